use iced::keyboard::{self, key};
use iced::time::{self, Instant};
use iced::widget::{canvas, column, container, row, text, Column};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;

mod angles;
mod capture;
mod error;
mod projection;
mod state;
mod ui;

use capture::positions::{position, POSITION_COUNT};
use capture::progress::{direction_label, guidance_hint, overlap_neighbors, pitch_guidance, ring_progress};
use projection::ViewOrientation;
use state::config::GuideConfig;
use state::manifest::{export_dir, export_manifest};
use state::orientation::{Orientation, OrientationFilter};
use state::session::{CaptureOutcome, CaptureSession, FrameHandle};

/// Degrees moved per arrow key press (hold Shift for coarse steps)
const FINE_STEP: f64 = 1.0;
const COARSE_STEP: f64 = 10.0;

/// Main application state
struct PanoGuide {
    config: GuideConfig,
    session: CaptureSession,
    filter: OrientationFilter,
    /// Simulated raw sensor reading
    sensor_heading: f64,
    sensor_pitch: f64,
    sensor_online: bool,
    /// Last orientation that made it through the change filter
    orientation: Orientation,
    active_target: Option<usize>,
    aligned: bool,
    next_frame_id: u64,
    /// Reticle animation phase in [0, 1)
    pulse: f32,
    last_tick: Option<Instant>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Orientation sensor moved by the given delta
    Rotate { heading: f64, pitch: f64 },
    /// Simulate the sensor dropping out or coming back
    ToggleSensor,
    /// User pressed the shutter
    Capture,
    /// Discard all captures and start over
    Reset,
    /// Write the upload manifest
    Export,
    /// Background export finished
    ExportComplete(Result<PathBuf, String>),
    /// Animation frame
    Tick(Instant),
}

impl PanoGuide {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = GuideConfig::load_or_default();
        info!(
            "🧭 Pano Guide initialized: {} capture positions, {:.0}° field of view",
            POSITION_COUNT, config.horizontal_fov
        );

        let mut guide = PanoGuide {
            config,
            session: CaptureSession::new(),
            filter: OrientationFilter::new(config.orientation_threshold),
            sensor_heading: 0.0,
            sensor_pitch: 0.0,
            sensor_online: true,
            orientation: Orientation::unavailable(),
            active_target: None,
            aligned: false,
            next_frame_id: 1,
            pulse: 0.0,
            last_tick: None,
            status: "Arrows: move  Space: capture  R: reset  E: export  S: toggle sensor".to_string(),
        };
        guide.feed_sensor();

        (guide, Task::none())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Rotate { heading, pitch } => {
                self.sensor_heading = angles::normalize_heading(self.sensor_heading + heading);
                self.sensor_pitch = angles::clamp_pitch(self.sensor_pitch + pitch);
                self.feed_sensor();
                Task::none()
            }
            Message::ToggleSensor => {
                self.sensor_online = !self.sensor_online;
                if self.sensor_online {
                    info!("📡 Orientation sensor back online");
                } else {
                    warn!("⚠️  Orientation sensor unavailable");
                }
                self.feed_sensor();
                Task::none()
            }
            Message::Capture => {
                self.capture();
                Task::none()
            }
            Message::Reset => {
                self.session.reset();
                self.filter.reset();
                self.active_target = None;
                self.feed_sensor();
                self.status = "Session reset. Start again from any direction.".to_string();
                Task::none()
            }
            Message::Export => {
                let manifest = match self.session.manifest() {
                    Ok(manifest) => manifest,
                    Err(e) => {
                        self.status = format!("Cannot export: {}", e);
                        return Task::none();
                    }
                };
                let dir = match export_dir() {
                    Ok(dir) => dir,
                    Err(e) => {
                        self.status = format!("Cannot export: {}", e);
                        return Task::none();
                    }
                };

                self.status = format!("Exporting {} frames...", manifest.entries.len());
                Task::perform(export_manifest(manifest, dir), Message::ExportComplete)
            }
            Message::ExportComplete(result) => {
                self.status = match result {
                    Ok(path) => format!("✅ Manifest written to {}", path.display()),
                    Err(e) => {
                        warn!("⚠️  Export failed: {}", e);
                        format!("Export failed: {}", e)
                    }
                };
                Task::none()
            }
            Message::Tick(now) => {
                if let Some(last) = self.last_tick {
                    let dt = now.saturating_duration_since(last).as_secs_f32();
                    // One pulse per 1.2 seconds
                    self.pulse = (self.pulse + dt / 1.2).fract();
                }
                self.last_tick = Some(now);
                Task::none()
            }
        }
    }

    /// Push the simulated sensor reading through the change filter
    fn feed_sensor(&mut self) {
        let sample = if self.sensor_online {
            Orientation::new(self.sensor_heading, self.sensor_pitch)
        } else {
            Orientation::unavailable()
        };

        if let Some(orientation) = self.filter.update(sample) {
            self.orientation = orientation;
            self.refresh_guidance();
        }
    }

    /// Recompute the active target and alignment from the current state
    fn refresh_guidance(&mut self) {
        self.active_target = self.session.active_target(&self.orientation, self.active_target);

        let aligned = self
            .active_target
            .map(|target| {
                self.session
                    .alignment(&self.orientation, target, self.config.tolerance())
                    .aligned
            })
            .unwrap_or(false);

        if aligned != self.aligned {
            debug!("🎯 Alignment {}", if aligned { "acquired" } else { "lost" });
        }
        self.aligned = aligned;
    }

    /// Snapshot the active target with the current orientation
    fn capture(&mut self) {
        let Some(index) = self.active_target else {
            self.status = "All positions captured. Press E to export.".to_string();
            return;
        };

        if !self.aligned {
            self.status = "Not aligned yet - follow the guide to the highlighted cell.".to_string();
            return;
        }

        let frame = FrameHandle::new(self.next_frame_id);
        self.next_frame_id += 1;

        if self
            .session
            .record(index, &self.orientation, CaptureOutcome::Captured(frame))
        {
            self.refresh_guidance();
            self.status = if self.session.is_complete() {
                format!("🎉 All {} positions captured! Press E to export.", POSITION_COUNT)
            } else {
                format!(
                    "Captured {}/{}",
                    self.session.captured_count(),
                    POSITION_COUNT
                )
            };
        } else {
            self.status = "Capture not recorded - waiting for a compass heading.".to_string();
        }
    }

    fn view_orientation(&self) -> Option<ViewOrientation> {
        let (heading, pitch) = self.orientation.angles()?;
        let start = self.session.effective_start_heading(&self.orientation)?;
        Some(ViewOrientation::new(heading, pitch, start))
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let captured = self.session.captured_set();
        let view = self.view_orientation();

        let overlay = ui::overlay::GuideOverlay {
            view,
            horizontal_fov: self.config.horizontal_fov,
            boundary_step: self.config.boundary_step,
            captured: captured.clone(),
            active: self.active_target,
            aligned: self.aligned,
            overlap: self
                .active_target
                .map(|target| overlap_neighbors(target, &captured))
                .unwrap_or_default(),
            pulse: self.pulse,
        };

        let minimap = ui::minimap::SphereMinimap {
            view,
            radius: self.config.minimap_radius,
            captured: captured.clone(),
            active: self.active_target,
            aligned: self.aligned,
        };

        let mut panel: Column<Message> = column![
            canvas(minimap)
                .width(Length::Fixed(160.0))
                .height(Length::Fixed(160.0)),
            text(format!(
                "Captured {}/{}",
                self.session.captured_count(),
                POSITION_COUNT
            ))
            .size(20),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(280.0))
        .align_x(Alignment::Start);

        match self.active_target.and_then(position) {
            Some(target) => {
                let start = self
                    .session
                    .effective_start_heading(&self.orientation)
                    .unwrap_or(0.0);
                let hint = guidance_hint(
                    &self.orientation,
                    target.index,
                    start,
                    self.config.tolerance(),
                );
                panel = panel
                    .push(text(direction_label(target)).size(18))
                    .push(text(pitch_guidance(target.ring)).size(14))
                    .push(text(hint.to_string()).size(14));
            }
            None => {
                panel = panel.push(text("Capture complete").size(18));
            }
        }

        for progress in ring_progress(&captured) {
            panel = panel.push(
                text(format!(
                    "{:<8} {}/{}{}",
                    progress.ring.name(),
                    progress.captured,
                    progress.total,
                    if progress.is_complete() { "  ✓" } else { "" }
                ))
                .size(13),
            );
        }

        panel = panel.push(text(&self.status).size(12));

        let content = row![
            canvas(overlay).width(Length::Fill).height(Length::Fill),
            panel,
        ];

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            keyboard::on_key_press(handle_key),
            time::every(Duration::from_millis(16)).map(Message::Tick),
        ])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Map keys to simulated sensor motion and capture actions
fn handle_key(key: keyboard::Key, modifiers: keyboard::Modifiers) -> Option<Message> {
    let step = if modifiers.shift() { COARSE_STEP } else { FINE_STEP };

    match key.as_ref() {
        keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::Rotate { heading: -step, pitch: 0.0 }),
        keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::Rotate { heading: step, pitch: 0.0 }),
        keyboard::Key::Named(key::Named::ArrowUp) => Some(Message::Rotate { heading: 0.0, pitch: step }),
        keyboard::Key::Named(key::Named::ArrowDown) => Some(Message::Rotate { heading: 0.0, pitch: -step }),
        keyboard::Key::Named(key::Named::Space) => Some(Message::Capture),
        keyboard::Key::Character("r") => Some(Message::Reset),
        keyboard::Key::Character("e") => Some(Message::Export),
        keyboard::Key::Character("s") => Some(Message::ToggleSensor),
        _ => None,
    }
}

fn main() -> iced::Result {
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    iced::application("Pano Guide", PanoGuide::update, PanoGuide::view)
        .subscription(PanoGuide::subscription)
        .theme(PanoGuide::theme)
        .centered()
        .run_with(PanoGuide::new)
}
