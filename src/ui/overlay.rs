/// Full-screen capture guide drawn over the camera preview
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Vector};
use std::collections::BTreeSet;

use super::{polyline_path, state_color, to_point, with_alpha, CAPTURED_COLOR};
use crate::projection::grid::{build_overlay, MarkerKind, OverlayInputs};
use crate::projection::pinhole::PinholeCamera;
use crate::projection::{CellState, ViewOrientation};
use crate::Message;

/// Snapshot of everything the overlay needs for one frame
#[derive(Debug, Clone)]
pub struct GuideOverlay {
    /// `None` while the orientation sensor is not reporting
    pub view: Option<ViewOrientation>,
    pub horizontal_fov: f64,
    pub boundary_step: f64,
    pub captured: BTreeSet<usize>,
    pub active: Option<usize>,
    pub aligned: bool,
    /// Captured neighbors of the active target
    pub overlap: Vec<usize>,
    /// Animation phase in [0, 1) for the pulsing reticle
    pub pulse: f32,
}

impl canvas::Program<Message> for GuideOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let center = frame.center();

        // Stand-in for the camera preview
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::from_rgb(0.06, 0.07, 0.09));

        let Some(view) = self.view else {
            frame.fill_text(canvas::Text {
                content: "Waiting for orientation sensor...".to_string(),
                position: center,
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.7),
                size: iced::Pixels(20.0),
                horizontal_alignment: iced::alignment::Horizontal::Center,
                vertical_alignment: iced::alignment::Vertical::Center,
                ..canvas::Text::default()
            });
            return vec![frame.into_geometry()];
        };

        let inputs = OverlayInputs {
            camera: PinholeCamera::new(bounds.width as f64, bounds.height as f64, self.horizontal_fov),
            view,
            captured: &self.captured,
            active: self.active,
            step: self.boundary_step,
        };
        let scene = build_overlay(&inputs);

        // Cell fills; open polygons (cut by the image plane) are still filled
        for cell in &scene.cells {
            if cell.points.len() < 3 {
                continue;
            }
            let alpha = match cell.state {
                CellState::Captured => 0.22,
                CellState::Active => 0.18 + 0.12 * pulse_wave(self.pulse),
                CellState::Pending => 0.04,
            };
            let path = polyline_path(&cell.points, true);
            frame.fill(&path, with_alpha(state_color(cell.state, self.aligned), alpha));

            if self.overlap.contains(&cell.index) && cell.closed {
                frame.stroke(
                    &path,
                    Stroke::default()
                        .with_color(with_alpha(CAPTURED_COLOR, 0.8))
                        .with_width(2.0),
                );
            }
        }

        // Ring and meridian boundaries
        for run in &scene.wireframe {
            frame.stroke(
                &polyline_path(run, false),
                Stroke::default()
                    .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.35))
                    .with_width(1.0),
            );
        }

        for marker in &scene.markers {
            let at = to_point(&marker.at);
            match marker.kind {
                MarkerKind::Checkmark => draw_checkmark(&mut frame, at),
                MarkerKind::Reticle => draw_reticle(&mut frame, at, self.pulse, self.aligned),
                MarkerKind::Dot => {
                    frame.fill(&Path::circle(at, 3.0), Color::from_rgba(1.0, 1.0, 1.0, 0.35));
                }
            }
        }

        draw_crosshair(&mut frame, center, self.aligned);

        vec![frame.into_geometry()]
    }
}

/// Smooth 0..1..0 wave over one pulse period
fn pulse_wave(phase: f32) -> f32 {
    0.5 - 0.5 * (phase * std::f32::consts::TAU).cos()
}

fn draw_checkmark(frame: &mut canvas::Frame, at: Point) {
    frame.fill(&Path::circle(at, 13.0), with_alpha(CAPTURED_COLOR, 0.85));
    let tick = Path::new(|b| {
        b.move_to(at + Vector::new(-6.0, 0.0));
        b.line_to(at + Vector::new(-2.0, 5.0));
        b.line_to(at + Vector::new(7.0, -5.0));
    });
    frame.stroke(&tick, Stroke::default().with_color(Color::WHITE).with_width(3.0));
}

fn draw_reticle(frame: &mut canvas::Frame, at: Point, pulse: f32, aligned: bool) {
    let color = state_color(CellState::Active, aligned);
    let radius = 16.0 + 8.0 * pulse_wave(pulse);

    frame.stroke(
        &Path::circle(at, radius),
        Stroke::default()
            .with_color(with_alpha(color, 1.0 - 0.5 * pulse_wave(pulse)))
            .with_width(3.0),
    );
    frame.fill(&Path::circle(at, 4.0), color);

    // Short ticks on the four sides
    let ticks = Path::new(|b| {
        for (dx, dy) in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
            b.move_to(at + Vector::new(dx * (radius + 4.0), dy * (radius + 4.0)));
            b.line_to(at + Vector::new(dx * (radius + 12.0), dy * (radius + 12.0)));
        }
    });
    frame.stroke(&ticks, Stroke::default().with_color(color).with_width(2.0));
}

fn draw_crosshair(frame: &mut canvas::Frame, center: Point, aligned: bool) {
    let color = if aligned {
        state_color(CellState::Active, true)
    } else {
        Color::from_rgba(1.0, 1.0, 1.0, 0.8)
    };
    let cross = Path::new(|b| {
        b.move_to(center + Vector::new(-10.0, 0.0));
        b.line_to(center + Vector::new(10.0, 0.0));
        b.move_to(center + Vector::new(0.0, -10.0));
        b.line_to(center + Vector::new(0.0, 10.0));
    });
    frame.stroke(&cross, Stroke::default().with_color(color).with_width(2.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_wave_range() {
        assert!(pulse_wave(0.0).abs() < 1e-6);
        assert!((pulse_wave(0.5) - 1.0).abs() < 1e-6);
        for i in 0..20 {
            let v = pulse_wave(i as f32 / 20.0);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
