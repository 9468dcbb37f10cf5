/// Overview sphere showing every capture position at once
///
/// The sphere turns with the device so the faced position sits in the
/// middle; positions on the far side fade out and are dropped past the rim.
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle};
use std::collections::BTreeSet;

use super::{polyline_path, state_color, to_point, with_alpha};
use crate::projection::sphere::{minimap_dots, MinimapView};
use crate::projection::{CellState, ViewOrientation};
use crate::Message;

/// Snapshot of the session for the overview widget
#[derive(Debug, Clone)]
pub struct SphereMinimap {
    pub view: Option<ViewOrientation>,
    /// Preferred sphere radius; shrunk to fit the widget bounds
    pub radius: f64,
    pub captured: BTreeSet<usize>,
    pub active: Option<usize>,
    pub aligned: bool,
}

impl canvas::Program<Message> for SphereMinimap {
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

        let fit = (bounds.width.min(bounds.height) / 2.0 - 6.0).max(1.0) as f64;
        let radius = self.radius.min(fit);

        frame.fill(&Path::circle(center, radius as f32), Color::from_rgba(1.0, 1.0, 1.0, 0.05));
        frame.stroke(
            &Path::circle(center, radius as f32),
            Stroke::default()
                .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.3))
                .with_width(1.0),
        );

        // Without a heading, show the layout as seen from the start direction
        let orientation = self.view.unwrap_or(ViewOrientation::new(0.0, 0.0, 0.0));
        let view = MinimapView {
            cx: center.x as f64,
            cy: center.y as f64,
            radius,
            orientation,
        };

        for run in view.latitude_circle(0.0, 6.0) {
            frame.stroke(
                &polyline_path(&run, false),
                Stroke::default()
                    .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.25))
                    .with_width(1.0),
            );
        }

        // Already sorted back to front
        for dot in minimap_dots(&view, &self.captured, self.active) {
            let at: Point = to_point(&dot.at);
            let opacity = dot.opacity as f32;
            let size = match dot.state {
                CellState::Active => 5.5,
                CellState::Captured => 4.5,
                CellState::Pending => 3.0,
            };
            let color = state_color(dot.state, self.aligned);
            frame.fill(&Path::circle(at, size), with_alpha(color, opacity));
        }

        vec![frame.into_geometry()]
    }
}
