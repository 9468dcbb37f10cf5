/// Canvas widgets for the capture guide
///
/// - `overlay.rs` - full-screen pinhole grid matching the live camera
/// - `minimap.rs` - small orthographic overview sphere
///
/// Both are pure views: they read the session snapshot they were built with
/// and never send messages back.

pub mod minimap;
pub mod overlay;

use iced::widget::canvas::Path;
use iced::{Color, Point};

use crate::projection::{CellState, ScreenPoint};

pub const CAPTURED_COLOR: Color = Color {
    r: 0.30,
    g: 0.85,
    b: 0.45,
    a: 1.0,
};
pub const ACTIVE_COLOR: Color = Color {
    r: 1.0,
    g: 0.78,
    b: 0.20,
    a: 1.0,
};
pub const ALIGNED_COLOR: Color = Color {
    r: 0.25,
    g: 0.95,
    b: 1.0,
    a: 1.0,
};
pub const PENDING_COLOR: Color = Color {
    r: 0.85,
    g: 0.88,
    b: 0.92,
    a: 1.0,
};

pub fn to_point(p: &ScreenPoint) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

/// Build a path through `points`, optionally closing it
pub fn polyline_path(points: &[ScreenPoint], close: bool) -> Path {
    Path::new(|builder| {
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            builder.move_to(to_point(first));
            for p in iter {
                builder.line_to(to_point(p));
            }
            if close {
                builder.close();
            }
        }
    })
}

/// Base color for a cell, switching the active cell over once aligned
pub fn state_color(state: CellState, aligned: bool) -> Color {
    match state {
        CellState::Captured => CAPTURED_COLOR,
        CellState::Active if aligned => ALIGNED_COLOR,
        CellState::Active => ACTIVE_COLOR,
        CellState::Pending => PENDING_COLOR,
    }
}

pub fn with_alpha(color: Color, alpha: f32) -> Color {
    Color { a: alpha, ..color }
}
