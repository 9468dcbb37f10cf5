/// Projection of capture positions onto the 2D drawing surface
///
/// Architecture:
/// - `sphere.rs` - orthographic projection for the overview widget
/// - `pinhole.rs` - perspective projection matching the live camera
/// - `grid.rs` - cell polygons, wireframe and markers for the overlay
///
/// Directions use Y = up, Z = forward, X = right. Screen Y grows downward.

use cgmath::{Deg, Matrix3, Vector3};

pub mod grid;
pub mod pinhole;
pub mod sphere;

/// Where the device currently points, plus the session anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOrientation {
    /// Current device heading (absolute)
    pub heading: f64,
    /// Current device pitch
    pub pitch: f64,
    /// Session start heading; relative headings are offset by this
    pub start_heading: f64,
}

impl ViewOrientation {
    pub fn new(heading: f64, pitch: f64, start_heading: f64) -> Self {
        Self {
            heading,
            pitch,
            start_heading,
        }
    }

    /// Rotation taking sphere directions into the viewer's frame
    ///
    /// Yaw by `start - heading` about Y, then pitch by the device pitch about
    /// X, so the point the device faces ends up on +Z.
    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_angle_x(Deg(self.pitch)) * Matrix3::from_angle_y(Deg(self.start_heading - self.heading))
    }

    /// Direction of a (relative heading, pitch) point in the viewer's frame
    pub fn to_view(&self, heading: f64, pitch: f64) -> Vector3<f64> {
        self.rotation() * to_cartesian(heading, pitch)
    }
}

/// Unit vector for a heading/pitch pair in degrees
pub fn to_cartesian(heading: f64, pitch: f64) -> Vector3<f64> {
    let (h, p) = (heading.to_radians(), pitch.to_radians());
    Vector3::new(p.cos() * h.sin(), p.sin(), p.cos() * h.cos())
}

/// A point on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Result of projecting a single direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    /// Forward component after rotation; larger is closer to the viewer
    pub depth: f64,
    /// `false` when the point is behind the sphere or the camera
    pub visible: bool,
}

impl ProjectedPoint {
    /// Zero-length, invisible projection used for invalid input
    pub fn hidden() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            depth: f64::NEG_INFINITY,
            visible: false,
        }
    }

    pub fn screen(&self) -> Option<ScreenPoint> {
        self.visible.then(|| ScreenPoint::new(self.x, self.y))
    }
}

/// Visual state of a capture cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Captured,
    /// The position the user is being guided to
    Active,
    Pending,
}

impl CellState {
    pub fn of(index: usize, captured: &std::collections::BTreeSet<usize>, active: Option<usize>) -> Self {
        if captured.contains(&index) {
            CellState::Captured
        } else if active == Some(index) {
            CellState::Active
        } else {
            CellState::Pending
        }
    }
}

/// Split a sampled curve into drawable runs
///
/// Hidden samples break the curve; runs shorter than two points are dropped.
pub fn polyline_runs(points: impl IntoIterator<Item = ProjectedPoint>) -> Vec<Vec<ScreenPoint>> {
    let mut runs = Vec::new();
    let mut current: Vec<ScreenPoint> = Vec::new();

    for point in points {
        match point.screen() {
            Some(p) => current.push(p),
            None => {
                if current.len() >= 2 {
                    runs.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }

    if current.len() >= 2 {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeSet;

    fn assert_direction(v: Vector3<f64>, x: f64, y: f64, z: f64) {
        assert_relative_eq!(v.x, x, epsilon = 1e-9);
        assert_relative_eq!(v.y, y, epsilon = 1e-9);
        assert_relative_eq!(v.z, z, epsilon = 1e-9);
    }

    #[test]
    fn test_cartesian_axes() {
        assert_direction(to_cartesian(0.0, 0.0), 0.0, 0.0, 1.0);
        assert_direction(to_cartesian(90.0, 0.0), 1.0, 0.0, 0.0);

        let up = to_cartesian(123.0, 90.0);
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_view_rotation_centers_faced_point() {
        let view = ViewOrientation::new(200.0, 30.0, 150.0);
        // Relative heading 50 from start 150 is exactly where the device points
        assert_direction(view.to_view(50.0, 30.0), 0.0, 0.0, 1.0);
    }

    #[test]
    fn test_view_rotation_pitch_direction() {
        let view = ViewOrientation::new(0.0, 0.0, 0.0);
        let v = view.to_view(0.0, 20.0);
        assert!(v.y > 0.0, "points above the horizon stay up");

        let tilted = ViewOrientation::new(0.0, 20.0, 0.0);
        let horizon = tilted.to_view(0.0, 0.0);
        assert!(horizon.y < 0.0, "horizon drops when tilting up");
    }

    #[test]
    fn test_polyline_breaks_on_hidden() {
        let visible = |x: f64| ProjectedPoint {
            x,
            y: 0.0,
            depth: 1.0,
            visible: true,
        };
        let runs = polyline_runs(vec![
            visible(0.0),
            visible(1.0),
            ProjectedPoint::hidden(),
            visible(2.0),
            ProjectedPoint::hidden(),
            visible(3.0),
            visible(4.0),
            visible(5.0),
        ]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1].len(), 3);
    }

    #[test]
    fn test_cell_state() {
        let captured: BTreeSet<usize> = [3].into_iter().collect();
        assert_eq!(CellState::of(3, &captured, Some(3)), CellState::Captured);
        assert_eq!(CellState::of(4, &captured, Some(4)), CellState::Active);
        assert_eq!(CellState::of(5, &captured, Some(4)), CellState::Pending);
    }
}
