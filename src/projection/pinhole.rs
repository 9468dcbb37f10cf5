/// Pinhole camera projection for the full-screen overlay
///
/// Models the live camera so the overlay lines up with the preview:
/// `f = (width / 2) / tan(hfov / 2)`, `x' = cx + f * x / z`, `y' = cy - f * y / z`.

use super::{ProjectedPoint, ViewOrientation};
use crate::capture::positions::position;

/// Reference horizontal field of view of a phone main camera (degrees)
pub const DEFAULT_HORIZONTAL_FOV: f64 = 70.0;

/// Usable range of the horizontal field of view (degrees)
pub const MIN_HORIZONTAL_FOV: f64 = 1.0;
pub const MAX_HORIZONTAL_FOV: f64 = 179.0;

/// Points with a forward component at or below this are behind the camera
pub const NEAR_PLANE: f64 = 0.01;

/// Viewport size and lens of the live camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCamera {
    pub width: f64,
    pub height: f64,
    /// Horizontal field of view in degrees
    pub horizontal_fov: f64,
}

impl PinholeCamera {
    pub fn new(width: f64, height: f64, horizontal_fov: f64) -> Self {
        Self {
            width,
            height,
            horizontal_fov,
        }
    }

    /// Focal length in pixels
    ///
    /// The field of view is clamped to the usable lens range first, so a
    /// zero or negative fov cannot blow up or mirror the image.
    pub fn focal_length(&self) -> f64 {
        let fov = self.horizontal_fov.clamp(MIN_HORIZONTAL_FOV, MAX_HORIZONTAL_FOV);
        (self.width / 2.0) / (fov.to_radians() / 2.0).tan()
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Project a (relative heading, pitch) direction seen from `view`
    ///
    /// Directions behind the camera, or that do not land on a finite screen
    /// coordinate, come back with `visible == false`.
    pub fn project(&self, view: &ViewOrientation, heading: f64, pitch: f64) -> ProjectedPoint {
        let v = view.to_view(heading, pitch);
        if v.z <= NEAR_PLANE {
            return ProjectedPoint {
                depth: v.z,
                ..ProjectedPoint::hidden()
            };
        }

        let f = self.focal_length();
        let (cx, cy) = self.center();
        let (x, y) = (cx + f * (v.x / v.z), cy - f * (v.y / v.z));
        if !x.is_finite() || !y.is_finite() {
            return ProjectedPoint {
                depth: v.z,
                ..ProjectedPoint::hidden()
            };
        }

        ProjectedPoint {
            x,
            y,
            depth: v.z,
            visible: true,
        }
    }

    /// Project a catalog position; invalid indices give a hidden point
    pub fn project_position(&self, view: &ViewOrientation, index: usize) -> ProjectedPoint {
        match position(index) {
            Some(p) => self.project(view, p.heading, p.pitch),
            None => ProjectedPoint::hidden(),
        }
    }

    /// Whether a visible point lands inside the viewport, with `margin` slack
    pub fn in_viewport(&self, point: &ProjectedPoint, margin: f64) -> bool {
        point.visible
            && point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }
}

impl Default for PinholeCamera {
    fn default() -> Self {
        Self::new(1080.0, 1920.0, DEFAULT_HORIZONTAL_FOV)
    }
}
