/// Orthographic projection for the overview sphere widget
///
/// Parallel rays, no perspective: a direction maps to `center + (x, -y) * radius`
/// after rotating the sphere into the viewer's frame. The rotated Z drives
/// back-face culling, draw order and fading.

use std::collections::BTreeSet;

use super::{polyline_runs, to_cartesian, CellState, ProjectedPoint, ScreenPoint, ViewOrientation};
use crate::angles::sample_range;
use crate::capture::positions::{catalog, position};

/// Points with rotated Z below this are on the far side and not drawn
pub const BACK_FACE_CUTOFF: f64 = -0.1;

/// Opacity of the furthest visible dot
const MIN_OPACITY: f64 = 0.25;

/// Placement and orientation of the overview sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapView {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub orientation: ViewOrientation,
}

impl MinimapView {
    /// Project a (relative heading, pitch) direction
    pub fn project(&self, heading: f64, pitch: f64) -> ProjectedPoint {
        let v = self.orientation.rotation() * to_cartesian(heading, pitch);
        ProjectedPoint {
            x: self.cx + v.x * self.radius,
            y: self.cy - v.y * self.radius,
            depth: v.z,
            visible: v.z >= BACK_FACE_CUTOFF,
        }
    }

    /// Project a catalog position; invalid indices give a hidden point
    pub fn project_position(&self, index: usize) -> ProjectedPoint {
        match position(index) {
            Some(p) => self.project(p.heading, p.pitch),
            None => ProjectedPoint {
                x: self.cx,
                y: self.cy,
                ..ProjectedPoint::hidden()
            },
        }
    }

    /// Front-facing runs of a constant-pitch circle, e.g. the horizon
    pub fn latitude_circle(&self, pitch: f64, step: f64) -> Vec<Vec<ScreenPoint>> {
        polyline_runs(
            sample_range(0.0, 360.0, step)
                .into_iter()
                .map(|heading| self.project(heading, pitch)),
        )
    }
}

/// Map depth to opacity so the far side of the sphere fades out
pub fn depth_opacity(depth: f64) -> f64 {
    let t = ((depth - BACK_FACE_CUTOFF) / (1.0 - BACK_FACE_CUTOFF)).clamp(0.0, 1.0);
    MIN_OPACITY + (1.0 - MIN_OPACITY) * t
}

/// One catalog position as drawn on the overview sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapDot {
    pub index: usize,
    pub at: ScreenPoint,
    pub depth: f64,
    pub opacity: f64,
    pub state: CellState,
}

/// Visible catalog positions, sorted back to front
pub fn minimap_dots(view: &MinimapView, captured: &BTreeSet<usize>, active: Option<usize>) -> Vec<MinimapDot> {
    let mut dots: Vec<MinimapDot> = catalog()
        .iter()
        .filter_map(|p| {
            let projected = view.project_position(p.index);
            let at = projected.screen()?;
            Some(MinimapDot {
                index: p.index,
                at,
                depth: projected.depth,
                opacity: depth_opacity(projected.depth),
                state: CellState::of(p.index, captured, active),
            })
        })
        .collect();

    dots.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    dots
}
