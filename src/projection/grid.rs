/// Overlay geometry for the live camera guide
///
/// Every capture position owns a cell on the sphere. Band cells span half the
/// ring spacing either side of the position heading and reach halfway to the
/// neighboring rings; the two polar cells are caps. Boundaries are sampled at
/// a fixed angular step and pushed through the pinhole camera, skipping any
/// sample that falls behind it.

use std::collections::BTreeSet;

use super::pinhole::PinholeCamera;
use super::{polyline_runs, CellState, ScreenPoint, ViewOrientation};
use crate::angles::sample_range;
use crate::capture::positions::{catalog, position, positions_in_ring, Ring, LOWER_PITCH, UPPER_PITCH};

/// Boundary between the zenith cap and the upper ring
pub const UPPER_CAP_EDGE: f64 = (90.0 + UPPER_PITCH) / 2.0;

/// Boundary between the upper ring and the equator
pub const UPPER_EQUATOR_EDGE: f64 = UPPER_PITCH / 2.0;

/// Boundary between the equator and the lower ring
pub const LOWER_EQUATOR_EDGE: f64 = LOWER_PITCH / 2.0;

/// Boundary between the lower ring and the nadir cap
pub const LOWER_CAP_EDGE: f64 = (-90.0 + LOWER_PITCH) / 2.0;

/// Default sampling step along boundaries (degrees)
pub const DEFAULT_BOUNDARY_STEP: f64 = 4.0;

/// Markers further than this outside the viewport are not drawn (pixels)
const MARKER_MARGIN: f64 = 64.0;

/// Extent of one capture cell on the sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellShape {
    /// Heading/pitch rectangle; headings are relative and may exceed [0, 360)
    Band {
        heading_from: f64,
        heading_to: f64,
        pitch_low: f64,
        pitch_high: f64,
    },
    /// Polar cap bounded by a single latitude circle
    Cap { edge_pitch: f64, pole_pitch: f64 },
}

/// Pitch range of a non-polar ring's band
fn band_pitches(ring: Ring) -> Option<(f64, f64)> {
    match ring {
        Ring::Upper => Some((UPPER_EQUATOR_EDGE, UPPER_CAP_EDGE)),
        Ring::Equator => Some((LOWER_EQUATOR_EDGE, UPPER_EQUATOR_EDGE)),
        Ring::Lower => Some((LOWER_CAP_EDGE, LOWER_EQUATOR_EDGE)),
        Ring::Zenith | Ring::Nadir => None,
    }
}

/// Half the heading spacing within a ring
fn half_width(ring: Ring) -> f64 {
    let count = positions_in_ring(ring).count().max(1);
    180.0 / count as f64
}

/// Cell of a catalog position; `None` for an invalid index
pub fn cell_shape(index: usize) -> Option<CellShape> {
    let p = position(index)?;
    let shape = match p.ring {
        Ring::Zenith => CellShape::Cap {
            edge_pitch: UPPER_CAP_EDGE,
            pole_pitch: 90.0,
        },
        Ring::Nadir => CellShape::Cap {
            edge_pitch: LOWER_CAP_EDGE,
            pole_pitch: -90.0,
        },
        ring => {
            let (pitch_low, pitch_high) = band_pitches(ring)?;
            let half = half_width(ring);
            CellShape::Band {
                heading_from: p.heading - half,
                heading_to: p.heading + half,
                pitch_low,
                pitch_high,
            }
        }
    };
    Some(shape)
}

/// Sampled outline of a cell as (relative heading, pitch) pairs
///
/// Bands are walked clockwise: top edge, right edge, bottom edge, left edge.
/// Caps start at the pole and then walk the edge circle.
pub fn cell_outline(shape: &CellShape, step: f64) -> Vec<(f64, f64)> {
    match *shape {
        CellShape::Band {
            heading_from,
            heading_to,
            pitch_low,
            pitch_high,
        } => {
            let mut outline: Vec<(f64, f64)> = sample_range(heading_from, heading_to, step)
                .into_iter()
                .map(|h| (h, pitch_high))
                .collect();
            outline.extend(
                sample_range(pitch_high, pitch_low, step)
                    .into_iter()
                    .skip(1)
                    .map(|p| (heading_to, p)),
            );
            outline.extend(
                sample_range(heading_to, heading_from, step)
                    .into_iter()
                    .skip(1)
                    .map(|h| (h, pitch_low)),
            );
            // Last sample would repeat the first corner
            let left = sample_range(pitch_low, pitch_high, step);
            let inner = left.len().saturating_sub(2);
            outline.extend(left.into_iter().skip(1).take(inner).map(|p| (heading_from, p)));
            outline
        }
        CellShape::Cap {
            edge_pitch,
            pole_pitch,
        } => {
            let mut outline = vec![(0.0, pole_pitch)];
            outline.extend(
                sample_range(0.0, 360.0, step)
                    .into_iter()
                    .map(|h| (h, edge_pitch)),
            );
            outline
        }
    }
}

/// A capture cell as seen through the camera
#[derive(Debug, Clone, PartialEq)]
pub struct CellPolygon {
    pub index: usize,
    pub state: CellState,
    /// Visible outline vertices in drawing order
    pub points: Vec<ScreenPoint>,
    /// `false` when some vertices were behind the camera and skipped
    pub closed: bool,
}

/// What to draw at a cell's center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Checkmark,
    /// Pulsing target reticle
    Reticle,
    Dot,
}

impl From<CellState> for MarkerKind {
    fn from(state: CellState) -> Self {
        match state {
            CellState::Captured => MarkerKind::Checkmark,
            CellState::Active => MarkerKind::Reticle,
            CellState::Pending => MarkerKind::Dot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMarker {
    pub index: usize,
    pub kind: MarkerKind,
    pub at: ScreenPoint,
}

/// Everything the overlay draws for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayScene {
    pub cells: Vec<CellPolygon>,
    pub wireframe: Vec<Vec<ScreenPoint>>,
    pub markers: Vec<CellMarker>,
}

/// Inputs for building the overlay scene
#[derive(Debug, Clone, Copy)]
pub struct OverlayInputs<'a> {
    pub camera: PinholeCamera,
    pub view: ViewOrientation,
    pub captured: &'a BTreeSet<usize>,
    pub active: Option<usize>,
    pub step: f64,
}

/// Project one cell through the camera
pub fn project_cell(inputs: &OverlayInputs<'_>, index: usize) -> Option<CellPolygon> {
    let shape = cell_shape(index)?;
    let outline = cell_outline(&shape, inputs.step);
    let total = outline.len();

    let points: Vec<ScreenPoint> = outline
        .into_iter()
        .filter_map(|(h, p)| inputs.camera.project(&inputs.view, h, p).screen())
        .collect();

    Some(CellPolygon {
        index,
        state: CellState::of(index, inputs.captured, inputs.active),
        closed: points.len() == total,
        points,
    })
}

/// Sampled (relative heading, pitch) curves for all ring and meridian boundaries
pub fn boundary_curves(step: f64) -> Vec<Vec<(f64, f64)>> {
    let mut curves = Vec::new();

    for pitch in [UPPER_CAP_EDGE, UPPER_EQUATOR_EDGE, LOWER_EQUATOR_EDGE, LOWER_CAP_EDGE] {
        curves.push(
            sample_range(0.0, 360.0, step)
                .into_iter()
                .map(|h| (h, pitch))
                .collect(),
        );
    }

    for ring in [Ring::Upper, Ring::Equator, Ring::Lower] {
        let Some((low, high)) = band_pitches(ring) else {
            continue;
        };
        let half = half_width(ring);
        for p in positions_in_ring(ring) {
            let heading = p.heading - half;
            curves.push(
                sample_range(low, high, step)
                    .into_iter()
                    .map(|pitch| (heading, pitch))
                    .collect(),
            );
        }
    }

    curves
}

/// Build the full overlay for the current camera orientation
pub fn build_overlay(inputs: &OverlayInputs<'_>) -> OverlayScene {
    let cells = catalog()
        .iter()
        .filter_map(|p| project_cell(inputs, p.index))
        .filter(|cell| !cell.points.is_empty())
        .collect();

    let wireframe = boundary_curves(inputs.step)
        .into_iter()
        .flat_map(|curve| {
            polyline_runs(
                curve
                    .into_iter()
                    .map(|(h, p)| inputs.camera.project(&inputs.view, h, p)),
            )
        })
        .collect();

    let markers = catalog()
        .iter()
        .filter_map(|p| {
            let projected = inputs.camera.project_position(&inputs.view, p.index);
            if !inputs.camera.in_viewport(&projected, MARKER_MARGIN) {
                return None;
            }
            let at = projected.screen()?;
            Some(CellMarker {
                index: p.index,
                kind: CellState::of(p.index, inputs.captured, inputs.active).into(),
                at,
            })
        })
        .collect();

    OverlayScene {
        cells,
        wireframe,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs<'a>(view: ViewOrientation, captured: &'a BTreeSet<usize>, active: Option<usize>) -> OverlayInputs<'a> {
        OverlayInputs {
            camera: PinholeCamera::new(1080.0, 1920.0, 70.0),
            view,
            captured,
            active,
            step: DEFAULT_BOUNDARY_STEP,
        }
    }

    #[test]
    fn test_boundary_pitches() {
        assert_relative_eq!(UPPER_CAP_EDGE, 72.5);
        assert_relative_eq!(UPPER_EQUATOR_EDGE, 27.5);
        assert_relative_eq!(LOWER_EQUATOR_EDGE, -27.5);
        assert_relative_eq!(LOWER_CAP_EDGE, -72.5);
    }

    #[test]
    fn test_cell_shapes() {
        assert_eq!(
            cell_shape(7),
            Some(CellShape::Band {
                heading_from: -22.5,
                heading_to: 22.5,
                pitch_low: -27.5,
                pitch_high: 27.5,
            })
        );
        assert_eq!(
            cell_shape(15),
            Some(CellShape::Band {
                heading_from: 0.0,
                heading_to: 60.0,
                pitch_low: -72.5,
                pitch_high: -27.5,
            })
        );
        assert_eq!(
            cell_shape(0),
            Some(CellShape::Cap {
                edge_pitch: 72.5,
                pole_pitch: 90.0
            })
        );
        assert_eq!(cell_shape(22), None);
    }

    #[test]
    fn test_band_outline_has_no_duplicate_corners() {
        let shape = cell_shape(1).unwrap();
        let outline = cell_outline(&shape, 4.0);
        for pair in outline.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_ne!(outline.first(), outline.last());
        assert_eq!(outline[0], (-30.0, 72.5));
    }

    #[test]
    fn test_cap_outline_starts_at_pole() {
        let shape = cell_shape(21).unwrap();
        let outline = cell_outline(&shape, 4.0);
        assert_eq!(outline[0], (0.0, -90.0));
        assert_eq!(outline.len(), 1 + 91);
        assert!(outline[1..].iter().all(|&(_, p)| p == -72.5));
    }

    #[test]
    fn test_faced_cell_is_closed() {
        let captured = BTreeSet::new();
        let inputs = inputs(ViewOrientation::new(0.0, 0.0, 0.0), &captured, Some(7));
        let cell = project_cell(&inputs, 7).unwrap();
        assert!(cell.closed);
        assert_eq!(cell.state, CellState::Active);
        assert!(cell.points.iter().all(|p| p.x > 0.0 && p.x < 1080.0));
    }

    #[test]
    fn test_cell_behind_camera_skipped() {
        let captured = BTreeSet::new();
        let inputs = inputs(ViewOrientation::new(0.0, 0.0, 0.0), &captured, None);

        // Back is entirely behind the camera
        let back = project_cell(&inputs, 11).unwrap();
        assert!(back.points.is_empty());
        assert!(!back.closed);

        // Right straddles the image plane: partially visible, left open
        let right = project_cell(&inputs, 9).unwrap();
        assert!(!right.points.is_empty());
        assert!(!right.closed);

        let scene = build_overlay(&inputs);
        assert!(scene.cells.iter().all(|c| c.index != 11));
        assert!(scene.cells.iter().any(|c| c.index == 9));
    }

    #[test]
    fn test_markers_reflect_state() {
        let captured: BTreeSet<usize> = [7].into_iter().collect();
        let scene = build_overlay(&inputs(ViewOrientation::new(20.0, 0.0, 0.0), &captured, Some(8)));

        let kind_of = |index| scene.markers.iter().find(|m| m.index == index).map(|m| m.kind);
        assert_eq!(kind_of(7), Some(MarkerKind::Checkmark));
        assert_eq!(kind_of(8), Some(MarkerKind::Reticle));
        assert_eq!(kind_of(11), None);

        let center = scene.markers.iter().find(|m| m.index == 7).unwrap().at;
        assert!(center.x < 540.0, "Front is left of center when facing 20°");
    }

    #[test]
    fn test_off_screen_markers_dropped() {
        let captured = BTreeSet::new();
        let scene = build_overlay(&inputs(ViewOrientation::new(0.0, 0.0, 0.0), &captured, Some(7)));
        let indices: Vec<usize> = scene.markers.iter().map(|m| m.index).collect();

        // Upper Front is in front of the camera but well above a portrait viewport
        assert!(indices.contains(&7));
        assert!(!indices.contains(&1));
        assert!(scene.markers.iter().all(|m| m.at.y > -MARKER_MARGIN));
    }

    #[test]
    fn test_wireframe_breaks_behind_camera() {
        let captured = BTreeSet::new();
        let scene = build_overlay(&inputs(ViewOrientation::new(0.0, 0.0, 0.0), &captured, None));

        assert!(!scene.wireframe.is_empty());
        assert!(scene.wireframe.iter().all(|run| run.len() >= 2));
        // Looking at the horizon, the poles' edge circles are partly behind
        let curves = boundary_curves(DEFAULT_BOUNDARY_STEP);
        assert_eq!(curves.len(), 4 + 6 + 8 + 6);
        assert!(scene.wireframe.len() > 4);
    }
}
