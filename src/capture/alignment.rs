/// Alignment test between the live device orientation and a capture target

use serde::{Deserialize, Serialize};

use super::positions::position;
use crate::angles::{heading_delta, normalize_heading};
use crate::state::orientation::Orientation;

/// Default heading tolerance in degrees
pub const DEFAULT_HEADING_TOLERANCE: f64 = 15.0;

/// Default pitch tolerance in degrees
pub const DEFAULT_PITCH_TOLERANCE: f64 = 15.0;

/// How far the device may stray from a target and still count as aligned
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub heading: f64,
    pub pitch: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            heading: DEFAULT_HEADING_TOLERANCE,
            pitch: DEFAULT_PITCH_TOLERANCE,
        }
    }
}

/// Verdict of a single alignment check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentResult {
    /// Ready to capture
    pub aligned: bool,
    pub heading_aligned: bool,
    pub pitch_aligned: bool,
    /// Smallest heading difference to the target, [0, 180]
    pub heading_delta: f64,
    /// Absolute pitch difference to the target
    pub pitch_delta: f64,
}

impl AlignmentResult {
    /// Result for an unknown target or an unavailable sensor
    pub fn not_aligned() -> Self {
        Self {
            aligned: false,
            heading_aligned: false,
            pitch_aligned: false,
            heading_delta: 180.0,
            pitch_delta: 180.0,
        }
    }
}

/// Check whether the device points at the target position
///
/// Zenith and nadir targets ignore the heading entirely. An index outside
/// the catalog yields [`AlignmentResult::not_aligned`].
pub fn is_aligned(
    current_heading: f64,
    current_pitch: f64,
    target_index: usize,
    start_heading: f64,
    tolerance: Tolerance,
) -> AlignmentResult {
    let Some(target) = position(target_index) else {
        return AlignmentResult::not_aligned();
    };

    let pitch_delta = (current_pitch - target.pitch).abs();
    let pitch_aligned = pitch_delta <= tolerance.pitch;

    if target.ring.is_polar() {
        return AlignmentResult {
            aligned: pitch_aligned,
            heading_aligned: true,
            pitch_aligned,
            heading_delta: 0.0,
            pitch_delta,
        };
    }

    let target_heading = normalize_heading(start_heading + target.heading);
    let delta = heading_delta(current_heading, target_heading);
    let heading_aligned = delta <= tolerance.heading;

    AlignmentResult {
        aligned: heading_aligned && pitch_aligned,
        heading_aligned,
        pitch_aligned,
        heading_delta: delta,
        pitch_delta,
    }
}

/// Alignment check against a possibly incomplete sensor sample
///
/// A missing pitch always means "not aligned". A missing heading only blocks
/// alignment for targets that need one, so the poles stay reachable.
pub fn evaluate(
    orientation: &Orientation,
    target_index: usize,
    start_heading: f64,
    tolerance: Tolerance,
) -> AlignmentResult {
    let Some(pitch) = orientation.pitch else {
        return AlignmentResult::not_aligned();
    };

    match orientation.heading {
        Some(heading) => is_aligned(heading, pitch, target_index, start_heading, tolerance),
        None => match position(target_index) {
            Some(target) if target.ring.is_polar() => {
                is_aligned(0.0, pitch, target_index, start_heading, tolerance)
            }
            _ => AlignmentResult::not_aligned(),
        },
    }
}
