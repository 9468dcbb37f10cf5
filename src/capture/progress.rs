/// Derived guidance views: per-ring progress, direction text and hints

use std::collections::BTreeSet;
use std::fmt;

use super::adjacency::neighbors_of;
use super::alignment::Tolerance;
use super::positions::{absolute_heading, catalog, position, CapturePosition, Ring};
use crate::angles::signed_heading_delta;
use crate::state::orientation::Orientation;

/// Captured vs. total count for one ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingProgress {
    pub ring: Ring,
    pub captured: usize,
    pub total: usize,
}

impl RingProgress {
    pub fn is_complete(&self) -> bool {
        self.captured == self.total
    }
}

/// Progress for every ring, top to bottom
pub fn ring_progress(captured: &BTreeSet<usize>) -> Vec<RingProgress> {
    Ring::ALL
        .iter()
        .map(|&ring| {
            let in_ring = catalog().iter().filter(|p| p.ring == ring);
            let (total, done) = in_ring.fold((0, 0), |(total, done), p| {
                (total + 1, done + usize::from(captured.contains(&p.index)))
            });
            RingProgress {
                ring,
                captured: done,
                total,
            }
        })
        .collect()
}

/// Where to point the camera, in words
pub fn direction_label(position: &CapturePosition) -> &'static str {
    match position.ring {
        Ring::Zenith => "Point camera at ceiling",
        Ring::Upper => "Point camera at upper wall",
        Ring::Equator => position.label,
        Ring::Lower => "Point camera at lower wall",
        Ring::Nadir => "Point camera at floor",
    }
}

/// How to tilt the camera for a ring
pub fn pitch_guidance(ring: Ring) -> &'static str {
    match ring {
        Ring::Zenith => "Straight up",
        Ring::Upper => "Tilt up 55°",
        Ring::Equator => "Level",
        Ring::Lower => "Tilt down 55°",
        Ring::Nadir => "Straight down",
    }
}

/// Rotation still needed to reach the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Turn {
    Left(f64),
    Right(f64),
}

/// Tilt still needed to reach the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tilt {
    Up(f64),
    Down(f64),
}

/// Directional hint shown while the user moves toward the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuidanceHint {
    /// Orientation sensor is not reporting
    NoSensor,
    /// Within tolerance on both axes
    HoldSteady,
    Move {
        turn: Option<Turn>,
        tilt: Option<Tilt>,
    },
}

impl fmt::Display for GuidanceHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuidanceHint::NoSensor => write!(f, "Waiting for orientation sensor"),
            GuidanceHint::HoldSteady => write!(f, "Hold steady"),
            GuidanceHint::Move { turn, tilt } => {
                let turn = match turn {
                    Some(Turn::Left(deg)) => Some(format!("turn left {:.0}°", deg)),
                    Some(Turn::Right(deg)) => Some(format!("turn right {:.0}°", deg)),
                    None => None,
                };
                let tilt = match tilt {
                    Some(Tilt::Up(deg)) => Some(format!("tilt up {:.0}°", deg)),
                    Some(Tilt::Down(deg)) => Some(format!("tilt down {:.0}°", deg)),
                    None => None,
                };
                let parts: Vec<String> = turn.into_iter().chain(tilt).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// Work out which way the user has to move to reach `target_index`
///
/// Uses the same per-axis tolerances as the alignment check, so "Hold steady"
/// shows exactly when a capture would be accepted. Polar targets never ask
/// for a turn and only need the pitch axis.
pub fn guidance_hint(
    orientation: &Orientation,
    target_index: usize,
    start_heading: f64,
    tolerance: Tolerance,
) -> GuidanceHint {
    let (Some(target), Some(pitch)) = (position(target_index), orientation.pitch) else {
        return GuidanceHint::NoSensor;
    };

    let turn = if target.ring.is_polar() {
        None
    } else {
        let Some(heading) = orientation.heading else {
            return GuidanceHint::NoSensor;
        };
        let delta = signed_heading_delta(heading, absolute_heading(target, start_heading));
        if delta.abs() <= tolerance.heading {
            None
        } else if delta > 0.0 {
            Some(Turn::Right(delta))
        } else {
            Some(Turn::Left(-delta))
        }
    };

    let pitch_delta = target.pitch - pitch;
    let tilt = if pitch_delta.abs() <= tolerance.pitch {
        None
    } else if pitch_delta > 0.0 {
        Some(Tilt::Up(pitch_delta))
    } else {
        Some(Tilt::Down(-pitch_delta))
    };

    if turn.is_none() && tilt.is_none() {
        GuidanceHint::HoldSteady
    } else {
        GuidanceHint::Move { turn, tilt }
    }
}

/// Captured neighbors of the target, i.e. photos the next shot will overlap
pub fn overlap_neighbors(target_index: usize, captured: &BTreeSet<usize>) -> Vec<usize> {
    neighbors_of(target_index)
        .iter()
        .copied()
        .filter(|index| captured.contains(index))
        .collect()
}
