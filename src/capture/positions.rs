/// The fixed spherical capture layout
///
/// 22 capture targets grouped into five latitude rings. The index order is
/// part of the contract with the stitching backend, which assumes exactly
/// this geometry per slot:
/// - 0: zenith
/// - 1..=6: upper ring (pitch +55, every 60°)
/// - 7..=14: equator (pitch 0, every 45°)
/// - 15..=20: lower ring (pitch -55, every 60° offset by 30°)
/// - 21: nadir

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::angles::normalize_heading;

/// Total number of capture slots in the reference layout
pub const POSITION_COUNT: usize = 22;

/// Pitch of the upper ring (degrees above the horizon)
pub const UPPER_PITCH: f64 = 55.0;

/// Pitch of the lower ring (degrees below the horizon)
pub const LOWER_PITCH: f64 = -55.0;

/// Latitude band a capture position belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Ring {
    Zenith,
    Upper,
    Equator,
    Lower,
    Nadir,
}

impl Ring {
    /// All rings from top to bottom
    pub const ALL: [Ring; 5] = [Ring::Zenith, Ring::Upper, Ring::Equator, Ring::Lower, Ring::Nadir];

    /// Poles have a single position whose heading carries no meaning
    pub fn is_polar(self) -> bool {
        matches!(self, Ring::Zenith | Ring::Nadir)
    }

    /// Rings sharing a boundary (upper/equator and equator/lower)
    pub fn is_adjacent_band(self, other: Ring) -> bool {
        matches!(
            (self, other),
            (Ring::Upper, Ring::Equator)
                | (Ring::Equator, Ring::Upper)
                | (Ring::Equator, Ring::Lower)
                | (Ring::Lower, Ring::Equator)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Ring::Zenith => "zenith",
            Ring::Upper => "upper",
            Ring::Equator => "equator",
            Ring::Lower => "lower",
            Ring::Nadir => "nadir",
        }
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One capture target on the unit sphere
#[derive(Debug, Clone, PartialEq)]
pub struct CapturePosition {
    /// Stable slot identity, 0..POSITION_COUNT
    pub index: usize,
    pub ring: Ring,
    /// Heading relative to the session start heading, [0, 360)
    pub heading: f64,
    /// 90 = straight up, -90 = straight down
    pub pitch: f64,
    /// Display name shown in the guidance text
    pub label: &'static str,
}

const UPPER_LABELS: [&str; 6] = [
    "Upper Front",
    "Upper Front-Right",
    "Upper Back-Right",
    "Upper Back",
    "Upper Back-Left",
    "Upper Front-Left",
];

const EQUATOR_LABELS: [&str; 8] = [
    "Front",
    "Front-Right",
    "Right",
    "Back-Right",
    "Back",
    "Back-Left",
    "Left",
    "Front-Left",
];

const LOWER_LABELS: [&str; 6] = [
    "Lower Front-Right",
    "Lower Right",
    "Lower Back-Right",
    "Lower Back-Left",
    "Lower Left",
    "Lower Front-Left",
];

/// Build the reference capture layout in slot order
pub fn build_positions() -> Vec<CapturePosition> {
    let mut positions = Vec::with_capacity(POSITION_COUNT);

    let mut push = |ring: Ring, heading: f64, pitch: f64, label: &'static str| {
        let index = positions.len();
        positions.push(CapturePosition {
            index,
            ring,
            heading,
            pitch,
            label,
        });
    };

    push(Ring::Zenith, 0.0, 90.0, "Ceiling");

    for (i, &label) in UPPER_LABELS.iter().enumerate() {
        push(Ring::Upper, i as f64 * 60.0, UPPER_PITCH, label);
    }

    for (i, &label) in EQUATOR_LABELS.iter().enumerate() {
        push(Ring::Equator, i as f64 * 45.0, 0.0, label);
    }

    for (i, &label) in LOWER_LABELS.iter().enumerate() {
        push(Ring::Lower, i as f64 * 60.0 + 30.0, LOWER_PITCH, label);
    }

    push(Ring::Nadir, 0.0, -90.0, "Floor");

    positions
}

static CATALOG: Lazy<Vec<CapturePosition>> = Lazy::new(build_positions);

/// Process-wide capture layout, built on first use and never mutated
pub fn catalog() -> &'static [CapturePosition] {
    &CATALOG
}

/// Look up a position by index; `None` for anything outside the catalog
pub fn position(index: usize) -> Option<&'static CapturePosition> {
    catalog().get(index)
}

/// Positions belonging to a single ring, in slot order
pub fn positions_in_ring(ring: Ring) -> impl Iterator<Item = &'static CapturePosition> {
    catalog().iter().filter(move |p| p.ring == ring)
}

/// `(start_heading + position.heading) mod 360`
pub fn absolute_heading(position: &CapturePosition, start_heading: f64) -> f64 {
    normalize_heading(start_heading + position.heading)
}
