/// Next-best capture position selection

use std::collections::BTreeSet;

use super::positions::{absolute_heading, positions_in_ring, Ring};
use crate::angles::heading_delta;

/// Order in which rings are offered to the user
///
/// The equator is easiest to reach and anchors the panorama seam.
pub const RING_PRIORITY: [Ring; 5] = [Ring::Equator, Ring::Upper, Ring::Lower, Ring::Zenith, Ring::Nadir];

/// Tilting is more effortful than rotating, so pitch is weighted heavier
pub const PITCH_WEIGHT: f64 = 1.5;

/// Weighted angular distance from the current orientation to a position
pub fn travel_cost(
    current_heading: f64,
    current_pitch: f64,
    target_heading: f64,
    target_pitch: f64,
) -> f64 {
    heading_delta(current_heading, target_heading)
        + PITCH_WEIGHT * (current_pitch - target_pitch).abs()
}

/// Pick the next position the user should be guided to
///
/// Walks [`RING_PRIORITY`] and, within the first ring that still has an
/// uncaptured position, returns the one with the lowest [`travel_cost`].
/// Ties go to the lower catalog index. `None` means every slot is captured.
pub fn next_target(
    captured: &BTreeSet<usize>,
    current_heading: f64,
    current_pitch: f64,
    start_heading: f64,
) -> Option<usize> {
    for ring in RING_PRIORITY {
        let mut best: Option<(usize, f64)> = None;

        for candidate in positions_in_ring(ring).filter(|p| !captured.contains(&p.index)) {
            let cost = travel_cost(
                current_heading,
                current_pitch,
                absolute_heading(candidate, start_heading),
                candidate.pitch,
            );

            // Strict comparison keeps the first encountered on ties
            match best {
                Some((_, best_cost)) if cost >= best_cost => {}
                _ => best = Some((candidate.index, cost)),
            }
        }

        if let Some((index, _)) = best {
            return Some(index);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::positions::{position, POSITION_COUNT};

    fn ring_of(index: usize) -> Ring {
        position(index).unwrap().ring
    }

    #[test]
    fn test_first_target_is_front() {
        let captured = BTreeSet::new();
        assert_eq!(next_target(&captured, 0.0, 0.0, 0.0), Some(7));
    }

    #[test]
    fn test_nearest_equator_position_wins() {
        let captured = BTreeSet::new();
        // Facing +100° from start: Right (90°) is nearest
        assert_eq!(next_target(&captured, 100.0, 0.0, 0.0), Some(9));
        // Same relative direction with a non-zero start heading
        assert_eq!(next_target(&captured, 300.0, 0.0, 200.0), Some(9));
    }

    #[test]
    fn test_equator_before_upper() {
        let captured = BTreeSet::new();
        // Even pointing straight at Upper Front, the equator comes first
        let next = next_target(&captured, 0.0, 55.0, 0.0).unwrap();
        assert_eq!(ring_of(next), Ring::Equator);
    }

    #[test]
    fn test_upper_after_equator_complete() {
        let captured: BTreeSet<usize> = (7..=14).collect();
        let next = next_target(&captured, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(ring_of(next), Ring::Upper);
        assert_eq!(next, 1);
    }

    #[test]
    fn test_ring_priority_order() {
        let mut captured: BTreeSet<usize> = (1..=14).collect();
        assert_eq!(ring_of(next_target(&captured, 0.0, 0.0, 0.0).unwrap()), Ring::Lower);

        captured.extend(15..=20);
        assert_eq!(next_target(&captured, 0.0, -90.0, 0.0), Some(0));

        captured.insert(0);
        assert_eq!(next_target(&captured, 0.0, 0.0, 0.0), Some(21));
    }

    #[test]
    fn test_tie_goes_to_lower_index() {
        // Halfway between Front (0°) and Front-Right (45°)
        let captured = BTreeSet::new();
        assert_eq!(next_target(&captured, 22.5, 0.0, 0.0), Some(7));
    }

    #[test]
    fn test_complete_returns_none() {
        let captured: BTreeSet<usize> = (0..POSITION_COUNT).collect();
        assert_eq!(next_target(&captured, 0.0, 0.0, 0.0), None);
    }
}
