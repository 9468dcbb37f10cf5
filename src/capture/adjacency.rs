/// Neighbor relation between capture positions
///
/// Two positions are neighbors when their photos are expected to overlap.
/// The graph is derived once from the static catalog geometry and shared
/// read-only for the lifetime of the process.

use once_cell::sync::Lazy;

use super::positions::{catalog, CapturePosition, Ring};
use crate::angles::heading_delta;

/// Same-ring heading window for the 60° rings
const RING_NEIGHBOR_WINDOW: f64 = 65.0;

/// Same-ring heading window for the equator (45° spacing)
const EQUATOR_NEIGHBOR_WINDOW: f64 = 50.0;

/// Heading window for positions in bands that share a boundary
const CROSS_RING_WINDOW: f64 = 35.0;

/// Decide whether `to` is listed as a neighbor of `from`
fn is_neighbor(from: &CapturePosition, to: &CapturePosition) -> bool {
    if from.index == to.index {
        return false;
    }

    let delta = heading_delta(from.heading, to.heading);

    match (from.ring, to.ring) {
        (Ring::Zenith, Ring::Upper) | (Ring::Upper, Ring::Zenith) => true,
        (Ring::Nadir, Ring::Lower) | (Ring::Lower, Ring::Nadir) => true,
        (Ring::Equator, Ring::Equator) => delta <= EQUATOR_NEIGHBOR_WINDOW,
        (a, b) if a == b && !a.is_polar() => delta <= RING_NEIGHBOR_WINDOW,
        (a, b) if a.is_adjacent_band(b) => delta <= CROSS_RING_WINDOW,
        _ => false,
    }
}

/// Compute the neighbor lists for a set of positions
///
/// Entry `i` of the result lists the neighbors of the position with index `i`,
/// in ascending index order.
pub fn build_adjacency(positions: &[CapturePosition]) -> Vec<Vec<usize>> {
    positions
        .iter()
        .map(|from| {
            positions
                .iter()
                .filter(|to| is_neighbor(from, to))
                .map(|to| to.index)
                .collect()
        })
        .collect()
}

static ADJACENCY: Lazy<Vec<Vec<usize>>> = Lazy::new(|| build_adjacency(catalog()));

/// Neighbors of a catalog position; empty for an index outside the catalog
pub fn neighbors_of(index: usize) -> &'static [usize] {
    ADJACENCY.get(index).map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::positions::POSITION_COUNT;

    #[test]
    fn test_neighbor_counts() {
        for index in 0..POSITION_COUNT {
            let count = neighbors_of(index).len();
            if index == 0 || index == POSITION_COUNT - 1 {
                assert_eq!(count, 6, "pole {} should see its whole ring", index);
            } else {
                assert!(
                    (3..=6).contains(&count),
                    "position {} has {} neighbors",
                    index,
                    count
                );
            }
        }
    }

    #[test]
    fn test_not_reflexive() {
        for index in 0..POSITION_COUNT {
            assert!(!neighbors_of(index).contains(&index));
        }
    }

    #[test]
    fn test_poles_connect_to_their_ring() {
        assert_eq!(neighbors_of(0), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(neighbors_of(21), &[15, 16, 17, 18, 19, 20]);
    }

    #[test]
    fn test_front_neighbors() {
        // Front (7): equator 8 and 14, upper front (1), lower 15 and 20 at ±30°
        assert_eq!(neighbors_of(7), &[1, 8, 14, 15, 20]);
    }

    #[test]
    fn test_rule_is_symmetric_for_reference_layout() {
        for a in 0..POSITION_COUNT {
            for &b in neighbors_of(a) {
                assert!(neighbors_of(b).contains(&a), "{} lists {} but not back", a, b);
            }
        }
    }

    #[test]
    fn test_invalid_index_has_no_neighbors() {
        assert!(neighbors_of(POSITION_COUNT).is_empty());
        assert!(!neighbors_of(0).contains(&POSITION_COUNT));
    }
}
