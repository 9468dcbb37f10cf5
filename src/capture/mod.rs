/// Spherical capture-guidance engine
///
/// This module holds the pure, deterministic core:
/// - `positions.rs` - the fixed 22-slot capture layout
/// - `adjacency.rs` - which positions overlap each other
/// - `alignment.rs` - is the device pointing at a target?
/// - `selector.rs` - which target to guide the user to next
/// - `progress.rs` - ring counts, direction text and hints
///
/// Everything here is a function of (catalog, captured set, orientation,
/// start heading) and is safe to recompute on every sensor event.

pub mod adjacency;
pub mod alignment;
pub mod positions;
pub mod progress;
pub mod selector;
