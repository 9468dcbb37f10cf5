/// Capture session state
///
/// The session owns the only mutable state of the guide: which positions
/// have been captured (and with which frame) and the start heading that
/// anchors all relative headings. Both change only through `record` and
/// `reset`.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::angles::normalize_heading;
use crate::capture::alignment::{self, AlignmentResult, Tolerance};
use crate::capture::positions::{position, POSITION_COUNT};
use crate::capture::selector::next_target;
use crate::error::Result;
use crate::state::manifest::CaptureManifest;
use crate::state::orientation::Orientation;

/// Opaque reference to a captured camera frame
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameHandle {
    /// Identifier assigned by the camera layer
    pub id: u64,
    pub captured_at: DateTime<Utc>,
}

impl FrameHandle {
    /// Handle for a frame captured right now
    pub fn new(id: u64) -> Self {
        Self {
            id,
            captured_at: Utc::now(),
        }
    }
}

/// What the camera layer reported for a capture request
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Captured(FrameHandle),
    Failed(String),
}

/// Captured frames and start heading for one panorama
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    captured: BTreeMap<usize, FrameHandle>,
    start_heading: Option<f64>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading fixed at the first capture, `None` before that
    pub fn start_heading(&self) -> Option<f64> {
        self.start_heading
    }

    /// Start heading to use for guidance right now
    ///
    /// Before the first capture the current heading stands in, so the
    /// direction the user is facing becomes "Front".
    pub fn effective_start_heading(&self, orientation: &Orientation) -> Option<f64> {
        self.start_heading.or(orientation.heading)
    }

    pub fn captured_set(&self) -> BTreeSet<usize> {
        self.captured.keys().copied().collect()
    }

    pub fn is_captured(&self, index: usize) -> bool {
        self.captured.contains_key(&index)
    }

    pub fn captured_count(&self) -> usize {
        self.captured.len()
    }

    pub fn is_complete(&self) -> bool {
        self.captured.len() == POSITION_COUNT
    }

    pub fn frame(&self, index: usize) -> Option<&FrameHandle> {
        self.captured.get(&index)
    }

    /// Apply the result of a capture request for `index`
    ///
    /// Returns `true` when the session changed. A failed capture or an index
    /// outside the layout leaves the session untouched, and so does a
    /// non-polar capture that would have to anchor the start heading while no
    /// heading is available. Re-capturing a position replaces its previous
    /// frame.
    pub fn record(&mut self, index: usize, orientation: &Orientation, outcome: CaptureOutcome) -> bool {
        let Some(target) = position(index) else {
            warn!("⚠️  Ignoring capture for unknown position {}", index);
            return false;
        };

        let frame = match outcome {
            CaptureOutcome::Captured(frame) => frame,
            CaptureOutcome::Failed(reason) => {
                warn!("⚠️  Capture of {} failed: {}", target.label, reason);
                return false;
            }
        };

        if self.start_heading.is_none() {
            match orientation.heading {
                Some(heading) => {
                    // Anchor so that the captured slot lines up with where the device points
                    let start = if target.ring.is_polar() {
                        heading
                    } else {
                        normalize_heading(heading - target.heading)
                    };
                    info!("🧭 Start heading set to {:.1}°", start);
                    self.start_heading = Some(start);
                }
                None if target.ring.is_polar() => {
                    debug!("🧭 Captured {} before any heading, start heading still open", target.label);
                }
                None => {
                    warn!("⚠️  Not capturing {}: no heading to anchor the panorama", target.label);
                    return false;
                }
            }
        }

        if self.captured.insert(index, frame).is_some() {
            info!("🔁 Re-captured {} ({})", target.label, index);
        } else {
            info!(
                "📸 Captured {} ({}) - {}/{}",
                target.label,
                index,
                self.captured.len(),
                POSITION_COUNT
            );
        }

        true
    }

    /// Forget every capture and the start heading
    pub fn reset(&mut self) {
        self.captured.clear();
        self.start_heading = None;
        info!("🗑️  Capture session reset");
    }

    /// Position the user should be guided to next
    ///
    /// With no usable orientation the `previous` target is kept as long as it
    /// is still open; otherwise the selection is made from the start direction.
    pub fn active_target(&self, orientation: &Orientation, previous: Option<usize>) -> Option<usize> {
        let captured = self.captured_set();
        let start = self.effective_start_heading(orientation);

        let next = match (orientation.angles(), start) {
            (Some((heading, pitch)), Some(start)) => next_target(&captured, heading, pitch, start),
            _ => previous
                .filter(|&index| index < POSITION_COUNT && !self.is_captured(index))
                .or_else(|| {
                    let start = start.unwrap_or(0.0);
                    next_target(&captured, start, 0.0, start)
                }),
        };

        if next != previous {
            debug!("🎯 Active target {:?} -> {:?}", previous, next);
        }
        next
    }

    /// Alignment of the current orientation with `target`
    pub fn alignment(&self, orientation: &Orientation, target: usize, tolerance: Tolerance) -> AlignmentResult {
        // Without any heading only the poles can align, and those ignore the start
        let start = self.effective_start_heading(orientation).unwrap_or(0.0);
        alignment::evaluate(orientation, target, start, tolerance)
    }

    /// Captured frames sorted by position index
    pub fn ordered_frames(&self) -> Vec<(usize, &FrameHandle)> {
        self.captured.iter().map(|(&index, frame)| (index, frame)).collect()
    }

    /// Upload manifest for the stitching backend
    pub fn manifest(&self) -> Result<CaptureManifest> {
        CaptureManifest::from_session(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::positions::Ring;

    fn capture(session: &mut CaptureSession, index: usize, heading: f64, pitch: f64) -> bool {
        session.record(
            index,
            &Orientation::new(heading, pitch),
            CaptureOutcome::Captured(FrameHandle::new(index as u64)),
        )
    }

    #[test]
    fn test_first_capture_sets_start_heading() {
        let mut session = CaptureSession::new();
        assert_eq!(session.start_heading(), None);

        assert!(capture(&mut session, 7, 123.0, 0.0));
        assert_eq!(session.start_heading(), Some(123.0));

        // Later captures do not move the anchor
        assert!(capture(&mut session, 9, 215.0, 0.0));
        assert_eq!(session.start_heading(), Some(123.0));
    }

    #[test]
    fn test_start_heading_offsets_by_slot_heading() {
        let mut session = CaptureSession::new();
        capture(&mut session, 9, 100.0, 0.0);
        assert_eq!(session.start_heading(), Some(10.0));
    }

    #[test]
    fn test_first_capture_without_heading() {
        let mut session = CaptureSession::new();
        let pitch_only = Orientation { heading: None, pitch: Some(0.0) };
        let frame = || CaptureOutcome::Captured(FrameHandle::new(1));

        // An equator slot cannot fix the start heading blind
        assert!(!session.record(7, &pitch_only, frame()));
        assert_eq!(session.captured_count(), 0);

        // A pole can be taken, and the first headed capture anchors afterwards
        let straight_up = Orientation { heading: None, pitch: Some(90.0) };
        assert!(session.record(0, &straight_up, frame()));
        assert_eq!(session.start_heading(), None);
        assert!(capture(&mut session, 9, 100.0, 0.0));
        assert_eq!(session.start_heading(), Some(10.0));

        // Once anchored, a missing heading no longer blocks
        assert!(session.record(8, &pitch_only, frame()));
    }

    #[test]
    fn test_recapture_replaces_frame() {
        let mut session = CaptureSession::new();
        capture(&mut session, 7, 0.0, 0.0);
        session.record(
            7,
            &Orientation::new(0.0, 0.0),
            CaptureOutcome::Captured(FrameHandle::new(99)),
        );
        assert_eq!(session.captured_count(), 1);
        assert_eq!(session.frame(7).map(|f| f.id), Some(99));
    }

    #[test]
    fn test_failed_and_invalid_captures_are_noops() {
        let mut session = CaptureSession::new();
        let facing = Orientation::new(0.0, 0.0);
        assert!(!session.record(7, &facing, CaptureOutcome::Failed("camera busy".into())));
        assert!(!session.record(
            POSITION_COUNT,
            &facing,
            CaptureOutcome::Captured(FrameHandle::new(1))
        ));
        assert_eq!(session.captured_count(), 0);
        assert_eq!(session.start_heading(), None);
    }

    #[test]
    fn test_guided_walkthrough_completes() {
        let mut session = CaptureSession::new();
        let mut facing = Orientation::new(40.0, 0.0);
        let mut target = session.active_target(&facing, None);
        assert_eq!(target, Some(7));

        while let Some(index) = target {
            let p = position(index).unwrap();
            let start = session.effective_start_heading(&facing).unwrap();
            facing = Orientation::new(start + p.heading, p.pitch);
            assert!(session.alignment(&facing, index, Tolerance::default()).aligned);
            assert!(capture(&mut session, index, facing.heading.unwrap(), p.pitch));
            target = session.active_target(&facing, target);
        }

        assert!(session.is_complete());
        assert_eq!(session.start_heading(), Some(40.0));
    }

    #[test]
    fn test_equator_is_completed_first() {
        let mut session = CaptureSession::new();
        let mut facing = Orientation::new(0.0, 0.0);
        for _ in 0..8 {
            let index = session.active_target(&facing, None).unwrap();
            let p = position(index).unwrap();
            assert_eq!(p.ring, Ring::Equator);
            facing = Orientation::new(p.heading, p.pitch);
            capture(&mut session, index, p.heading, p.pitch);
        }
        let next = session.active_target(&facing, None).unwrap();
        assert_eq!(position(next).unwrap().ring, Ring::Upper);
    }

    #[test]
    fn test_unavailable_sensor_keeps_previous_target() {
        let mut session = CaptureSession::new();
        capture(&mut session, 7, 0.0, 0.0);
        assert_eq!(session.active_target(&Orientation::unavailable(), Some(11)), Some(11));

        // A previous target that has since been captured is not kept
        let fallback = session.active_target(&Orientation::unavailable(), Some(7));
        assert_eq!(fallback, Some(8));
    }

    #[test]
    fn test_reset_matches_fresh_session() {
        let facing = Orientation::new(75.0, 10.0);
        let fresh = CaptureSession::new();

        let mut session = CaptureSession::new();
        capture(&mut session, 7, 75.0, 0.0);
        capture(&mut session, 8, 120.0, 0.0);
        session.reset();

        assert_eq!(session.captured_count(), 0);
        assert_eq!(session.start_heading(), None);
        assert_eq!(
            session.active_target(&facing, None),
            fresh.active_target(&facing, None)
        );
    }

    #[test]
    fn test_ordered_frames_sorted_by_index() {
        let mut session = CaptureSession::new();
        for index in [14, 3, 7, 0] {
            capture(&mut session, index, 0.0, 0.0);
        }
        let order: Vec<usize> = session.ordered_frames().iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 3, 7, 14]);
    }
}
