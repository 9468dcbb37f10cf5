/// Angle helpers shared by the guidance engine
///
/// All angles are in degrees. Headings wrap around at 360, pitches are
/// clamped to the [-90, 90] range reported by the orientation sensor.

/// Wrap a heading into the [0, 360) range
pub fn normalize_heading(heading: f64) -> f64 {
    let wrapped = heading.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Smallest unsigned angle between two headings, in [0, 180]
pub fn heading_delta(a: f64, b: f64) -> f64 {
    let diff = normalize_heading(a - b);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Signed rotation needed to turn from `from` to `to`, in (-180, 180]
///
/// Positive values mean turning clockwise (to the right).
pub fn signed_heading_delta(from: f64, to: f64) -> f64 {
    let diff = normalize_heading(to - from);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Clamp a pitch into the physically meaningful range
pub fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-90.0, 90.0)
}

/// Finest angular step accepted when sampling curves (degrees)
pub const MIN_SAMPLE_STEP: f64 = 0.5;

/// Evenly sample `from..=to` with at most `step` degrees between samples
///
/// Both endpoints are always included so adjacent boundary curves meet.
/// Steps finer than [`MIN_SAMPLE_STEP`] are raised to it.
pub fn sample_range(from: f64, to: f64, step: f64) -> Vec<f64> {
    let span = to - from;
    let step = if step.is_finite() { step.max(MIN_SAMPLE_STEP) } else { 4.0 };
    let segments = (span.abs() / step).ceil().max(1.0) as usize;

    (0..=segments)
        .map(|i| from + span * i as f64 / segments as f64)
        .collect()
}
