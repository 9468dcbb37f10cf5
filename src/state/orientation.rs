/// Orientation sensor samples and change filtering

use crate::angles::{clamp_pitch, heading_delta, normalize_heading};

/// Default minimum change (degrees) before a new sample is propagated
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 2.0;

/// One reading from the device orientation sensor
///
/// Either axis may be missing while the sensor warms up or loses its fix.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Compass heading in [0, 360)
    pub heading: Option<f64>,
    /// Tilt in [-90, 90]
    pub pitch: Option<f64>,
}

impl Orientation {
    pub fn new(heading: f64, pitch: f64) -> Self {
        Self {
            heading: Some(normalize_heading(heading)),
            pitch: Some(clamp_pitch(pitch)),
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Both axes at once, if available
    pub fn angles(&self) -> Option<(f64, f64)> {
        Some((self.heading?, self.pitch?))
    }
}

/// Drops sensor samples that moved less than a threshold
///
/// Only the last propagated sample is compared against, so slow drifts still
/// get through once they add up past the threshold.
#[derive(Debug, Clone)]
pub struct OrientationFilter {
    threshold: f64,
    last: Option<Orientation>,
}

impl OrientationFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.max(0.0),
            last: None,
        }
    }

    /// Feed a raw sample; returns it when it should propagate downstream
    pub fn update(&mut self, sample: Orientation) -> Option<Orientation> {
        let changed = match self.last {
            None => true,
            Some(last) => {
                axis_changed(last.heading, sample.heading, self.threshold, heading_delta)
                    || axis_changed(last.pitch, sample.pitch, self.threshold, |a, b| (a - b).abs())
            }
        };

        if changed {
            self.last = Some(sample);
            Some(sample)
        } else {
            None
        }
    }

    /// Last sample that made it through
    pub fn current(&self) -> Orientation {
        self.last.unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for OrientationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGE_THRESHOLD)
    }
}

fn axis_changed(
    last: Option<f64>,
    next: Option<f64>,
    threshold: f64,
    distance: impl Fn(f64, f64) -> f64,
) -> bool {
    match (last, next) {
        (Some(a), Some(b)) => distance(a, b) > threshold,
        (None, None) => false,
        // Sensor came up or dropped out
        _ => true,
    }
}
