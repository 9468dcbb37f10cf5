/// User-tunable guide settings
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/pano-guide/config.json
/// - macOS: ~/Library/Application Support/pano-guide/config.json
/// - Windows: %APPDATA%\pano-guide\config.json

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::alignment::{Tolerance, DEFAULT_HEADING_TOLERANCE, DEFAULT_PITCH_TOLERANCE};
use crate::error::{GuideError, Result};
use crate::angles::MIN_SAMPLE_STEP;
use crate::projection::grid::DEFAULT_BOUNDARY_STEP;
use crate::projection::pinhole::{DEFAULT_HORIZONTAL_FOV, MAX_HORIZONTAL_FOV, MIN_HORIZONTAL_FOV};
use crate::state::orientation::DEFAULT_CHANGE_THRESHOLD;

/// All guide settings; missing fields fall back to their defaults
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct GuideConfig {
    /// Heading tolerance for alignment (degrees)
    pub heading_tolerance: f64,
    /// Pitch tolerance for alignment (degrees)
    pub pitch_tolerance: f64,
    /// Horizontal field of view of the camera (degrees)
    pub horizontal_fov: f64,
    /// Orientation changes below this are not propagated (degrees)
    pub orientation_threshold: f64,
    /// Angular step when sampling cell boundaries (degrees)
    pub boundary_step: f64,
    /// Radius of the overview sphere widget (pixels)
    pub minimap_radius: f64,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            heading_tolerance: DEFAULT_HEADING_TOLERANCE,
            pitch_tolerance: DEFAULT_PITCH_TOLERANCE,
            horizontal_fov: DEFAULT_HORIZONTAL_FOV,
            orientation_threshold: DEFAULT_CHANGE_THRESHOLD,
            boundary_step: DEFAULT_BOUNDARY_STEP,
            minimap_radius: 60.0,
        }
    }
}

impl GuideConfig {
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            heading: self.heading_tolerance,
            pitch: self.pitch_tolerance,
        }
    }

    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().ok_or(GuideError::NoConfigDir)?;
        path.push("pano-guide");
        path.push("config.json");
        Ok(path)
    }

    /// Load the config, writing defaults if none exists yet
    ///
    /// An unreadable, corrupt or out-of-range file is reported and replaced by defaults in
    /// memory; the file itself is left alone so the user can fix it.
    pub fn load_or_default() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("⚠️  {}, using default settings", e);
                return Self::default();
            }
        };

        if !path.exists() {
            let config = Self::default();
            match config.save(&path) {
                Ok(()) => info!("⚙️  Created default config at {}", path.display()),
                Err(e) => warn!("⚠️  Could not write default config: {}", e),
            }
            return config;
        }

        match Self::load(&path) {
            Ok(config) => {
                info!("⚙️  Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("⚠️  Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| GuideError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| GuideError::io(parent, e))?;
        }
        fs::write(path, self.to_json()?).map_err(|e| GuideError::io(path, e))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate; a file with out-of-range values is rejected as a whole
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is inside the range the guide can work with
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &'static str, reason: String| GuideError::InvalidConfig { field, reason };

        if !(MIN_HORIZONTAL_FOV..=MAX_HORIZONTAL_FOV).contains(&self.horizontal_fov) {
            return Err(invalid(
                "horizontal_fov",
                format!(
                    "{} is outside {}..={} degrees",
                    self.horizontal_fov, MIN_HORIZONTAL_FOV, MAX_HORIZONTAL_FOV
                ),
            ));
        }
        if !(self.boundary_step.is_finite() && self.boundary_step >= MIN_SAMPLE_STEP) {
            return Err(invalid(
                "boundary_step",
                format!("{} is below the minimum of {} degrees", self.boundary_step, MIN_SAMPLE_STEP),
            ));
        }

        for (field, value) in [
            ("heading_tolerance", self.heading_tolerance),
            ("pitch_tolerance", self.pitch_tolerance),
            ("orientation_threshold", self.orientation_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, format!("{} must be a non-negative angle", value)));
            }
        }

        if !(self.minimap_radius.is_finite() && self.minimap_radius > 0.0) {
            return Err(invalid("minimap_radius", format!("{} must be positive", self.minimap_radius)));
        }

        Ok(())
    }
}
