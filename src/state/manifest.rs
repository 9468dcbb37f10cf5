/// Upload manifest handed to the stitching backend
///
/// The backend expects the captured frames ordered by slot index, each with
/// the absolute heading and pitch it was taken at so it can use them as a
/// prior when aligning the panorama.

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::angles::heading_delta;
use crate::capture::positions::{absolute_heading, position, Ring};
use crate::error::{GuideError, Result};
use crate::state::session::{CaptureSession, FrameHandle};

/// Slack allowed when comparing stored angles with the layout (degrees)
const ANGLE_EPSILON: f64 = 1e-6;

/// Metadata for a single uploaded frame
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub index: usize,
    /// `(start_heading + position.heading) mod 360`
    pub absolute_heading: f64,
    pub pitch: f64,
    pub ring: Ring,
    pub frame: FrameHandle,
}

/// Ordered set of captured frames for one panorama
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CaptureManifest {
    pub start_heading: f64,
    pub created_at: DateTime<Utc>,
    /// Sorted by `index`
    pub entries: Vec<ManifestEntry>,
}

impl CaptureManifest {
    /// Build the manifest from a session's captured frames
    pub fn from_session(session: &CaptureSession) -> Result<Self> {
        let start_heading = session.start_heading().ok_or(GuideError::StartHeadingUnset)?;

        let entries = session
            .ordered_frames()
            .into_iter()
            .map(|(index, frame)| -> Result<ManifestEntry> {
                let p = position(index).ok_or(GuideError::UnknownPosition(index))?;
                Ok(ManifestEntry {
                    index,
                    absolute_heading: absolute_heading(p, start_heading),
                    pitch: p.pitch,
                    ring: p.ring,
                    frame: frame.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            start_heading,
            created_at: Utc::now(),
            entries,
        })
    }

    /// Slot indices covered by this manifest
    pub fn captured_indices(&self) -> BTreeSet<usize> {
        self.entries.iter().map(|e| e.index).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a manifest and check every entry against the capture layout
    ///
    /// Entries must name a known slot at most once, with the ring, pitch and
    /// absolute heading that slot has under the manifest's start heading.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut manifest: CaptureManifest = serde_json::from_str(json)?;

        let mut seen = BTreeSet::new();
        for entry in &manifest.entries {
            manifest.check_entry(entry)?;
            if !seen.insert(entry.index) {
                return Err(GuideError::ManifestMismatch {
                    index: entry.index,
                    reason: "listed more than once".to_string(),
                });
            }
        }

        manifest.entries.sort_by_key(|e| e.index);
        Ok(manifest)
    }

    fn check_entry(&self, entry: &ManifestEntry) -> Result<()> {
        let p = position(entry.index).ok_or(GuideError::UnknownPosition(entry.index))?;
        let mismatch = |reason: String| GuideError::ManifestMismatch {
            index: entry.index,
            reason,
        };

        if entry.ring != p.ring {
            return Err(mismatch(format!("ring {} should be {}", entry.ring, p.ring)));
        }
        if (entry.pitch - p.pitch).abs() > ANGLE_EPSILON {
            return Err(mismatch(format!("pitch {} should be {}", entry.pitch, p.pitch)));
        }
        let expected = absolute_heading(p, self.start_heading);
        if heading_delta(entry.absolute_heading, expected) > ANGLE_EPSILON {
            return Err(mismatch(format!(
                "heading {} should be {}",
                entry.absolute_heading, expected
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| GuideError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Write the manifest as JSON into `dir`, returning the file path
    ///
    /// The file is read back and must cover the same slots before it is
    /// reported as written.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| GuideError::io(dir, e))?;

        let path = dir.join(format!("manifest-{}.json", self.created_at.format("%Y%m%d-%H%M%S")));
        fs::write(&path, self.to_json()?).map_err(|e| GuideError::io(&path, e))?;

        let written = Self::load(&path)?;
        if written.captured_indices() != self.captured_indices() {
            return Err(GuideError::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "manifest did not read back intact"),
            ));
        }

        info!("📦 Wrote manifest with {} frames to {}", self.entries.len(), path.display());
        Ok(path)
    }
}

/// Directory manifests are exported to
pub fn export_dir() -> Result<PathBuf> {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or(GuideError::NoConfigDir)?;

    path.push("pano-guide");
    path.push("manifests");
    Ok(path)
}

/// Export a manifest without blocking the UI thread
pub async fn export_manifest(manifest: CaptureManifest, dir: PathBuf) -> std::result::Result<PathBuf, String> {
    tokio::task::spawn_blocking(move || manifest.write_to_dir(&dir))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::orientation::Orientation;
    use crate::state::session::CaptureOutcome;

    fn session_with(indices: &[usize], start: f64) -> CaptureSession {
        let mut session = CaptureSession::new();
        for &index in indices {
            let p = position(index).unwrap();
            session.record(
                index,
                &Orientation::new(start + p.heading, p.pitch),
                CaptureOutcome::Captured(FrameHandle::new(100 + index as u64)),
            );
        }
        session
    }

    #[test]
    fn test_manifest_requires_start_heading() {
        let session = CaptureSession::new();
        assert!(matches!(
            CaptureManifest::from_session(&session),
            Err(GuideError::StartHeadingUnset)
        ));
    }

    #[test]
    fn test_manifest_entries_use_absolute_heading() {
        let session = session_with(&[9, 7, 1], 300.0);
        let manifest = session.manifest().unwrap();

        let indices: Vec<usize> = manifest.entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 7, 9]);
        assert_eq!(manifest.start_heading, 300.0);

        let right = &manifest.entries[2];
        assert_eq!(right.absolute_heading, 30.0);
        assert_eq!(right.pitch, 0.0);
        assert_eq!(right.ring, Ring::Equator);
        assert_eq!(right.frame.id, 109);
    }

    #[test]
    fn test_json_preserves_captured_indices() {
        let indices = [0, 3, 7, 12, 18, 21];
        let session = session_with(&indices, 45.0);
        let manifest = session.manifest().unwrap();

        let restored = CaptureManifest::from_json(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(restored.captured_indices(), session.captured_set());
        assert_eq!(restored, manifest);
    }

    #[test]
    fn test_ring_serialized_lowercase() {
        let manifest = session_with(&[0], 0.0).manifest().unwrap();
        let json = manifest.to_json().unwrap();
        assert!(json.contains("\"ring\": \"zenith\""));
    }

    #[test]
    fn test_unknown_index_rejected() {
        let mut manifest = session_with(&[7], 0.0).manifest().unwrap();
        manifest.entries[0].index = 40;
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(matches!(
            CaptureManifest::from_json(&json),
            Err(GuideError::UnknownPosition(40))
        ));
    }

    fn entry_json(manifest: &CaptureManifest, edit: impl FnOnce(&mut CaptureManifest)) -> String {
        let mut manifest = manifest.clone();
        edit(&mut manifest);
        serde_json::to_string(&manifest).unwrap()
    }

    #[test]
    fn test_entry_must_match_layout() {
        let manifest = session_with(&[7, 9], 30.0).manifest().unwrap();

        let wrong_ring = entry_json(&manifest, |m| {
            m.entries[0].ring = Ring::Zenith;
            m.entries[0].pitch = 90.0;
        });
        assert!(matches!(
            CaptureManifest::from_json(&wrong_ring),
            Err(GuideError::ManifestMismatch { index: 7, .. })
        ));

        let wrong_pitch = entry_json(&manifest, |m| m.entries[1].pitch = 10.0);
        assert!(matches!(
            CaptureManifest::from_json(&wrong_pitch),
            Err(GuideError::ManifestMismatch { index: 9, .. })
        ));

        let wrong_heading = entry_json(&manifest, |m| m.entries[1].absolute_heading = 90.0);
        assert!(matches!(
            CaptureManifest::from_json(&wrong_heading),
            Err(GuideError::ManifestMismatch { index: 9, .. })
        ));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let manifest = session_with(&[7], 0.0).manifest().unwrap();
        let duplicated = entry_json(&manifest, |m| {
            let copy = m.entries[0].clone();
            m.entries.push(copy);
        });
        assert!(matches!(
            CaptureManifest::from_json(&duplicated),
            Err(GuideError::ManifestMismatch { index: 7, .. })
        ));
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = session_with(&[7, 8], 0.0).manifest().unwrap();

        let path = export_manifest(manifest.clone(), dir.path().to_path_buf())
            .await
            .unwrap();

        let json = std::fs::read_to_string(path).unwrap();
        assert_eq!(CaptureManifest::from_json(&json).unwrap(), manifest);
    }
}
