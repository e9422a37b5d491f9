//! Skeleton topology configuration.
//!
//! A [`PoseConfig`] is an immutable value owned by the caller and passed by reference into every
//! pipeline stage. There is no process-wide configuration.

use std::collections::BTreeMap;
use std::path::Path;


use crate::foundation::error::{PoseAlignError, PoseAlignResult};

/// Ordered landmark indices `(p1, p2, p3)`; `p2` is the vertex.
pub type JointTriple = [usize; 3];

/// Normalization joints used when a configuration record does not name any.
pub const DEFAULT_NORMALIZATION_JOINTS: [usize; 3] = [11, 12, 23];

fn default_normalization_joints() -> Vec<usize> {
    DEFAULT_NORMALIZATION_JOINTS.to_vec()
}

/// Key angles and normalization joints for one exercise.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoseConfig {
    /// Named joint angles.
    #[serde(default, alias = "KEY_ANGLES")]
    pub key_angles: BTreeMap<String, JointTriple>,
    /// Joints that must be present for a frame to be normalized. The first one is the anchor.
    #[serde(
        default = "default_normalization_joints",
        alias = "NORMALIZATION_JOINTS"
    )]
    pub normalization_joints: Vec<usize>,
}

impl Default for PoseConfig {
    /// Elbows, shoulders, hips and knees of the 33-point MediaPipe body topology.
    fn default() -> Self {
        let key_angles = [
            ("left_elbow", [11, 13, 15]),
            ("right_elbow", [12, 14, 16]),
            ("left_shoulder", [13, 11, 23]),
            ("right_shoulder", [14, 12, 24]),
            ("left_hip", [11, 23, 25]),
            ("right_hip", [12, 24, 26]),
            ("left_knee", [23, 25, 27]),
            ("right_knee", [24, 26, 28]),
        ]
        .into_iter()
        .map(|(name, triple)| (name.to_string(), triple))
        .collect();

        Self {
            key_angles,
            normalization_joints: default_normalization_joints(),
        }
    }
}

impl PoseConfig {
    /// Build a config from parts.
    pub fn new(
        key_angles: BTreeMap<String, JointTriple>,
        normalization_joints: Vec<usize>,
    ) -> Self {
        Self {
            key_angles,
            normalization_joints,
        }
    }

    /// Landmark used to translate the reference skeleton onto the subject.
    pub fn anchor(&self) -> Option<usize> {
        self.normalization_joints.first().copied()
    }

    /// Reject configs that cannot drive an overlay.
    pub fn validate(&self) -> PoseAlignResult<()> {
        if self.normalization_joints.is_empty() {
            return Err(PoseAlignError::config(
                "normalization_joints must name at least the anchor joint",
            ));
        }
        for (name, [p1, p2, p3]) in &self.key_angles {
            if p1 == p2 || p2 == p3 {
                return Err(PoseAlignError::config(format!(
                    "key angle '{name}' reuses its vertex {p2} as an endpoint"
                )));
            }
        }
        Ok(())
    }

    /// Parse a single config from JSON.
    pub fn from_json_str(s: &str) -> PoseAlignResult<Self> {
        serde_json::from_str(s).map_err(|e| PoseAlignError::config(format!("invalid config: {e}")))
    }

    /// Load a single config from a JSON file.
    pub fn from_json_file(path: &Path) -> PoseAlignResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            PoseAlignError::io(format!("cannot open config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }
}

/// One catalog record.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CatalogEntry {
    /// Human-readable exercise description.
    #[serde(default, alias = "Describe")]
    pub description: String,
    /// Geometry for this exercise.
    #[serde(flatten)]
    pub config: PoseConfig,
}

/// Per-video configurations keyed by numeric id (`01_03`).
///
/// Accepts the deployment file keyed by video path (`"Actions\\3.mp4"`) and the exported form
/// keyed by numeric id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ConfigCatalog {
    /// Parse a catalog document.
    pub fn from_json_str(s: &str) -> PoseAlignResult<Self> {
        let raw: BTreeMap<String, CatalogEntry> = serde_json::from_str(s)
            .map_err(|e| PoseAlignError::config(format!("invalid config catalog: {e}")))?;

        let mut entries = BTreeMap::new();
        for (key, entry) in raw {
            let id = numeric_id(&key)?;
            if entries.insert(id.clone(), entry).is_some() {
                tracing::warn!(%id, source = %key, "duplicate catalog id; later record wins");
            }
        }
        Ok(Self { entries })
    }

    /// Load a catalog from a JSON file.
    pub fn from_json_file(path: &Path) -> PoseAlignResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            PoseAlignError::io(format!("cannot open config catalog '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    /// Look up the record for `id`.
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Look up the config for `id`, failing on unknown ids.
    pub fn config(&self, id: &str) -> PoseAlignResult<&PoseConfig> {
        self.get(id)
            .map(|e| &e.config)
            .ok_or_else(|| PoseAlignError::config(format!("no configuration with id '{id}'")))
    }

    /// Iterate records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the catalog has no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive the `01_XX` id from a catalog key.
///
/// Keys that already look like `<digits>_<digits>` are kept; otherwise the file stem of a
/// Windows- or Unix-style path is parsed as the video number.
pub fn numeric_id(key: &str) -> PoseAlignResult<String> {
    if let Some((a, b)) = key.split_once('_')
        && !a.is_empty()
        && !b.is_empty()
        && a.bytes().all(|c| c.is_ascii_digit())
        && b.bytes().all(|c| c.is_ascii_digit())
    {
        return Ok(key.to_string());
    }

    let file = key.rsplit(['\\', '/']).next().unwrap_or(key);
    let stem = file.split('.').next().unwrap_or(file);
    let n: u32 = stem.trim().parse().map_err(|_| {
        PoseAlignError::config(format!("cannot derive a video number from '{key}'"))
    })?;
    Ok(format!("01_{n:02}"))
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
