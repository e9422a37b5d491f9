//! Boundary types for the external alignment engine and low-score selector.
//!
//! Nothing here computes an alignment; paths, stages and scores are consumed as given.

use std::collections::HashMap;
use std::path::Path;

use crate::foundation::error::{PoseAlignError, PoseAlignResult};

/// Output of an alignment engine.
pub trait Alignment {
    /// `(reference_index, subject_index)` pairs in engine order.
    fn path(&self) -> &[(usize, usize)];
    /// Stage/segmentation labels, passed through untouched to the score selector.
    fn stages(&self) -> &serde_json::Value;
}

/// Picks the frames worth exporting as snapshots.
pub trait LowScoreSelector {
    /// `(subject_frame_index, score)` pairs; only the indices are used by the renderer.
    fn select(&self, alignment: &dyn Alignment) -> Vec<(usize, f64)>;
}

/// Selector that never picks a frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLowScores;

impl LowScoreSelector for NoLowScores {
    fn select(&self, _alignment: &dyn Alignment) -> Vec<(usize, f64)> {
        Vec::new()
    }
}

/// A precomputed alignment, as written by an offline alignment run.
///
/// It also acts as a [`LowScoreSelector`] that returns the frames stored with it.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlignmentResult {
    /// `(reference_index, subject_index)` pairs.
    pub alignment_path: Vec<(usize, usize)>,
    /// Opaque stage labels.
    #[serde(default)]
    pub stages: serde_json::Value,
    /// Precomputed `(subject_frame_index, score)` selections.
    #[serde(default)]
    pub low_score_frames: Vec<(usize, f64)>,
}

impl AlignmentResult {
    /// Alignment with a path only.
    pub fn from_path(alignment_path: Vec<(usize, usize)>) -> Self {
        Self {
            alignment_path,
            ..Self::default()
        }
    }

    /// Attach precomputed low-score frames.
    pub fn with_low_score_frames(mut self, frames: Vec<(usize, f64)>) -> Self {
        self.low_score_frames = frames;
        self
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: &Path) -> PoseAlignResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| PoseAlignError::io(format!("cannot open '{}': {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            PoseAlignError::config(format!("invalid alignment '{}': {e}", path.display()))
        })
    }
}

impl Alignment for AlignmentResult {
    fn path(&self) -> &[(usize, usize)] {
        &self.alignment_path
    }

    fn stages(&self) -> &serde_json::Value {
        &self.stages
    }
}

impl LowScoreSelector for AlignmentResult {
    fn select(&self, _alignment: &dyn Alignment) -> Vec<(usize, f64)> {
        self.low_score_frames.clone()
    }
}

/// Reverse an alignment path into `subject_index → reference_index`.
///
/// When a subject index appears more than once, the last pair in path order wins.
pub fn subject_to_reference(path: &[(usize, usize)]) -> HashMap<usize, usize> {
    path.iter()
        .map(|&(reference, subject)| (subject, reference))
        .collect()
}

#[cfg(test)]
#[path = "../tests/unit/align/align.rs"]
mod tests;
