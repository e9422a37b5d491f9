//! Per-video pose sequences and the decode loop that builds them.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::Path;

use crate::config::PoseConfig;
use crate::foundation::error::{PoseAlignError, PoseAlignResult};
use crate::media::source::{FfmpegFrameSource, FrameSource};
use crate::pose::angle::joint_angle;
use crate::pose::landmark::{Landmark, LandmarkSource, landmark_at};
use crate::pose::normalize::normalize_landmarks;

/// Pose measurements for one decoded frame.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameRecord {
    /// Raw pixel-space landmarks, in detector order.
    pub landmarks: Vec<Landmark>,
    /// Angle name → degrees, one entry per configured key angle.
    pub angles: BTreeMap<String, f64>,
    /// Scale/translation-invariant coordinates; empty when the frame is incomplete.
    pub norm_landmarks: Vec<(f64, f64)>,
}

impl FrameRecord {
    /// Measure one frame's landmarks against `config`.
    pub fn measure(landmarks: Vec<Landmark>, config: &PoseConfig) -> Self {
        let angles = config
            .key_angles
            .iter()
            .map(|(name, &triple)| (name.clone(), joint_angle(&landmarks, triple)))
            .collect();
        let norm_landmarks = normalize_landmarks(&landmarks, &config.normalization_joints);
        Self {
            landmarks,
            angles,
            norm_landmarks,
        }
    }

    /// Raw landmark carrying `index`.
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        landmark_at(&self.landmarks, index)
    }

    /// `true` when the frame passed the normalization preconditions.
    pub fn is_normalized(&self) -> bool {
        !self.norm_landmarks.is_empty()
    }
}

/// Ordered frame records of one video; position is the frame number.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    frames: Vec<FrameRecord>,
}

impl Sequence {
    /// Wrap already-measured records.
    pub fn from_records(frames: Vec<FrameRecord>) -> Self {
        Self { frames }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when no frame was recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Record for frame `idx`.
    pub fn get(&self, idx: usize) -> Option<&FrameRecord> {
        self.frames.get(idx)
    }

    /// All records in frame order.
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Write the sequence as JSON.
    pub fn save_json(&self, path: &Path) -> PoseAlignResult<()> {
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        let write_err = |e: String| {
            PoseAlignError::io(format!("write sequence '{}': {e}", path.display()))
        };
        let f = std::fs::File::create(path).map_err(|e| write_err(e.to_string()))?;
        let mut w = std::io::BufWriter::new(f);
        serde_json::to_writer(&mut w, self).map_err(|e| write_err(e.to_string()))?;
        // Errors raised while dropping a BufWriter are lost.
        w.flush().map_err(|e| write_err(e.to_string()))?;
        Ok(())
    }

    /// Read a sequence written by [`Sequence::save_json`].
    pub fn load_json(path: &Path) -> PoseAlignResult<Self> {
        let f = std::fs::File::open(path)
            .map_err(|e| PoseAlignError::io(format!("cannot open '{}': {e}", path.display())))?;
        serde_json::from_reader(std::io::BufReader::new(f)).map_err(|e| {
            PoseAlignError::config(format!("invalid sequence '{}': {e}", path.display()))
        })
    }
}

/// Options for [`SequenceExtractor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractOpts {
    /// Record every `stride`-th decoded frame. `1` records every frame.
    pub stride: usize,
}

impl Default for ExtractOpts {
    fn default() -> Self {
        Self { stride: 1 }
    }
}

/// Drives a frame source and a landmark detector into a [`Sequence`].
#[derive(Clone, Copy, Debug)]
pub struct SequenceExtractor<'a> {
    config: &'a PoseConfig,
    opts: ExtractOpts,
}

impl<'a> SequenceExtractor<'a> {
    /// Extractor recording every frame.
    pub fn new(config: &'a PoseConfig) -> Self {
        Self {
            config,
            opts: ExtractOpts::default(),
        }
    }

    /// Override the extraction options.
    pub fn with_opts(mut self, opts: ExtractOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Decode `source` to the end and measure every recorded frame.
    ///
    /// Frames without detections are still recorded so the sequence stays index-aligned with the
    /// video. A detector error on one frame is logged and treated as "nothing detected".
    #[tracing::instrument(skip_all, fields(stride = self.opts.stride))]
    pub fn extract<S, L>(&self, source: &mut S, landmarks: &mut L) -> PoseAlignResult<Sequence>
    where
        S: FrameSource + ?Sized,
        L: LandmarkSource + ?Sized,
    {
        let stride = self.opts.stride;
        if stride == 0 {
            return Err(PoseAlignError::validation("extract stride must be >= 1"));
        }
        if stride > 1 {
            tracing::warn!(
                stride,
                "frame stride > 1: sequence indices no longer match video frame numbers"
            );
        }

        let mut frames = Vec::new();
        let mut decoded = 0usize;
        let mut detected = 0usize;
        while let Some(frame) = source.next_frame()? {
            let frame_no = decoded;
            decoded += 1;
            if frame_no % stride != 0 {
                continue;
            }

            let lms = match landmarks.detect(&frame) {
                Ok(lms) => lms,
                Err(err) => {
                    tracing::warn!(frame = frame_no, error = %err, "landmark detection failed");
                    Vec::new()
                }
            };
            if !lms.is_empty() {
                detected += 1;
            }
            frames.push(FrameRecord::measure(lms, self.config));
        }

        tracing::info!(decoded, recorded = frames.len(), detected, "extracted sequence");
        Ok(Sequence::from_records(frames))
    }

    /// Open the video at `path` and extract it.
    ///
    /// Fails with [`PoseAlignError::Io`] when the video cannot be opened.
    pub fn extract_path<L>(&self, path: &Path, landmarks: &mut L) -> PoseAlignResult<Sequence>
    where
        L: LandmarkSource + ?Sized,
    {
        let mut source = FfmpegFrameSource::open(path)?;
        self.extract(&mut source, landmarks)
    }

    /// Extract the reference and subject videos as two independent pipelines in parallel.
    ///
    /// The only shared state is this extractor's immutable configuration.
    pub fn extract_pair<RS, RL, SS, SL>(
        &self,
        reference: (&mut RS, &mut RL),
        subject: (&mut SS, &mut SL),
    ) -> PoseAlignResult<(Sequence, Sequence)>
    where
        RS: FrameSource + Send + ?Sized,
        RL: LandmarkSource + Send + ?Sized,
        SS: FrameSource + Send + ?Sized,
        SL: LandmarkSource + Send + ?Sized,
    {
        let (reference, subject) = rayon::join(
            || self.extract(reference.0, reference.1),
            || self.extract(subject.0, subject.1),
        );
        Ok((reference?, subject?))
    }
}

#[cfg(test)]
#[path = "../tests/unit/sequence/sequence.rs"]
mod tests;
