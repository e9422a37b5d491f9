use std::path::Path;

use image::RgbaImage;

use crate::foundation::core::Point;
use crate::foundation::error::{PoseAlignError, PoseAlignResult};

/// Pixel-space position of one indexed anatomical point in one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Landmark {
    /// Topology index, stable across frames and videos.
    pub index: usize,
    /// Horizontal pixel coordinate.
    pub x: f64,
    /// Vertical pixel coordinate.
    pub y: f64,
}

impl Landmark {
    /// Create a landmark.
    pub fn new(index: usize, x: f64, y: f64) -> Self {
        Self { index, x, y }
    }

    /// Position as a [`Point`].
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Look up the landmark carrying `index`.
///
/// Detectors emit landmarks in index order, so the slot at position `index` is checked first.
pub fn landmark_at(landmarks: &[Landmark], index: usize) -> Option<&Landmark> {
    match landmarks.get(index) {
        Some(lm) if lm.index == index => Some(lm),
        _ => landmarks.iter().find(|lm| lm.index == index),
    }
}

/// Per-frame body-landmark detector.
///
/// Implementations must not mutate `frame`. An empty vector means "nothing detected".
pub trait LandmarkSource {
    /// Detect landmarks in the next decoded frame.
    fn detect(&mut self, frame: &RgbaImage) -> PoseAlignResult<Vec<Landmark>>;
}

impl<T: LandmarkSource + ?Sized> LandmarkSource for &mut T {
    fn detect(&mut self, frame: &RgbaImage) -> PoseAlignResult<Vec<Landmark>> {
        (**self).detect(frame)
    }
}

impl<T: LandmarkSource + ?Sized> LandmarkSource for Box<T> {
    fn detect(&mut self, frame: &RgbaImage) -> PoseAlignResult<Vec<Landmark>> {
        (**self).detect(frame)
    }
}

/// Detector confidence below which a frame is treated as empty.
pub const DEFAULT_MIN_DETECTION_CONFIDENCE: f64 = 0.5;

/// One frame of recorded detector output.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeypointFrame {
    /// Pose detection score. Missing scores pass the confidence gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Keypoints as `[x, y]` or `[x, y, visibility]`, with x/y normalized to `[0, 1]`.
    #[serde(default)]
    pub keypoints: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
struct KeypointFile {
    frames: Vec<KeypointFrame>,
}

/// Replays detector output recorded as a JSON sidecar, one entry per decoded frame.
///
/// Keypoints are numbered by their position in each entry and scaled to the pixel size of the
/// frame they are matched with. Frames past the end of the recording detect nothing.
#[derive(Clone, Debug)]
pub struct KeypointFileSource {
    frames: Vec<KeypointFrame>,
    cursor: usize,
    min_detection_confidence: f64,
}

impl KeypointFileSource {
    /// Build a source from in-memory frames.
    pub fn new(frames: Vec<KeypointFrame>) -> Self {
        Self {
            frames,
            cursor: 0,
            min_detection_confidence: DEFAULT_MIN_DETECTION_CONFIDENCE,
        }
    }

    /// Load `{"frames": [...]}` from `path`.
    pub fn open(path: &Path) -> PoseAlignResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            PoseAlignError::io(format!("cannot open keypoint file '{}': {e}", path.display()))
        })?;
        let file: KeypointFile = serde_json::from_slice(&bytes).map_err(|e| {
            PoseAlignError::config(format!(
                "keypoint file '{}' is not valid: {e}",
                path.display()
            ))
        })?;
        tracing::debug!(path = %path.display(), frames = file.frames.len(), "loaded keypoints");
        Ok(Self::new(file.frames))
    }

    /// Override the detection-confidence gate.
    pub fn with_min_detection_confidence(mut self, min: f64) -> Self {
        self.min_detection_confidence = min;
        self
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkSource for KeypointFileSource {
    fn detect(&mut self, frame: &RgbaImage) -> PoseAlignResult<Vec<Landmark>> {
        let Some(entry) = self.frames.get(self.cursor) else {
            return Ok(Vec::new());
        };
        self.cursor += 1;

        if entry
            .score
            .is_some_and(|s| s < self.min_detection_confidence)
        {
            return Ok(Vec::new());
        }

        let w = f64::from(frame.width());
        let h = f64::from(frame.height());
        let mut out = Vec::with_capacity(entry.keypoints.len());
        for (index, kp) in entry.keypoints.iter().enumerate() {
            let [x, y, ..] = kp.as_slice() else {
                return Err(PoseAlignError::validation(format!(
                    "keypoint {index} of frame {} has fewer than 2 coordinates",
                    self.cursor - 1
                )));
            };
            // Pixel coordinates are truncated to whole pixels.
            out.push(Landmark::new(index, (x * w).trunc(), (y * h).trunc()));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/landmark.rs"]
mod tests;
