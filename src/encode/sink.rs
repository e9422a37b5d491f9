use image::RgbaImage;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::PoseAlignResult;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output frame size.
    pub canvas: Canvas,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Consumer of composited frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing indices starting at 0.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> PoseAlignResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: usize, frame: &RgbaImage) -> PoseAlignResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> PoseAlignResult<()>;
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn begin(&mut self, cfg: SinkConfig) -> PoseAlignResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: usize, frame: &RgbaImage) -> PoseAlignResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> PoseAlignResult<()> {
        (**self).end()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(usize, RgbaImage)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(usize, RgbaImage)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PoseAlignResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &RgbaImage) -> PoseAlignResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> PoseAlignResult<()> {
        self.ended = true;
        Ok(())
    }
}
