#![forbid(unsafe_code)]

//! Pose-sequence extraction and alignment overlays for exercise videos.
//!
//! A video is decoded frame by frame, a [`LandmarkSource`] turns each frame into pixel-space
//! landmarks, and a [`SequenceExtractor`] records joint angles and normalized coordinates per
//! frame. Given an externally computed [`Alignment`], the [`OverlayRenderer`] draws the subject
//! skeleton and the anchor-aligned reference skeleton over the subject video.

pub mod align;
pub mod config;
pub mod encode;
pub mod foundation;
pub mod media;
pub mod pose;
pub mod render;
pub mod sequence;

pub use align::{Alignment, AlignmentResult, LowScoreSelector, NoLowScores, subject_to_reference};
pub use config::{
    CatalogEntry, ConfigCatalog, DEFAULT_NORMALIZATION_JOINTS, JointTriple, PoseConfig, numeric_id,
};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Canvas, Fps, Point, Vec2};
pub use foundation::error::{PoseAlignError, PoseAlignResult};
pub use media::probe::{VideoInfo, is_ffprobe_on_path, probe_video};
pub use media::source::{FfmpegFrameSource, FrameSource, InMemorySource};
pub use pose::angle::{annotate_joint_angle, joint_angle};
pub use pose::landmark::{
    DEFAULT_MIN_DETECTION_CONFIDENCE, KeypointFileSource, KeypointFrame, Landmark,
    LandmarkSource,
};
pub use pose::normalize::normalize_landmarks;
pub use render::overlay::{FrameOverlay, anchor_translation, composite_frame};
pub use render::pipeline::{LOW_SCORE_DIR, OverlayRenderer, RenderOpts, RenderSummary};
pub use sequence::{ExtractOpts, FrameRecord, Sequence, SequenceExtractor};
