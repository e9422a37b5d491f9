use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::align::{Alignment, LowScoreSelector, subject_to_reference};
use crate::config::PoseConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{PoseAlignError, PoseAlignResult};
use crate::media::source::{FfmpegFrameSource, FrameSource};
use crate::render::overlay::composite_frame;
use crate::sequence::Sequence;

/// Directory name used for snapshots when none is configured.
pub const LOW_SCORE_DIR: &str = "low_score_frames";

/// Options for [`OverlayRenderer`].
#[derive(Clone, Debug, Default)]
pub struct RenderOpts {
    /// Export frames picked by the low-score selector as JPEG snapshots.
    pub save_lowest_scores: bool,
    /// Snapshot directory. Defaults to `low_score_frames/` next to the output video, or in the
    /// working directory when rendering into an arbitrary sink.
    pub snapshot_dir: Option<PathBuf>,
    /// Mark key-angle vertices on the subject skeleton.
    pub annotate_subject_angles: bool,
}

/// Outcome of a render run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Frames pushed to the sink.
    pub frames_written: usize,
    /// Snapshot images written.
    pub snapshots_written: usize,
    /// Directory the snapshots went to, when snapshot export was enabled.
    pub snapshot_dir: Option<PathBuf>,
}

/// Draws the subject and anchor-aligned reference skeletons over the subject video.
#[derive(Clone, Debug)]
pub struct OverlayRenderer<'a> {
    config: &'a PoseConfig,
    opts: RenderOpts,
}

impl<'a> OverlayRenderer<'a> {
    /// Renderer with default options.
    pub fn new(config: &'a PoseConfig) -> Self {
        Self {
            config,
            opts: RenderOpts::default(),
        }
    }

    /// Override the render options.
    pub fn with_opts(mut self, opts: RenderOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Composite every subject frame and push it to `sink`.
    ///
    /// Output stops when `source` runs dry or every subject record has been used, whichever
    /// comes first. The sink is configured with the source's size and frame rate.
    #[tracing::instrument(skip_all, fields(reference = reference.len(), subject = subject.len()))]
    pub fn render<S, K>(
        &self,
        reference: &Sequence,
        subject: &Sequence,
        alignment: &dyn Alignment,
        selector: &dyn LowScoreSelector,
        source: &mut S,
        sink: &mut K,
    ) -> PoseAlignResult<RenderSummary>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        self.render_inner(reference, subject, alignment, selector, source, sink)
            .inspect_err(|err| tracing::error!(error = %err, "overlay render failed"))
    }

    /// Decode `subject_video`, composite it and encode the result to `out_path`.
    ///
    /// Snapshots default to `low_score_frames/` next to `out_path`.
    pub fn render_to_file(
        &self,
        reference: &Sequence,
        subject: &Sequence,
        alignment: &dyn Alignment,
        selector: &dyn LowScoreSelector,
        subject_video: &Path,
        out_path: &Path,
    ) -> PoseAlignResult<RenderSummary> {
        let mut source = FfmpegFrameSource::open(subject_video)?;
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path));

        let mut renderer = self.clone();
        if renderer.opts.snapshot_dir.is_none() {
            let parent = out_path.parent().unwrap_or_else(|| Path::new(""));
            renderer.opts.snapshot_dir = Some(parent.join(LOW_SCORE_DIR));
        }
        renderer.render(reference, subject, alignment, selector, &mut source, &mut sink)
    }

    fn render_inner<S, K>(
        &self,
        reference: &Sequence,
        subject: &Sequence,
        alignment: &dyn Alignment,
        selector: &dyn LowScoreSelector,
        source: &mut S,
        sink: &mut K,
    ) -> PoseAlignResult<RenderSummary>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        let lookup = subject_to_reference(alignment.path());
        if reference.is_empty() {
            tracing::warn!("reference sequence is empty; drawing the subject skeleton only");
        }

        let snapshot_dir = self.opts.save_lowest_scores.then(|| {
            self.opts
                .snapshot_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(LOW_SCORE_DIR))
        });
        let low_scores: HashSet<usize> = if self.opts.save_lowest_scores {
            selector
                .select(alignment)
                .into_iter()
                .map(|(idx, _)| idx)
                .collect()
        } else {
            HashSet::new()
        };

        sink.begin(SinkConfig {
            canvas: source.canvas(),
            fps: source.fps(),
        })?;

        let mut summary = RenderSummary {
            snapshot_dir: snapshot_dir.clone(),
            ..RenderSummary::default()
        };
        for (i, record) in subject.frames().iter().enumerate() {
            let Some(mut frame) = source.next_frame()? else {
                break;
            };

            let reference_record = reference_index(&lookup, i, reference.len())
                .and_then(|idx| reference.get(idx));
            let drawn = composite_frame(
                &mut frame,
                record,
                reference_record,
                self.config,
                self.opts.annotate_subject_angles,
            );
            if reference_record.is_some() && drawn.translation.is_none() {
                tracing::debug!(frame = i, "anchor missing; reference skeleton skipped");
            }

            if let Some(dir) = &snapshot_dir
                && low_scores.contains(&i)
            {
                summary.snapshots_written += 1;
                save_snapshot(&frame, dir, summary.snapshots_written)?;
            }

            sink.push_frame(i, &frame)?;
            summary.frames_written += 1;
        }
        sink.end()?;

        tracing::info!(
            frames = summary.frames_written,
            snapshots = summary.snapshots_written,
            "rendered overlay"
        );
        Ok(summary)
    }
}

/// Reference frame shown alongside subject frame `i`.
///
/// Unaligned subject frames fall back to reference frame 0; out-of-range indices clamp to the
/// last reference frame. `None` only when the reference is empty.
pub fn reference_index(
    lookup: &HashMap<usize, usize>,
    i: usize,
    reference_len: usize,
) -> Option<usize> {
    let last = reference_len.checked_sub(1)?;
    Some(lookup.get(&i).copied().unwrap_or(0).min(last))
}

fn save_snapshot(frame: &RgbaImage, dir: &Path, n: usize) -> PoseAlignResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        PoseAlignError::io(format!("create snapshot dir '{}': {e}", dir.display()))
    })?;
    let path = dir.join(format!("frame_{n}.jpg"));
    DynamicImage::ImageRgba8(frame.clone())
        .to_rgb8()
        .save_with_format(&path, ImageFormat::Jpeg)
        .map_err(|e| PoseAlignError::io(format!("write snapshot '{}': {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "saved low-score snapshot");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
