use super::*;
use crate::align::{AlignmentResult, NoLowScores};
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Canvas, Fps, Vec2};
use crate::media::source::InMemorySource;
use crate::pose::landmark::Landmark;
use crate::render::overlay::anchor_translation;
use crate::sequence::FrameRecord;

const CANVAS: Canvas = Canvas {
    width: 256,
    height: 256,
};

fn source(count: usize) -> InMemorySource {
    InMemorySource::blank(CANVAS, Fps::new(30, 1).unwrap(), count)
}

/// A 33-point skeleton whose anchor (index 11) sits at `(x, y)`.
fn skeleton(cfg: &PoseConfig, x: f64, y: f64) -> FrameRecord {
    let lms = (0..33)
        .map(|i| {
            let d = i as f64 - 11.0;
            Landmark::new(i, x + d, y + d)
        })
        .collect();
    FrameRecord::measure(lms, cfg)
}

fn sequence(cfg: &PoseConfig, len: usize, x: f64, y: f64) -> Sequence {
    Sequence::from_records((0..len).map(|_| skeleton(cfg, x, y)).collect())
}

fn identity(len: usize) -> AlignmentResult {
    AlignmentResult::from_path((0..len).map(|i| (i, i)).collect())
}

#[test]
fn output_is_bounded_by_subject_records() {
    let cfg = PoseConfig::default();
    let reference = sequence(&cfg, 5, 20.0, 20.0);
    let subject = sequence(&cfg, 5, 25.0, 22.0);
    let mut sink = InMemorySink::new();

    let summary = OverlayRenderer::new(&cfg)
        .render(
            &reference,
            &subject,
            &identity(5),
            &NoLowScores,
            &mut source(8),
            &mut sink,
        )
        .unwrap();

    assert_eq!(summary.frames_written, 5);
    assert_eq!(sink.frames().len(), 5);
    assert!(sink.is_finished());
}

#[test]
fn output_is_bounded_by_decodable_frames() {
    let cfg = PoseConfig::default();
    let reference = sequence(&cfg, 5, 20.0, 20.0);
    let subject = sequence(&cfg, 5, 25.0, 22.0);
    let mut sink = InMemorySink::new();

    let summary = OverlayRenderer::new(&cfg)
        .render(
            &reference,
            &subject,
            &identity(5),
            &NoLowScores,
            &mut source(3),
            &mut sink,
        )
        .unwrap();

    assert_eq!(summary.frames_written, 3);
    let indices: Vec<usize> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn end_to_end_overlay_keeps_constant_translation() {
    let cfg = PoseConfig::default();
    let reference = sequence(&cfg, 10, 100.0, 200.0);
    let subject = sequence(&cfg, 8, 120.0, 210.0);
    let alignment = identity(8);
    let mut sink = InMemorySink::new();

    let summary = OverlayRenderer::new(&cfg)
        .render(
            &reference,
            &subject,
            &alignment,
            &NoLowScores,
            &mut source(8),
            &mut sink,
        )
        .unwrap();

    assert_eq!(summary.frames_written, 8);
    assert_eq!(summary.snapshots_written, 0);
    assert_eq!(summary.snapshot_dir, None);
    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            canvas: CANVAS,
            fps: Fps::new(30, 1).unwrap(),
        })
    );

    let lookup = subject_to_reference(alignment.path());
    for i in 0..8 {
        let r = reference_index(&lookup, i, reference.len()).unwrap();
        let t = anchor_translation(subject.get(i).unwrap(), reference.get(r).unwrap(), 11);
        assert_eq!(t, Some(Vec2::new(20.0, 10.0)));
    }
    // Skeletons were actually drawn onto the decoded frames.
    assert!(
        sink.frames()
            .iter()
            .all(|(_, f)| f.pixels().any(|p| p.0 != [0, 0, 0, 255]))
    );
}

#[test]
fn low_score_frames_are_exported_with_a_running_counter() {
    let cfg = PoseConfig::default();
    let reference = sequence(&cfg, 10, 10.0, 12.0);
    let subject = sequence(&cfg, 8, 30.0, 22.0);
    let alignment = identity(8).with_low_score_frames(vec![(3, 0.12), (7, 0.4)]);
    let dir = tempfile::tempdir().unwrap();
    let snaps = dir.path().join("snaps");

    let summary = OverlayRenderer::new(&cfg)
        .with_opts(RenderOpts {
            save_lowest_scores: true,
            snapshot_dir: Some(snaps.clone()),
            annotate_subject_angles: false,
        })
        .render(
            &reference,
            &subject,
            &alignment,
            &alignment,
            &mut source(8),
            &mut InMemorySink::new(),
        )
        .unwrap();

    assert_eq!(summary.snapshots_written, 2);
    assert_eq!(summary.snapshot_dir.as_deref(), Some(snaps.as_path()));
    let mut names: Vec<String> = std::fs::read_dir(&snaps)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["frame_1.jpg", "frame_2.jpg"]);

    let img = image::open(snaps.join("frame_2.jpg")).unwrap();
    assert_eq!((img.width(), img.height()), (CANVAS.width, CANVAS.height));
}

#[test]
fn snapshots_are_ignored_unless_enabled() {
    let cfg = PoseConfig::default();
    let reference = sequence(&cfg, 4, 10.0, 12.0);
    let subject = sequence(&cfg, 4, 30.0, 22.0);
    let alignment = identity(4).with_low_score_frames(vec![(1, 0.0)]);
    let dir = tempfile::tempdir().unwrap();
    let snaps = dir.path().join("snaps");

    let summary = OverlayRenderer::new(&cfg)
        .with_opts(RenderOpts {
            snapshot_dir: Some(snaps.clone()),
            ..RenderOpts::default()
        })
        .render(
            &reference,
            &subject,
            &alignment,
            &alignment,
            &mut source(4),
            &mut InMemorySink::new(),
        )
        .unwrap();

    assert_eq!(summary.snapshots_written, 0);
    assert!(!snaps.exists());
}

#[test]
fn empty_reference_still_renders_subject() {
    let cfg = PoseConfig::default();
    let subject = sequence(&cfg, 3, 30.0, 22.0);
    let mut sink = InMemorySink::new();

    let summary = OverlayRenderer::new(&cfg)
        .render(
            &Sequence::default(),
            &subject,
            &AlignmentResult::default(),
            &NoLowScores,
            &mut source(3),
            &mut sink,
        )
        .unwrap();

    assert_eq!(summary.frames_written, 3);
}

#[test]
fn reference_index_falls_back_and_clamps() {
    let lookup = subject_to_reference(&[(50, 0), (2, 1)]);
    assert_eq!(reference_index(&lookup, 0, 10), Some(9));
    assert_eq!(reference_index(&lookup, 1, 10), Some(2));
    assert_eq!(reference_index(&lookup, 5, 10), Some(0));
    assert_eq!(reference_index(&lookup, 0, 0), None);
}

struct BrokenSink;

impl FrameSink for BrokenSink {
    fn begin(&mut self, _cfg: SinkConfig) -> PoseAlignResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: usize, _frame: &RgbaImage) -> PoseAlignResult<()> {
        Err(PoseAlignError::encode("disk full"))
    }

    fn end(&mut self) -> PoseAlignResult<()> {
        Ok(())
    }
}

#[test]
fn sink_failures_are_returned() {
    let cfg = PoseConfig::default();
    let subject = sequence(&cfg, 2, 30.0, 22.0);
    let err = OverlayRenderer::new(&cfg)
        .render(
            &subject,
            &subject,
            &identity(2),
            &NoLowScores,
            &mut source(2),
            &mut BrokenSink,
        )
        .unwrap_err();
    assert!(matches!(err, PoseAlignError::Encode(_)));
}
