use image::RgbaImage;

use crate::config::PoseConfig;
use crate::foundation::core::{Point, Vec2};
use crate::pose::angle::annotate_joint_angle;
use crate::render::draw::{REFERENCE_COLOR, SUBJECT_COLOR, draw_bones};
use crate::sequence::FrameRecord;

/// Rigid translation moving the reference anchor onto the subject anchor.
///
/// `None` when the anchor is missing from either frame.
pub fn anchor_translation(
    subject: &FrameRecord,
    reference: &FrameRecord,
    anchor: usize,
) -> Option<Vec2> {
    let s = subject.landmark(anchor)?;
    let r = reference.landmark(anchor)?;
    Some(s.point() - r.point())
}

/// What was drawn on one composited frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOverlay {
    /// Translation applied to the reference skeleton, if it was drawn.
    pub translation: Option<Vec2>,
    /// Subject bones drawn.
    pub subject_bones: usize,
    /// Reference bones drawn.
    pub reference_bones: usize,
}

/// Draw the subject skeleton and the anchor-aligned reference skeleton onto `canvas`.
///
/// Both skeletons use the `(p1, p2)` and `(p2, p3)` bones of every key angle. The reference is
/// skipped when there is no reference frame or the anchor is missing from either frame.
pub fn composite_frame(
    canvas: &mut RgbaImage,
    subject: &FrameRecord,
    reference: Option<&FrameRecord>,
    config: &PoseConfig,
    annotate_subject_angles: bool,
) -> FrameOverlay {
    let translation = match (reference, config.anchor()) {
        (Some(reference), Some(anchor)) => anchor_translation(subject, reference, anchor),
        _ => None,
    };

    let subject_at = |i: usize| subject.landmark(i).map(|lm| lm.point());
    let reference_at = |i: usize| -> Option<Point> {
        let t = translation?;
        reference?.landmark(i).map(|lm| lm.point() + t)
    };

    let mut overlay = FrameOverlay {
        translation,
        ..FrameOverlay::default()
    };
    for &[p1, p2, p3] in config.key_angles.values() {
        let bones = [(p1, p2), (p2, p3)];
        overlay.subject_bones += draw_bones(canvas, &bones, subject_at, SUBJECT_COLOR);
        if translation.is_some() {
            overlay.reference_bones += draw_bones(canvas, &bones, reference_at, REFERENCE_COLOR);
        }
    }

    if annotate_subject_angles {
        for &triple in config.key_angles.values() {
            annotate_joint_angle(canvas, &subject.landmarks, triple);
        }
    }

    overlay
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
