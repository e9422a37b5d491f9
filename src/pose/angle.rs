//! Joint angles from key-angle triples.

use image::RgbaImage;

use crate::config::JointTriple;
use crate::pose::landmark::{Landmark, landmark_at};
use crate::render::draw::{self, Rgb};

/// Absolute joint angle in degrees at the vertex `p2` of `(p1, p2, p3)`, in `[0, 180]`.
///
/// Returns `0.0` when the landmark storage is shorter than the largest referenced index or when
/// any of the three indices is absent from the frame.
pub fn joint_angle(landmarks: &[Landmark], triple: JointTriple) -> f64 {
    let [p1, p2, p3] = triple;
    let needed = p1.max(p2).max(p3);
    if landmarks.len() < needed + 1 {
        return 0.0;
    }
    let (Some(a), Some(b), Some(c)) = (
        landmark_at(landmarks, p1),
        landmark_at(landmarks, p2),
        landmark_at(landmarks, p3),
    ) else {
        return 0.0;
    };

    let v1 = a.point() - b.point();
    let v2 = c.point() - b.point();
    v1.cross(v2).atan2(v1.dot(v2)).to_degrees().abs()
}

const SEGMENT_COLOR: Rgb = [255, 255, 255];
const MARKER_COLOR: Rgb = [255, 0, 0];

/// Draw the two segments of `triple` plus joint markers onto `canvas` and return the angle.
///
/// Drawing never changes the returned value; when the angle falls back to `0.0` nothing is drawn.
pub fn annotate_joint_angle(
    canvas: &mut RgbaImage,
    landmarks: &[Landmark],
    triple: JointTriple,
) -> f64 {
    let angle = joint_angle(landmarks, triple);
    let [p1, p2, p3] = triple;
    let (Some(a), Some(b), Some(c)) = (
        landmark_at(landmarks, p1),
        landmark_at(landmarks, p2),
        landmark_at(landmarks, p3),
    ) else {
        return angle;
    };
    if landmarks.len() < p1.max(p2).max(p3) + 1 {
        return angle;
    }

    draw::thick_line(canvas, a.point(), b.point(), SEGMENT_COLOR, 3);
    draw::thick_line(canvas, c.point(), b.point(), SEGMENT_COLOR, 3);
    for p in [a.point(), b.point(), c.point()] {
        draw::joint_marker(canvas, p, MARKER_COLOR);
    }
    angle
}

#[cfg(test)]
#[path = "../../tests/unit/pose/angle.rs"]
mod tests;
