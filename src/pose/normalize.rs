use crate::pose::landmark::{Landmark, landmark_at};

/// Map a frame's landmarks into a scale- and translation-invariant vector.
///
/// The bounding box of all landmarks is squared by padding the shorter axis towards negative
/// coordinates, landmarks are offset from that padded corner, and the flattened offsets are
/// divided by their L2 norm. Rotation is not removed.
///
/// Returns an empty vector when `landmarks` is empty or any of `normalization_joints` is absent.
/// A zero norm returns the raw offsets.
pub fn normalize_landmarks(
    landmarks: &[Landmark],
    normalization_joints: &[usize],
) -> Vec<(f64, f64)> {
    if landmarks.is_empty() {
        return Vec::new();
    }
    if !normalization_joints
        .iter()
        .all(|&j| landmark_at(landmarks, j).is_some())
    {
        return Vec::new();
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for lm in landmarks {
        min_x = min_x.min(lm.x);
        max_x = max_x.max(lm.x);
        min_y = min_y.min(lm.y);
        max_y = max_y.max(lm.y);
    }

    let half_w = (max_x - min_x) / 2.0;
    let half_h = (max_y - min_y) / 2.0;
    let (origin_x, origin_y) = if half_w <= half_h {
        (min_x - (half_h - half_w), min_y)
    } else {
        (min_x, min_y - (half_w - half_h))
    };

    let offsets: Vec<(f64, f64)> = landmarks
        .iter()
        .map(|lm| (lm.x - origin_x, lm.y - origin_y))
        .collect();

    let norm = offsets
        .iter()
        .map(|&(x, y)| x * x + y * y)
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 {
        return offsets;
    }

    offsets
        .into_iter()
        .map(|(x, y)| (x / norm, y / norm))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/pose/normalize.rs"]
mod tests;
