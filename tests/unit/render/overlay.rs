use std::collections::BTreeMap;

use super::*;
use crate::pose::landmark::Landmark;
use image::Rgba;

fn arm_config() -> PoseConfig {
    let mut key_angles = BTreeMap::new();
    key_angles.insert("left_elbow".to_string(), [11, 13, 15]);
    PoseConfig::new(key_angles, vec![11, 12, 23])
}

/// 33 landmarks parked in the top-left corner, with the left arm placed explicitly.
fn record(cfg: &PoseConfig, arm: [(f64, f64); 3]) -> FrameRecord {
    let mut lms: Vec<Landmark> = (0..33).map(|i| Landmark::new(i, 5.0, 5.0)).collect();
    for (slot, (x, y)) in [11, 13, 15].into_iter().zip(arm) {
        lms[slot] = Landmark::new(slot, x, y);
    }
    FrameRecord::measure(lms, cfg)
}

fn canvas() -> RgbaImage {
    RgbaImage::from_pixel(320, 320, Rgba([0, 0, 0, 255]))
}

#[test]
fn translation_moves_reference_anchor_onto_subject() {
    let cfg = arm_config();
    let subject = record(&cfg, [(120.0, 210.0), (150.0, 240.0), (180.0, 270.0)]);
    let reference = record(&cfg, [(100.0, 200.0), (100.0, 260.0), (100.0, 300.0)]);
    assert_eq!(
        anchor_translation(&subject, &reference, 11),
        Some(Vec2::new(20.0, 10.0))
    );

    let mut img = canvas();
    let drawn = composite_frame(&mut img, &subject, Some(&reference), &cfg, false);
    assert_eq!(drawn.translation, Some(Vec2::new(20.0, 10.0)));
    assert_eq!(drawn.subject_bones, 2);
    assert_eq!(drawn.reference_bones, 2);

    // The translated forearm runs vertically along x = 120 between y = 270 and y = 310.
    let px = img.get_pixel(120, 290).0;
    assert!(px[1] > 100 && px[2] < 100, "expected reference color, got {px:?}");
    // The subject upper arm runs diagonally from (120, 210) to (150, 240).
    let near_blue = (134..=136)
        .flat_map(|x| (224..=226).map(move |y| (x, y)))
        .any(|(x, y)| img.get_pixel(x, y).0[2] > 100);
    assert!(near_blue, "expected subject color around (135, 225)");
    // Untranslated reference position stays untouched.
    assert_eq!(img.get_pixel(100, 280).0, [0, 0, 0, 255]);
}

#[test]
fn missing_anchor_skips_reference_skeleton() {
    let cfg = arm_config();
    let subject = record(&cfg, [(120.0, 210.0), (150.0, 240.0), (180.0, 270.0)]);
    let mut reference = record(&cfg, [(100.0, 200.0), (100.0, 260.0), (100.0, 300.0)]);
    reference.landmarks.retain(|lm| lm.index != 11);

    let mut img = canvas();
    let drawn = composite_frame(&mut img, &subject, Some(&reference), &cfg, false);
    assert_eq!(drawn.translation, None);
    assert_eq!(drawn.subject_bones, 2);
    assert_eq!(drawn.reference_bones, 0);
    assert!(img.pixels().all(|p| p.0[1] == 0));
}

#[test]
fn subject_without_detections_draws_nothing() {
    let cfg = arm_config();
    let subject = FrameRecord::measure(Vec::new(), &cfg);
    let reference = record(&cfg, [(100.0, 200.0), (100.0, 260.0), (100.0, 300.0)]);

    let mut img = canvas();
    let drawn = composite_frame(&mut img, &subject, Some(&reference), &cfg, false);
    assert_eq!(drawn, FrameOverlay::default());
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn no_reference_frame_draws_subject_only() {
    let cfg = arm_config();
    let subject = record(&cfg, [(120.0, 210.0), (150.0, 240.0), (180.0, 270.0)]);
    let mut img = canvas();
    let drawn = composite_frame(&mut img, &subject, None, &cfg, false);
    assert_eq!(drawn.translation, None);
    assert_eq!(drawn.subject_bones, 2);
    assert_eq!(drawn.reference_bones, 0);
}

#[test]
fn annotation_marks_subject_vertices() {
    let cfg = arm_config();
    let subject = record(&cfg, [(120.0, 210.0), (150.0, 240.0), (180.0, 270.0)]);

    let mut plain = canvas();
    composite_frame(&mut plain, &subject, None, &cfg, false);
    let mut annotated = canvas();
    composite_frame(&mut annotated, &subject, None, &cfg, true);

    assert_ne!(plain.get_pixel(150, 240).0, annotated.get_pixel(150, 240).0);
    assert_eq!(annotated.get_pixel(150, 245).0, [255, 0, 0, 255]);
}
