//! Per-frame pose geometry: landmarks, joint angles and normalization.

pub mod angle;
pub mod landmark;
pub mod normalize;
