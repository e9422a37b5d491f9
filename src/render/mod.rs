//! Alignment overlay rendering.

/// Low-level skeleton drawing primitives.
pub mod draw;
/// Single-frame skeleton compositing.
pub mod overlay;
/// Decode → composite → encode loop.
pub mod pipeline;
