//! Encoding sinks.
//!
//! Sinks consume composited frames in output order and are driven by the overlay renderer.

/// `ffmpeg`-based sink (video output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
