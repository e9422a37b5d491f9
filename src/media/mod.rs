//! Video probing and frame decoding through the system `ffprobe`/`ffmpeg` binaries.

/// `ffprobe` metadata.
pub mod probe;
/// Sequential frame sources.
pub mod source;
