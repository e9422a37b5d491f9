/// Crate-wide result alias.
pub type PoseAlignResult<T> = Result<T, PoseAlignError>;

/// Errors surfaced by the extraction and overlay pipelines.
///
/// Per-frame anomalies (missing landmarks, zero-norm frames, out-of-range alignment indices) are
/// absorbed by the pipeline and never show up here.
#[derive(thiserror::Error, Debug)]
pub enum PoseAlignError {
    /// A video source could not be opened/probed/read, or an output could not be written.
    #[error("io error: {0}")]
    Io(String),

    /// Caller-supplied input is structurally invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration JSON could not be parsed or resolved.
    #[error("config error: {0}")]
    Config(String),

    /// The output encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Anything else, with context attached via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PoseAlignError {
    /// Build a [`PoseAlignError::Io`].
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`PoseAlignError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PoseAlignError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`PoseAlignError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// `true` for failures to open or read a media source.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
