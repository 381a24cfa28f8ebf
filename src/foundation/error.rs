/// Convenience result type used across beatframe.
pub type BeatframeResult<T> = Result<T, BeatframeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum BeatframeError {
    /// Invalid caller-provided values (sizes, settings, ranges).
    #[error("validation error: {0}")]
    Validation(String),

    /// The input audio file could not be accepted.
    #[error("input error: {0}")]
    Input(String),

    /// The input audio file exceeds the accepted size.
    #[error("input error: file is {size} bytes, the limit is {max} bytes")]
    FileTooLarge {
        /// Size of the rejected file in bytes.
        size: u64,
        /// Accepted maximum in bytes.
        max: u64,
    },

    /// No encoder profile in the probe list is supported on this system.
    #[error("capture error: format unsupported, no encoder profile is available")]
    UnsupportedFormat,

    /// A capture session is already recording.
    #[error("capture error: capture already in progress")]
    CaptureInProgress,

    /// An operation required an active capture session.
    #[error("capture error: no active capture session")]
    NoActiveCapture,

    /// Encoder start/feed/flush failure.
    #[error("capture error: {0}")]
    Capture(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BeatframeError {
    /// Build a [`BeatframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BeatframeError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`BeatframeError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`BeatframeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors raised by the capture pipeline.
    pub fn is_capture(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat | Self::CaptureInProgress | Self::NoActiveCapture | Self::Capture(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
