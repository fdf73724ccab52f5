use thiserror::Error;

/// Main error type for the Contour-Compositor library
#[derive(Error, Debug)]
pub enum ContourError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image decoding errors
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read image: {path}")]
    Unreadable { path: String },

    #[error("Malformed image data: {path}")]
    Malformed { path: String },
}

/// Structural pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No input pairs to process")]
    EmptyInput,

    #[error("Mask sequence exhausted at pair {index}: {frames} frames but only {masks} masks")]
    Alignment {
        index: usize,
        frames: usize,
        masks: usize,
    },

    #[error("Dimensions {actual_width}x{actual_height} do not match the fixed run geometry {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Run cancelled before pair {index}")]
    Cancelled { index: usize },
}

/// Video encoding errors
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to initialize encoder for {path}: {reason}")]
    InitFailed { path: String, reason: String },

    #[error("Failed to write frame to encoder: {reason}")]
    WriteFailed { reason: String },

    #[error("Failed to finalize video container: {reason}")]
    FinalizeFailed { reason: String },

    #[error("Sink is closed and no longer accepts frames")]
    Closed,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ContourError
pub type Result<T> = std::result::Result<T, ContourError>;

/// What the pipeline does with an error raised while processing one pair.
///
/// Keeping the decision in one place (rather than scattered conditionals in
/// the streaming loop) makes the two-tier failure policy auditable: decode
/// failures are local to a pair and recoverable by skipping it, everything
/// else invalidates the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Skip the current pair, count it, and continue with the next one.
    SkipPair,
    /// Abort the run; the error is surfaced to the caller.
    Abort,
}

impl ContourError {
    /// Classify this error under the mid-stream failure policy.
    ///
    /// Only applies to errors raised while streaming pairs; validation and
    /// open-phase failures abort before any frame is written regardless.
    pub fn failure_action(&self) -> FailureAction {
        match self {
            Self::Decode(_) => FailureAction::SkipPair,
            _ => FailureAction::Abort,
        }
    }
}
