//! Error types for the transfer engine and its exporters.

use std::path::{Path, PathBuf};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GradeError>;

/// Everything that can go wrong between pixel ingress and artifact export.
///
/// Degenerate statistics (empty zones, zero standard deviation) are not
/// errors; the algorithms fall back to identity for those.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    /// Image unreadable or output path unwritable.
    #[error("I/O error while {stage} `{}`: {source}", .path.display())]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image could not be decoded by the `image` crate.
    #[error("failed to decode image `{}`: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Unsupported pixel layout or malformed artifact contents.
    #[error("format error in {stage}: {message}")]
    Format { stage: &'static str, message: String },

    /// A configuration parameter outside its documented domain.
    #[error("invalid {parameter} = {value}: {reason}")]
    Validation {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    /// Irrecoverable numeric failure.
    #[error("computation failed in {stage}: {message}")]
    Computation { stage: &'static str, message: String },
}

impl GradeError {
    /// I/O error with the stage and path it happened at.
    pub fn io(stage: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Validation error for a named parameter.
    pub fn validation(
        parameter: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            parameter,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Format error raised while handling `stage`.
    pub fn format(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Format {
            stage,
            message: message.into(),
        }
    }

    /// Numeric failure raised while handling `stage`.
    pub fn computation(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Computation {
            stage,
            message: message.into(),
        }
    }

    /// True when the caller supplied a bad parameter and nothing was processed.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
