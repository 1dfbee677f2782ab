//! Error types for index animation configuration.

use serde::{Deserialize, Serialize};

/// Configuration errors. Runtime operations never produce these; they
/// degrade gracefully and log instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    #[error("animation config parse error: {reason}")]
    Parse { reason: String },

    #[error("frame {index} has invalid delay {value} (must be finite and > 0)")]
    InvalidDelay { index: usize, value: f32 },

    #[error("invalid speed {value} (must be finite and > 0)")]
    InvalidSpeed { value: f32 },
}

impl AnimationError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "serialization",
            Self::InvalidDelay { .. } | Self::InvalidSpeed { .. } => "validation",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
