use thiserror::Error;

use crate::scanner::Diagnostic;

/// Codec failures once a tagged [`crate::Parsed`] is turned into a `Result`.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("[HM200] {message}")]
    NotFound { message: String },
    #[error("[HM201] {message}")]
    Parse {
        message: String,
        diagnostics: Vec<Diagnostic>,
    },
    #[error("[HM202] {message}")]
    Validation { message: String },
    #[error("[HM203] failed to serialize document: {0}")]
    Serialize(String),
}

impl CodecError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "HM200",
            Self::Parse { .. } => "HM201",
            Self::Validation { .. } => "HM202",
            Self::Serialize(_) => "HM203",
        }
    }
}
