use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("[HM100] cache entry '{key}' not found")]
    NotFound { key: String },
    #[error("[HM101] cache entry '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("[HM102] cache I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("[HM103] invalid integrity token '{0}'")]
    InvalidIntegrity(String),
    #[error("[HM104] failed to encode cache value: {0}")]
    Encode(String),
}

impl CacheError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "HM100",
            Self::Corrupt { .. } => "HM101",
            Self::Io { .. } => "HM102",
            Self::InvalidIntegrity(_) => "HM103",
            Self::Encode(_) => "HM104",
        }
    }

    /// Missing entries are recoverable; callers usually fall back to a default.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
