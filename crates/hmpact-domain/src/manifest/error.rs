use std::{io, path::PathBuf};

use hmpact_codec::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("[HM300] no manifest file found in {}", root.display())]
    NotFound { root: PathBuf },
    #[error("[HM301] {} format not supported yet", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("[HM302] {message}")]
    Parse {
        message: String,
        diagnostics: Vec<Diagnostic>,
    },
    #[error("[HM303] {message}")]
    Validation { message: String },
    #[error("[HM304] cannot edit '{path}': {reason}")]
    Path { path: String, reason: String },
    #[error("[HM305] manifest I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("[HM306] manifest already exists at {}", path.display())]
    AlreadyExists { path: PathBuf },
    #[error("[HM307] failed to serialize manifest: {0}")]
    Serialize(String),
}

impl ManifestError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "HM300",
            Self::UnsupportedFormat { .. } => "HM301",
            Self::Parse { .. } => "HM302",
            Self::Validation { .. } => "HM303",
            Self::Path { .. } => "HM304",
            Self::Io { .. } => "HM305",
            Self::AlreadyExists { .. } => "HM306",
            Self::Serialize(_) => "HM307",
        }
    }

    /// Errors the user can fix by changing the manifest or their input.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Io { .. } | Self::Serialize(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
