use hmpact_domain::ManifestError;
use thiserror::Error;

use super::ImportReport;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("[HM400] failed to fetch registries from {location}: {reason}")]
    Fetch { location: String, reason: String },
    #[error("[HM401] invalid registry import data: {0}")]
    Schema(String),
    #[error("[HM402] Duplicate registry IDs found in import data: {}", ids.join(", "))]
    Conflict { ids: Vec<String> },
    #[error("[HM403] All registry imports failed.")]
    AllFailed(Box<ImportReport>),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

impl ImportError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "HM400",
            Self::Schema(_) => "HM401",
            Self::Conflict { .. } => "HM402",
            Self::AllFailed(_) => "HM403",
            Self::Manifest(err) => err.code(),
        }
    }

    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Fetch { .. } => false,
            Self::Schema(_) | Self::Conflict { .. } | Self::AllFailed(_) => true,
            Self::Manifest(err) => err.is_user_error(),
        }
    }

    /// The per-entry report, when the import got as far as applying entries.
    #[must_use]
    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            Self::AllFailed(report) => Some(report.as_ref()),
            _ => None,
        }
    }
}
