pub mod cache;
pub mod init;
pub mod registry;

use hmpact_cache::CacheError;
use hmpact_domain::ManifestError;
use serde_json::{json, Value};

use crate::ExecutionOutcome;

const INIT_HINT: &str = "Run `hmpact init` to create hmpact.jsonc, or pass --manifest-dir.";

pub fn manifest_error_outcome(err: &ManifestError) -> ExecutionOutcome {
    let mut details = json!({
        "reason": manifest_reason(err),
        "code": err.code(),
    });
    match err {
        ManifestError::NotFound { root } => {
            details["manifest_dir"] = json!(root.display().to_string());
            details["hint"] = json!(INIT_HINT);
        }
        ManifestError::UnsupportedFormat { path } => {
            details["path"] = json!(path.display().to_string());
            details["hint"] = json!("Rename the manifest to hmpact.jsonc.");
        }
        ManifestError::Parse { diagnostics, .. } => {
            details["issues"] = Value::Array(
                diagnostics
                    .iter()
                    .map(|diag| json!({"message": diag.to_string()}))
                    .collect(),
            );
        }
        _ => {}
    }
    if err.is_user_error() {
        ExecutionOutcome::user_error(err.to_string(), details)
    } else {
        ExecutionOutcome::failure(err.to_string(), details)
    }
}

fn manifest_reason(err: &ManifestError) -> &'static str {
    match err {
        ManifestError::NotFound { .. } => "missing_manifest",
        ManifestError::UnsupportedFormat { .. } => "unsupported_manifest_format",
        ManifestError::Parse { .. } => "manifest_parse_error",
        ManifestError::Validation { .. } => "invalid_manifest",
        ManifestError::Path { .. } => "invalid_edit_path",
        ManifestError::Io { .. } => "manifest_io",
        ManifestError::AlreadyExists { .. } => "manifest_exists",
        ManifestError::Serialize(_) => "manifest_serialize",
    }
}

pub fn cache_error_outcome(err: &CacheError) -> ExecutionOutcome {
    let details = json!({
        "reason": match err {
            CacheError::NotFound { .. } => "cache_miss",
            CacheError::Corrupt { .. } => "cache_corrupt",
            CacheError::Io { .. } => "cache_io",
            CacheError::InvalidIntegrity(_) => "invalid_integrity",
            CacheError::Encode(_) => "cache_encode",
        },
        "code": err.code(),
    });
    if err.is_not_found() {
        ExecutionOutcome::user_error(err.to_string(), details)
    } else {
        ExecutionOutcome::failure(err.to_string(), details)
    }
}
