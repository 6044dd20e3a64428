use hmpact_codec::{serialize, Formatting, Validator};
use serde_json::Value;
use tracing::{debug, info};

use super::store::write_atomic;
use super::{apply_patch, LoadedManifest, ManifestDocument, ManifestError, ManifestLocation, MANIFEST_SCHEMA};

/// In-memory manifest that is schema-valid after every edit.
///
/// Edits return a new draft and never touch disk, so the previous value is
/// always a usable fallback. Nothing is written until [`Draft::save`].
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    location: ManifestLocation,
    document: ManifestDocument,
}

impl From<LoadedManifest> for Draft {
    fn from(loaded: LoadedManifest) -> Self {
        Self {
            location: loaded.location,
            document: loaded.document,
        }
    }
}

impl Draft {
    pub fn document(&self) -> &ManifestDocument {
        &self.document
    }

    pub fn location(&self) -> &ManifestLocation {
        &self.location
    }

    /// Apply one set/delete and re-validate the result.
    pub fn edit(&self, path: &[&str], value: Option<Value>) -> Result<Self, ManifestError> {
        let mut raw = serde_json::to_value(&self.document)
            .map_err(|err| ManifestError::Serialize(err.to_string()))?;
        apply_patch(&mut raw, path, value)?;
        let document = MANIFEST_SCHEMA
            .validate(&raw)
            .map_err(|err| ManifestError::Validation {
                message: format!(
                    "edit at '{}' would make the manifest invalid: {err}",
                    path.join(".")
                ),
            })?;
        debug!(path = %path.join("."), "draft edited");
        Ok(Self {
            location: self.location.clone(),
            document,
        })
    }

    /// Write the draft over its backing file in one atomic replace.
    pub fn save(&self) -> Result<(), ManifestError> {
        let text = serialize(&self.document, Formatting::default())
            .map_err(|err| ManifestError::Serialize(err.to_string()))?;
        write_atomic(&self.location.path, &text)?;
        info!(path = %self.location.path.display(), "manifest saved");
        Ok(())
    }
}
