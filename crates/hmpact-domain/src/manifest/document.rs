use std::collections::BTreeMap;

use hmpact_codec::{Constraints, Schema, ValidationError};
use serde::{Deserialize, Serialize};

/// Checked shape of the manifest. Unknown top-level keys are dropped on load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registries: Option<BTreeMap<String, RegistryEntry>>,
    /// group -> package -> version spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, BTreeMap<String, String>>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub rule: RegistryRule,
}

/// How package URLs are built for one registry.
///
/// `format` is a template such as `//{domain}/@{org}/{pkg}/-/{pkg}-{ver}.tgz`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRule {
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<BTreeMap<String, String>>,
}

pub const MANIFEST_SCHEMA: Schema<ManifestDocument> = Schema::new("manifest");

impl ManifestDocument {
    pub fn registry(&self, id: &str) -> Option<&RegistryEntry> {
        self.registries.as_ref()?.get(id)
    }

    pub fn has_registry(&self, id: &str) -> bool {
        self.registry(id).is_some()
    }

    /// Registry ids in sorted order.
    pub fn registry_ids(&self) -> Vec<&str> {
        self.registries
            .iter()
            .flat_map(|registries| registries.keys().map(String::as_str))
            .collect()
    }
}

impl Constraints for ManifestDocument {
    fn check(&self) -> Result<(), ValidationError> {
        for (id, entry) in self.registries.iter().flatten() {
            if entry.rule.format.trim().is_empty() {
                return Err(ValidationError::at(
                    format!("registries.{id}.rule.format"),
                    "must be a non-empty template string",
                ));
            }
        }
        Ok(())
    }
}
