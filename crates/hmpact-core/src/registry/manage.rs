use std::collections::BTreeMap;

use hmpact_domain::{ManifestError, ManifestStore, RegistryEntry};
use serde::Serialize;
use serde_json::json;
use tracing::info;

/// URL template used when `add` is given no explicit format.
#[must_use]
pub fn default_format(domain: &str) -> String {
    format!("//{domain}/@{{org}}/{{pkg}}/-/{{pkg}}-{{ver}}.tgz")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedRegistry {
    pub id: String,
    pub format: String,
    /// False when the registry already had this exact format.
    pub changed: bool,
}

/// Set the URL format of a registry, creating it when needed. The id defaults
/// to the domain.
pub fn add_registry(
    store: &ManifestStore,
    domain: &str,
    id: Option<&str>,
    format: Option<&str>,
) -> Result<AddedRegistry, ManifestError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ManifestError::Validation {
            message: "registry domain must not be empty".to_string(),
        });
    }
    let id = match id.map(str::trim) {
        Some("") => {
            return Err(ManifestError::Validation {
                message: "registry id must not be empty".to_string(),
            })
        }
        Some(id) => id,
        None => domain,
    };
    let format = format.map_or_else(|| default_format(domain), str::to_string);
    let changed = store.edit_in_place(&["registries", id, "rule", "format"], Some(json!(format)))?;
    info!(%id, %format, changed, "registry added");
    Ok(AddedRegistry {
        id: id.to_string(),
        format,
        changed,
    })
}

/// Returns whether the registry existed.
pub fn remove_registry(store: &ManifestStore, id: &str) -> Result<bool, ManifestError> {
    let removed = store.edit_in_place(&["registries", id], None)?;
    info!(%id, removed, "registry removed");
    Ok(removed)
}

pub fn list_registries(store: &ManifestStore) -> Result<BTreeMap<String, RegistryEntry>, ManifestError> {
    Ok(store.require()?.document.registries.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use hmpact_domain::MANIFEST_FILE;
    use tempfile::tempdir;

    use super::*;

    fn initialized() -> Result<(tempfile::TempDir, ManifestStore)> {
        let temp = tempdir()?;
        let store = ManifestStore::new(temp.path());
        store.init()?;
        Ok((temp, store))
    }

    #[test]
    fn default_format_interpolates_only_the_domain() {
        assert_eq!(
            default_format("npm.pkg.github.com"),
            "//npm.pkg.github.com/@{org}/{pkg}/-/{pkg}-{ver}.tgz"
        );
    }

    #[test]
    fn add_uses_domain_as_id_and_default_format() -> Result<()> {
        let (_temp, store) = initialized()?;
        let added = add_registry(&store, "npm.example.com", None, None)?;
        assert_eq!(added.id, "npm.example.com");
        assert!(added.changed);

        let registries = list_registries(&store)?;
        assert_eq!(
            registries["npm.example.com"].rule.format,
            "//npm.example.com/@{org}/{pkg}/-/{pkg}-{ver}.tgz"
        );
        Ok(())
    }

    #[test]
    fn add_with_explicit_id_and_format_keeps_headers() -> Result<()> {
        let temp = tempdir()?;
        fs::write(
            temp.path().join(MANIFEST_FILE),
            r#"{"registries": {"gh": {"rule": {"format": "//old", "header": {"Authorization": "x"}}}}}"#,
        )?;
        let store = ManifestStore::new(temp.path());
        add_registry(&store, "npm.pkg.github.com", Some("gh"), Some("//npm.pkg.github.com/{pkg}"))?;

        let entry = &list_registries(&store)?["gh"];
        assert_eq!(entry.rule.format, "//npm.pkg.github.com/{pkg}");
        assert!(entry.rule.header.is_some());

        let again = add_registry(&store, "npm.pkg.github.com", Some("gh"), Some("//npm.pkg.github.com/{pkg}"))?;
        assert!(!again.changed);
        Ok(())
    }

    #[test]
    fn add_rejects_blank_input() -> Result<()> {
        let (_temp, store) = initialized()?;
        assert!(matches!(
            add_registry(&store, "  ", None, None),
            Err(ManifestError::Validation { .. })
        ));
        assert!(matches!(
            add_registry(&store, "npm.example.com", Some(""), None),
            Err(ManifestError::Validation { .. })
        ));
        assert!(matches!(
            add_registry(&store, "npm.example.com", None, Some("")),
            Err(ManifestError::Validation { .. })
        ));
        assert!(list_registries(&store)?.is_empty());
        Ok(())
    }

    #[test]
    fn remove_reports_whether_anything_changed() -> Result<()> {
        let (temp, store) = initialized()?;
        add_registry(&store, "npm.example.com", Some("npm"), None)?;
        assert!(remove_registry(&store, "npm")?);

        let before = fs::read_to_string(temp.path().join(MANIFEST_FILE))?;
        assert!(!remove_registry(&store, "npm")?);
        assert_eq!(fs::read_to_string(temp.path().join(MANIFEST_FILE))?, before);
        Ok(())
    }

    #[test]
    fn operations_need_a_manifest() -> Result<()> {
        let temp = tempdir()?;
        let store = ManifestStore::new(temp.path());
        assert!(matches!(list_registries(&store), Err(ManifestError::NotFound { .. })));
        assert!(matches!(
            add_registry(&store, "npm.example.com", None, None),
            Err(ManifestError::NotFound { .. })
        ));
        Ok(())
    }
}
