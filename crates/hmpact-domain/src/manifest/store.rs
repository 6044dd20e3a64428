use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use hmpact_codec::{read_path, Parsed};
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{Draft, ManifestDocument, ManifestError, MANIFEST_SCHEMA};

/// File written by `init` and the only format currently loadable.
pub const MANIFEST_FILE: &str = "hmpact.jsonc";
/// Searched in order; the first existing file wins.
pub const MANIFEST_CANDIDATES: &[&str] = &[MANIFEST_FILE, "hmpact.json"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManifestLocation {
    pub path: PathBuf,
    pub file_name: String,
    pub base_name: String,
    /// Lowercase, without the leading dot.
    pub extension: String,
}

impl ManifestLocation {
    fn new(root: &Path, file_name: &str) -> Self {
        let path = root.join(file_name);
        let (base_name, extension) = match file_name.rsplit_once('.') {
            Some((base, ext)) => (base.to_string(), ext.to_ascii_lowercase()),
            None => (file_name.to_string(), String::new()),
        };
        Self {
            path,
            file_name: file_name.to_string(),
            base_name,
            extension,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedManifest {
    pub location: ManifestLocation,
    pub document: ManifestDocument,
}

/// Loads and edits the manifest living directly in `root`.
#[derive(Clone, Debug)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locate(&self) -> Result<Option<ManifestLocation>, ManifestError> {
        for name in MANIFEST_CANDIDATES {
            let location = ManifestLocation::new(&self.root, name);
            match fs::metadata(&location.path) {
                Ok(meta) if meta.is_file() => {
                    debug!(path = %location.path.display(), "manifest located");
                    return Ok(Some(location));
                }
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(ManifestError::io(&location.path, err)),
            }
        }
        debug!(root = %self.root.display(), "no manifest located");
        Ok(None)
    }

    /// `Ok(None)` when no manifest exists; errors when one exists but is unusable.
    pub fn load(&self) -> Result<Option<LoadedManifest>, ManifestError> {
        let Some(location) = self.locate()? else {
            return Ok(None);
        };
        if location.extension != "jsonc" {
            return Err(ManifestError::UnsupportedFormat {
                path: location.path,
            });
        }
        match read_path(&location.path, Some(&MANIFEST_SCHEMA)) {
            Parsed::Success { data } => Ok(Some(LoadedManifest {
                location,
                document: data,
            })),
            Parsed::NotFound { .. } => Ok(None),
            Parsed::Error {
                message,
                diagnostics,
            } => Err(ManifestError::Parse {
                message,
                diagnostics,
            }),
            Parsed::ValidationFailed { message } => Err(ManifestError::Validation { message }),
        }
    }

    /// Like [`ManifestStore::load`], but a missing manifest is an error.
    pub fn require(&self) -> Result<LoadedManifest, ManifestError> {
        self.load()?.ok_or_else(|| ManifestError::NotFound {
            root: self.root.clone(),
        })
    }

    /// Apply one set/delete to the manifest on disk.
    ///
    /// The whole file is rewritten when the edit changes the document; an edit
    /// that changes nothing leaves the file untouched. Returns whether it
    /// changed.
    pub fn edit_in_place(&self, path: &[&str], value: Option<Value>) -> Result<bool, ManifestError> {
        let draft = self.open_draft()?;
        let edited = draft.edit(path, value)?;
        if edited.document() == draft.document() {
            debug!(path = %path.join("."), "manifest edit is a no-op");
            return Ok(false);
        }
        edited.save()?;
        Ok(true)
    }

    pub fn open_draft(&self) -> Result<Draft, ManifestError> {
        self.require().map(Draft::from)
    }

    /// Create an empty manifest when none exists yet.
    pub fn init(&self) -> Result<ManifestLocation, ManifestError> {
        if let Some(existing) = self.locate()? {
            return Err(ManifestError::AlreadyExists {
                path: existing.path,
            });
        }
        fs::create_dir_all(&self.root).map_err(|err| ManifestError::io(&self.root, err))?;
        let location = ManifestLocation::new(&self.root, MANIFEST_FILE);
        write_atomic(&location.path, "{}\n")?;
        info!(path = %location.path.display(), "manifest created");
        Ok(location)
    }
}

/// Replace `path` with `contents` via a sibling temp file and rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), ManifestError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| ManifestError::io(dir, err))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|err| ManifestError::io(tmp.path(), err))?;
    tmp.as_file()
        .sync_all()
        .map_err(|err| ManifestError::io(tmp.path(), err))?;
    tmp.persist(path)
        .map_err(|err| ManifestError::io(path, err.error))?;
    Ok(())
}
