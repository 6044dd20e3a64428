//! Content-addressed blob storage keyed by caller-chosen strings.
//!
//! Layout under the root:
//!
//! ```text
//! content-v1/sha256/<aa>/<hex>        blob bytes, named by their digest
//! index-v1/<aa>/<sha256(key)>.json    key -> integrity, size, time
//! tmp/                                staging area for atomic writes
//! ```
//!
//! Every file is written to a uniquely named temp file, flushed, and renamed
//! into place. The index entry is only written after its content exists, so
//! an entry that is visible always points at complete bytes.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Result as AnyResult;
use hmpact_codec::{parse_labeled, serialize, Formatting, Parsed, Validator};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempfile::NamedTempFile;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::integrity::{key_digest, Integrity};
use crate::location::{resolve_cache_root, CacheLocation};
use crate::CacheError;

const CONTENT_DIR: &str = "content-v1";
const INDEX_DIR: &str = "index-v1";
const TMP_DIR: &str = "tmp";

/// Listing row for one cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryInfo {
    pub key: String,
    pub integrity: Integrity,
    pub size: u64,
    /// RFC 3339 write time.
    pub time: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedBlob {
    pub key: String,
    pub data: Vec<u8>,
    pub integrity: Integrity,
    pub size: u64,
    pub time: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheUsage {
    pub exists: bool,
    pub entries: u64,
    pub content_files: u64,
    pub total_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct CacheStore {
    location: CacheLocation,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            location: CacheLocation {
                path: root.into(),
                source: "explicit",
            },
        }
    }

    #[must_use]
    pub fn with_location(location: CacheLocation) -> Self {
        Self { location }
    }

    /// Open the store at the per-OS default root (or `HMPACT_CACHE_PATH`).
    ///
    /// # Errors
    ///
    /// Returns an error when the root cannot be resolved.
    pub fn open_default() -> AnyResult<Self> {
        Ok(Self {
            location: resolve_cache_root()?,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.location.path
    }

    #[must_use]
    pub fn location(&self) -> &CacheLocation {
        &self.location
    }

    /// Store `data` under `key` and return its integrity token.
    pub fn put(&self, key: &str, data: &[u8]) -> Result<Integrity, CacheError> {
        let integrity = Integrity::of(data);
        let size = data.len() as u64;
        let content = self.content_path(&integrity);
        let reusable = fs::read(&content).is_ok_and(|existing| integrity.matches(&existing));
        if reusable {
            debug!(key, %integrity, "cache content already present");
        } else {
            self.write_atomic(&content, data)?;
        }

        let entry = CacheEntryInfo {
            key: key.to_string(),
            integrity,
            size,
            time: now_rfc3339()?,
        };
        let encoded =
            serde_json::to_vec(&entry).map_err(|err| CacheError::Encode(err.to_string()))?;
        self.write_atomic(&self.index_path(key), &encoded)?;
        debug!(key, %integrity, size, "cache entry written");
        Ok(integrity)
    }

    /// Read the bytes stored under `key`, verifying them first.
    pub fn get(&self, key: &str) -> Result<CachedBlob, CacheError> {
        let entry = self.read_entry(key)?.ok_or_else(|| CacheError::NotFound {
            key: key.to_string(),
        })?;
        let content = self.content_path(&entry.integrity);
        let data = match fs::read(&content) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(CacheError::Corrupt {
                    key: key.to_string(),
                    reason: format!("content {} is missing", content.display()),
                })
            }
            Err(err) => return Err(CacheError::io(content, err)),
        };
        if data.len() as u64 != entry.size {
            return Err(CacheError::Corrupt {
                key: key.to_string(),
                reason: format!("size mismatch (expected {}, found {})", entry.size, data.len()),
            });
        }
        if !entry.integrity.matches(&data) {
            return Err(CacheError::Corrupt {
                key: key.to_string(),
                reason: format!("digest mismatch (expected {})", entry.integrity),
            });
        }
        Ok(CachedBlob {
            key: entry.key,
            data,
            integrity: entry.integrity,
            size: entry.size,
            time: entry.time,
        })
    }

    /// True when `key` has an index entry whose content is on disk.
    pub fn has(&self, key: &str) -> Result<bool, CacheError> {
        match self.read_entry(key)? {
            Some(entry) => Ok(self.content_path(&entry.integrity).is_file()),
            None => Ok(false),
        }
    }

    /// Every entry in the store, sorted by key.
    pub fn list(&self) -> Result<Vec<CacheEntryInfo>, CacheError> {
        let index_root = self.root().join(INDEX_DIR);
        if !index_root.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for item in WalkDir::new(&index_root).min_depth(2).max_depth(2) {
            let item = item.map_err(|err| {
                let path = err.path().map_or_else(|| index_root.clone(), Path::to_path_buf);
                CacheError::io(path, err.into())
            })?;
            if !item.file_type().is_file() {
                continue;
            }
            let path = item.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_entry_file(path) {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!(path = %path.display(), %err, "skipping unreadable cache index entry"),
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Remove the whole store. A missing root is already clear.
    pub fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_dir_all(self.root()) {
            Ok(()) => {
                debug!(root = %self.root().display(), "cache cleared");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CacheError::io(self.root(), err)),
        }
    }

    /// Aggregate entry count and on-disk content size.
    pub fn usage(&self) -> Result<CacheUsage, CacheError> {
        let root = self.root();
        if !root.is_dir() {
            return Ok(CacheUsage::default());
        }
        let mut usage = CacheUsage {
            exists: true,
            entries: self.list()?.len() as u64,
            ..CacheUsage::default()
        };
        let content_root = root.join(CONTENT_DIR);
        if content_root.is_dir() {
            for item in WalkDir::new(&content_root) {
                let item = item.map_err(|err| CacheError::io(&content_root, err.into()))?;
                if item.file_type().is_file() {
                    let meta = item
                        .metadata()
                        .map_err(|err| CacheError::io(item.path(), err.into()))?;
                    usage.content_files += 1;
                    usage.total_bytes += meta.len();
                }
            }
        }
        Ok(usage)
    }

    /// Serialize `value` as JSON and store it under `key`.
    pub fn put_json<T>(&self, key: &str, value: &T) -> Result<Integrity, CacheError>
    where
        T: Serialize + ?Sized,
    {
        let text = serialize(value, Formatting::default())
            .map_err(|err| CacheError::Encode(err.to_string()))?;
        self.put(key, text.as_bytes())
    }

    /// Read `key` back as a document and validate it. Never fails outright:
    /// every outcome is a [`Parsed`] variant.
    pub fn get_validated<T>(&self, key: &str, validator: Option<&dyn Validator<T>>) -> Parsed<T>
    where
        T: DeserializeOwned,
    {
        let blob = match self.get(key) {
            Ok(blob) => blob,
            Err(CacheError::NotFound { .. }) => {
                return Parsed::NotFound {
                    message: format!("cache entry '{key}' not found"),
                }
            }
            Err(err) => {
                return Parsed::Error {
                    message: err.to_string(),
                    diagnostics: Vec::new(),
                }
            }
        };
        match String::from_utf8(blob.data) {
            Ok(text) => parse_labeled(&text, &format!("cache entry '{key}'"), validator),
            Err(err) => Parsed::Error {
                message: format!("cache entry '{key}' is not UTF-8: {err}"),
                diagnostics: Vec::new(),
            },
        }
    }

    fn content_path(&self, integrity: &Integrity) -> PathBuf {
        let hex = integrity.hex();
        self.root()
            .join(CONTENT_DIR)
            .join("sha256")
            .join(&hex[..2])
            .join(hex)
    }

    fn index_path(&self, key: &str) -> PathBuf {
        let digest = key_digest(key);
        self.root()
            .join(INDEX_DIR)
            .join(&digest[..2])
            .join(format!("{digest}.json"))
    }

    fn read_entry(&self, key: &str) -> Result<Option<CacheEntryInfo>, CacheError> {
        let path = self.index_path(key);
        match read_entry_file(&path) {
            Ok(entry) if entry.key == key => Ok(Some(entry)),
            Ok(_) => Ok(None),
            Err(CacheError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(CacheError::Corrupt { reason, .. }) => Err(CacheError::Corrupt {
                key: key.to_string(),
                reason,
            }),
            Err(err) => Err(err),
        }
    }

    fn write_atomic(&self, dest: &Path, bytes: &[u8]) -> Result<(), CacheError> {
        let parent = dest.parent().unwrap_or_else(|| self.root());
        fs::create_dir_all(parent).map_err(|err| CacheError::io(parent, err))?;
        let tmp_dir = self.root().join(TMP_DIR);
        fs::create_dir_all(&tmp_dir).map_err(|err| CacheError::io(&tmp_dir, err))?;

        let mut tmp = NamedTempFile::new_in(&tmp_dir).map_err(|err| CacheError::io(&tmp_dir, err))?;
        tmp.write_all(bytes)
            .map_err(|err| CacheError::io(tmp.path(), err))?;
        tmp.as_file()
            .sync_all()
            .map_err(|err| CacheError::io(tmp.path(), err))?;
        tmp.persist(dest)
            .map_err(|err| CacheError::io(dest, err.error))?;
        fsync_dir(parent).ok();
        Ok(())
    }
}

fn read_entry_file(path: &Path) -> Result<CacheEntryInfo, CacheError> {
    let raw = fs::read(path).map_err(|err| CacheError::io(path, err))?;
    serde_json::from_slice(&raw).map_err(|err| CacheError::Corrupt {
        key: path.display().to_string(),
        reason: format!("index entry is unreadable: {err}"),
    })
}

fn now_rfc3339() -> Result<String, CacheError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| CacheError::Encode(err.to_string()))
}

fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    let file = File::open(dir)?;
    file.sync_all()
}

#[cfg(test)]
mod tests;
