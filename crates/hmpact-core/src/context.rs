use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use hmpact_cache::{CacheLocation, CacheStore};
use hmpact_domain::ManifestStore;

use crate::config::Config;
use crate::fetch::{Fetcher, HttpFetcher};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandGroup {
    Init,
    Registry,
    Cache,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandGroup::Init => "init",
            CommandGroup::Registry => "registry",
            CommandGroup::Cache => "cache",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext {
    config: Config,
    manifest_root: PathBuf,
    fetcher: Box<dyn Fetcher>,
}

impl CommandContext {
    /// Creates a command context rooted at `manifest_root`.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be prepared.
    pub fn new(manifest_root: impl Into<PathBuf>) -> Result<Self> {
        let config = Config::from_env()?;
        let fetcher = HttpFetcher::new(config.network());
        Ok(Self::from_parts(config, manifest_root.into(), Box::new(fetcher)))
    }

    pub(crate) fn from_parts(
        config: Config,
        manifest_root: PathBuf,
        fetcher: Box<dyn Fetcher>,
    ) -> Self {
        Self {
            config,
            manifest_root,
            fetcher,
        }
    }

    pub fn cache(&self) -> &CacheLocation {
        &self.config.cache().store
    }

    pub fn cache_store(&self) -> CacheStore {
        CacheStore::with_location(self.cache().clone())
    }

    pub fn manifest_root(&self) -> &Path {
        &self.manifest_root
    }

    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::new(self.manifest_root.clone())
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }
}
