use std::path::Path;

use anyhow::Result;
use hmpact_cache::CACHE_PATH_ENV;
use serde_json::{json, Value};

use crate::config::{Config, EnvSnapshot};
use crate::fetch::Fetcher;
use crate::CommandContext;

pub(crate) struct StaticFetcher(Value);

impl StaticFetcher {
    pub(crate) fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub(crate) fn empty() -> Self {
        Self(json!({"registries": []}))
    }
}

impl Fetcher for StaticFetcher {
    fn fetch_json(&self, _location: &str) -> Result<Value> {
        Ok(self.0.clone())
    }
}

/// Context whose manifest root is `root` and whose cache lives in `root/cache`.
pub(crate) fn context_in(root: &Path) -> CommandContext {
    context_with_fetcher(root, StaticFetcher::empty())
}

pub(crate) fn context_with_fetcher(root: &Path, fetcher: impl Fetcher + 'static) -> CommandContext {
    let cache = root.join("cache").display().to_string();
    let snapshot = EnvSnapshot::testing(&[(CACHE_PATH_ENV, cache.as_str())]);
    let config = Config::from_snapshot(&snapshot).expect("test config");
    CommandContext::from_parts(config, root.to_path_buf(), Box::new(fetcher))
}
