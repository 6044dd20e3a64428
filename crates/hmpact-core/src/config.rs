use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::time::Duration;

use anyhow::{bail, Result};
use hmpact_cache::{resolve_cache_root_with, CacheLocation};

pub const HTTP_TIMEOUT_ENV: &str = "HMPACT_HTTP_TIMEOUT_SECS";
pub const ONLINE_ENV: &str = "HMPACT_ONLINE";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug)]
pub struct Config {
    pub(crate) cache: CacheConfig,
    pub(crate) network: NetworkConfig,
}

impl Config {
    /// Builds a configuration snapshot from the current process environment.
    ///
    /// # Errors
    /// Returns an error if the cache root cannot be resolved or a setting is malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        let store = resolve_cache_root_with(
            &|key| snapshot.var(key).map(OsString::from),
            dirs_next::home_dir(),
        )?;
        Ok(Self {
            cache: CacheConfig { store },
            network: NetworkConfig {
                online: match snapshot.var(ONLINE_ENV) {
                    Some(value) => {
                        let lowered = value.to_ascii_lowercase();
                        !matches!(lowered.as_str(), "0" | "false" | "no" | "off" | "")
                    }
                    None => true,
                },
                http_timeout: match snapshot.var(HTTP_TIMEOUT_ENV) {
                    Some(raw) => match raw.trim().parse::<u64>() {
                        Ok(secs) if secs > 0 => Duration::from_secs(secs),
                        _ => bail!("{HTTP_TIMEOUT_ENV} must be a positive number of seconds (got '{raw}')"),
                    },
                    None => DEFAULT_HTTP_TIMEOUT,
                },
            },
        })
    }

    #[must_use]
    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }

    #[must_use]
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

#[derive(Debug)]
pub struct CacheConfig {
    pub store: CacheLocation,
}

#[derive(Debug, Clone, Copy)]
pub struct NetworkConfig {
    pub online: bool,
    pub http_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use hmpact_cache::CACHE_PATH_ENV;
    use serial_test::serial;

    use super::*;

    #[test]
    fn online_handles_common_falsey_values() {
        for value in ["no", "off", "0", "", "FALSE"] {
            let snapshot = EnvSnapshot::testing(&[(ONLINE_ENV, value), (CACHE_PATH_ENV, "/tmp/c")]);
            let config = Config::from_snapshot(&snapshot).unwrap();
            assert!(!config.network().online, "{value:?} should disable network");
        }
        let snapshot = EnvSnapshot::testing(&[(CACHE_PATH_ENV, "/tmp/c")]);
        assert!(Config::from_snapshot(&snapshot).unwrap().network().online);
    }

    #[test]
    fn http_timeout_defaults_and_overrides() {
        let snapshot = EnvSnapshot::testing(&[(CACHE_PATH_ENV, "/tmp/c")]);
        let config = Config::from_snapshot(&snapshot).unwrap();
        assert_eq!(config.network().http_timeout, Duration::from_secs(60));

        let snapshot = EnvSnapshot::testing(&[(CACHE_PATH_ENV, "/tmp/c"), (HTTP_TIMEOUT_ENV, "5")]);
        let config = Config::from_snapshot(&snapshot).unwrap();
        assert_eq!(config.network().http_timeout, Duration::from_secs(5));

        let snapshot = EnvSnapshot::testing(&[(CACHE_PATH_ENV, "/tmp/c"), (HTTP_TIMEOUT_ENV, "soon")]);
        assert!(Config::from_snapshot(&snapshot).is_err());
    }

    #[test]
    fn cache_override_is_recorded_with_its_source() {
        let snapshot = EnvSnapshot::testing(&[(CACHE_PATH_ENV, "/srv/hmpact-cache")]);
        let config = Config::from_snapshot(&snapshot).unwrap();
        assert_eq!(config.cache().store.path, Path::new("/srv/hmpact-cache"));
        assert_eq!(config.cache().store.source, CACHE_PATH_ENV);

        let snapshot = EnvSnapshot::testing(&[(CACHE_PATH_ENV, "")]);
        let config = Config::from_snapshot(&snapshot).unwrap();
        assert_ne!(config.cache().store.source, CACHE_PATH_ENV);
    }

    #[test]
    #[cfg(all(unix, not(target_os = "macos")))]
    fn cache_root_falls_back_to_the_snapshot_xdg_dir() {
        let snapshot = EnvSnapshot::testing(&[("XDG_CACHE_HOME", "/xdg")]);
        let config = Config::from_snapshot(&snapshot).unwrap();
        assert_eq!(config.cache().store.path, Path::new("/xdg/hmpact"));
        assert_eq!(config.cache().store.source, "XDG_CACHE_HOME/hmpact");
    }

    #[test]
    #[serial]
    fn from_env_reads_the_process_environment() {
        let previous = env::var_os(HTTP_TIMEOUT_ENV);
        env::set_var(HTTP_TIMEOUT_ENV, "7");
        let config = Config::from_env();
        match previous {
            Some(value) => env::set_var(HTTP_TIMEOUT_ENV, value),
            None => env::remove_var(HTTP_TIMEOUT_ENV),
        }
        assert_eq!(config.unwrap().network().http_timeout, Duration::from_secs(7));
    }
}
