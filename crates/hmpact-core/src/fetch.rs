use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use hmpact_codec::{parse_labeled, AnyValue};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::NetworkConfig;

const USER_AGENT: &str = concat!("hmpact/", env!("CARGO_PKG_VERSION"));

/// Retrieves a JSON document for the import job.
pub trait Fetcher {
    /// # Errors
    /// Returns an error when the source is unreachable or is not JSON.
    fn fetch_json(&self, location: &str) -> Result<Value>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl Source {
    pub(crate) fn classify(location: &str) -> Result<Self> {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Remote(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Self::Local)
                .map_err(|()| anyhow!("'{location}' is not a usable file URL")),
            // drive letters such as `C:\registries.json` parse as a one-letter scheme
            Ok(url) if url.scheme().len() == 1 => Ok(Self::Local(PathBuf::from(location))),
            Ok(url) => bail!("unsupported URL scheme '{}' in {location}", url.scheme()),
            Err(_) => Ok(Self::Local(PathBuf::from(location))),
        }
    }
}

/// Fetches over HTTP(S) with blocking `reqwest`; local files go through the codec.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    online: bool,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            timeout: network.http_timeout,
            online: network.online,
        }
    }

    fn client(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()
            .context("failed to build http client")
    }

    fn fetch_remote(&self, url: &Url) -> Result<Value> {
        if !self.online {
            bail!("HMPACT_ONLINE is disabled; refusing to fetch {url}");
        }
        debug!(%url, timeout_secs = self.timeout.as_secs(), "fetching");
        self.client()?
            .get(url.clone())
            .send()
            .with_context(|| format!("failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("unexpected response for {url}"))?
            .json::<Value>()
            .with_context(|| format!("response from {url} is not valid JSON"))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_json(&self, location: &str) -> Result<Value> {
        match Source::classify(location)? {
            Source::Remote(url) => self.fetch_remote(&url),
            Source::Local(path) => read_local(&path),
        }
    }
}

fn read_local(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "reading local import source");
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let label = path.display().to_string();
    parse_labeled(&raw, &label, Some(&AnyValue))
        .into_result()
        .map_err(anyhow::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn offline() -> HttpFetcher {
        HttpFetcher::new(&NetworkConfig {
            online: false,
            http_timeout: Duration::from_secs(1),
        })
    }

    #[test]
    fn classifies_sources() {
        assert!(matches!(
            Source::classify("https://example.com/registries.json").unwrap(),
            Source::Remote(_)
        ));
        assert_eq!(
            Source::classify("fixtures/registries.json").unwrap(),
            Source::Local(PathBuf::from("fixtures/registries.json"))
        );
        assert!(Source::classify("ftp://example.com/r.json").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn file_urls_become_paths() {
        assert_eq!(
            Source::classify("file:///tmp/registries.json").unwrap(),
            Source::Local(PathBuf::from("/tmp/registries.json"))
        );
    }

    #[test]
    fn local_files_accept_comments() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("registries.jsonc");
        fs::write(&path, "// shared\n{\"registries\": [],}\n")?;
        let value = offline().fetch_json(&path.display().to_string())?;
        assert_eq!(value, serde_json::json!({"registries": []}));
        Ok(())
    }

    #[test]
    fn offline_mode_refuses_remote_sources() {
        let err = offline()
            .fetch_json("https://example.com/registries.json")
            .unwrap_err();
        assert!(err.to_string().contains("HMPACT_ONLINE"), "{err}");
    }

    #[test]
    fn missing_and_malformed_files_fail() -> Result<()> {
        let temp = tempdir()?;
        assert!(offline()
            .fetch_json(&temp.path().join("absent.json").display().to_string())
            .is_err());
        let path = temp.path().join("broken.json");
        fs::write(&path, "{\"registries\": [")?;
        assert!(offline().fetch_json(&path.display().to_string()).is_err());
        Ok(())
    }
}
