use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dirs_next::home_dir;

pub const CACHE_PATH_ENV: &str = "HMPACT_CACHE_PATH";
const NAMESPACE: &str = "hmpact";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLocation {
    pub path: PathBuf,
    pub source: &'static str,
}

/// Determine the root directory for the on-disk cache.
///
/// # Errors
///
/// Returns an error if a relative override cannot be absolutized.
pub fn resolve_cache_root() -> Result<CacheLocation> {
    resolve_cache_root_with(&|key| env::var_os(key), home_dir())
}

/// Resolve the cache root from an arbitrary variable lookup and home
/// directory instead of the live process.
///
/// # Errors
///
/// Returns an error if a relative override cannot be absolutized.
pub fn resolve_cache_root_with(
    lookup: &dyn Fn(&str) -> Option<OsString>,
    home: Option<PathBuf>,
) -> Result<CacheLocation> {
    if let Some(override_path) = lookup(CACHE_PATH_ENV).filter(|value| !value.is_empty()) {
        let path = absolutize(PathBuf::from(override_path))?;
        return Ok(CacheLocation {
            path,
            source: CACHE_PATH_ENV,
        });
    }

    #[cfg(target_os = "windows")]
    let (path, source) = windows_cache_base(lookup, home);
    #[cfg(target_os = "macos")]
    let (path, source) = macos_cache_base(home);
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let (path, source) = unix_cache_base(lookup, home);

    Ok(CacheLocation { path, source })
}

#[cfg_attr(
    any(target_os = "windows", target_os = "macos"),
    allow(dead_code)
)]
fn unix_cache_base(
    lookup: &dyn Fn(&str) -> Option<OsString>,
    home: Option<PathBuf>,
) -> (PathBuf, &'static str) {
    if let Some(xdg) = lookup("XDG_CACHE_HOME").filter(|value| !value.is_empty()) {
        return (PathBuf::from(xdg).join(NAMESPACE), "XDG_CACHE_HOME/hmpact");
    }
    if let Some(home) = home {
        return (home.join(".cache").join(NAMESPACE), "HOME/.cache/hmpact");
    }
    (PathBuf::from("/tmp/hmpact"), "default (/tmp/hmpact)")
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn macos_cache_base(home: Option<PathBuf>) -> (PathBuf, &'static str) {
    if let Some(home) = home {
        return (
            home.join("Library").join("Caches").join(NAMESPACE),
            "HOME/Library/Caches/hmpact",
        );
    }
    (PathBuf::from("/tmp/hmpact"), "default (/tmp/hmpact)")
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn windows_cache_base(
    lookup: &dyn Fn(&str) -> Option<OsString>,
    home: Option<PathBuf>,
) -> (PathBuf, &'static str) {
    if let Some(local_app_data) = lookup("LOCALAPPDATA").filter(|value| !value.is_empty()) {
        return (
            PathBuf::from(local_app_data).join(NAMESPACE).join("cache"),
            "LOCALAPPDATA/hmpact/cache",
        );
    }
    if let Some(home) = home {
        return (
            home.join("AppData")
                .join("Local")
                .join(NAMESPACE)
                .join("cache"),
            "HOME/AppData/Local/hmpact/cache",
        );
    }
    (PathBuf::from("C:\\hmpact\\cache"), "default (C:\\hmpact\\cache)")
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()
            .context("failed to resolve HMPACT_CACHE_PATH")?
            .join(path))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;

    use serial_test::serial;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(*v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn override_wins_and_is_absolutized() -> Result<()> {
        let lookup = vars(&[(CACHE_PATH_ENV, "relative/cache")]);
        let location = resolve_cache_root_with(&lookup, Some(PathBuf::from("/home/u")))?;
        assert_eq!(location.source, CACHE_PATH_ENV);
        assert!(location.path.is_absolute());
        assert!(location.path.ends_with("relative/cache"));
        Ok(())
    }

    #[test]
    fn empty_override_is_ignored() -> Result<()> {
        let lookup = vars(&[(CACHE_PATH_ENV, "")]);
        let location = resolve_cache_root_with(&lookup, Some(PathBuf::from("/home/u")))?;
        assert_ne!(location.source, CACHE_PATH_ENV);
        Ok(())
    }

    #[test]
    fn unix_prefers_xdg_then_home() {
        let home = Some(PathBuf::from("/home/u"));
        let (path, source) = unix_cache_base(&vars(&[("XDG_CACHE_HOME", "/xdg")]), home.clone());
        assert_eq!(path, Path::new("/xdg/hmpact"));
        assert_eq!(source, "XDG_CACHE_HOME/hmpact");

        let (path, _) = unix_cache_base(&vars(&[]), home);
        assert_eq!(path, Path::new("/home/u/.cache/hmpact"));

        let (path, _) = unix_cache_base(&vars(&[]), None);
        assert_eq!(path, Path::new("/tmp/hmpact"));
    }

    #[test]
    fn macos_uses_library_caches() {
        let (path, _) = macos_cache_base(Some(PathBuf::from("/Users/u")));
        assert_eq!(path, Path::new("/Users/u/Library/Caches/hmpact"));
    }

    #[test]
    fn windows_prefers_local_app_data() {
        let (path, source) = windows_cache_base(&vars(&[("LOCALAPPDATA", "/lad")]), None);
        assert_eq!(path, Path::new("/lad/hmpact/cache"));
        assert_eq!(source, "LOCALAPPDATA/hmpact/cache");

        let (path, _) = windows_cache_base(&vars(&[]), Some(PathBuf::from("/home/u")));
        assert_eq!(path, Path::new("/home/u/AppData/Local/hmpact/cache"));
    }

    #[test]
    #[serial]
    fn process_env_override_is_honored() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let previous = env::var_os(CACHE_PATH_ENV);
        env::set_var(CACHE_PATH_ENV, temp.path());
        let resolved = resolve_cache_root();
        match previous {
            Some(value) => env::set_var(CACHE_PATH_ENV, value),
            None => env::remove_var(CACHE_PATH_ENV),
        }
        assert_eq!(resolved?.path, temp.path());
        Ok(())
    }
}
