#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::assert::Assert;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn stdout(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout")
}

/// `hmpact` rooted at `root`, with its cache isolated under `root/cache`.
pub fn hmpact(root: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("hmpact");
    cmd.current_dir(root)
        .env("HMPACT_CACHE_PATH", root.join("cache"))
        .env_remove("HMPACT_MANIFEST_DIR")
        .env_remove("HMPACT_ONLINE")
        .env("NO_COLOR", "1");
    cmd
}

pub fn write_fixture(root: &Path, name: &str, contents: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}
