use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use super::cache_error_outcome;
use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug, Default)]
pub struct CachePathRequest;

#[derive(Clone, Debug, Default)]
pub struct CacheListRequest;

#[derive(Clone, Debug, Default)]
pub struct CacheStatsRequest;

#[derive(Clone, Debug, Default)]
pub struct CacheClearRequest;

#[derive(Clone, Debug)]
pub struct CacheHasRequest {
    pub key: String,
}

#[derive(Clone, Debug)]
pub struct CacheGetRequest {
    pub key: String,
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct CachePutRequest {
    pub key: String,
    pub file: PathBuf,
}

pub fn cache_path(ctx: &CommandContext, _request: CachePathRequest) -> Result<ExecutionOutcome> {
    let cache = ctx.cache();
    fs::create_dir_all(&cache.path).context("unable to create cache directory")?;
    let canonical = fs::canonicalize(&cache.path).unwrap_or_else(|_| cache.path.clone());
    let path_str = canonical.display().to_string();
    Ok(ExecutionOutcome::success(
        format!("cache directory: {path_str}"),
        json!({
            "status": "path",
            "cache_path": path_str,
            "path": path_str,
            "source": cache.source,
        }),
    ))
}

pub fn cache_list(ctx: &CommandContext, _request: CacheListRequest) -> Result<ExecutionOutcome> {
    let store = ctx.cache_store();
    let entries = match store.list() {
        Ok(entries) => entries,
        Err(err) => return Ok(cache_error_outcome(&err)),
    };
    Ok(ExecutionOutcome::success(
        format!("{} cached entries", entries.len()),
        json!({
            "status": "list",
            "cache_path": store.root().display().to_string(),
            "entries": entries,
        }),
    ))
}

pub fn cache_stats(ctx: &CommandContext, _request: CacheStatsRequest) -> Result<ExecutionOutcome> {
    let store = ctx.cache_store();
    let usage = match store.usage() {
        Ok(usage) => usage,
        Err(err) => return Ok(cache_error_outcome(&err)),
    };
    let message = if usage.exists {
        format!("stats: {} entries, {} bytes", usage.entries, usage.total_bytes)
    } else {
        format!("cache path {} not found", store.root().display())
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "status": "stats",
            "cache_path": store.root().display().to_string(),
            "cache_exists": usage.exists,
            "total_entries": usage.entries,
            "content_files": usage.content_files,
            "total_size_bytes": usage.total_bytes,
        }),
    ))
}

pub fn cache_clear(ctx: &CommandContext, _request: CacheClearRequest) -> Result<ExecutionOutcome> {
    let store = ctx.cache_store();
    let before = match store.usage() {
        Ok(usage) => usage,
        Err(err) => return Ok(cache_error_outcome(&err)),
    };
    if let Err(err) = store.clear() {
        return Ok(cache_error_outcome(&err));
    }
    Ok(ExecutionOutcome::success(
        format!("removed {} entries", before.entries),
        json!({
            "status": "cleared",
            "cache_path": store.root().display().to_string(),
            "removed_entries": before.entries,
            "freed_bytes": before.total_bytes,
        }),
    ))
}

pub fn cache_has(ctx: &CommandContext, request: CacheHasRequest) -> Result<ExecutionOutcome> {
    match ctx.cache_store().has(&request.key) {
        Ok(present) => Ok(ExecutionOutcome::success(
            if present {
                format!("{} is cached", request.key)
            } else {
                format!("{} is not cached", request.key)
            },
            json!({"status": "has", "key": request.key, "present": present}),
        )),
        Err(err) => Ok(cache_error_outcome(&err)),
    }
}

pub fn cache_get(ctx: &CommandContext, request: CacheGetRequest) -> Result<ExecutionOutcome> {
    let blob = match ctx.cache_store().get(&request.key) {
        Ok(blob) => blob,
        Err(err) => return Ok(cache_error_outcome(&err)),
    };
    let mut details = json!({
        "status": "get",
        "key": blob.key,
        "integrity": blob.integrity,
        "size": blob.size,
        "time": blob.time,
    });
    if let Some(output) = &request.output {
        fs::write(output, &blob.data)
            .with_context(|| format!("failed to write {}", output.display()))?;
        details["output"] = json!(output.display().to_string());
        return Ok(ExecutionOutcome::success(
            format!("wrote {} bytes to {}", blob.size, output.display()),
            details,
        ));
    }
    match String::from_utf8(blob.data) {
        Ok(text) => {
            details["passthrough"] = json!(true);
            details["text"] = json!(text);
            Ok(ExecutionOutcome::success(text, details))
        }
        Err(_) => {
            details["reason"] = json!("binary_entry");
            details["hint"] = json!("Pass --output <FILE> to write binary entries to disk.");
            Ok(ExecutionOutcome::user_error(
                format!("{} is not UTF-8 text", request.key),
                details,
            ))
        }
    }
}

pub fn cache_put(ctx: &CommandContext, request: CachePutRequest) -> Result<ExecutionOutcome> {
    let data = match fs::read(&request.file) {
        Ok(data) => data,
        Err(err) => {
            return Ok(ExecutionOutcome::user_error(
                format!("cannot read {}: {err}", request.file.display()),
                json!({
                    "reason": "unreadable_input",
                    "path": request.file.display().to_string(),
                }),
            ))
        }
    };
    match ctx.cache_store().put(&request.key, &data) {
        Ok(integrity) => Ok(ExecutionOutcome::success(
            format!("cached {} ({} bytes)", request.key, data.len()),
            json!({
                "status": "put",
                "key": request.key,
                "integrity": integrity,
                "size": data.len(),
            }),
        )),
        Err(err) => Ok(cache_error_outcome(&err)),
    }
}
