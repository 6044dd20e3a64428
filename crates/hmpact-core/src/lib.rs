//! Command layer of the hmpact CLI: configuration, registry import and
//! management, cache commands, and the `ExecutionOutcome` envelope they share.

#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value
)]

mod commands;
mod config;
mod context;
mod fetch;
mod outcome;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use commands::cache::{
    cache_clear, cache_get, cache_has, cache_list, cache_path, cache_put, cache_stats,
    CacheClearRequest, CacheGetRequest, CacheHasRequest, CacheListRequest, CachePathRequest,
    CachePutRequest, CacheStatsRequest,
};
pub use commands::init::{project_init, InitRequest};
pub use commands::registry::{
    registry_add, registry_import, registry_list, registry_remove, RegistryAddRequest,
    RegistryImportRequest, RegistryListRequest, RegistryRemoveRequest,
};
pub use commands::{cache_error_outcome, manifest_error_outcome};
pub use config::{CacheConfig, Config, NetworkConfig, HTTP_TIMEOUT_ENV, ONLINE_ENV};
pub use context::{CommandContext, CommandGroup, CommandInfo};
pub use fetch::{Fetcher, HttpFetcher};
pub use outcome::{format_status_message, to_json_response, CommandStatus, ExecutionOutcome};
