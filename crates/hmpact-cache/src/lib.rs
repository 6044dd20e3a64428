//! Content-addressed cache of opaque blobs for the hmpact CLI.

#![deny(clippy::all)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod error;
mod integrity;
mod location;
mod store;

pub use error::CacheError;
pub use integrity::Integrity;
pub use location::{resolve_cache_root, resolve_cache_root_with, CacheLocation, CACHE_PATH_ENV};
pub use store::{CacheEntryInfo, CacheStore, CacheUsage, CachedBlob};
