#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod manifest;

pub use manifest::{
    apply_patch, Draft, LoadedManifest, ManifestDocument, ManifestError, ManifestLocation,
    ManifestStore, RegistryEntry, RegistryRule, MANIFEST_CANDIDATES, MANIFEST_FILE, MANIFEST_SCHEMA,
};
