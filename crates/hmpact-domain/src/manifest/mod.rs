//! The `hmpact.jsonc` manifest: typed document, path patches, and the
//! store that loads, edits and commits it.

mod document;
mod draft;
mod error;
mod patch;
mod store;

pub use document::{ManifestDocument, RegistryEntry, RegistryRule, MANIFEST_SCHEMA};
pub use draft::Draft;
pub use error::ManifestError;
pub use patch::apply_patch;
pub use store::{LoadedManifest, ManifestLocation, ManifestStore, MANIFEST_CANDIDATES, MANIFEST_FILE};
