//! Registry entries of the manifest: bulk import plus single add/remove.

mod error;
mod import;
mod manage;

pub use error::ImportError;
pub use import::{
    import_registries, ImportEntry, ImportFailure, ImportOutcome, ImportPayload, ImportPhase,
    ImportReport,
};
pub use manage::{add_registry, default_format, list_registries, remove_registry, AddedRegistry};
