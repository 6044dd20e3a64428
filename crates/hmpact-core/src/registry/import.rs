use std::collections::HashSet;
use std::fmt;

use hmpact_codec::{Constraints, Schema, ValidationError, Validator};
use hmpact_domain::{Draft, ManifestError, ManifestStore, RegistryEntry, RegistryRule};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ImportError;
use crate::fetch::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Fetching,
    Validating,
    ConflictCheck,
    Applying,
    Summarizing,
    Committed,
    Aborted,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportPhase::Fetching => "fetching",
            ImportPhase::Validating => "validating",
            ImportPhase::ConflictCheck => "conflict-check",
            ImportPhase::Applying => "applying",
            ImportPhase::Summarizing => "summarizing",
            ImportPhase::Committed => "committed",
            ImportPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Shape of a fetched import document:
/// `{"registries": [{"id", "rule": {"format", "header"?}}]}`.
///
/// Rule shape is checked here; rule content (a blank `format`) is checked per
/// entry when it is applied to the draft.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportPayload {
    pub registries: Vec<ImportEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportEntry {
    pub id: String,
    pub rule: RegistryRule,
}

impl Constraints for ImportPayload {
    fn check(&self) -> Result<(), ValidationError> {
        for (index, entry) in self.registries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(ValidationError::at(
                    format!("registries[{index}].id"),
                    "must be a non-empty string",
                ));
            }
        }
        Ok(())
    }
}

const PAYLOAD_SCHEMA: Schema<ImportPayload> = Schema::new("registry import data");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    Empty,
    Complete,
    Partial,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Ids applied to the manifest, in input order.
    pub imported: Vec<String>,
    pub failures: Vec<ImportFailure>,
    /// Ids that already existed in the manifest before the import.
    pub overwritten: Vec<String>,
    pub committed: bool,
}

impl ImportReport {
    #[must_use]
    pub fn outcome(&self) -> ImportOutcome {
        if self.total == 0 {
            ImportOutcome::Empty
        } else if self.failed == 0 {
            ImportOutcome::Complete
        } else {
            ImportOutcome::Partial
        }
    }
}

/// Fetch a registry list from `location` and merge it into the manifest.
///
/// Entries are applied in input order to one draft; an entry that would make
/// the manifest invalid is recorded in the report and skipped. The manifest is
/// written once, and only when at least one entry applied. Duplicate ids in
/// the fetched batch abort the whole import before anything is applied.
pub fn import_registries(
    store: &ManifestStore,
    fetcher: &dyn Fetcher,
    location: &str,
) -> Result<ImportReport, ImportError> {
    info!(phase = %ImportPhase::Fetching, %location, "fetching registries");
    let raw = fetcher.fetch_json(location).map_err(|err| {
        warn!(phase = %ImportPhase::Aborted, %location, error = %err, "fetch failed");
        ImportError::Fetch {
            location: location.to_string(),
            reason: format!("{err:#}"),
        }
    })?;

    debug!(phase = %ImportPhase::Validating, "validating import data");
    let entries = PAYLOAD_SCHEMA
        .validate(&raw)
        .map_err(|err| ImportError::Schema(err.to_string()))?
        .registries;
    if entries.is_empty() {
        info!("no registries found to import");
        return Ok(ImportReport::default());
    }
    let total = entries.len();
    info!(total, "found registries to import");

    debug!(phase = %ImportPhase::ConflictCheck, "checking for duplicate ids");
    let duplicates = duplicate_ids(&entries);
    if !duplicates.is_empty() {
        warn!(phase = %ImportPhase::Aborted, ids = %duplicates.join(", "), "duplicate registry ids");
        return Err(ImportError::Conflict { ids: duplicates });
    }

    let draft = store.open_draft()?;
    let overwritten: Vec<String> = entries
        .iter()
        .filter(|entry| draft.document().has_registry(&entry.id))
        .map(|entry| entry.id.clone())
        .collect();
    if !overwritten.is_empty() {
        warn!(ids = %overwritten.join(", "), "existing registries will be overwritten");
    }

    let (draft, imported, failures) = entries.into_iter().enumerate().fold(
        (draft, Vec::new(), Vec::new()),
        |(draft, mut imported, mut failures), (index, entry)| {
            let position = index + 1;
            debug!(phase = %ImportPhase::Applying, position, total, id = %entry.id, "importing registry");
            match apply_entry(&draft, &entry) {
                Ok(next) => {
                    info!(position, total, id = %entry.id, "registry imported");
                    imported.push(entry.id);
                    (next, imported, failures)
                }
                Err(err) => {
                    warn!(position, total, id = %entry.id, error = %err, "registry import failed");
                    failures.push(ImportFailure {
                        id: entry.id,
                        error: err.to_string(),
                    });
                    (draft, imported, failures)
                }
            }
        },
    );

    let mut report = ImportReport {
        total,
        succeeded: imported.len(),
        failed: failures.len(),
        imported,
        failures,
        overwritten,
        committed: false,
    };
    info!(
        phase = %ImportPhase::Summarizing,
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "import summary"
    );

    if report.succeeded == 0 {
        warn!(phase = %ImportPhase::Aborted, "all registry imports failed");
        return Err(ImportError::AllFailed(Box::new(report)));
    }
    draft.save()?;
    report.committed = true;
    info!(phase = %ImportPhase::Committed, path = %draft.location().path.display(), "registries imported");
    Ok(report)
}

fn apply_entry(draft: &Draft, entry: &ImportEntry) -> Result<Draft, ManifestError> {
    let value = serde_json::to_value(RegistryEntry {
        rule: entry.rule.clone(),
    })
    .map_err(|err| ManifestError::Serialize(err.to_string()))?;
    draft.edit(&["registries", entry.id.as_str()], Some(value))
}

/// Ids seen more than once, each reported once, in the order they repeat.
fn duplicate_ids(entries: &[ImportEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for entry in entries {
        if !seen.insert(entry.id.as_str()) && !duplicates.contains(&entry.id) {
            duplicates.push(entry.id.clone());
        }
    }
    duplicates
}
