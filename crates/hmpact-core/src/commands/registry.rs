use anyhow::Result;
use serde_json::{json, Value};

use super::manifest_error_outcome;
use crate::registry::{
    add_registry, import_registries, list_registries, remove_registry, ImportError, ImportOutcome,
    ImportReport,
};
use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug)]
pub struct RegistryAddRequest {
    pub domain: String,
    pub id: Option<String>,
    pub format: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RegistryRemoveRequest {
    pub id: String,
}

#[derive(Clone, Debug, Default)]
pub struct RegistryListRequest;

#[derive(Clone, Debug)]
pub struct RegistryImportRequest {
    pub location: String,
}

pub fn registry_add(ctx: &CommandContext, request: RegistryAddRequest) -> Result<ExecutionOutcome> {
    let store = ctx.manifest_store();
    match add_registry(
        &store,
        &request.domain,
        request.id.as_deref(),
        request.format.as_deref(),
    ) {
        Ok(added) => {
            let message = if added.changed {
                format!("registry {} added", added.id)
            } else {
                format!("registry {} already up to date", added.id)
            };
            Ok(ExecutionOutcome::success(
                message,
                json!({
                    "status": if added.changed { "added" } else { "unchanged" },
                    "id": added.id,
                    "format": added.format,
                }),
            ))
        }
        Err(err) => Ok(manifest_error_outcome(&err)),
    }
}

pub fn registry_remove(
    ctx: &CommandContext,
    request: RegistryRemoveRequest,
) -> Result<ExecutionOutcome> {
    let store = ctx.manifest_store();
    match remove_registry(&store, &request.id) {
        Ok(true) => Ok(ExecutionOutcome::success(
            format!("registry {} removed", request.id),
            json!({"status": "removed", "id": request.id}),
        )),
        Ok(false) => Ok(ExecutionOutcome::success(
            format!("registry {} was not configured", request.id),
            json!({"status": "absent", "id": request.id}),
        )),
        Err(err) => Ok(manifest_error_outcome(&err)),
    }
}

pub fn registry_list(ctx: &CommandContext, _request: RegistryListRequest) -> Result<ExecutionOutcome> {
    let store = ctx.manifest_store();
    let registries = match list_registries(&store) {
        Ok(registries) => registries,
        Err(err) => return Ok(manifest_error_outcome(&err)),
    };
    let rows: Vec<Value> = registries
        .iter()
        .map(|(id, entry)| {
            json!({
                "id": id,
                "format": entry.rule.format,
                "header": entry.rule.header,
            })
        })
        .collect();
    let message = match rows.len() {
        0 => "no registries configured".to_string(),
        1 => "1 registry".to_string(),
        n => format!("{n} registries"),
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "status": "list",
            "registries": rows,
        }),
    ))
}

pub fn registry_import(
    ctx: &CommandContext,
    request: RegistryImportRequest,
) -> Result<ExecutionOutcome> {
    let store = ctx.manifest_store();
    match import_registries(&store, ctx.fetcher(), &request.location) {
        Ok(report) => Ok(report_outcome(&request.location, &report)),
        Err(err) => Ok(import_error_outcome(&request.location, &err)),
    }
}

fn report_details(location: &str, report: &ImportReport) -> Value {
    json!({
        "source": location,
        "outcome": report.outcome(),
        "total": report.total,
        "succeeded": report.succeeded,
        "failed": report.failed,
        "imported": report.imported,
        "overwritten": report.overwritten,
        "committed": report.committed,
        "issues": report
            .failures
            .iter()
            .map(|failure| json!({"id": failure.id, "message": failure.error}))
            .collect::<Vec<_>>(),
    })
}

fn report_outcome(location: &str, report: &ImportReport) -> ExecutionOutcome {
    let mut details = report_details(location, report);
    let message = match report.outcome() {
        ImportOutcome::Empty => "No registries found to import.".to_string(),
        ImportOutcome::Complete => format!(
            "imported {} of {} registries",
            report.succeeded, report.total
        ),
        ImportOutcome::Partial => {
            details["hint"] = json!("Fix the failed entries at the source and import again.");
            format!(
                "Partial import completed: {} succeeded, {} failed",
                report.succeeded, report.failed
            )
        }
    };
    details["status"] = json!(report.outcome());
    ExecutionOutcome::success(message, details)
}

fn import_error_outcome(location: &str, err: &ImportError) -> ExecutionOutcome {
    let message = format!("Failed to import registries: {err}");
    let mut details = match err {
        ImportError::Manifest(inner) => return manifest_error_outcome(inner),
        ImportError::AllFailed(report) => report_details(location, report),
        ImportError::Conflict { ids } => json!({"source": location, "duplicates": ids}),
        ImportError::Fetch { reason, .. } => json!({"source": location, "issues": [reason]}),
        ImportError::Schema(reason) => json!({
            "source": location,
            "issues": [reason],
            "hint": "Import data must look like {\"registries\": [{\"id\": ..., \"rule\": {\"format\": ...}}]}.",
        }),
    };
    details["reason"] = json!(match err {
        ImportError::Fetch { .. } => "import_fetch_failed",
        ImportError::Schema(_) => "invalid_import_data",
        ImportError::Conflict { .. } => "duplicate_registry_ids",
        ImportError::AllFailed(_) => "all_imports_failed",
        ImportError::Manifest(_) => "manifest_error",
    });
    details["code"] = json!(err.code());
    if err.is_user_error() {
        ExecutionOutcome::user_error(message, details)
    } else {
        ExecutionOutcome::failure(message, details)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::test_support::{context_with_fetcher, StaticFetcher};
    use crate::CommandStatus;

    fn init(root: &std::path::Path) -> Result<()> {
        hmpact_domain::ManifestStore::new(root).init()?;
        Ok(())
    }

    #[test]
    fn add_list_remove_roundtrip() -> Result<()> {
        let temp = tempdir()?;
        init(temp.path())?;
        let ctx = context_with_fetcher(temp.path(), StaticFetcher::empty());

        let added = registry_add(
            &ctx,
            RegistryAddRequest {
                domain: "npm.example.com".into(),
                id: Some("corp".into()),
                format: None,
            },
        )?;
        assert_eq!(added.status, CommandStatus::Ok);
        assert_eq!(added.details["status"], "added");

        let listed = registry_list(&ctx, RegistryListRequest)?;
        assert_eq!(listed.message, "1 registry");
        assert_eq!(listed.details["registries"][0]["id"], "corp");

        let removed = registry_remove(&ctx, RegistryRemoveRequest { id: "corp".into() })?;
        assert_eq!(removed.details["status"], "removed");
        let absent = registry_remove(&ctx, RegistryRemoveRequest { id: "corp".into() })?;
        assert_eq!(absent.details["status"], "absent");
        Ok(())
    }

    #[test]
    fn missing_manifest_is_a_user_error_with_a_hint() -> Result<()> {
        let temp = tempdir()?;
        let ctx = context_with_fetcher(temp.path(), StaticFetcher::empty());
        let outcome = registry_list(&ctx, RegistryListRequest)?;
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["reason"], "missing_manifest");
        assert!(outcome.details["hint"].as_str().is_some());
        Ok(())
    }

    #[test]
    fn partial_import_reports_counts_and_failures() -> Result<()> {
        let temp = tempdir()?;
        init(temp.path())?;
        let fetcher = StaticFetcher::new(json!({"registries": [
            {"id": "a", "rule": {"format": "//a"}},
            {"id": "b", "rule": {"format": ""}},
        ]}));
        let ctx = context_with_fetcher(temp.path(), fetcher);

        let outcome = registry_import(
            &ctx,
            RegistryImportRequest {
                location: "https://example.test/r.json".into(),
            },
        )?;
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.details["status"], "partial");
        assert_eq!(outcome.details["succeeded"], 1);
        assert_eq!(outcome.details["failed"], 1);
        assert_eq!(outcome.details["issues"][0]["id"], "b");
        Ok(())
    }

    #[test]
    fn conflicting_import_is_a_user_error() -> Result<()> {
        let temp = tempdir()?;
        init(temp.path())?;
        let before = fs::read_to_string(temp.path().join("hmpact.jsonc"))?;
        let fetcher = StaticFetcher::new(json!({"registries": [
            {"id": "a", "rule": {"format": "//a"}},
            {"id": "a", "rule": {"format": "//b"}},
        ]}));
        let ctx = context_with_fetcher(temp.path(), fetcher);

        let outcome = registry_import(
            &ctx,
            RegistryImportRequest {
                location: "https://example.test/r.json".into(),
            },
        )?;
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["reason"], "duplicate_registry_ids");
        assert_eq!(outcome.details["duplicates"], json!(["a"]));
        assert!(outcome.message.starts_with("Failed to import registries:"));
        assert_eq!(fs::read_to_string(temp.path().join("hmpact.jsonc"))?, before);
        Ok(())
    }
}
