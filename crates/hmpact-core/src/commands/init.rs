use anyhow::Result;
use serde_json::json;

use super::manifest_error_outcome;
use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug, Default)]
pub struct InitRequest;

pub fn project_init(ctx: &CommandContext, _request: InitRequest) -> Result<ExecutionOutcome> {
    match ctx.manifest_store().init() {
        Ok(location) => {
            let path = location.path.display().to_string();
            Ok(ExecutionOutcome::success(
                format!("created {}", location.file_name),
                json!({
                    "status": "created",
                    "manifest": path,
                }),
            ))
        }
        Err(err) => Ok(manifest_error_outcome(&err)),
    }
}
