use color_eyre::Result;
use hmpact_core::{
    cache_clear, cache_get, cache_has, cache_list, cache_path, cache_put, cache_stats,
    project_init, registry_add, registry_import, registry_list, registry_remove, CacheClearRequest,
    CacheGetRequest, CacheHasRequest, CacheListRequest, CachePathRequest, CachePutRequest,
    CacheStatsRequest, CommandContext, CommandGroup, CommandInfo, ExecutionOutcome, InitRequest,
    RegistryAddRequest, RegistryImportRequest, RegistryListRequest, RegistryRemoveRequest,
};
use tracing::debug;

use crate::cli::{CacheCommand, CommandGroupCli, RegistryCommand};

pub fn dispatch_command(
    ctx: &CommandContext,
    group: &CommandGroupCli,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    match group {
        CommandGroupCli::Init => {
            let info = CommandInfo::new(CommandGroup::Init, "init");
            core_call(info, || project_init(ctx, InitRequest))
        }
        CommandGroupCli::Registry(command) => dispatch_registry(ctx, command),
        CommandGroupCli::Cache(command) => dispatch_cache(ctx, command),
    }
}

fn dispatch_registry(
    ctx: &CommandContext,
    command: &RegistryCommand,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    match command {
        RegistryCommand::Add(args) => {
            let info = CommandInfo::new(CommandGroup::Registry, "add");
            let request = RegistryAddRequest {
                domain: args.domain.clone(),
                id: args.id.clone(),
                format: args.format.clone(),
            };
            core_call(info, || registry_add(ctx, request))
        }
        RegistryCommand::Remove(args) => {
            let info = CommandInfo::new(CommandGroup::Registry, "remove");
            let request = RegistryRemoveRequest {
                id: args.id.clone(),
            };
            core_call(info, || registry_remove(ctx, request))
        }
        RegistryCommand::List => {
            let info = CommandInfo::new(CommandGroup::Registry, "list");
            core_call(info, || registry_list(ctx, RegistryListRequest))
        }
        RegistryCommand::Import(args) => {
            let info = CommandInfo::new(CommandGroup::Registry, "import");
            let request = RegistryImportRequest {
                location: args.location.clone(),
            };
            core_call(info, || registry_import(ctx, request))
        }
    }
}

fn dispatch_cache(
    ctx: &CommandContext,
    command: &CacheCommand,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    match command {
        CacheCommand::Path => {
            let info = CommandInfo::new(CommandGroup::Cache, "path");
            core_call(info, || cache_path(ctx, CachePathRequest))
        }
        CacheCommand::Ls => {
            let info = CommandInfo::new(CommandGroup::Cache, "ls");
            core_call(info, || cache_list(ctx, CacheListRequest))
        }
        CacheCommand::Stats => {
            let info = CommandInfo::new(CommandGroup::Cache, "stats");
            core_call(info, || cache_stats(ctx, CacheStatsRequest))
        }
        CacheCommand::Clear => {
            let info = CommandInfo::new(CommandGroup::Cache, "clear");
            core_call(info, || cache_clear(ctx, CacheClearRequest))
        }
        CacheCommand::Has(args) => {
            let info = CommandInfo::new(CommandGroup::Cache, "has");
            let request = CacheHasRequest {
                key: args.key.clone(),
            };
            core_call(info, || cache_has(ctx, request))
        }
        CacheCommand::Get(args) => {
            let info = CommandInfo::new(CommandGroup::Cache, "get");
            let request = CacheGetRequest {
                key: args.key.clone(),
                output: args.output.clone(),
            };
            core_call(info, || cache_get(ctx, request))
        }
        CacheCommand::Put(args) => {
            let info = CommandInfo::new(CommandGroup::Cache, "put");
            let request = CachePutRequest {
                key: args.key.clone(),
                file: args.file.clone(),
            };
            core_call(info, || cache_put(ctx, request))
        }
    }
}

fn core_call<F>(info: CommandInfo, action: F) -> Result<(CommandInfo, ExecutionOutcome)>
where
    F: FnOnce() -> anyhow::Result<ExecutionOutcome>,
{
    debug!(group = %info.group, name = info.name, "dispatching");
    match action() {
        Ok(outcome) => Ok((info, outcome)),
        Err(err) => {
            let issues: Vec<String> = err.chain().map(std::string::ToString::to_string).collect();
            Ok((
                info,
                ExecutionOutcome::failure(
                    err.to_string(),
                    serde_json::json!({
                        "reason": "internal_error",
                        "error": err.to_string(),
                        "issues": issues,
                        "hint": "Re-run with `-vv` for more detail, or open an issue if this persists.",
                    }),
                ),
            ))
        }
    }
}
