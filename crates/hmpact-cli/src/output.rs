use atty::Stream;
use color_eyre::Result;
use hmpact_core::{CommandGroup, CommandInfo, CommandStatus, ExecutionOutcome};
use serde_json::Value;

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn emit_output(opts: &OutputOptions, info: CommandInfo, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = outcome.status.exit_code();
    let style = Style::new(opts.no_color, atty::is(Stream::Stdout));

    if opts.json {
        let payload = hmpact_core::to_json_response(info, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }
    if opts.quiet {
        return Ok(code);
    }

    if let CommandStatus::Ok = outcome.status {
        if is_passthrough(&outcome.details) {
            print!("{}", outcome.message);
            if !outcome.message.ends_with('\n') {
                println!();
            }
            return Ok(code);
        }
        let message = hmpact_core::format_status_message(info, &outcome.message);
        println!("{}", style.status(outcome.status, &message));
        if let Some(summary) = import_summary(&outcome.details) {
            println!("{summary}");
        }
        for issue in issue_lines(&outcome.details) {
            println!("{}", style.issue(&issue));
        }
        if let Some(table) = render_table(&style, info, &outcome.details) {
            println!("{table}");
        }
        if let Some(hint) = hint_from_details(&outcome.details) {
            println!("{}", style.hint(&format!("Tip: {hint}")));
        }
    } else {
        let header = hmpact_core::format_status_message(info, &outcome.message);
        println!("{}", style.status(outcome.status, &header));
        println!();
        println!("Why:");
        for reason in collect_why_bullets(&outcome.details, &outcome.message) {
            println!("  • {reason}");
        }
        let fixes = collect_fix_bullets(&outcome.details);
        if !fixes.is_empty() {
            println!();
            println!("Fix:");
            for fix in fixes {
                println!("{}", style.hint(&format!("  • {fix}")));
            }
        }
    }
    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn is_passthrough(details: &Value) -> bool {
    details
        .as_object()
        .and_then(|map| map.get("passthrough"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn import_summary(details: &Value) -> Option<String> {
    let total = details.get("total")?.as_u64()?;
    let succeeded = details.get("succeeded")?.as_u64()?;
    let failed = details.get("failed")?.as_u64()?;
    if total == 0 {
        return None;
    }
    Some(format!("  Total: {total}, Success: {succeeded}, Failed: {failed}"))
}

fn issue_lines(details: &Value) -> Vec<String> {
    let Some(issues) = details.get("issues").and_then(Value::as_array) else {
        return Vec::new();
    };
    issues.iter().filter_map(issue_text).collect()
}

fn issue_text(entry: &Value) -> Option<String> {
    match entry {
        Value::String(message) => Some(message.clone()),
        Value::Object(map) => {
            let message = map.get("message").and_then(Value::as_str)?;
            match map.get("id").and_then(Value::as_str) {
                Some(id) => Some(format!("{id}: {message}")),
                None => Some(message.to_string()),
            }
        }
        _ => None,
    }
}

fn render_table(style: &Style, info: CommandInfo, details: &Value) -> Option<String> {
    let (headers, rows) = match (info.group, info.name) {
        (CommandGroup::Registry, "list") => {
            let rows = details
                .get("registries")?
                .as_array()?
                .iter()
                .map(|row| {
                    Some(vec![
                        row.get("id")?.as_str()?.to_string(),
                        row.get("format")?.as_str()?.to_string(),
                    ])
                })
                .collect::<Option<Vec<_>>>()?;
            (vec!["Id", "Format"], rows)
        }
        (CommandGroup::Cache, "ls") => {
            let rows = details
                .get("entries")?
                .as_array()?
                .iter()
                .map(|row| {
                    Some(vec![
                        row.get("key")?.as_str()?.to_string(),
                        row.get("size")?.as_u64()?.to_string(),
                        row.get("integrity")?.as_str()?.to_string(),
                    ])
                })
                .collect::<Option<Vec<_>>>()?;
            (vec!["Key", "Size", "Integrity"], rows)
        }
        _ => return None,
    };
    if rows.is_empty() {
        return None;
    }
    Some(format_table(style, &headers, &rows))
}

fn format_table(style: &Style, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }
    let join = |cells: Vec<String>| cells.join("  ").trim_end().to_string();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(style.heading(&join(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, &w)| format!("{h:<w$}"))
            .collect(),
    )));
    lines.push(join(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        lines.push(join(
            row.iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:<w$}"))
                .collect(),
        ));
    }
    lines.join("\n")
}

fn collect_why_bullets(details: &Value, fallback: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(reason) = details.get("reason").and_then(Value::as_str) {
        push_unique(&mut bullets, reason_display(reason).unwrap_or(reason));
    }
    if let Some(duplicates) = details.get("duplicates").and_then(Value::as_array) {
        let ids: Vec<&str> = duplicates.iter().filter_map(Value::as_str).collect();
        push_unique(&mut bullets, format!("Duplicated ids: {}", ids.join(", ")));
    }
    for issue in issue_lines(details) {
        push_unique(&mut bullets, issue);
    }
    if bullets.is_empty() {
        bullets.push(fallback.to_string());
    }
    bullets
}

fn collect_fix_bullets(details: &Value) -> Vec<String> {
    let mut fixes = Vec::new();
    if let Some(hint) = hint_from_details(details) {
        push_unique(&mut fixes, hint);
    }
    if fixes.is_empty() {
        fixes.push("Re-run with --help for usage or inspect the output above.".to_string());
    }
    fixes
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}

fn reason_display(code: &str) -> Option<&'static str> {
    match code {
        "missing_manifest" => Some("No hmpact.jsonc manifest was found."),
        "duplicate_registry_ids" => Some("The import data lists the same registry id more than once."),
        "all_imports_failed" => Some("Every registry in the import data was rejected."),
        "import_fetch_failed" => Some("The import source could not be fetched."),
        "cache_miss" => Some("The key is not in the cache."),
        "cache_corrupt" => Some("The cached content no longer matches its integrity."),
        _ => None,
    }
}
