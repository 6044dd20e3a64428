use std::env;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use hmpact_core::{CommandContext, ONLINE_ENV};

mod cli;
mod dispatch;
mod output;
mod style;

use cli::HmpactCli;
use dispatch::dispatch_command;
use output::{emit_output, OutputOptions};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = HmpactCli::parse();
    init_tracing(cli.trace, cli.verbose);

    if cli.offline {
        env::set_var(ONLINE_ENV, "0");
    }

    let manifest_root = match &cli.manifest_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let ctx = CommandContext::new(manifest_root).map_err(|err| eyre!("{err:?}"))?;
    let (info, outcome) = dispatch_command(&ctx, &cli.command)?;
    let opts = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };
    let code = emit_output(&opts, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = format!(
        "hmpact={level},hmpact_cli={level},hmpact_core={level},hmpact_domain={level},hmpact_cache={level},hmpact_codec={level}"
    );
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
