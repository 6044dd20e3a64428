use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const HMPACT_BEFORE_HELP: &str = concat!(
    "hmpact ",
    env!("CARGO_PKG_VERSION"),
    " – manifest and cache tooling\n\n",
    "\x1b[1;36mManifest\x1b[0m\n",
    "  init             Create an empty hmpact.jsonc in the manifest directory.\n",
    "  registry         Add, remove, list, or bulk-import package registries.\n\n",
    "\x1b[1;36mCache\x1b[0m\n",
    "  cache            Inspect and manage the content-addressed cache.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "hmpact",
    author,
    version,
    disable_help_subcommand = true,
    before_help = HMPACT_BEFORE_HELP
)]
#[allow(clippy::struct_excessive_bools)]
pub struct HmpactCli {
    #[arg(short, long, help = "Suppress human output", global = true)]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)", global = true)]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(long, help = "Emit {status,message,details} JSON envelopes", global = true)]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        help = "Refuse network access for this invocation (sets HMPACT_ONLINE=0)",
        global = true
    )]
    pub offline: bool,
    #[arg(
        long,
        value_name = "DIR",
        env = "HMPACT_MANIFEST_DIR",
        help = "Directory holding hmpact.jsonc (defaults to the current directory)",
        global = true
    )]
    pub manifest_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Create an empty hmpact.jsonc manifest.",
        after_help = "Example:\n  hmpact init --manifest-dir ./app\n"
    )]
    Init,
    #[command(subcommand, about = "Manage package registries in the manifest.")]
    Registry(RegistryCommand),
    #[command(subcommand, about = "Inspect and manage the content-addressed cache.")]
    Cache(CacheCommand),
}

#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    #[command(
        about = "Add a registry or update its URL format.",
        after_help = "Example:\n  hmpact registry add --domain npm.pkg.github.com --id github\n"
    )]
    Add(RegistryAddArgs),
    #[command(about = "Remove a registry by id.")]
    Remove(RegistryRemoveArgs),
    #[command(about = "List configured registries.")]
    List,
    #[command(
        about = "Import registries from a URL or local JSON file.",
        after_help = "Example:\n  hmpact registry import https://example.com/registries.json\n"
    )]
    Import(RegistryImportArgs),
}

#[derive(Args, Debug)]
pub struct RegistryAddArgs {
    #[arg(long, help = "Registry host, e.g. npm.pkg.github.com")]
    pub domain: String,
    #[arg(long, help = "Registry id (defaults to the domain)")]
    pub id: Option<String>,
    #[arg(long, help = "URL template (defaults to //{domain}/@{org}/{pkg}/-/{pkg}-{ver}.tgz)")]
    pub format: Option<String>,
}

#[derive(Args, Debug)]
pub struct RegistryRemoveArgs {
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug)]
pub struct RegistryImportArgs {
    #[arg(value_name = "URL", help = "http(s) URL, file:// URL, or path to a JSON document")]
    pub location: String,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    #[command(about = "Print the resolved cache directory.", after_help = "Example:\n  hmpact cache path\n")]
    Path,
    #[command(about = "List cached entries.")]
    Ls,
    #[command(about = "Report entry count and total size.")]
    Stats,
    #[command(about = "Remove every cached entry.")]
    Clear,
    #[command(about = "Check whether a key is cached.")]
    Has(CacheKeyArgs),
    #[command(about = "Print a cached entry, or write it to a file.")]
    Get(CacheGetArgs),
    #[command(about = "Store a file under a key.")]
    Put(CachePutArgs),
}

#[derive(Args, Debug)]
pub struct CacheKeyArgs {
    #[arg(value_name = "KEY")]
    pub key: String,
}

#[derive(Args, Debug)]
pub struct CacheGetArgs {
    #[arg(value_name = "KEY")]
    pub key: String,
    #[arg(short, long, value_name = "FILE", help = "Write the entry to FILE instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CachePutArgs {
    #[arg(value_name = "KEY")]
    pub key: String,
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
