//! # mgit CLI
//!
//! Command-line interface for the multi-provider Git fleet manager.
//!
//! Provides the `list`, `sync`, and `status` commands, plus shell
//! completions. Configuration file loading and logging initialization live
//! here; the core crate only ever sees an `EffectiveConfig` and never
//! touches the filesystem or environment directly.

pub mod commands;
pub mod config_loading;
pub mod logging;
pub mod reporting;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mgit_core::UpdateMode;

use config_loading::ConfigLoadError;
use reporting::ListFormat;

/// mgit - fleet management across Azure DevOps, GitHub, and BitBucket
#[derive(Parser)]
#[command(name = "mgit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-provider Git fleet management")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MGIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (overridden by the DEBUG environment variable)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Emit structured JSON logs instead of human-readable text
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List repositories matching a query without synchronizing them
    List {
        /// Three-segment query: `org/project/repo`, `*`/`?` wildcards allowed
        query: String,

        /// Restrict to a single configured provider
        #[arg(short, long)]
        provider: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: ListFormat,

        /// Limit the number of results, applied after deduplication
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Clone or update repositories matching a query
    Sync {
        /// Three-segment query: `org/project/repo`, `*`/`?` wildcards allowed
        query: String,

        /// Local root directory to sync into
        path: PathBuf,

        /// Restrict to a single configured provider
        #[arg(short, long)]
        provider: Option<String>,

        /// Repository-fanout concurrency (default from config, hard max 50)
        #[arg(long)]
        concurrency: Option<u32>,

        /// What to do with existing checkouts
        #[arg(long, value_enum)]
        update_mode: Option<UpdateModeArg>,

        /// Synonym for `--update-mode force`; requires confirmation
        #[arg(long)]
        force: bool,

        /// Compute and print the plan without executing any Git operation
        #[arg(long)]
        dry_run: bool,

        /// Skip the interactive force-mode confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Emit one JSON event per line as tasks complete, instead of a
        /// human-readable progress line
        #[arg(long)]
        jsonl: bool,
    },

    /// Scan a local directory tree for Git checkouts and report cleanliness
    Status {
        /// Local root directory to scan
        path: PathBuf,

        /// Repository-fanout concurrency
        #[arg(long)]
        concurrency: Option<u32>,

        /// Include clean checkouts in the report, not just dirty ones
        #[arg(long)]
        show_clean: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        output: commands::status::StatusOutput,

        /// Exit with a non-zero status if any checkout is dirty
        #[arg(long)]
        fail_on_dirty: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Interactively add or update a provider entry in the configuration file
    ///
    /// The interactive credential flow is a collaborator outside the core
    /// query-to-sync pipeline: this entry point exists so the command
    /// surface is complete, but it does not prompt for or write credentials
    /// itself. Edit the configuration file directly, or have a provisioning
    /// tool populate it, then pass `--config` (or rely on the default
    /// location) for `list`/`sync`/`status`.
    Login {
        /// Provider kind to configure
        #[arg(value_enum)]
        kind: LoginProviderKind,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LoginProviderKind {
    // Debug is used to render the kind in the `login` stub's diagnostic.
    AzureDevOps,
    GitHub,
    Bitbucket,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum UpdateModeArg {
    Skip,
    Pull,
    Force,
}

impl From<UpdateModeArg> for UpdateMode {
    fn from(value: UpdateModeArg) -> Self {
        match value {
            UpdateModeArg::Skip => UpdateMode::Skip,
            UpdateModeArg::Pull => UpdateMode::Pull,
            UpdateModeArg::Force => UpdateMode::Force,
        }
    }
}

/// Top-level CLI error. Exit-code mapping happens in `main`, not here, so
/// this type stays a plain taxonomy covering validation/config failures,
/// resolver and sync failures, cancellation, and internal invariant
/// violations.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("resolution failed: {0}")]
    ResolverFailed(String),

    #[error("{failed} repository operation(s) failed")]
    SyncFailed { failed: usize },

    #[error("interrupted")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Maps each error variant to the process exit code `main` returns.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation(_) | CliError::Config(_) => 2,
            CliError::Cancelled => 130,
            CliError::Internal(_) => 3,
            CliError::ResolverFailed(_) | CliError::SyncFailed { .. } | CliError::Io(_) => 1,
        }
    }
}

/// Parse arguments, initialize logging, load configuration, and dispatch to
/// the selected command orchestrator.
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.json_logs);

    let config = config_loading::load(cli.config.as_deref())?;

    match cli.command {
        Commands::List {
            query,
            provider,
            format,
            limit,
        } => {
            commands::list::run(&query, provider.as_deref(), format, limit, &config).await
        }
        Commands::Sync {
            query,
            path,
            provider,
            concurrency,
            update_mode,
            force,
            dry_run,
            yes,
            jsonl,
        } => {
            let options = commands::sync::SyncOptions {
                query: &query,
                target_root: &path,
                provider: provider.as_deref(),
                concurrency,
                update_mode: update_mode.map(UpdateMode::from),
                force,
                dry_run,
                yes,
                jsonl,
            };
            commands::sync::run(options, &config).await
        }
        Commands::Status {
            path,
            concurrency,
            show_clean,
            output,
            fail_on_dirty,
        } => commands::status::run(&path, concurrency, show_clean, output, fail_on_dirty, &config).await,
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        Commands::Login { kind } => {
            let path = config_loading::default_config_path();
            let path_hint = path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "~/.config/mgit/config.yaml".to_string());
            Err(CliError::Validation(format!(
                "interactive login is not part of this tool's core; add a `{kind:?}` entry \
                 under `providers:` in {path_hint} instead (see the configuration file shape \
                 in the documentation)"
            )))
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
