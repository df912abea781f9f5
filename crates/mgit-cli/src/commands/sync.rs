//! `sync` orchestrator: 4.A -> 4.D -> 4.E -> 4.F -> 4.H, then render.

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use mgit_core::{EffectiveConfig, ProviderRegistry, SystemGitExecutor, UpdateMode};

use crate::reporting::{action_label, render_sync_event_jsonl, render_sync_human, render_sync_summary};
use crate::CliError;

pub struct SyncOptions<'a> {
    pub query: &'a str,
    pub target_root: &'a Path,
    pub provider: Option<&'a str>,
    pub concurrency: Option<u32>,
    pub update_mode: Option<UpdateMode>,
    pub force: bool,
    pub dry_run: bool,
    pub yes: bool,
    pub jsonl: bool,
}

/// Prompt for confirmation on stdin/stdout, refusing outright when stdin is
/// not a TTY: `--force` without `--yes` and without a TTY is rejected with
/// `Validation` rather than hanging on a read that will never resolve.
fn confirm_force(yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation(
            "--force requires --yes when stdin is not a terminal".to_string(),
        ));
    }
    print!("This will delete and re-clone existing checkouts. Continue? [y/N] ");
    std::io::stdout().flush().ok();
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|err| CliError::Io(err))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn run(options: SyncOptions<'_>, config: &EffectiveConfig) -> Result<(), CliError> {
    let analysis = mgit_core::analyze(options.query, options.provider);
    if !analysis.is_valid() {
        return Err(CliError::Validation(format!(
            "invalid query '{}': {:?}",
            options.query, analysis.validation_errors
        )));
    }
    if let Some(name) = options.provider {
        if config.find(name).is_none() {
            return Err(CliError::Validation(format!(
                "no configured provider named '{name}'"
            )));
        }
    }

    let requested_concurrency = options
        .concurrency
        .unwrap_or(config.global.default_concurrency);
    if requested_concurrency == 0 {
        return Err(CliError::Validation(
            "concurrency must be a positive integer".to_string(),
        ));
    }
    let (concurrency, clamped) = EffectiveConfig::clamp_repository_concurrency(requested_concurrency);
    if clamped {
        tracing::warn!(
            requested = requested_concurrency,
            clamped_to = concurrency,
            "requested concurrency exceeds the hard maximum; clamping"
        );
    }

    let update_mode = if options.force {
        UpdateMode::Force
    } else {
        options.update_mode.unwrap_or(config.global.default_update_mode)
    };

    let force_confirmed = if update_mode == UpdateMode::Force {
        confirm_force(options.yes)?
    } else {
        false
    };

    let registry = ProviderRegistry::from_config(config);
    if registry.is_empty() {
        println!("no providers configured");
        return Ok(());
    }

    let resolved = mgit_core::resolve(&registry, &analysis)
        .await
        .map_err(|err| CliError::ResolverFailed(err.to_string()))?;

    let git: Arc<dyn mgit_core::GitExecutor> = Arc::new(SystemGitExecutor::default());
    let plan = mgit_core::plan_all(
        options.target_root,
        &resolved.repositories,
        update_mode,
        force_confirmed,
        &*git,
    )
    .await
    .map_err(|err| CliError::Internal(err.to_string()))?;

    if options.dry_run {
        for entry in &plan {
            println!(
                "{:<12} {}  -> {}",
                action_label(entry.action),
                entry.repository.display_name(),
                entry.target_path.display()
            );
        }
        return Ok(());
    }

    let cancellation = mgit_core::CancellationToken::new();
    {
        let cancellation = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling remaining tasks");
                cancellation.cancel();
            }
        });
    }

    let jsonl = options.jsonl;
    let progress: mgit_core::ProgressCallback = Arc::new(move |_completed, _total, result| {
        if jsonl {
            render_sync_event_jsonl(result);
        } else {
            render_sync_human(result);
        }
    });

    let summary = mgit_core::sync_all(
        plan,
        concurrency,
        git,
        cancellation.clone(),
        Some(progress),
        update_mode,
    )
    .await;
    if !jsonl {
        render_sync_summary(&summary);
    }

    if cancellation.is_cancelled() {
        return Err(CliError::Cancelled);
    }
    if summary.failed > 0 {
        return Err(CliError::SyncFailed {
            failed: summary.failed,
        });
    }
    Ok(())
}
