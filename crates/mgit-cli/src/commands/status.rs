//! `status` orchestrator: local-only scan of a target directory for Git
//! checkouts, reporting working-tree cleanliness.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use mgit_core::{EffectiveConfig, GitExecutor, SystemGitExecutor};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Semaphore;

use crate::CliError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusOutput {
    Table,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct CheckoutStatus {
    path: PathBuf,
    dirty: bool,
    error: Option<String>,
}

/// Depth bound on the recursive scan, matching the planner's own
/// `root/organization/project?/name` shape plus a little slack.
const MAX_SCAN_DEPTH: usize = 4;

fn find_checkouts(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![(root.to_path_buf(), 0usize)];
    while let Some((dir, depth)) = stack.pop() {
        if dir.join(".git").exists() {
            found.push(dir);
            continue;
        }
        if depth >= MAX_SCAN_DEPTH {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push((path, depth + 1));
            }
        }
    }
    found.sort();
    found
}

pub async fn run(
    target_root: &Path,
    concurrency: Option<u32>,
    show_clean: bool,
    output: StatusOutput,
    fail_on_dirty: bool,
    config: &EffectiveConfig,
) -> Result<(), CliError> {
    if !target_root.exists() {
        return Err(CliError::Validation(format!(
            "target path '{}' does not exist",
            target_root.display()
        )));
    }

    let requested_concurrency = concurrency.unwrap_or(config.global.default_concurrency);
    if requested_concurrency == 0 {
        return Err(CliError::Validation(
            "concurrency must be a positive integer".to_string(),
        ));
    }
    let (permits, _) = EffectiveConfig::clamp_repository_concurrency(requested_concurrency);
    let semaphore = Arc::new(Semaphore::new(permits as usize));
    let git: Arc<dyn GitExecutor> = Arc::new(SystemGitExecutor::default());

    let checkouts = find_checkouts(target_root);
    let mut tasks = FuturesUnordered::new();
    for path in checkouts {
        let semaphore = Arc::clone(&semaphore);
        let git = Arc::clone(&git);
        tasks.push(async move {
            let _permit = semaphore.acquire().await.expect("status semaphore never closes early");
            match git.is_working_tree_dirty(&path).await {
                Ok(dirty) => CheckoutStatus {
                    path,
                    dirty,
                    error: None,
                },
                Err(err) => CheckoutStatus {
                    path,
                    dirty: false,
                    error: Some(err.to_string()),
                },
            }
        });
    }

    let mut statuses = Vec::new();
    while let Some(status) = tasks.next().await {
        statuses.push(status);
    }
    statuses.sort_by(|a, b| a.path.cmp(&b.path));

    let any_dirty = statuses.iter().any(|s| s.dirty);
    render(&statuses, show_clean, output);

    if fail_on_dirty && any_dirty {
        return Err(CliError::SyncFailed { failed: 1 });
    }
    Ok(())
}

fn render(statuses: &[CheckoutStatus], show_clean: bool, output: StatusOutput) {
    match output {
        StatusOutput::Table => {
            for status in statuses {
                if !status.dirty && status.error.is_none() && !show_clean {
                    continue;
                }
                let label = if let Some(err) = &status.error {
                    format!("error: {err}")
                } else if status.dirty {
                    "dirty".to_string()
                } else {
                    "clean".to_string()
                };
                println!("{:<8} {}", label, status.path.display());
            }
        }
        StatusOutput::Json => {
            let rendered: Vec<_> = statuses
                .iter()
                .filter(|s| show_clean || s.dirty || s.error.is_some())
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "checkouts": rendered }))
                    .expect("json body is always serializable")
            );
        }
    }
}
