//! # Bulk Sync Engine
//!
//! The central orchestrator: given a resolved repository list and a plan
//! from the path planner, runs Git operations under bounded concurrency,
//! collects per-repository outcomes, and honors cancellation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::UpdateMode;
use crate::git_executor::GitExecutor;
use crate::path_planner::{PlanAction, PlanEntry};

/// The hard ceiling on repository-fanout concurrency, regardless of what a
/// caller requests.
pub const MAX_CONCURRENCY: u32 = 50;

/// Cooperative cancellation signal shared across in-flight tasks.
///
/// There is no external crate for this in the dependency set; a single
/// `AtomicBool` behind an `Arc` is sufficient since the only operation
/// needed is "has anyone asked to stop".
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

/// How often an in-flight task re-checks the cancellation flag while racing
/// its Git operation.
const CANCELLATION_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled; never resolves otherwise. Used
    /// to race an in-flight Git operation so a mid-flight interrupt doesn't
    /// have to wait for the subprocess to finish on its own.
    async fn cancelled(&self) {
        while !self.is_cancelled() {
            tokio::time::sleep(CANCELLATION_POLL_INTERVAL).await;
        }
    }
}

/// What happened to one repository.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    Cloned,
    Pulled,
    ForceReplaced,
    /// Recorded as a successful no-op: `skip` update mode, or a skip-worthy
    /// local state (dirty working tree, non-repo directory).
    Skipped { reason: String },
    /// Fast-forward pull failed; non-fatal to the batch.
    MergeConflict { message: String },
    Failed { error: String },
    /// Subprocess was killed or the task never started due to a user
    /// interrupt.
    Cancelled,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SyncOutcome::Cloned | SyncOutcome::Pulled | SyncOutcome::ForceReplaced | SyncOutcome::Skipped { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct RepoSyncResult {
    pub display_name: String,
    pub target_path: PathBuf,
    pub action: PlanAction,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub duration: Duration,
    pub results: Vec<RepoSyncResult>,
}

fn compile_summary(results: Vec<RepoSyncResult>, duration: Duration) -> SyncSummary {
    let total = results.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut cancelled = 0;

    for result in &results {
        match &result.outcome {
            SyncOutcome::Cancelled => cancelled += 1,
            SyncOutcome::Failed { .. } | SyncOutcome::MergeConflict { .. } => failed += 1,
            outcome if outcome.is_success() => succeeded += 1,
            _ => {}
        }
    }

    SyncSummary {
        total,
        succeeded,
        failed,
        cancelled,
        duration,
        results,
    }
}

/// Invoked once per completed task with `(completed, total, last_outcome)`.
/// The engine is callback-agnostic; rendering belongs to the orchestrator.
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &RepoSyncResult) + Send + Sync>;

async fn execute_entry(
    entry: PlanEntry,
    git: Arc<dyn GitExecutor>,
    cancellation: CancellationToken,
    update_mode: UpdateMode,
) -> RepoSyncResult {
    let display_name = entry.repository.display_name();
    let target_path = entry.target_path.clone();
    let action = entry.action;

    if cancellation.is_cancelled() {
        return RepoSyncResult {
            display_name,
            target_path,
            action,
            outcome: SyncOutcome::Cancelled,
        };
    }

    let outcome = match action {
        PlanAction::SkipDirty => SyncOutcome::Skipped {
            reason: "working tree has uncommitted changes".to_string(),
        },
        PlanAction::SkipNonRepo => SyncOutcome::Skipped {
            reason: "target exists and is not a git checkout".to_string(),
        },
        // `skip` update mode is a recorded no-op for an existing checkout:
        // no `git` invocation at all, per spec 4.H item 2.
        PlanAction::PullExisting if update_mode == UpdateMode::Skip => SyncOutcome::Skipped {
            reason: "update mode is skip".to_string(),
        },
        PlanAction::CloneNew | PlanAction::ForceReplace | PlanAction::PullExisting => {
            let git_op = async {
                match action {
                    PlanAction::CloneNew => clone_into(&entry, &*git).await,
                    PlanAction::ForceReplace => force_replace(&entry, &*git).await,
                    PlanAction::PullExisting => pull_existing(&entry, &*git).await,
                    PlanAction::SkipDirty | PlanAction::SkipNonRepo => unreachable!(),
                }
            };
            tokio::select! {
                outcome = git_op => outcome,
                // Dropping `git_op` here abandons its in-flight subprocess;
                // `SystemGitExecutor` spawns with `kill_on_drop(true)`, so
                // this is what actually terminates it.
                _ = cancellation.cancelled() => SyncOutcome::Cancelled,
            }
        }
    };

    RepoSyncResult {
        display_name,
        target_path,
        action,
        outcome,
    }
}

async fn clone_into(entry: &PlanEntry, git: &dyn GitExecutor) -> SyncOutcome {
    if let Some(parent) = entry.target_path.parent() {
        if let Err(err) = tokio::fs::create_dir_all(parent).await {
            return SyncOutcome::Failed {
                error: format!("could not create parent directory: {err}"),
            };
        }
    }
    match git.clone(&entry.repository.clone_url, &entry.target_path).await {
        Ok(_) => SyncOutcome::Cloned,
        Err(err) => SyncOutcome::Failed {
            error: err.to_string(),
        },
    }
}

async fn force_replace(entry: &PlanEntry, git: &dyn GitExecutor) -> SyncOutcome {
    if entry.target_path.exists() {
        if let Err(err) = tokio::fs::remove_dir_all(&entry.target_path).await {
            return SyncOutcome::Failed {
                error: format!("could not remove existing checkout: {err}"),
            };
        }
    }
    match clone_into(entry, git).await {
        SyncOutcome::Cloned => SyncOutcome::ForceReplaced,
        other => other,
    }
}

async fn pull_existing(entry: &PlanEntry, git: &dyn GitExecutor) -> SyncOutcome {
    let resolved_url = &entry.repository.clone_url;

    match git.remote_url(&entry.target_path).await {
        Ok(Some(current)) if current != *resolved_url => {
            if let Err(err) = git.set_remote_url(&entry.target_path, resolved_url).await {
                return SyncOutcome::Failed {
                    error: format!("could not update divergent origin url: {err}"),
                };
            }
        }
        Ok(_) => {}
        Err(err) => {
            return SyncOutcome::Failed {
                error: format!("could not read origin url: {err}"),
            }
        }
    }

    match git.pull_fast_forward(&entry.target_path).await {
        Ok(_) => SyncOutcome::Pulled,
        Err(crate::git_executor::GitExecutorError::MergeConflict { stderr_tail, .. }) => {
            SyncOutcome::MergeConflict {
                message: stderr_tail,
            }
        }
        Err(err) => SyncOutcome::Failed {
            error: err.to_string(),
        },
    }
}

/// Run the plan to completion. Tasks execute in any order; the semaphore
/// bounds in-flight Git processes but imposes no ordering. One repository's
/// failure never prevents another's.
pub async fn sync_all(
    plan: Vec<PlanEntry>,
    concurrency: u32,
    git: Arc<dyn GitExecutor>,
    cancellation: CancellationToken,
    progress: Option<ProgressCallback>,
    update_mode: UpdateMode,
) -> SyncSummary {
    let started = Instant::now();
    let total = plan.len();
    let permits = concurrency.clamp(1, MAX_CONCURRENCY) as usize;
    let semaphore = Arc::new(Semaphore::new(permits));

    info!(total, permits, "starting bulk sync");

    let mut tasks = FuturesUnordered::new();
    for entry in plan {
        let semaphore = Arc::clone(&semaphore);
        let git = Arc::clone(&git);
        let cancellation = cancellation.clone();

        tasks.push(async move {
            let _permit = semaphore.acquire().await.expect("sync semaphore never closes early");
            execute_entry(entry, git, cancellation, update_mode).await
        });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(result) = tasks.next().await {
        debug!(repository = %result.display_name, outcome = ?result.outcome, "repository sync complete");
        results.push(result);
        if let Some(callback) = &progress {
            callback(results.len(), total, results.last().expect("just pushed"));
        }
    }

    let summary = compile_summary(results, started.elapsed());
    if cancellation.is_cancelled() {
        warn!(
            succeeded = summary.succeeded,
            cancelled = summary.cancelled,
            "bulk sync ended early due to cancellation"
        );
    } else {
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "bulk sync complete"
        );
    }
    summary
}

#[cfg(test)]
#[path = "sync_engine_tests.rs"]
mod tests;
