//! # Path Planner
//!
//! Deterministic mapping from a resolved repository descriptor to a local
//! directory under a user-supplied root, plus the action each target path
//! implies given its current on-disk state.

use std::path::{Path, PathBuf};

use crate::config::UpdateMode;
use crate::git_executor::GitExecutor;
use crate::repository::RepositoryDescriptor;

/// What the bulk sync engine should do with one resolved repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    CloneNew,
    PullExisting,
    ForceReplace,
    SkipDirty,
    SkipNonRepo,
}

/// One row of a sync plan, computed before any Git invocation. Visible
/// verbatim in dry-run output.
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub repository: RepositoryDescriptor,
    pub target_path: PathBuf,
    pub action: PlanAction,
}

/// `root / organization / project? / name`, with `project` included only
/// when non-empty, and duplicate separators collapsed.
pub fn target_path(root: &Path, repo: &RepositoryDescriptor) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in [
        Some(repo.organization.as_str()),
        repo.project.as_deref().filter(|p| !p.is_empty()),
        Some(repo.name.as_str()),
    ]
    .into_iter()
    .flatten()
    {
        for part in segment.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
    }
    path
}

/// True iff `path` exists and contains a `.git` entry — this is the
/// definition of "managed repository" used throughout planning.
fn is_managed_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Plan one repository. `force_confirmed` gates `ForceReplace`: without it,
/// force mode against an existing managed repo still resolves to
/// `PullExisting` rather than silently destroying the checkout — the engine
/// refuses to plan a destructive replace without prior confirmation.
pub async fn plan_one(
    root: &Path,
    repo: &RepositoryDescriptor,
    update_mode: UpdateMode,
    force_confirmed: bool,
    git: &dyn GitExecutor,
) -> Result<PlanEntry, crate::git_executor::GitExecutorError> {
    let path = target_path(root, repo);

    let action = if !path.exists() {
        PlanAction::CloneNew
    } else if !is_managed_repository(&path) {
        PlanAction::SkipNonRepo
    } else if update_mode == UpdateMode::Force && force_confirmed {
        PlanAction::ForceReplace
    } else if update_mode == UpdateMode::Skip {
        PlanAction::PullExisting
    } else if git.is_working_tree_dirty(&path).await? {
        PlanAction::SkipDirty
    } else {
        PlanAction::PullExisting
    };

    Ok(PlanEntry {
        repository: repo.clone(),
        target_path: path,
        action,
    })
}

/// Plan the full batch. Planning is not concurrent with itself — it runs to
/// completion synchronously before execution begins, so the plan is always
/// the authoritative, fully-computed source of actions the caller renders
/// or executes.
pub async fn plan_all(
    root: &Path,
    repositories: &[RepositoryDescriptor],
    update_mode: UpdateMode,
    force_confirmed: bool,
    git: &dyn GitExecutor,
) -> Result<Vec<PlanEntry>, crate::git_executor::GitExecutorError> {
    let mut entries = Vec::with_capacity(repositories.len());
    for repo in repositories {
        entries.push(plan_one(root, repo, update_mode, force_confirmed, git).await?);
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "path_planner_tests.rs"]
mod tests;
