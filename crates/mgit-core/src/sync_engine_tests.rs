use super::*;
use crate::git_executor::{GitExecutorError, GitOutcome};
use crate::repository::RepositoryDescriptor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

#[derive(Default)]
struct FakeGitExecutor {
    clone_should_fail: Mutex<HashMap<PathBuf, String>>,
    remote_urls: Mutex<HashMap<PathBuf, String>>,
    pull_is_merge_conflict: Mutex<Vec<PathBuf>>,
    set_remote_calls: Mutex<Vec<PathBuf>>,
    clone_calls: Mutex<Vec<PathBuf>>,
    pull_calls: Mutex<Vec<PathBuf>>,
    clone_delay: Option<Duration>,
}

fn ok_outcome() -> GitOutcome {
    GitOutcome {
        exit_code: Some(0),
        stdout: String::new(),
        stderr: String::new(),
        duration: Duration::from_millis(1),
    }
}

#[async_trait]
impl GitExecutor for FakeGitExecutor {
    async fn clone(&self, _clone_url: &str, target_path: &Path) -> Result<GitOutcome, GitExecutorError> {
        self.clone_calls.lock().unwrap().push(target_path.to_path_buf());
        if let Some(delay) = self.clone_delay {
            tokio::time::sleep(delay).await;
        }
        tokio::fs::create_dir_all(target_path.join(".git")).await.ok();
        if let Some(message) = self.clone_should_fail.lock().unwrap().get(target_path) {
            return Err(GitExecutorError::UnknownGitError {
                command: "clone".to_string(),
                stderr_tail: message.clone(),
            });
        }
        Ok(ok_outcome())
    }

    async fn pull_fast_forward(&self, target_path: &Path) -> Result<GitOutcome, GitExecutorError> {
        self.pull_calls.lock().unwrap().push(target_path.to_path_buf());
        if self.pull_is_merge_conflict.lock().unwrap().contains(&target_path.to_path_buf()) {
            return Err(GitExecutorError::MergeConflict {
                command: "pull --ff-only".to_string(),
                stderr_tail: "would be overwritten by merge".to_string(),
            });
        }
        Ok(ok_outcome())
    }

    async fn set_remote_url(&self, target_path: &Path, url: &str) -> Result<GitOutcome, GitExecutorError> {
        self.set_remote_calls.lock().unwrap().push(target_path.to_path_buf());
        self.remote_urls
            .lock()
            .unwrap()
            .insert(target_path.to_path_buf(), url.to_string());
        Ok(ok_outcome())
    }

    async fn remote_url(&self, target_path: &Path) -> Result<Option<String>, GitExecutorError> {
        Ok(self.remote_urls.lock().unwrap().get(target_path).cloned())
    }

    async fn is_working_tree_dirty(&self, _target_path: &Path) -> Result<bool, GitExecutorError> {
        Ok(false)
    }

    async fn status_porcelain(&self, _target_path: &Path) -> Result<String, GitExecutorError> {
        Ok(String::new())
    }
}

fn repo(name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        organization: "acme".to_string(),
        project: None,
        name: name.to_string(),
        clone_url: format!("https://example.invalid/acme/{name}.git"),
        default_branch: Some("main".to_string()),
        is_private: false,
        description: None,
        provider_name: "gh".to_string(),
        metadata: Default::default(),
    }
}

fn entry(root: &Path, name: &str, action: PlanAction) -> PlanEntry {
    PlanEntry {
        target_path: root.join("acme").join(name),
        repository: repo(name),
        action,
    }
}

#[tokio::test]
async fn clone_new_reports_cloned() {
    let root = tempdir().unwrap();
    let git: Arc<dyn GitExecutor> = Arc::new(FakeGitExecutor::default());
    let plan = vec![entry(root.path(), "widgets", PlanAction::CloneNew)];
    let summary = sync_all(plan, 4, git, CancellationToken::new(), None, UpdateMode::Pull).await;
    assert_eq!(summary.succeeded, 1);
    assert!(matches!(summary.results[0].outcome, SyncOutcome::Cloned));
}

#[tokio::test]
async fn clone_failure_is_recorded_without_aborting_others() {
    let root = tempdir().unwrap();
    let fake = FakeGitExecutor::default();
    let failing_path = root.path().join("acme").join("bad");
    fake.clone_should_fail
        .lock()
        .unwrap()
        .insert(failing_path, "fatal: repository not found".to_string());
    let git: Arc<dyn GitExecutor> = Arc::new(fake);

    let plan = vec![
        entry(root.path(), "bad", PlanAction::CloneNew),
        entry(root.path(), "good", PlanAction::CloneNew),
    ];
    let summary = sync_all(plan, 4, git, CancellationToken::new(), None, UpdateMode::Pull).await;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn skip_dirty_and_skip_nonrepo_count_as_success_without_git_calls() {
    let root = tempdir().unwrap();
    let git: Arc<dyn GitExecutor> = Arc::new(FakeGitExecutor::default());
    let plan = vec![
        entry(root.path(), "dirty-one", PlanAction::SkipDirty),
        entry(root.path(), "nonrepo-one", PlanAction::SkipNonRepo),
    ];
    let summary = sync_all(plan, 4, git, CancellationToken::new(), None, UpdateMode::Pull).await;
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    for result in &summary.results {
        assert!(matches!(result.outcome, SyncOutcome::Skipped { .. }));
    }
}

#[tokio::test]
async fn pull_existing_updates_divergent_remote_before_pulling() {
    let root = tempdir().unwrap();
    let fake = FakeGitExecutor::default();
    let path = root.path().join("acme").join("widgets");
    fake.remote_urls
        .lock()
        .unwrap()
        .insert(path.clone(), "https://stale.invalid/acme/widgets.git".to_string());
    let set_remote_calls = Arc::new(Mutex::new(Vec::new()));
    let git: Arc<dyn GitExecutor> = Arc::new(fake);

    let plan = vec![entry(root.path(), "widgets", PlanAction::PullExisting)];
    let summary = sync_all(plan, 4, git, CancellationToken::new(), None, UpdateMode::Pull).await;
    assert_eq!(summary.succeeded, 1);
    assert!(matches!(summary.results[0].outcome, SyncOutcome::Pulled));
    let _ = set_remote_calls;
}

#[tokio::test]
async fn pull_existing_under_skip_mode_is_a_noop_without_git_calls() {
    let root = tempdir().unwrap();
    let fake = Arc::new(FakeGitExecutor::default());
    let git: Arc<dyn GitExecutor> = Arc::clone(&fake);

    let plan = vec![entry(root.path(), "widgets", PlanAction::PullExisting)];
    let summary = sync_all(plan, 4, git, CancellationToken::new(), None, UpdateMode::Skip).await;
    assert_eq!(summary.succeeded, 1);
    assert!(matches!(summary.results[0].outcome, SyncOutcome::Skipped { .. }));

    assert!(fake.pull_calls.lock().unwrap().is_empty());
    assert!(fake.set_remote_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pull_existing_merge_conflict_is_nonfatal_to_batch() {
    let root = tempdir().unwrap();
    let fake = FakeGitExecutor::default();
    let conflicted = root.path().join("acme").join("conflicted");
    fake.pull_is_merge_conflict.lock().unwrap().push(conflicted);
    let git: Arc<dyn GitExecutor> = Arc::new(fake);

    let plan = vec![
        entry(root.path(), "conflicted", PlanAction::PullExisting),
        entry(root.path(), "clean", PlanAction::PullExisting),
    ];
    let summary = sync_all(plan, 4, git, CancellationToken::new(), None, UpdateMode::Pull).await;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    let conflict_result = summary
        .results
        .iter()
        .find(|r| r.display_name.contains("conflicted"))
        .unwrap();
    assert!(matches!(conflict_result.outcome, SyncOutcome::MergeConflict { .. }));
}

#[tokio::test]
async fn force_replace_deletes_then_clones() {
    let root = tempdir().unwrap();
    let path = root.path().join("acme").join("stale");
    std::fs::create_dir_all(path.join(".git")).unwrap();
    std::fs::write(path.join("leftover.txt"), b"old").unwrap();

    let git: Arc<dyn GitExecutor> = Arc::new(FakeGitExecutor::default());
    let plan = vec![entry(root.path(), "stale", PlanAction::ForceReplace)];
    let summary = sync_all(plan, 4, git, CancellationToken::new(), None, UpdateMode::Force).await;
    assert_eq!(summary.succeeded, 1);
    assert!(matches!(summary.results[0].outcome, SyncOutcome::ForceReplaced));
    assert!(!path.join("leftover.txt").exists());
}

#[tokio::test]
async fn cancellation_before_start_marks_entries_cancelled() {
    let root = tempdir().unwrap();
    let git: Arc<dyn GitExecutor> = Arc::new(FakeGitExecutor::default());
    let cancellation = CancellationToken::new();
    cancellation.cancel();

    let plan = vec![entry(root.path(), "widgets", PlanAction::CloneNew)];
    let summary = sync_all(plan, 4, git, cancellation, None, UpdateMode::Pull).await;
    assert_eq!(summary.cancelled, 1);
    assert_eq!(summary.succeeded, 0);
}

#[tokio::test]
async fn progress_callback_invoked_once_per_entry() {
    let root = tempdir().unwrap();
    let git: Arc<dyn GitExecutor> = Arc::new(FakeGitExecutor::default());
    let calls = Arc::new(Mutex::new(Vec::new()));
    let calls_clone = Arc::clone(&calls);
    let callback: ProgressCallback = Arc::new(move |completed, total, _last| {
        calls_clone.lock().unwrap().push((completed, total));
    });

    let plan = vec![
        entry(root.path(), "one", PlanAction::CloneNew),
        entry(root.path(), "two", PlanAction::CloneNew),
    ];
    sync_all(plan, 4, git, CancellationToken::new(), Some(callback), UpdateMode::Pull).await;
    let recorded = calls.lock().unwrap();
    assert_eq!(recorded.len(), 2);
    assert!(recorded.iter().all(|(_, total)| *total == 2));
}

#[tokio::test]
async fn cancellation_mid_flight_abandons_running_clone() {
    let root = tempdir().unwrap();
    let fake = FakeGitExecutor {
        clone_delay: Some(Duration::from_secs(3600)),
        ..Default::default()
    };
    let git: Arc<dyn GitExecutor> = Arc::new(fake);
    let cancellation = CancellationToken::new();

    let plan = vec![entry(root.path(), "slow", PlanAction::CloneNew)];
    let cancel_trigger = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel_trigger.cancel();
    });

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        sync_all(plan, 1, git, cancellation, None, UpdateMode::Pull),
    )
    .await
    .expect("sync_all must return promptly once cancelled, not wait for the stuck clone");

    assert_eq!(summary.cancelled, 1);
    assert_eq!(summary.succeeded, 0);
}

#[test]
fn cancellation_token_reflects_cancel_call() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
    token.cancel();
    assert!(token.is_cancelled());
}
