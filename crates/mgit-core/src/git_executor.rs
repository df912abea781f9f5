//! # Git Executor
//!
//! Wraps `git` invocation as an asynchronous subprocess: environment
//! scrubbing, bounded output capture, and exit-code classification.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

/// Beyond this many bytes, captured stdout/stderr is truncated, keeping the
/// head and tail and dropping the middle.
const OUTPUT_CAPTURE_LIMIT: usize = 64 * 1024;

/// Git network operations carry a fixed timeout; not configurable.
const GIT_NETWORK_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GitOutcome {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl GitOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Non-zero exit codes are mapped into one of these via stderr pattern
/// matching; unmatched cases fall through as `UnknownGitError`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GitExecutorError {
    #[error("network error running git {command}: {stderr_tail}")]
    NetworkError { command: String, stderr_tail: String },

    #[error("authentication failed running git {command}: {stderr_tail}")]
    AuthError { command: String, stderr_tail: String },

    #[error("git {command} reported not found: {stderr_tail}")]
    NotFoundError { command: String, stderr_tail: String },

    #[error("repository at target appears corrupt: {stderr_tail}")]
    RepositoryCorrupt { command: String, stderr_tail: String },

    #[error("fast-forward pull failed: {stderr_tail}")]
    MergeConflict { command: String, stderr_tail: String },

    #[error("git {command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("git {command} failed: {stderr_tail}")]
    UnknownGitError { command: String, stderr_tail: String },
}

impl GitExecutorError {
    /// Classify a non-zero exit outcome by matching on its stderr. Matching
    /// is deliberately conservative: an unrecognized message is better
    /// reported as `UnknownGitError` with the full tail than silently
    /// mis-classified.
    pub fn classify(command: &str, outcome: &GitOutcome) -> Self {
        let stderr = outcome.stderr.to_lowercase();
        let stderr_tail = tail(&outcome.stderr, 2048);
        let command = command.to_string();

        if stderr.contains("could not resolve host")
            || stderr.contains("connection timed out")
            || stderr.contains("network is unreachable")
            || stderr.contains("failed to connect")
        {
            return GitExecutorError::NetworkError {
                command,
                stderr_tail,
            };
        }
        if stderr.contains("authentication failed")
            || stderr.contains("permission denied")
            || stderr.contains("invalid credentials")
            || stderr.contains("403")
        {
            return GitExecutorError::AuthError {
                command,
                stderr_tail,
            };
        }
        if stderr.contains("repository not found") || stderr.contains("does not exist") {
            return GitExecutorError::NotFoundError {
                command,
                stderr_tail,
            };
        }
        if stderr.contains("not a git repository") || stderr.contains("fatal: bad object") {
            return GitExecutorError::RepositoryCorrupt {
                command,
                stderr_tail,
            };
        }
        if stderr.contains("not possible to fast-forward")
            || stderr.contains("non-fast-forward")
            || stderr.contains("would be overwritten by merge")
        {
            return GitExecutorError::MergeConflict {
                command,
                stderr_tail,
            };
        }
        GitExecutorError::UnknownGitError {
            command,
            stderr_tail,
        }
    }
}

/// Truncate a string to at most `limit` bytes at a UTF-8 boundary, keeping
/// the head and tail and marking the elision.
fn bound_output(raw: Vec<u8>, limit: usize) -> String {
    let text = String::from_utf8_lossy(&raw).into_owned();
    if text.len() <= limit {
        return text;
    }
    let half = limit / 2;
    let head_end = floor_char_boundary(&text, half);
    let tail_start = ceil_char_boundary(&text, text.len() - half);
    format!(
        "{}\n... [truncated {} bytes] ...\n{}",
        &text[..head_end],
        text.len() - head_end - (text.len() - tail_start),
        &text[tail_start..]
    )
}

fn tail(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        text.to_string()
    } else {
        let start = ceil_char_boundary(text, text.len() - limit);
        text[start..].to_string()
    }
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Uniform contract the bulk sync engine and path planner invoke Git
/// through. Kept as a trait so tests can substitute a fake without
/// shelling out.
#[async_trait]
pub trait GitExecutor: Send + Sync {
    async fn clone(&self, clone_url: &str, target_path: &Path) -> Result<GitOutcome, GitExecutorError>;
    async fn pull_fast_forward(&self, target_path: &Path) -> Result<GitOutcome, GitExecutorError>;
    async fn set_remote_url(&self, target_path: &Path, url: &str) -> Result<GitOutcome, GitExecutorError>;
    async fn remote_url(&self, target_path: &Path) -> Result<Option<String>, GitExecutorError>;
    async fn is_working_tree_dirty(&self, target_path: &Path) -> Result<bool, GitExecutorError>;
    async fn status_porcelain(&self, target_path: &Path) -> Result<String, GitExecutorError>;
}

/// Shells out to a real `git` binary on `$PATH`.
pub struct SystemGitExecutor {
    binary: String,
}

impl Default for SystemGitExecutor {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
        }
    }
}

impl SystemGitExecutor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(
        &self,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<GitOutcome, GitExecutorError> {
        let command_label = args.join(" ");
        let started = Instant::now();

        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Force non-interactive: no credential prompt, no terminal
            // editor, deterministic locale for message matching.
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_ASKPASS", "")
            .env("GCM_INTERACTIVE", "Never")
            .env("LC_ALL", "C")
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let spawn = command.output();
        let output = match timeout(GIT_NETWORK_TIMEOUT, spawn).await {
            Ok(result) => result.map_err(|io_err| GitExecutorError::UnknownGitError {
                command: command_label.clone(),
                stderr_tail: io_err.to_string(),
            })?,
            Err(_) => {
                return Err(GitExecutorError::Timeout {
                    command: command_label,
                    seconds: GIT_NETWORK_TIMEOUT.as_secs(),
                })
            }
        };

        let outcome = GitOutcome {
            exit_code: output.status.code(),
            stdout: bound_output(output.stdout, OUTPUT_CAPTURE_LIMIT),
            stderr: bound_output(output.stderr, OUTPUT_CAPTURE_LIMIT),
            duration: started.elapsed(),
        };

        if outcome.success() {
            Ok(outcome)
        } else {
            Err(GitExecutorError::classify(&command_label, &outcome))
        }
    }
}

#[async_trait]
impl GitExecutor for SystemGitExecutor {
    async fn clone(&self, clone_url: &str, target_path: &Path) -> Result<GitOutcome, GitExecutorError> {
        self.run(
            &["clone", "--", clone_url, &target_path.to_string_lossy()],
            None,
        )
        .await
    }

    async fn pull_fast_forward(&self, target_path: &Path) -> Result<GitOutcome, GitExecutorError> {
        self.run(&["pull", "--ff-only"], Some(target_path)).await
    }

    async fn set_remote_url(&self, target_path: &Path, url: &str) -> Result<GitOutcome, GitExecutorError> {
        self.run(&["remote", "set-url", "origin", url], Some(target_path))
            .await
    }

    async fn remote_url(&self, target_path: &Path) -> Result<Option<String>, GitExecutorError> {
        match self
            .run(&["remote", "get-url", "origin"], Some(target_path))
            .await
        {
            Ok(outcome) => Ok(Some(outcome.stdout.trim().to_string())),
            Err(GitExecutorError::UnknownGitError { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    async fn is_working_tree_dirty(&self, target_path: &Path) -> Result<bool, GitExecutorError> {
        let status = self.status_porcelain(target_path).await?;
        Ok(!status.trim().is_empty())
    }

    async fn status_porcelain(&self, target_path: &Path) -> Result<String, GitExecutorError> {
        let outcome = self
            .run(&["status", "--porcelain"], Some(target_path))
            .await?;
        Ok(outcome.stdout)
    }
}

#[cfg(test)]
#[path = "git_executor_tests.rs"]
mod tests;
