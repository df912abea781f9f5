//! # Reporting
//!
//! Renders resolver/sync/status results to the three supported output
//! shapes: human table, JSON, and JSONL event stream.

use mgit_core::{PlanAction, RepoSyncResult, RepositoryDescriptor, ResolverResult, SyncOutcome};
use serde::Serialize;
use serde_json::json;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ListFormat {
    Human,
    Json,
    Jsonl,
}

pub fn render_list(result: &ResolverResult, format: ListFormat) {
    match format {
        ListFormat::Human => render_list_human(result),
        ListFormat::Json => render_list_json(result),
        ListFormat::Jsonl => render_list_jsonl(result),
    }
}

fn render_list_human(result: &ResolverResult) {
    if result.repositories.is_empty() {
        println!("no repositories found for query '{}'", result.query);
    }
    for repo in &result.repositories {
        println!("{}  {}", repo.display_name(), repo.clone_url);
    }
    if !result.failed_providers.is_empty() {
        eprintln!();
        for failure in &result.failed_providers {
            eprintln!(
                "warning: provider '{}' failed: {}",
                failure.name, failure.message
            );
        }
    }
    eprintln!(
        "{} repositories from {} provider(s), {} duplicate(s) removed",
        result.repositories.len(),
        result.successful_providers.len(),
        result.duplicates_removed
    );
}

#[derive(Serialize)]
struct RepositoryJson<'a> {
    organization: &'a str,
    project: &'a Option<String>,
    name: &'a str,
    clone_url: &'a str,
    default_branch: &'a Option<String>,
    is_private: bool,
    provider: &'a str,
}

impl<'a> From<&'a RepositoryDescriptor> for RepositoryJson<'a> {
    fn from(repo: &'a RepositoryDescriptor) -> Self {
        Self {
            organization: &repo.organization,
            project: &repo.project,
            name: &repo.name,
            clone_url: &repo.clone_url,
            default_branch: &repo.default_branch,
            is_private: repo.is_private,
            provider: &repo.provider_name,
        }
    }
}

fn render_list_json(result: &ResolverResult) {
    let body = json!({
        "repositories": result.repositories.iter().map(RepositoryJson::from).collect::<Vec<_>>(),
        "providers": {
            "successful": result.successful_providers,
            "failed": result.failed_providers.iter().map(|f| json!({
                "name": f.name,
                "error_kind": f.error_kind,
                "message": f.message,
            })).collect::<Vec<_>>(),
        },
        "stats": {
            "total_found": result.total_found,
            "duplicates_removed": result.duplicates_removed,
        },
    });
    println!("{}", serde_json::to_string_pretty(&body).expect("json body is always serializable"));
}

fn render_list_jsonl(result: &ResolverResult) {
    for repo in &result.repositories {
        let line = json!({
            "type": "repository",
            "repository": RepositoryJson::from(repo),
        });
        println!("{}", line);
    }
}

/// Emit one JSONL event as a sync task completes. `--format jsonl` maps
/// each [`RepoSyncResult`] onto this event's schema.
pub fn render_sync_event_jsonl(result: &RepoSyncResult) {
    let (outcome_label, error_kind, message) = classify_outcome(&result.outcome);
    let line = json!({
        "type": "event",
        "repository": result.display_name,
        "action": action_label(result.action),
        "outcome": outcome_label,
        "error_kind": error_kind,
        "message": message,
    });
    println!("{}", line);
}

pub(crate) fn action_label(action: PlanAction) -> &'static str {
    match action {
        PlanAction::CloneNew => "clone_new",
        PlanAction::PullExisting => "pull_existing",
        PlanAction::ForceReplace => "force_replace",
        PlanAction::SkipDirty => "skip_dirty",
        PlanAction::SkipNonRepo => "skip_nonrepo",
    }
}

fn classify_outcome(outcome: &SyncOutcome) -> (&'static str, Option<&'static str>, Option<String>) {
    match outcome {
        SyncOutcome::Cloned | SyncOutcome::Pulled | SyncOutcome::ForceReplaced => ("success", None, None),
        SyncOutcome::Skipped { reason } => ("skip", None, Some(reason.clone())),
        SyncOutcome::MergeConflict { message } => ("failure", Some("merge_conflict"), Some(message.clone())),
        SyncOutcome::Failed { error } => ("failure", None, Some(error.clone())),
        SyncOutcome::Cancelled => ("cancelled", None, None),
    }
}

pub fn render_sync_human(result: &RepoSyncResult) {
    let (outcome_label, _, message) = classify_outcome(&result.outcome);
    match message {
        Some(message) => println!(
            "{:<10} {:<12} {}  ({})",
            outcome_label,
            action_label(result.action),
            result.display_name,
            message
        ),
        None => println!(
            "{:<10} {:<12} {}",
            outcome_label,
            action_label(result.action),
            result.display_name
        ),
    }
}

pub fn render_sync_summary(summary: &mgit_core::SyncSummary) {
    println!(
        "\n{} total, {} succeeded, {} failed, {} cancelled ({:.1}s)",
        summary.total,
        summary.succeeded,
        summary.failed,
        summary.cancelled,
        summary.duration.as_secs_f64()
    );
}
