//! # Multi-Provider Resolver
//!
//! Fans a query out to the selected providers concurrently behind a
//! semaphore, aggregates results, deduplicates, and preserves a per-provider
//! success/failure outcome.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::PROVIDER_CONCURRENCY_CAP;
use crate::error::ErrorKind;
use crate::pattern::PatternAnalysis;
use crate::provider::{ProviderError, ProviderQuery};
use crate::registry::ProviderRegistry;
use crate::repository::RepositoryDescriptor;

/// One provider's failure, retained for the summary.
#[derive(Debug, Clone)]
pub struct FailedProvider {
    pub name: String,
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&ProviderError> for ErrorKind {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::Auth { .. } => ErrorKind::Auth,
            ProviderError::RateLimited { .. } => ErrorKind::RateLimited,
            ProviderError::Network { .. } => ErrorKind::Network,
            ProviderError::Protocol { .. } => ErrorKind::Internal,
            ProviderError::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

/// Outcome of resolving one query across the registry.
///
/// Invariant: `repositories.len() == total_found - duplicates_removed`.
#[derive(Debug, Clone)]
pub struct ResolverResult {
    pub repositories: Vec<RepositoryDescriptor>,
    pub successful_providers: Vec<String>,
    pub failed_providers: Vec<FailedProvider>,
    pub total_found: usize,
    pub duplicates_removed: usize,
    pub query: String,
}

/// Resolution failed outright: no provider returned any result and at
/// least one provider errored.
#[derive(Debug, thiserror::Error)]
#[error("resolution failed: no providers returned results ({failed_count} failed)")]
pub struct ResolutionFailed {
    pub failed_count: usize,
    pub failures: Vec<FailedProvider>,
}

/// Select which registry entries a query fans out to: explicit provider
/// name, a wildcard org-segment-as-provider-selector, or every configured
/// provider when the query is multi-provider.
fn select_providers<'a>(
    registry: &'a ProviderRegistry,
    analysis: &PatternAnalysis,
) -> Vec<&'a crate::registry::RegistryEntry> {
    if let Some(provider_name) = &analysis.provider_segment {
        return registry.get(provider_name).into_iter().collect();
    }

    if analysis.is_multi_provider && crate::glob::is_glob(&analysis.org_segment) {
        return registry.select_by_glob(&analysis.org_segment);
    }

    registry.all().iter().collect()
}

/// Evaluate a query across the selected providers, deduplicate, and report
/// per-provider outcome. Never returns `Err` for partial failure; only a
/// total failure (zero providers, zero results and a failure) surfaces as
/// [`ResolutionFailed`].
pub async fn resolve(
    registry: &ProviderRegistry,
    analysis: &PatternAnalysis,
) -> Result<ResolverResult, ResolutionFailed> {
    let selected = select_providers(registry, analysis);
    let query_string = analysis.normalized.clone();

    if selected.is_empty() {
        return Ok(ResolverResult {
            repositories: Vec::new(),
            successful_providers: Vec::new(),
            failed_providers: Vec::new(),
            total_found: 0,
            duplicates_removed: 0,
            query: query_string,
        });
    }

    let permits = std::cmp::min(PROVIDER_CONCURRENCY_CAP, selected.len());
    let semaphore = Arc::new(Semaphore::new(permits));

    let org_segment = analysis.org_segment.clone();
    let middle_segment = analysis.middle_segment.clone();
    let repo_segment = analysis.repo_segment.clone();

    let mut tasks = FuturesUnordered::new();
    for entry in &selected {
        let semaphore = Arc::clone(&semaphore);
        let adapter = Arc::clone(&entry.adapter);
        let name = entry.name.clone();
        let org_segment = org_segment.clone();
        let middle_segment = middle_segment.clone();
        let repo_segment = repo_segment.clone();

        tasks.push(async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("resolver semaphore never closes early");
            let query = ProviderQuery {
                org_segment: &org_segment,
                middle_segment: &middle_segment,
                repo_segment: &repo_segment,
            };
            let outcome = adapter.list_repositories(&query).await;
            (name, outcome)
        });
    }

    // registry order (alphabetical) is preserved for the eventual
    // deduplication pass below, independent of completion order.
    let mut by_provider: std::collections::HashMap<String, Result<Vec<RepositoryDescriptor>, ProviderError>> =
        std::collections::HashMap::new();
    while let Some((name, outcome)) = tasks.next().await {
        if let Err(err) = &outcome {
            debug!(provider = %name, error = %err, "provider failed during resolution");
        }
        by_provider.insert(name, outcome);
    }

    let mut successful_providers = Vec::new();
    let mut failed_providers = Vec::new();
    let mut ordered_repos: Vec<(String, RepositoryDescriptor)> = Vec::new();

    for entry in &selected {
        match by_provider.remove(&entry.name) {
            Some(Ok(repos)) => {
                successful_providers.push(entry.name.clone());
                for repo in repos {
                    ordered_repos.push((entry.name.clone(), repo));
                }
            }
            Some(Err(err)) => {
                failed_providers.push(FailedProvider {
                    name: entry.name.clone(),
                    error_kind: ErrorKind::from(&err),
                    message: err.to_string(),
                });
            }
            None => {}
        }
    }

    let total_found = ordered_repos.len();

    let mut seen_primary: HashSet<(String, String)> = HashSet::new();
    let mut seen_secondary: HashSet<String> = HashSet::new();
    let mut deduplicated = Vec::with_capacity(total_found);
    let mut duplicates_removed = 0usize;

    for (_, repo) in ordered_repos {
        let secondary = repo.secondary_key().to_string();
        if seen_secondary.contains(&secondary) {
            duplicates_removed += 1;
            continue;
        }
        let primary = repo.primary_key();
        if seen_primary.contains(&primary) {
            duplicates_removed += 1;
            continue;
        }
        seen_primary.insert(primary);
        seen_secondary.insert(secondary);
        deduplicated.push(repo);
    }

    if deduplicated.is_empty() && successful_providers.is_empty() && !failed_providers.is_empty() {
        warn!(query = %query_string, "resolution failed: every provider errored");
        return Err(ResolutionFailed {
            failed_count: failed_providers.len(),
            failures: failed_providers,
        });
    }

    Ok(ResolverResult {
        repositories: deduplicated,
        successful_providers,
        failed_providers,
        total_found,
        duplicates_removed,
        query: query_string,
    })
}

/// Apply an optional result limit. Always applied after deduplication, so a
/// provider with many more results cannot starve the others of
/// representation.
pub fn apply_limit(result: &mut ResolverResult, limit: Option<usize>) {
    if let Some(limit) = limit {
        result.repositories.truncate(limit);
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
