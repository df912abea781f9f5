//! # mgit-core
//!
//! Core library for the multi-provider Git fleet manager: the query-to-sync
//! pipeline that discovers repositories across heterogeneous Git hosting
//! providers using a unified three-segment query language, then performs
//! bulk clone-or-update synchronization with bounded concurrency and
//! partial-failure tolerance.
//!
//! ## Architecture
//!
//! Business logic depends only on trait abstractions ([`provider::ProviderAdapter`],
//! [`git_executor::GitExecutor`]); infrastructure implementations are
//! injected by the CLI crate. Configuration is loaded once per invocation
//! and never mutated (see [`config::EffectiveConfig`]).
//!
//! Data flow for `sync`: a query is parsed and validated by [`pattern`],
//! providers are selected via [`registry`], [`resolver`] fans the query out
//! to them concurrently and deduplicates, [`path_planner`] maps results onto
//! local paths, and [`sync_engine`] runs Git operations through
//! [`git_executor`] under a semaphore.

pub mod config;
pub mod error;
pub mod git_executor;
pub mod glob;
pub mod path_planner;
pub mod pattern;
pub mod provider;
pub mod registry;
pub mod repository;
pub mod resolver;
pub mod sync_engine;

pub use config::{EffectiveConfig, GlobalConfig, ProviderConfig, ProviderKind, UpdateMode};
pub use error::{ErrorKind, ReportableError};
pub use git_executor::{GitExecutor, GitExecutorError, GitOutcome, SystemGitExecutor};
pub use path_planner::{plan_all, plan_one, target_path, PlanAction, PlanEntry};
pub use pattern::{analyze, PatternAnalysis, PatternValidationError};
pub use provider::{build_adapter, ProviderAdapter, ProviderError, ProviderQuery};
pub use registry::ProviderRegistry;
pub use repository::RepositoryDescriptor;
pub use resolver::{apply_limit, resolve, FailedProvider, ResolutionFailed, ResolverResult};
pub use sync_engine::{
    sync_all, CancellationToken, ProgressCallback, RepoSyncResult, SyncOutcome, SyncSummary,
};
