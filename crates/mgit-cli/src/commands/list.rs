//! `list` orchestrator: 4.A -> 4.D -> 4.E, then render.

use mgit_core::{EffectiveConfig, ProviderRegistry};

use crate::reporting::{render_list, ListFormat};
use crate::CliError;

pub async fn run(
    query: &str,
    provider: Option<&str>,
    format: ListFormat,
    limit: Option<usize>,
    config: &EffectiveConfig,
) -> Result<(), CliError> {
    let analysis = mgit_core::analyze(query, provider);
    if !analysis.is_valid() {
        return Err(CliError::Validation(format!(
            "invalid query '{query}': {:?}",
            analysis.validation_errors
        )));
    }

    if let Some(name) = provider {
        if config.find(name).is_none() {
            return Err(CliError::Validation(format!(
                "no configured provider named '{name}'"
            )));
        }
    }

    let registry = ProviderRegistry::from_config(config);
    if registry.is_empty() {
        tracing::info!("no providers configured");
        println!("no providers configured");
        return Ok(());
    }

    let mut result = mgit_core::resolve(&registry, &analysis)
        .await
        .map_err(|err| CliError::ResolverFailed(err.to_string()))?;
    mgit_core::apply_limit(&mut result, limit);

    render_list(&result, format);
    Ok(())
}
