//! Subcommand implementations

pub mod cone;
pub mod image;
pub mod lines;
pub mod registry;
pub mod resolve;
pub mod spectrum;
pub mod tap;

use anyhow::{anyhow, Result};
use tracing::info;
use voquest_core::dal::DalConnection;
use voquest_core::registry::RegistryService;
use voquest_core::VoConfig;

/// Resolve a service argument to a base URL.
///
/// Plain URLs pass through untouched; `ivo://` identifiers are looked up
/// in the registry and replaced by the record's access URL.
pub(crate) async fn service_base_url(
    spec: &str,
    config: &VoConfig,
    connection: &DalConnection,
) -> Result<String> {
    if !spec.starts_with("ivo://") {
        return Ok(spec.to_string());
    }
    let registry = RegistryService::with_base_url(&config.registry_base_url, connection.clone());
    let results = registry.resolve(spec).await?;
    let resource = results
        .resource(0)
        .ok_or_else(|| anyhow!("registry returned no record for {spec}"))?;
    let url = resource
        .access_url()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| anyhow!("resource {spec} has no access URL"))?
        .to_string();
    info!("🔭 resolved {} to {}", spec, url);
    Ok(url)
}
