//! `voquest registry` subcommand

use anyhow::Result;
use clap::Args;
use tracing::info;
use voquest_core::dal::DalConnection;
use voquest_core::registry::{RegistryService, ServiceType, Waveband};
use voquest_core::VoConfig;

use crate::output::{self, table, OutputOptions};

#[derive(Args)]
pub struct RegistryArgs {
    /// Keyword phrases to match against registry records
    #[arg(value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Restrict to services of this type (catalog, image, spectrum, line, tap)
    #[arg(long = "type", value_name = "TYPE")]
    pub service_type: Option<String>,

    /// Restrict to resources with data in this waveband
    #[arg(long, value_name = "BAND")]
    pub waveband: Option<String>,

    /// Extra SQL predicate AND-ed onto the search
    #[arg(long, value_name = "SQL")]
    pub predicate: Option<String>,

    /// Require every keyword to match instead of any one
    #[arg(long)]
    pub all: bool,
}

pub async fn execute(args: &RegistryArgs, config: &VoConfig, opts: &OutputOptions) -> Result<()> {
    let connection = DalConnection::from_config(config)?;
    let registry = RegistryService::with_base_url(&config.registry_base_url, connection);

    let mut query = registry.create_query();
    if let Some(name) = &args.service_type {
        query.set_service_type(ServiceType::from_name(name)?);
    }
    if let Some(name) = &args.waveband {
        query.set_waveband(Waveband::from_name(name)?);
    }
    if let Some(pred) = &args.predicate {
        query.add_predicate(pred.clone());
    }
    if args.all {
        query.set_or_keywords(false);
    }
    query.add_keywords(&args.keywords);

    info!("🔍 searching {}", registry.base_url());
    let results = query.execute().await?;

    if opts.json || opts.columns.is_some() {
        return output::print_results(results.as_dal(), opts);
    }

    let headers = ["Short Name", "Title", "Identifier", "Capability", "Waveband"];
    let rows: Vec<Vec<String>> = results
        .iter()
        .take(output::display_limit(opts, results.len()))
        .map(|res| {
            vec![
                res.short_name().unwrap_or("").to_string(),
                res.title().unwrap_or("").to_string(),
                res.ivoid().unwrap_or("").to_string(),
                res.capability().unwrap_or("").to_string(),
                res.waveband().join(","),
            ]
        })
        .collect();
    table::print(&headers, &rows);
    output::print_row_count(rows.len(), results.len());
    Ok(())
}
