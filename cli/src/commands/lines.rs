//! `voquest lines` subcommand

use anyhow::Result;
use clap::Args;
use tracing::info;
use voquest_core::dal::protocols::SlaService;
use voquest_core::dal::DalConnection;
use voquest_core::VoConfig;

use crate::commands::service_base_url;
use crate::output::{self, table, OutputOptions};

#[derive(Args)]
pub struct LinesArgs {
    /// Service base URL or IVOA identifier
    #[arg(value_name = "SERVICE")]
    pub service: String,

    /// Lower wavelength bound in meters
    #[arg(value_name = "MIN")]
    pub min_wavelength: f64,

    /// Upper wavelength bound in meters
    #[arg(value_name = "MAX")]
    pub max_wavelength: f64,
}

pub async fn execute(args: &LinesArgs, config: &VoConfig, opts: &OutputOptions) -> Result<()> {
    let connection = DalConnection::from_config(config)?;
    let base_url = service_base_url(&args.service, config, &connection).await?;
    let service = SlaService::new(base_url, connection);

    let mut query = service.create_query();
    query.set_wavelength(args.min_wavelength, args.max_wavelength)?;

    info!(
        "listing transitions between {:e} and {:e} m",
        args.min_wavelength, args.max_wavelength
    );
    let results = query.execute().await?;

    if opts.json || opts.columns.is_some() {
        return output::print_results(results.as_dal(), opts);
    }

    let headers = ["Title", "Wavelength (m)", "Species"];
    let rows: Vec<Vec<String>> = results
        .iter()
        .take(output::display_limit(opts, results.len()))
        .map(|line| {
            vec![
                line.title().unwrap_or("").to_string(),
                line.wavelength()
                    .map(|w| format!("{:e}", w))
                    .unwrap_or_default(),
                line.species_name().unwrap_or("").to_string(),
            ]
        })
        .collect();
    table::print(&headers, &rows);
    output::print_row_count(rows.len(), results.len());
    Ok(())
}
