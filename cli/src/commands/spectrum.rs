//! `voquest spectrum` subcommand

use anyhow::Result;
use clap::Args;
use tracing::info;
use voquest_core::dal::protocols::SsaService;
use voquest_core::dal::DalConnection;
use voquest_core::VoConfig;

use crate::commands::service_base_url;
use crate::coords;
use crate::output::{self, table, OutputOptions};

#[derive(Args)]
pub struct SpectrumArgs {
    /// Service base URL or IVOA identifier
    #[arg(value_name = "SERVICE")]
    pub service: String,

    /// Right ascension of the region center (decimal degrees or sexagesimal)
    #[arg(value_name = "RA")]
    pub ra: String,

    /// Declination of the region center (decimal degrees or sexagesimal)
    #[arg(value_name = "DEC")]
    pub dec: String,

    /// Region diameter in degrees
    #[arg(value_name = "DIAMETER")]
    pub diameter: f64,

    /// Spectral band constraint, e.g. 1e-7/3e-6 (meters) or J
    #[arg(long, value_name = "BAND")]
    pub band: Option<String>,

    /// Epoch constraint, e.g. 2010-01-01/2010-06-30
    #[arg(long, value_name = "TIME")]
    pub time: Option<String>,

    /// Serialization constraint, e.g. application/fits
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

pub async fn execute(args: &SpectrumArgs, config: &VoConfig, opts: &OutputOptions) -> Result<()> {
    let ra = coords::parse_ra(&args.ra)?;
    let dec = coords::parse_dec(&args.dec)?;

    let connection = DalConnection::from_config(config)?;
    let base_url = service_base_url(&args.service, config, &connection).await?;
    let service = SsaService::new(base_url, connection);

    let mut query = service.create_query();
    query.set_pos(ra, dec)?;
    query.set_size(args.diameter)?;
    if let Some(band) = &args.band {
        query.set_band(band);
    }
    if let Some(time) = &args.time {
        query.set_time(time);
    }
    if let Some(format) = &args.format {
        query.set_format(format);
    }

    info!("searching spectra around {:.5},{:.5}", ra, dec);
    let results = query.execute().await?;

    if opts.json || opts.columns.is_some() {
        return output::print_results(results.as_dal(), opts);
    }

    let headers = ["Title", "Target", "Format", "Access URL"];
    let rows: Vec<Vec<String>> = results
        .iter()
        .take(output::display_limit(opts, results.len()))
        .map(|spec| {
            vec![
                spec.title().unwrap_or("").to_string(),
                spec.target_name().unwrap_or("").to_string(),
                spec.format().unwrap_or("").to_string(),
                spec.acref().unwrap_or("").to_string(),
            ]
        })
        .collect();
    table::print(&headers, &rows);
    output::print_row_count(rows.len(), results.len());
    Ok(())
}
