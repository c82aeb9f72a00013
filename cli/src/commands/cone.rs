//! `voquest cone` subcommand

use anyhow::Result;
use clap::Args;
use tracing::info;
use voquest_core::dal::protocols::ScsService;
use voquest_core::dal::DalConnection;
use voquest_core::VoConfig;

use crate::commands::service_base_url;
use crate::coords;
use crate::output::{self, OutputOptions};

#[derive(Args)]
pub struct ConeArgs {
    /// Service base URL or IVOA identifier
    #[arg(value_name = "SERVICE")]
    pub service: String,

    /// Right ascension of the cone center (decimal degrees or sexagesimal)
    #[arg(value_name = "RA")]
    pub ra: String,

    /// Declination of the cone center (decimal degrees or sexagesimal)
    #[arg(value_name = "DEC")]
    pub dec: String,

    /// Search radius in degrees
    #[arg(value_name = "RADIUS")]
    pub radius: f64,

    /// Verbosity level (0-3) controlling how many columns services return
    #[arg(long, value_name = "N")]
    pub verb: Option<u8>,
}

pub async fn execute(args: &ConeArgs, config: &VoConfig, opts: &OutputOptions) -> Result<()> {
    let ra = coords::parse_ra(&args.ra)?;
    let dec = coords::parse_dec(&args.dec)?;

    let connection = DalConnection::from_config(config)?;
    let base_url = service_base_url(&args.service, config, &connection).await?;
    let service = ScsService::new(base_url, connection);

    let mut query = service.create_query();
    query.set_pos(ra, dec)?;
    query.set_radius(args.radius)?;
    if let Some(verb) = args.verb {
        query.set_verbosity(verb)?;
    }

    info!("cone of {} deg around {:.5},{:.5}", args.radius, ra, dec);
    let results = query.execute().await?;
    output::print_results(results.as_dal(), opts)
}
