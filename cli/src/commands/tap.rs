//! `voquest tap` subcommand

use anyhow::Result;
use clap::Args;
use tracing::info;
use voquest_core::dal::protocols::TapService;
use voquest_core::dal::DalConnection;
use voquest_core::VoConfig;

use crate::commands::service_base_url;
use crate::output::{self, OutputOptions};

#[derive(Args)]
pub struct TapArgs {
    /// Service base URL or IVOA identifier
    #[arg(value_name = "SERVICE")]
    pub service: String,

    /// The ADQL statement to run
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Cap on the number of rows the service may return
    #[arg(long, value_name = "N")]
    pub maxrec: Option<u64>,
}

pub async fn execute(args: &TapArgs, config: &VoConfig, opts: &OutputOptions) -> Result<()> {
    let connection = DalConnection::from_config(config)?;
    let base_url = service_base_url(&args.service, config, &connection).await?;
    let service = TapService::new(base_url, connection);

    let mut query = service.create_query(&args.query)?;
    if let Some(maxrec) = args.maxrec.or(config.max_records) {
        query.set_maxrec(maxrec);
    }

    info!("submitting query to {}", query.sync_url()?);
    let results = query.execute().await?;
    output::print_results(results.as_dal(), opts)
}
