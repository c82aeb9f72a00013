//! voquest command-line interface

mod commands;
mod config;
mod coords;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voquest_core::VoConfig;

use crate::config::loader::CliConfigLoader;
use crate::output::OutputOptions;

#[derive(Parser)]
#[command(
    name = "voquest",
    version,
    about = "Query Virtual Observatory registries and data services",
    long_about = "Query Virtual Observatory registries and data services.\n\n\
                  Service arguments accept either a base URL or an IVOA identifier \
                  (ivo://...), which is resolved through the registry first."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a configuration file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Registry base URL, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    registry_url: Option<String>,

    /// HTTP timeout in seconds, overriding the configuration
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print rows as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Maximum number of rows shown in table output
    #[arg(long, global = true, default_value_t = 25, value_name = "N")]
    limit: usize,

    /// Comma-separated column names to show, replacing the default view
    #[arg(long, global = true, value_name = "NAMES", value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the resource registry
    Registry(commands::registry::RegistryArgs),
    /// Look up one resource by its IVOA identifier
    Resolve(commands::resolve::ResolveArgs),
    /// Cone-search a catalog service for sources around a position
    Cone(commands::cone::ConeArgs),
    /// Find images overlapping a region of the sky
    Image(commands::image::ImageArgs),
    /// Find spectra observed around a position
    Spectrum(commands::spectrum::SpectrumArgs),
    /// List spectral line transitions in a wavelength range
    Lines(commands::lines::LinesArgs),
    /// Run a synchronous ADQL query against a TAP service
    Tap(commands::tap::TapArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        voquest_core::init_tracing_with_debug();
    } else {
        voquest_core::init_tracing();
    }

    let config = load_config(&cli)?;
    let opts = OutputOptions {
        json: cli.json,
        limit: cli.limit,
        columns: cli.columns.clone(),
    };

    match &cli.command {
        Commands::Registry(args) => commands::registry::execute(args, &config, &opts).await,
        Commands::Resolve(args) => commands::resolve::execute(args, &config, &opts).await,
        Commands::Cone(args) => commands::cone::execute(args, &config, &opts).await,
        Commands::Image(args) => commands::image::execute(args, &config, &opts).await,
        Commands::Spectrum(args) => commands::spectrum::execute(args, &config, &opts).await,
        Commands::Lines(args) => commands::lines::execute(args, &config, &opts).await,
        Commands::Tap(args) => commands::tap::execute(args, &config, &opts).await,
    }
}

fn load_config(cli: &Cli) -> Result<VoConfig> {
    let mut config = CliConfigLoader::new(cli.config.clone()).load()?;
    if let Some(url) = &cli.registry_url {
        config.registry_base_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }
    Ok(config)
}
