//! `voquest resolve` subcommand

use anyhow::{anyhow, Result};
use clap::Args;
use console::style;
use voquest_core::dal::DalConnection;
use voquest_core::registry::RegistryService;
use voquest_core::VoConfig;

use crate::output::{self, OutputOptions};

#[derive(Args)]
pub struct ResolveArgs {
    /// The IVOA identifier to look up, e.g. ivo://nasa.heasarc/rosmaster
    #[arg(value_name = "IVOID")]
    pub ivoid: String,
}

pub async fn execute(args: &ResolveArgs, config: &VoConfig, opts: &OutputOptions) -> Result<()> {
    let connection = DalConnection::from_config(config)?;
    let registry = RegistryService::with_base_url(&config.registry_base_url, connection);

    let results = registry.resolve(&args.ivoid).await?;
    if opts.json || opts.columns.is_some() {
        return output::print_results(results.as_dal(), opts);
    }

    let resource = results
        .resource(0)
        .ok_or_else(|| anyhow!("registry returned no record for {}", args.ivoid))?;

    print_field("Title", resource.title().unwrap_or(""));
    print_field("Short name", resource.short_name().unwrap_or(""));
    print_field("Identifier", resource.ivoid().unwrap_or(""));
    print_field("Publisher", resource.publisher().unwrap_or(""));
    print_field("Capability", resource.capability().unwrap_or(""));
    print_field("Standard ID", resource.standard_id().unwrap_or(""));
    print_field("Access URL", resource.access_url().unwrap_or(""));
    print_field("Waveband", &resource.waveband().join(", "));
    print_field("Subjects", &resource.subject().join(", "));
    print_field("Type", &resource.resource_type().join(", "));
    print_field("Content level", &resource.content_level().join(", "));
    if let Some(description) = resource.description() {
        println!();
        println!("{}", description);
    }
    Ok(())
}

fn print_field(label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    println!("{}  {}", style(format!("{:>13}", label)).bold(), value);
}
