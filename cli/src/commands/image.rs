//! `voquest image` subcommand

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;
use voquest_core::dal::protocols::{ImageFormat, Intersect, SiaRecord, SiaResults, SiaService};
use voquest_core::dal::DalConnection;
use voquest_core::VoConfig;

use crate::commands::service_base_url;
use crate::coords;
use crate::output::{self, table, OutputOptions};

#[derive(Args)]
pub struct ImageArgs {
    /// Service base URL or IVOA identifier
    #[arg(value_name = "SERVICE")]
    pub service: String,

    /// Right ascension of the region center (decimal degrees or sexagesimal)
    #[arg(value_name = "RA")]
    pub ra: String,

    /// Declination of the region center (decimal degrees or sexagesimal)
    #[arg(value_name = "DEC")]
    pub dec: String,

    /// Region width in degrees
    #[arg(value_name = "SIZE")]
    pub size: f64,

    /// Region height in degrees, when different from the width
    #[arg(long, value_name = "DEG")]
    pub height: Option<f64>,

    /// Format constraint: ALL, GRAPHIC, METADATA, or a MIME type
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Required overlap: covers, enclosed, center, or overlaps
    #[arg(long, value_name = "MODE")]
    pub intersect: Option<String>,

    /// Verbosity level (0-3) controlling how many columns services return
    #[arg(long, value_name = "N")]
    pub verb: Option<u8>,

    /// Download the first N matched datasets
    #[arg(long, value_name = "N")]
    pub download: Option<usize>,

    /// Directory downloaded datasets are written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

pub async fn execute(args: &ImageArgs, config: &VoConfig, opts: &OutputOptions) -> Result<()> {
    let ra = coords::parse_ra(&args.ra)?;
    let dec = coords::parse_dec(&args.dec)?;

    let connection = DalConnection::from_config(config)?;
    let base_url = service_base_url(&args.service, config, &connection).await?;
    let service = SiaService::new(base_url, connection);

    let mut query = service.create_query();
    query.set_pos(ra, dec)?;
    query.set_size(args.size, args.height)?;
    if let Some(format) = &args.format {
        query.set_format(ImageFormat::from_name(format)?);
    }
    if let Some(mode) = &args.intersect {
        query.set_intersect(Intersect::from_name(mode)?);
    }
    if let Some(verb) = args.verb {
        query.set_verbosity(verb)?;
    }

    info!("searching images around {:.5},{:.5}", ra, dec);
    let results = query.execute().await?;

    if let Some(count) = args.download {
        return download_datasets(&service, &results, count, &args.output_dir).await;
    }

    if opts.json || opts.columns.is_some() {
        return output::print_results(results.as_dal(), opts);
    }

    let headers = ["Title", "RA", "Dec", "Format", "Observed", "Axes"];
    let rows: Vec<Vec<String>> = results
        .iter()
        .take(output::display_limit(opts, results.len()))
        .map(|img| {
            vec![
                img.title().unwrap_or("").to_string(),
                img.ra().map(|v| format!("{:.5}", v)).unwrap_or_default(),
                img.dec().map(|v| format!("{:.5}", v)).unwrap_or_default(),
                img.format().unwrap_or("").to_string(),
                img.date_obs()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
                img.naxis()
                    .map(|axes| {
                        axes.iter()
                            .map(|a| a.to_string())
                            .collect::<Vec<_>>()
                            .join("x")
                    })
                    .unwrap_or_default(),
            ]
        })
        .collect();
    table::print(&headers, &rows);
    output::print_row_count(rows.len(), results.len());
    Ok(())
}

async fn download_datasets(
    service: &SiaService,
    results: &SiaResults,
    count: usize,
    output_dir: &Path,
) -> Result<()> {
    let count = count.min(results.len());
    if count == 0 {
        println!("nothing to download");
        return Ok(());
    }
    tokio::fs::create_dir_all(output_dir).await?;

    for (index, record) in results.iter().take(count).enumerate() {
        let name = dataset_filename(&record, index);
        let path = output_dir.join(&name);
        let bar = dataset_progress(record.filesize())?;
        bar.set_message(format!("[{}/{}] {}", index + 1, count, name));
        let file = tokio::fs::File::create(&path).await?;
        let mut writer = bar.wrap_async_write(file);
        let written = service.download_dataset(&record, &mut writer).await?;
        bar.finish_and_clear();
        debug!("wrote {} bytes to {}", written, path.display());
    }
    println!("{} dataset(s) saved", count);
    Ok(())
}

/// Progress over a dataset's streamed bytes: a sized bar when the record
/// advertises a file size, a byte-counting spinner otherwise
fn dataset_progress(filesize: Option<i64>) -> Result<ProgressBar> {
    let bar = match filesize {
        Some(bytes) if bytes > 0 => ProgressBar::new(bytes as u64).with_style(
            ProgressStyle::with_template("[{bar:30.cyan/blue}] {bytes}/{total_bytes} {msg}")?
                .progress_chars("=>-"),
        ),
        _ => ProgressBar::new_spinner()
            .with_style(ProgressStyle::with_template("{spinner} {bytes} {msg}")?),
    };
    Ok(bar)
}

fn dataset_filename(record: &SiaRecord<'_>, index: usize) -> String {
    filename_from_parts(record.acref(), record.format(), index)
}

/// Pick a filename for a dataset, preferring the last segment of its
/// access URL and falling back to a numbered name with an extension
/// guessed from the MIME type
fn filename_from_parts(acref: Option<&str>, format: Option<&str>, index: usize) -> String {
    let extension = match format {
        Some(f) if f.contains("fits") => "fits",
        Some(f) if f.contains("jpeg") || f.contains("jpg") => "jpg",
        Some(f) if f.contains("png") => "png",
        _ => "dat",
    };
    let stem = acref
        .and_then(|acref| Url::parse(acref).ok())
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .map(sanitize)
        .unwrap_or_else(|| format!("dataset-{:03}", index));
    if stem.contains('.') {
        stem
    } else {
        format!("{}.{}", stem, extension)
    }
}

fn sanitize(name: String) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
