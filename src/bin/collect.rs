//! Collects footwear listings from the supported retailers into flat files
//! the catalog server can load.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use footwear_catalog::collector::puma::PumaCollector;
use footwear_catalog::collector::saint_laurent::SaintLaurentCollector;
use footwear_catalog::collector::writer::write_products;
use footwear_catalog::collector::{Collector, CollectorError, HttpFetcher, SiteCollector};
use footwear_catalog::loader::FileFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Site {
    Puma,
    SaintLaurent,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl From<OutputFormat> for FileFormat {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Csv => FileFormat::Csv,
            OutputFormat::Json => FileFormat::Json,
        }
    }
}

/// Scrape footwear listings into CSV or JSON files
#[derive(Parser, Debug)]
#[command(name = "collect")]
#[command(version, about, long_about = None)]
struct Args {
    /// Retailer to collect
    #[arg(long, value_enum, default_value_t = Site::All)]
    site: Site,

    /// Output format; Puma defaults to JSON and Saint Laurent to CSV
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory the files are written to
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Maximum number of listing pages fetched per site
    #[arg(long, default_value_t = 1)]
    max_pages: usize,
}

fn collect_site(
    site: &dyn SiteCollector,
    default_format: FileFormat,
    args: &Args,
    collector: &Collector<HttpFetcher>,
) -> Result<(), CollectorError> {
    let products = collector.run(site)?;
    let format = args.format.map(FileFormat::from).unwrap_or(default_format);
    write_products(&args.output_dir, site.name(), format, &products)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    let collector = Collector::new(fetcher, args.max_pages);

    let mut sites: Vec<(&dyn SiteCollector, FileFormat)> = Vec::new();
    if matches!(args.site, Site::Puma | Site::All) {
        sites.push((&PumaCollector, FileFormat::Json));
    }
    if matches!(args.site, Site::SaintLaurent | Site::All) {
        sites.push((&SaintLaurentCollector, FileFormat::Csv));
    }

    let mut failed = false;
    for (site, default_format) in sites {
        if let Err(e) = collect_site(site, default_format, &args, &collector) {
            log::error!("Failed to collect {}: {e}", site.name());
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
}
