use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pharma_papers::export::{print_to_console, save_to_csv};
use pharma_papers::{AffiliationClassifier, Annotator, ClientConfig, IndicatorConfig, PaperFinder, PubMedClient};
use tracing::{debug, info};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "pharma-papers",
    version,
    about = "Find PubMed papers with pharmaceutical or biotech company affiliated authors",
    long_about = "Searches PubMed, keeps papers with at least one non-academic, company-affiliated \
                  author, and writes them as CSV or prints them to the console"
)]
struct Cli {
    /// PubMed search query (full PubMed query syntax)
    query: String,

    /// Save results as CSV to this file (default: print to console)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Maximum number of papers to fetch
    #[arg(short, long, default_value_t = 100)]
    max: usize,

    /// YAML file with academic_indicators and/or industry_indicators lists
    #[arg(long)]
    indicators: Option<PathBuf>,

    /// API key for NCBI E-utilities (increases rate limit)
    #[arg(long, env = "NCBI_API_KEY")]
    api_key: Option<String>,

    /// Email for NCBI requests (recommended)
    #[arg(long, env = "NCBI_EMAIL")]
    email: Option<String>,

    /// Tool name for NCBI requests
    #[arg(long, env = "NCBI_TOOL", default_value = "pharma-papers")]
    tool: String,
}

/// Fail early when results could not be written to `path`
fn validate_output_file(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_file() {
            bail!("Output path {} is not a regular file", path.display());
        }
        OpenOptions::new()
            .append(true)
            .open(path)
            .with_context(|| format!("Output file {} is not writable", path.display()))?;
        return Ok(());
    }

    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !parent.is_dir() {
        bail!(
            "Directory {} for output file {} does not exist",
            parent.display(),
            path.display()
        );
    }

    Ok(())
}

fn build_annotator(indicators: Option<&Path>) -> Result<Annotator> {
    let config = match indicators {
        Some(path) => IndicatorConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load indicators from {}", path.display()))?,
        None => IndicatorConfig::default(),
    };
    debug!(
        academic = config.academic_indicators.len(),
        industry = config.industry_indicators.len(),
        "Indicator lists loaded"
    );

    let classifier = AffiliationClassifier::new(&config).context("Invalid indicator lists")?;
    Ok(Annotator::new(classifier))
}

fn fetch_progress_bar() -> Result<ProgressBar> {
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} papers ({msg})")
            .context("Failed to set progress bar style")?
            .progress_chars("#>-"),
    );
    Ok(progress)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if let Some(path) = &cli.file {
        validate_output_file(path).context("Cannot write to output file")?;
    }

    let annotator = build_annotator(cli.indicators.as_deref())?;

    let mut config = ClientConfig::new().with_tool(&cli.tool);
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key);
    }
    if let Some(email) = &cli.email {
        config = config.with_email(email);
    }

    let finder = PaperFinder::new(PubMedClient::with_config(config), annotator)
        .with_progress(fetch_progress_bar()?);

    info!(query = %cli.query, max = cli.max, "Searching PubMed");
    let papers = finder
        .find(&cli.query, cli.max)
        .await
        .context("Paper search failed")?;

    match &cli.file {
        Some(path) => {
            save_to_csv(&papers, path)
                .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
            info!(count = papers.len(), path = %path.display(), "Results saved");
        }
        None => print_to_console(&papers),
    }

    Ok(())
}
