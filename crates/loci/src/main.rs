mod assets;

use anyhow::{Context, Result};
use clap::Parser;
use loci_engine::backend::Backend;
use loci_engine::bundle::ResolutionBundle;
use loci_engine::config::{ConfigLoader, LociConfig};
use loci_engine::resolution::ResolutionEngine;
use loci_engine::similarity::SimilarityOracle;
use loci_h::HeadlessBackend;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "https://store.steampowered.com/login/?redir=&redir_ssl=1";

#[derive(Parser, Debug)]
#[command(
    name = "loci",
    version,
    about = "Resolve semantic UI targets to durable selectors"
)]
struct Args {
    /// YAML config file (defaults to ./loci.yaml, then ~/.loci/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page to resolve against
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Where to write the JSON bundle
    #[arg(long)]
    out: Option<PathBuf>,

    /// Embedding model name
    #[arg(long)]
    model: Option<String>,

    /// Score with heuristics only
    #[arg(long)]
    no_embeddings: bool,

    /// Launch the browser with a window
    #[arg(long)]
    visible: bool,

    /// Label every interactive element instead of resolving configured targets
    #[arg(long)]
    discover_all: bool,

    /// Also generate the Playwright helper and sample spec
    #[arg(long)]
    update_playwright: bool,

    #[arg(long)]
    playwright_ts: Option<PathBuf>,

    #[arg(long)]
    playwright_spec: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the bundle, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };

    let url = url::Url::parse(&args.url).with_context(|| format!("Invalid URL: {}", args.url))?;

    let mut backend = HeadlessBackend::new_with_visibility(args.visible || config.browser.visible);
    backend
        .launch()
        .await
        .context("Failed to launch backend")?;

    let outcome = run(&mut backend, &args, &config, url.as_str()).await;
    if let Err(e) = backend.close().await {
        tracing::warn!("Failed to close backend: {}", e);
    }
    let bundle = outcome?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| config.output.bundle_path.clone());
    assets::write_json_bundle(&bundle, &out)
        .with_context(|| format!("Failed to write bundle to {}", out.display()))?;
    info!(
        "Resolved {}/{} key(s), bundle written to {}",
        bundle.resolved_count(),
        bundle.resolution.len(),
        out.display()
    );

    if args.update_playwright {
        let ts_path = args
            .playwright_ts
            .clone()
            .unwrap_or_else(|| config.output.playwright_ts.clone());
        let spec_path = args
            .playwright_spec
            .clone()
            .unwrap_or_else(|| config.output.playwright_spec.clone());
        assets::write_playwright_assets(&bundle, &ts_path, &spec_path, url.as_str())
            .context("Failed to write Playwright assets")?;
        info!(
            "Playwright helpers written to {} and {}",
            ts_path.display(),
            spec_path.display()
        );
    }

    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}

async fn run(
    backend: &mut HeadlessBackend,
    args: &Args,
    config: &LociConfig,
    url: &str,
) -> Result<ResolutionBundle> {
    if args.discover_all {
        return Ok(ResolutionEngine::discover(backend, url).await?);
    }

    let oracle = (!args.no_embeddings && config.embedding.enabled).then(|| {
        let model = args
            .model
            .clone()
            .unwrap_or_else(|| config.embedding.model.clone());
        SimilarityOracle::new(model, config.embedding.cache_capacity)
    });

    let targets = config.semantic_targets();
    Ok(ResolutionEngine::resolve(backend, url, &targets, oracle.as_ref()).await?)
}
