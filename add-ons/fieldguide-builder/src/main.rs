//! Field guide builder: fetches the knowledge base once, scans the notebooks, and writes the
//! filtered table fragments each topic page embeds. Config-driven via CoreConfig.

mod pages;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fieldguide_core::{
    extract_case_studies, ContentCache, CoreConfig, Secrets, TableKind, TagFilterEngine,
    ENV_SHARED_DATA,
};
use fieldguide_notion::NotionClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::pages::PageManifest;

#[derive(Parser)]
#[command(name = "fieldguide-builder", version, about = "Builds the field guide's table fragments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pre-flight check: config, API secret, content root and notebook count.
    Verify,
    /// Build every page listed in the manifest.
    Build {
        #[arg(long, default_value = "config/pages.toml")]
        manifest: PathBuf,
        #[arg(long, default_value = "_build/tables")]
        out: PathBuf,
    },
    /// Print one table fragment. Without --tag the unfiltered listing is printed.
    Show {
        #[arg(long)]
        table: TableKind,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Print the case-study catalog as JSON. Needs no network access.
    Catalog,
}

/// Pre-flight check: config loads, secret present, notebooks discoverable.
fn run_verify() -> Result<(), String> {
    print!("Checking config... ");
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;
    println!("OK ({})", config.site_name);

    print!("Checking NOTION_KEY... ");
    Secrets::from_env().map_err(|e| e.to_string())?;
    println!("OK");

    print!("Checking content root {}... ", config.content_root);
    let catalog = extract_case_studies(Path::new(&config.content_root), &config.notebook_glob)
        .map_err(|e| format!("Notebook scan failed: {}", e))?;
    if catalog.skipped > 0 {
        println!(
            "OK ({} notebooks, {} unreadable)",
            catalog.records.len(),
            catalog.skipped
        );
    } else {
        println!("OK ({} notebooks)", catalog.records.len());
    }

    match &config.shared_data_path {
        Some(path) => println!("{}: {}", ENV_SHARED_DATA, path),
        None => println!("{}: not set", ENV_SHARED_DATA),
    }
    match &config.base_url {
        Some(url) => println!("Links resolve against {}", url),
        None => println!("Links resolve into the local {} directory", config.build_subdir),
    }

    println!("\nSUCCESS: ready to build.");
    Ok(())
}

/// Single knowledge-base pass shared by every page of this run.
async fn build_cache(config: &CoreConfig) -> Result<ContentCache, Box<dyn Error + Send + Sync>> {
    let secrets = Secrets::from_env()?;
    let kb = NotionClient::from_config(config, &secrets)?;
    let cache = ContentCache::build(&kb, config).await;
    let report = cache.report();
    if !report.is_clean() {
        tracing::warn!(
            target: "fieldguide::builder",
            unavailable = ?report.unavailable,
            skipped_records = report.skipped_records,
            skipped_notebooks = report.skipped_notebooks,
            "Build degraded"
        );
    }
    Ok(cache)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Command::Verify = cli.command {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CoreConfig::load()?;

    match cli.command {
        Command::Verify => {}
        Command::Build { manifest, out } => {
            let manifest = PageManifest::load(&manifest)?;
            let cache = build_cache(&config).await?;
            let engine = TagFilterEngine::from_config(&config);
            let written = pages::write_pages(&cache, &engine, &manifest, &out)?;
            tracing::info!(
                target: "fieldguide::builder",
                files = written.len(),
                out = %out.display(),
                "Build complete"
            );
        }
        Command::Show { table, tags } => {
            let cache = build_cache(&config).await?;
            let engine = TagFilterEngine::from_config(&config);
            let view = pages::view(&cache, &engine, table, &tags)?;
            println!("{}", pages::render(&view));
        }
        Command::Catalog => {
            let catalog =
                extract_case_studies(Path::new(&config.content_root), &config.notebook_glob)?;
            println!("{}", serde_json::to_string_pretty(&catalog.records)?);
        }
    }
    Ok(())
}
