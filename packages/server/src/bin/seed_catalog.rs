use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};

use pack_server::catalog::CatalogManifest;
use pack_server::config::AppConfig;
use pack_server::{database, seed};

/// Load a catalog manifest into the card supply ledger and pack registry.
#[derive(Parser, Debug)]
#[command(name = "seed-catalog", version)]
struct Args {
    /// TOML catalog manifest. Defaults to `catalog.manifest` from configuration.
    #[arg(long, env = "PACKS_CATALOG_MANIFEST")]
    manifest: Option<PathBuf>,
    /// Total mintable copies across the catalog.
    #[arg(long)]
    supply_target: Option<u64>,
    /// Seed for per-card supply.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
    let args = Args::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let path = args
        .manifest
        .or(config.catalog.manifest.clone())
        .context("No manifest given; pass --manifest or set catalog.manifest")?;
    let manifest = CatalogManifest::load(&path)?;
    info!(path = %path.display(), cards = manifest.cards.len(), packs = manifest.packs.len(), "Loaded catalog manifest");

    let db = database::init_db(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db).await?;
    seed::ensure_constraints(&db).await?;

    let report = seed::seed_catalog(
        &db,
        &manifest,
        args.supply_target.unwrap_or(config.catalog.supply_target),
        args.seed.unwrap_or(config.catalog.supply_seed),
    )
    .await
    .context("Failed to seed catalog")?;

    println!(
        "Seeded {} cards ({} skipped), {} pack types, total supply {}",
        report.cards, report.skipped, report.packs, report.total_supply
    );
    Ok(())
}
