use anyhow::Context;
use tracing::{Level, info, warn};

use pack_server::catalog::CatalogManifest;
use pack_server::config::AppConfig;
use pack_server::state::AppState;
use pack_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db).await?;
    seed::ensure_constraints(&db)
        .await
        .context("Failed to install supply constraints")?;

    if config.catalog.seed_on_startup {
        match &config.catalog.manifest {
            Some(path) => {
                let manifest = CatalogManifest::load(path)?;
                seed::seed_catalog(
                    &db,
                    &manifest,
                    config.catalog.supply_target,
                    config.catalog.supply_seed,
                )
                .await
                .context("Failed to seed catalog")?;
            }
            None => warn!("catalog.seed_on_startup is set but catalog.manifest is not; skipping"),
        }
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
