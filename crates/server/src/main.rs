use anyhow::Context;
use registrar_server::{
    api::{self, AppState},
    auth::CredentialHasher,
    config::{DEFAULT_CONFIG_PATH, RegistrarConfig},
    db,
    seed::{Catalog, SeedOptions, Seeder},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenvy::dotenv().ok();
    init_tracing()?;

    if let Some(path) = env_file {
        info!(path = %path.display(), "loaded environment file");
    }

    info!("starting registrar server");
    let config_path =
        std::env::var("REGISTRAR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = RegistrarConfig::load(&config_path)
        .with_context(|| format!("failed to load registrar config from {config_path}"))?;

    if config.auth.uses_default_secret() {
        warn!("using the built-in JWT secret, set REGISTRAR_JWT_SECRET outside development");
    }

    let db = db::init_pool_and_migrate(&config.database_url).await?;
    let hasher = CredentialHasher::from_config(&config.auth)
        .context("failed to initialize password hasher")?;

    if config.seed.enabled {
        let catalog = match &config.seed.catalog_path {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::builtin()?,
        };
        let options = SeedOptions::from_config(&config.seed, config.registration.default_capacity);
        let report = Seeder::new(db.clone(), hasher.clone(), catalog, options)?
            .run()
            .await
            .context("failed to seed database")?;
        if report.skipped {
            info!("seed skipped, database already populated");
        }
    } else {
        info!("seeding disabled");
    }

    let state = AppState::with_hasher(db, &config, hasher)?;
    let app = api::router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server is ready, press Ctrl+C to shut down");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received, stopping server");
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
