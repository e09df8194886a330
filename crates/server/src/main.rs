use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookmirror_core::{
    load_config, metrics, validate_config, BestsellerScraper, BrowserEngine, CatalogStore,
    CategoryCrawler, Config, HttpEngine, NavigationSync, ProductEnricher, SqliteStore,
};

use bookmirror_server::api::create_router;
use bookmirror_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path; an explicitly named file must exist, the
    // default one is optional.
    let config = match std::env::var("BOOKMIRROR_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {:?}", path);
            load_config(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
        Err(_) => {
            let path = PathBuf::from("config.toml");
            if path.exists() {
                info!("Loading configuration from {:?}", path);
                load_config(&path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?
            } else {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");
    info!("Mirroring {}", config.site.base_url);
    info!("Database path: {:?}", config.database.path);

    metrics::register_metrics();

    // Create the SQLite-backed catalog store
    let store: Arc<dyn CatalogStore> = Arc::new(
        SqliteStore::new(&config.database.path).context("Failed to create catalog store")?,
    );
    info!("Catalog store initialized");

    // Create the HTTP fetch engine
    let engine: Arc<dyn BrowserEngine> =
        Arc::new(HttpEngine::new(&config.site).context("Failed to create fetch engine")?);

    // Wire up the crawl components
    let navigation = Arc::new(NavigationSync::new(
        Arc::clone(&store),
        Arc::clone(&engine),
        config.site.clone(),
        config.crawler.clone(),
    ));
    let crawler = Arc::new(CategoryCrawler::new(
        Arc::clone(&store),
        Arc::clone(&engine),
        Arc::clone(&navigation),
        config.crawler.clone(),
    ));
    let bestsellers = Arc::new(BestsellerScraper::new(
        Arc::clone(&store),
        Arc::clone(&engine),
        config.site.clone(),
        config.crawler.clone(),
    ));
    let enricher = Arc::new(ProductEnricher::new(
        Arc::clone(&store),
        Arc::clone(&engine),
        config.site.clone(),
        config.crawler.clone(),
    ));

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        navigation,
        crawler,
        bestsellers,
        enricher,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
