use std::sync::Arc;

use tracing::{error, info};

use feedsync::{
    Config, Database, HttpFeedFetcher, SettingsService, SqliteDocumentStore, SyncEngine,
    SyncScheduler, WebServer,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = feedsync::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        feedsync::logging::init_console_only(&config.logging.level);
    }

    info!("feedsync {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> feedsync::Result<()> {
    let db = Database::open(&config.database.path).await?;

    let store = Arc::new(SqliteDocumentStore::new(db.clone()));
    let fetcher = Arc::new(HttpFeedFetcher::new(&config.sync)?);
    let engine = Arc::new(SyncEngine::new(store, fetcher, &config.sync));
    let settings = Arc::new(SettingsService::new(db, engine));

    let interval = config.sync.refresh_interval_secs;

    if config.web.enabled {
        if interval > 0 {
            let _scheduler = SyncScheduler::new(settings.clone(), interval).start();
        }
        let server = WebServer::new(&config.web, settings)?;
        return server.run().await;
    }

    if interval > 0 {
        SyncScheduler::new(settings, interval).run().await;
        return Ok(());
    }

    let report = settings.run_sync().await?;
    info!("Sync complete: {}", report.summary());
    Ok(())
}
