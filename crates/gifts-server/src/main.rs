//! GIFTS Server - Main entry point

use anyhow::Result;
use gifts_common::logging::{init_logging, LogConfig};
use std::sync::Arc;
use tracing::info;

use gifts_server::{
    api,
    config::Config,
    db,
    external::RestSequenceService,
    features::FeatureState,
    store::{InMemoryStore, MappingStore, PgMappingStore},
    vocabulary::Vocabulary,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("gifts-server")
        .filter_directives("gifts_server=debug,tower_http=debug,sqlx=info")
        .build();

    // Environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or(log_config);
    let _guard = init_logging(&log_config)?;

    info!("Starting GIFTS Server");

    let config = Config::load()?;
    info!("Configuration loaded - server will bind to {}", config.bind_address());

    let store: Arc<dyn MappingStore> = match &config.fixture_path {
        Some(path) => {
            info!("Serving from fixture {}", path.display());
            Arc::new(InMemoryStore::load(path).await?)
        },
        None => {
            let pool = db::create_pool(&config.database).await?;
            info!("Database connection pool established");
            Arc::new(PgMappingStore::new(pool))
        },
    };

    let vocabulary = Vocabulary::load(store.as_ref()).await?;
    info!(statuses = vocabulary.statuses().len(), "Vocabulary loaded");

    let sequences = RestSequenceService::new(&config.external)?;

    let state = FeatureState {
        store,
        vocabulary: Arc::new(vocabulary),
        sequences: Arc::new(sequences),
    };

    api::serve(config, state).await
}
