//! spam-api - HTTP server for spam classification
//!
//! Loads the artifacts written by `spam-rs train` and serves predictions.

use spam_api::{router, AppState};
use spam_rs::config::Config;
use spam_rs::spam::SpamFilter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    spam_rs::logging::init(&config.logging)?;
    info!("Starting spam-api v{}", env!("CARGO_PKG_VERSION"));

    let store = config.artifacts.store();
    let filter = SpamFilter::load(&store)?;
    info!(
        "Model loaded from {} ({} features)",
        store.dir().display(),
        filter.vectorizer().vocabulary_size()
    );

    let state = Arc::new(AppState::new(filter, config.filter.clone()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr).await?;
    info!("Listening on {}", config.server.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
