//! Entry point for the Catering Engine binary.
//!
//! Running this binary starts an HTTP server exposing the allocation
//! engine and the report store.  See [`catering_engine::settings`] for
//! the configuration sources.

use std::sync::Arc;

use catering_engine::settings::{Settings, StoreKind};
use catering_engine::snapshot::{JsonFileStore, MemoryStore, SnapshotStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("catering_engine={}", settings.log_level))
        .init();

    let store: Arc<dyn SnapshotStore> = match settings.store {
        StoreKind::File => {
            let store = JsonFileStore::new(settings.reports_path.clone());
            tracing::info!("Storing reports in {}", store.path().display());
            Arc::new(store)
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory report store; reports are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if let Err(err) = catering_engine::api::serve(&settings.bind, store).await {
        tracing::error!("server failed: {err}");
        return Err(err);
    }
    Ok(())
}
