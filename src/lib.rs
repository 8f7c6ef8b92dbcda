pub mod api;
pub mod config;
pub mod core;
pub mod log;
pub mod providers;
pub mod service;
pub mod store;

use crate::config::AppConfig;
use crate::core::store::ItemStore;
use crate::providers::HtmlMetaResolver;
use crate::service::ItemService;
use crate::store::{FjallItemStore, MemoryItemStore};
use anyhow::{Context, Result};
use poem::Server;
use poem::listener::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Wires the configured store and preview resolver into an [`ItemService`].
pub fn build_service(config: &AppConfig) -> Result<Arc<ItemService>> {
    let store: Arc<dyn ItemStore> = if config.storage.persist {
        let data_dir = match &config.storage.data_dir {
            Some(dir) => dir.clone(),
            None => AppConfig::default_data_path()?.join("items"),
        };
        debug!(data_dir = %data_dir.display(), "Using persistent item store");
        Arc::new(FjallItemStore::open(&data_dir)?)
    } else {
        debug!("Using in-memory item store");
        Arc::new(MemoryItemStore::new())
    };

    let resolver = HtmlMetaResolver::new(
        Duration::from_millis(config.preview.timeout_ms),
        &config.preview.user_agent,
    )?;

    Ok(Arc::new(ItemService::new(
        store,
        Arc::new(resolver),
        config.defaults.clone(),
    )))
}

pub async fn run(config: AppConfig) -> Result<()> {
    info!("Wishvest starting...");
    debug!("Loaded config: {config:#?}");

    let service = build_service(&config)?;
    let app = api::build_app(service);

    info!("Listening on http://{}", config.server.bind);
    Server::new(TcpListener::bind(&config.server.bind))
        .run(app)
        .await
        .context("Server failed")
}
