//! JP Fan App admin - staging and publication of app content

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jpfan_admin::{
    api::{self, AppState},
    config::Config,
    services::SessionStore,
    store::StoreFactory,
    views::ViewEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jpfan_admin=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting JP Fan App admin...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let stores = create_stores(&config).await?;

    // Initialize templates
    let views = ViewEngine::new(config.templates.override_dir.as_deref())?;
    tracing::info!("Templates loaded");

    let state = AppState {
        stores,
        sessions: Arc::new(SessionStore::new(Duration::from_secs(config.session.ttl_seconds))),
        views: Arc::new(views),
        session_config: Arc::new(config.session.clone()),
    };

    // Build router
    let app = api::build_router(state, &config.server.public_dir);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Demo mode: in-memory content with sample data instead of the content service
#[cfg(feature = "demo")]
async fn create_stores(_config: &Config) -> Result<Arc<dyn StoreFactory>> {
    use jpfan_admin::store::{MemoryContentStore, MemoryStoreFactory};

    let store = Arc::new(MemoryContentStore::new());
    store.seed_demo().await;
    tracing::info!("Demo mode: in-memory content store (admin@jp-fan-app.de / jpfanapp)");
    Ok(MemoryStoreFactory::boxed(store))
}

#[cfg(not(feature = "demo"))]
async fn create_stores(config: &Config) -> Result<Arc<dyn StoreFactory>> {
    use jpfan_admin::store::{HttpStoreFactory, UpstreamClient};

    let client = UpstreamClient::new(&config.upstream)?;
    tracing::info!("Content service: {}", client.base_url());
    Ok(HttpStoreFactory::boxed(client))
}
