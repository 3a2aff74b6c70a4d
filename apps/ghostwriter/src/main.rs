mod config;
mod errors;
mod external;
mod generation;
mod llm_client;
mod models;
mod poller;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;
mod watermark;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::service::LlmContentService;
use crate::llm_client::openai::{OpenAiClient, TRIM_MODEL};
use crate::llm_client::LlmClient;
use crate::poller::scheduler::spawn_single_flight;
use crate::poller::{Poller, POLL_INTERVAL};
use crate::routes::build_router;
use crate::state::ServiceContext;
use crate::store::postgres::create_pool;
use crate::store::PgRecordStore;
use crate::watermark::{FileWatermarkStore, RedisWatermarkStore, WatermarkStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ghostwriter v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgRecordStore::new(db));

    // Initialize watermark backend
    let watermark: Arc<dyn WatermarkStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Watermark stored in Redis");
            Arc::new(RedisWatermarkStore::new(client))
        }
        None => {
            let file = FileWatermarkStore::new(&config.watermark_path);
            info!("Watermark stored in {}", file.path().display());
            Arc::new(file)
        }
    };

    // Initialize LLM clients
    let anthropic = LlmClient::new(config.anthropic_api_key.clone());
    let openai = OpenAiClient::new(config.openai_api_key.clone());
    info!(
        "LLM clients initialized (models: {}, {})",
        llm_client::MODEL,
        TRIM_MODEL
    );
    let content = Arc::new(LlmContentService::new(anthropic, openai));

    let ctx = ServiceContext {
        store,
        content,
        watermark,
    };

    // Start the poller; a firing is skipped while the previous tick runs
    let poller = Arc::new(Poller::new(ctx));
    spawn_single_flight(POLL_INTERVAL, move || {
        let poller = Arc::clone(&poller);
        async move {
            poller.tick().await;
        }
    });

    let app = build_router().layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
