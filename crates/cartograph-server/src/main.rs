use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cartograph_core::{AppConfig, GraphStore, LanguageService};
use cartograph_graph::Neo4jGraphStore;
use cartograph_translate::{AnthropicClient, QueryTranslator};

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cartograph=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let host = config.server_host.clone();
    let port = config.server_port;

    if !config.classifier_configured() {
        tracing::warn!("ANTHROPIC_API_KEY not set, intent classification will use keyword fallback");
    }

    let graph: Arc<dyn GraphStore> = Arc::new(Neo4jGraphStore::new(&config).await);
    let language: Arc<dyn LanguageService> = Arc::new(AnthropicClient::new(&config)?);
    let translator = Arc::new(QueryTranslator::new(language, &config));

    tracing::info!(mode = %translator.mode(), "Query translator ready");

    let state = AppState {
        config: Arc::new(config),
        graph,
        translator,
    };

    let app = routes::create_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{host}:{port}");
    tracing::info!("Cartograph server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
