//! Router assembly and the serve loop.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use cyberclub_core::config::GatewayConfig;
use cyberclub_core::error::{ClubError, Result};
use cyberclub_store::ContentStore;

use crate::routes;

/// Shared handler state.
pub struct AppState {
    pub store: Arc<ContentStore>,
    pub config: GatewayConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<ContentStore>, config: GatewayConfig) -> Arc<Self> {
        Arc::new(Self { store, config, start_time: Instant::now() })
    }
}

/// Build the full route table.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/about", get(routes::get_about))
        .route(
            "/events",
            get(routes::list_events).post(routes::create_event),
        )
        .route(
            "/events/{title}",
            get(routes::get_event)
                .put(routes::update_event)
                .delete(routes::delete_event),
        )
        .route("/facts", get(routes::list_facts).post(routes::create_fact))
        .route(
            "/facts/{id}",
            get(routes::get_fact)
                .put(routes::update_fact)
                .delete(routes::delete_fact),
        )
        .route("/jokes", get(routes::list_jokes).post(routes::create_joke))
        .route(
            "/jokes/{id}",
            get(routes::get_joke)
                .put(routes::update_joke)
                .delete(routes::delete_joke),
        )
        .route(
            "/quotes",
            get(routes::list_quotes).post(routes::create_quote),
        )
        .route(
            "/quotes/{id}",
            get(routes::get_quote)
                .put(routes::update_quote)
                .delete(routes::delete_quote),
        )
        .route("/quiz", get(routes::list_quizzes).post(routes::create_quiz))
        .route(
            "/quiz/{id}",
            get(routes::get_quiz)
                .put(routes::update_quiz)
                .delete(routes::delete_quiz),
        )
        .layer(TraceLayer::new_for_http())
        // The bot and local tools are the only expected callers.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: GatewayConfig, store: Arc<ContentStore>) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(store, config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ClubError::config(format!("Cannot bind {addr}: {e}")))?;
    tracing::info!("Gateway listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ClubError::Other(format!("Gateway server error: {e}")))
}
