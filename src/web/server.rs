use axum::{
    routing::{delete, get},
    Router,
};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use super::api::{
    add_rule, clear_rules, get_rules, health_check, list_logs, not_found, remove_rule, AppState,
};

/// Routes of the query API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/logs", get(list_logs))
        .route("/rules", get(get_rules).post(add_rule).delete(remove_rule))
        .route("/rules/all", delete(clear_rules))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the query API on `listen` until `shutdown_rx` turns true.
pub async fn run_server(
    state: AppState,
    listen: &str,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("Web server listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|&v| v).await;
            tracing::info!("Web server shutting down gracefully");
        })
        .await
}
