//! HTTP surface
//!
//! JSON API driving the wizard server-side, the raw generation and email
//! endpoints, the submission endpoint, and the prebuilt front-end served as
//! static files with an `index.html` fallback.

use crate::error::ApiError;
use crate::services::Services;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

mod handlers;
mod response;

pub fn build_router(services: Services) -> Router {
    let static_dir = services.config.server.static_dir.clone();
    let body_limit = services.config.server.body_limit_bytes;
    let frontend =
        ServeDir::new(&static_dir).not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/questions", get(handlers::questions))
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/:id/events", post(handlers::session_event))
        .route("/api/generate-image", post(handlers::generate_image))
        .route("/api/send-sticker-email", post(handlers::send_sticker_email))
        .route("/api/submit-user-data", post(handlers::submit_user_data))
        .fallback_service(frontend)
        // Json's own 2 MB cap would undercut the configured limit for photo bodies
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(services)
}

/// Serve until `shutdown` resolves, then wait for in-flight background work.
pub async fn serve<F>(services: Services, shutdown: F) -> Result<(), ApiError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = services.config.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!(address = %address, "listening");

    let spawner = services.spawner.clone();
    axum::serve(listener, build_router(services))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!(in_flight = spawner.in_flight(), "draining background tasks");
    spawner.drain().await;
    info!("shutdown complete");
    Ok(())
}
