//! HTTP server
//!
//! `GET /` answers a liveness string. Each `ResampleFilter` gets its own
//! `POST` route, all served by one handler.

pub mod error;
pub mod handlers;
pub mod state;
pub mod upload;

pub use error::ApiError;
pub use state::AppState;
pub use upload::{ImageUpload, UploadError};

use crate::{config::ServerConfig, error::Result, resample::ResampleFilter};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Build the application router
#[must_use]
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let mut router: Router<AppState> = Router::new().route("/", get(handlers::ping));

    for filter in ResampleFilter::ALL {
        let handler = move |state: State<AppState>,
                            multipart: std::result::Result<Multipart, MultipartRejection>| {
            handlers::remove_background(state, filter, multipart)
        };
        router = router.route(filter.route(), post(handler));
    }

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind to the configured address and serve until Ctrl-C
///
/// # Errors
/// - Address resolution or bind failures
/// - Fatal accept loop errors
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let router = build_router(state, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let local_addr = listener.local_addr()?;

    info!(
        address = %local_addr,
        debug = config.debug,
        "Serving on http://{}",
        config.socket_addr_string()
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
