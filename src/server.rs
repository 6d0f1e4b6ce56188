//! HTTP boundary: `GET /arbitrage` plus static files.

use crate::aggregator::Aggregator;
use crate::arbitrage::ArbitrageOpportunity;
use crate::errors::{AppError, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

/// Orchestration failure. Rendered as a bare 500.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "[HTTP] /arbitrage failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/arbitrage", get(get_arbitrage))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .with_state(state)
}

async fn get_arbitrage(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<ArbitrageOpportunity>>, ApiError> {
    let opportunities = state.aggregator.run_scan().await?;
    Ok(Json(opportunities))
}

pub async fn serve(state: AppState, addr: SocketAddr, static_dir: &Path) -> Result<()> {
    let app = router(state, static_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, static_dir = %static_dir.display(), "[HTTP] listening");
    axum::serve(listener, app).await?;
    Ok(())
}
