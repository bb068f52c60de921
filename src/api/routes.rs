use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use std::sync::Arc;

use crate::api::telemetry;
use crate::clock::{Clock, SystemClock};

/// Shared application state: the injectable clock and the RNG behind it.
///
/// The RNG lives behind a mutex so a seeded generator produces a stable
/// value sequence across requests in tests. Handlers hold the lock only
/// while building one response.
#[derive(Clone)]
pub struct AppState {
    pub clock: Arc<dyn Clock>,
    pub rng: Arc<Mutex<ChaCha8Rng>>,
}

impl AppState {
    /// Production state: system clock, entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(SystemClock), ChaCha8Rng::from_entropy())
    }

    pub fn with_parts(clock: Arc<dyn Clock>, rng: ChaCha8Rng) -> Self {
        Self {
            clock,
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(telemetry::get_health))
        .route("/api/test", get(telemetry::get_test_runs))
        .route("/api/submissions", get(telemetry::get_submissions))
        .route("/api/portfolio", get(telemetry::get_portfolio))
        .route("/api/performance", get(telemetry::get_performance))
        .route("/api/alerts", get(telemetry::get_alerts))
        .with_state(state)
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    /// A query parameter failed type coercion. Names the offending field.
    InvalidParameter { field: &'static str, value: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidParameter { field, value } => (
                StatusCode::BAD_REQUEST,
                format!("invalid value for query parameter '{field}': '{value}'"),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
