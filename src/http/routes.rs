//! Diagnostics routes

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::app::AppState;
use crate::game::SessionStatus;
use crate::room::RoomSummary;
use crate::util::time::uptime_secs;

/// Build the diagnostics router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/session", get(session_handler))
        .route("/rooms", get(rooms_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    game_server: String,
    online: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.session.status();
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        game_server: state.config.game_server_url.clone(),
        online: status.online,
    })
}

// ============================================================================
// Session endpoints
// ============================================================================

async fn session_handler(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.session.status())
}

async fn rooms_handler(State(state): State<AppState>) -> Result<Json<Vec<RoomSummary>>, AppError> {
    let rooms = state
        .api
        .joinable_rooms()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    Ok(Json(rooms))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Upstream(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Upstream(msg) => {
                warn!(error = %msg, "Upstream request failed");
                (StatusCode::BAD_GATEWAY, msg)
            }
        };

        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}
