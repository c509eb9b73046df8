use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::dialog::{Intent, Reply};
use crate::rate_limit::rate_limit_middleware;
use crate::session::Session;

/// Turn requests are tiny; anything larger is not a voice turn.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the HTTP router with all middleware applied.
pub fn build_router(state: AppState) -> Router {
    // A disabled timeout is a very long one so the layer stack keeps one type.
    let timeout_duration = if state.config.resilience.timeout_disabled {
        Duration::from_secs(365 * 24 * 60 * 60)
    } else {
        Duration::from_secs(state.config.resilience.request_timeout_secs)
    };

    Router::new()
        .route("/api/turn", post(api_turn))
        .route("/api/health", get(api_health))
        .route("/api/users/{id}/session", get(api_get_session))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout_duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for one dialog turn.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnRequest {
    /// Platform user id; sessions are keyed by it.
    user_id: String,
    /// Intent name, short (`Confirm`) or platform form (`YesIntent`).
    intent: String,
    /// Slot value for `Add`, `Remove` and `Clarify`.
    #[serde(default)]
    ingredient: Option<String>,
}

/// POST /api/turn - Apply one intent and return the reply.
async fn api_turn(
    State(state): State<AppState>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<Reply>, (StatusCode, String)> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "userId must not be empty".to_string()));
    }

    let intent = Intent::parse(&req.intent, req.ingredient.as_deref())
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    match state.turns.handle(user_id, &intent).await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            tracing::error!(
                name: "turn.failed",
                user_id = %user_id,
                intent = %intent.kind,
                error = ?e,
                "Turn failed"
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session storage unavailable".to_string(),
            ))
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    recipes: usize,
}

/// GET /api/health - Liveness plus catalog size.
async fn api_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        recipes: state.catalog.len(),
    })
}

/// GET /api/users/:id/session - Inspect a user's persisted session.
async fn api_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, (StatusCode, String)> {
    match state.turns.store().load(&id).await {
        Ok(Some(session)) => Ok(Json(session)),
        Ok(None) => Err((StatusCode::NOT_FOUND, format!("No session for user {id}"))),
        Err(e) => {
            tracing::error!(
                name: "session.load_failed",
                user_id = %id,
                error = ?e,
                "Session lookup failed"
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session storage unavailable".to_string(),
            ))
        }
    }
}
