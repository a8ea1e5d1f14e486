//! HTTP endpoints for posting activities and reading stored profiles.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use super::activity::Activity;
use super::dispatcher::TurnDispatcher;
use crate::error::Error;
use crate::store::Database;
use crate::store::state::user_key;

/// Shared state for bot routes.
#[derive(Clone)]
pub struct BotRouteState {
    pub bot: Arc<TurnDispatcher>,
    pub db: Arc<dyn Database>,
}

/// POST /api/messages
///
/// Runs one turn for the posted activity and returns its replies. A `null`
/// body is rejected with 400.
async fn post_message(
    State(state): State<BotRouteState>,
    Json(activity): Json<Option<Activity>>,
) -> impl IntoResponse {
    match state.bot.on_turn(activity.as_ref()).await {
        Ok(replies) => (StatusCode::OK, Json(serde_json::json!({ "replies": replies }))),
        Err(e @ Error::InvalidArgument { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
        Err(e) => {
            tracing::error!("Turn failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

/// GET /api/profiles/{channel}/{user_id}
///
/// Returns the stored profile, or 404 if none exists.
async fn get_profile(
    State(state): State<BotRouteState>,
    Path((channel, user_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.db.get_state(&user_key(&channel, &user_id)).await {
        Ok(Some(profile)) if !profile.is_null() => (StatusCode::OK, Json(profile)),
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No profile exists yet"})),
        ),
        Err(e) => {
            tracing::error!("Profile lookup failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

/// Build the bot REST routes.
pub fn bot_routes(state: BotRouteState) -> Router {
    Router::new()
        .route("/api/messages", post(post_message))
        .route("/api/profiles/{channel}/{user_id}", get(get_profile))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
