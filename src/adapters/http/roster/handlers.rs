//! HTTP handlers for the roster endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::chat::Broadcaster;

use super::dto::{UserView, EMPTY_ROSTER_JSON};

/// Shared state for roster queries.
#[derive(Clone)]
pub struct RosterAppState {
    pub broadcaster: Arc<Broadcaster>,
}

impl RosterAppState {
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        Self { broadcaster }
    }
}

/// GET /api/users - snapshot of connected users.
pub async fn get_user_list(State(state): State<RosterAppState>) -> Response {
    let users: Vec<UserView> = state.broadcaster.user_list().await;
    json_array_response(&users)
}

/// Renders `items` as a JSON array, or `[]` if serialization fails.
pub fn json_array_response<T: Serialize>(items: &[T]) -> Response {
    let body = serde_json::to_string(items).unwrap_or_else(|e| {
        tracing::error!("Roster serialization failed, serving empty list: {}", e);
        EMPTY_ROSTER_JSON.to_string()
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
