//! HTTP routes for the roster endpoint.

use axum::routing::get;
use axum::Router;

use super::handlers::{get_user_list, RosterAppState};

/// Creates the roster router.
pub fn roster_routes(state: RosterAppState) -> Router {
    Router::new()
        // GET /api/users
        .route("/api/users", get(get_user_list))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chat::{mailbox, Broadcaster};
    use crate::domain::chat::UserProfile;
    use crate::domain::foundation::{ConnectionId, UserId};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn lists_connected_users_without_tokens() {
        let broadcaster = Arc::new(Broadcaster::new());
        let (tx, _rx) = mailbox(4);
        broadcaster
            .join(
                ConnectionId::new(),
                Arc::new(UserProfile::new(UserId::new(1), "alice", "10.0.0.1:4000")),
                tx,
            )
            .await
            .unwrap();

        let response = roster_routes(RosterAppState::new(broadcaster))
            .oneshot(Request::get("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let users: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(users[0]["uid"], 1);
        assert_eq!(users[0]["nickname"], "alice");
        assert_eq!(users[0]["addr"], "10.0.0.1:4000");
        assert!(users[0].get("token").is_none());
    }
}
