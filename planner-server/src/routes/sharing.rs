//! Sharing endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;

use planner_core::{Calendar, Permission, ShareLevel};

use crate::routes::{AppError, CurrentUser, calendar_if_permitted};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/sharing", post(share_calendar))
}

/// Request body for sharing one of the current user's calendars
#[derive(Deserialize)]
pub struct ShareRequest {
    pub calendar_name: String,
    pub username: String,
    pub perm: String,
}

/// POST /api/sharing - Set the level a calendar is shared at with a user
async fn share_calendar(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Json(req): Json<ShareRequest>,
) -> Result<StatusCode, AppError> {
    let level: ShareLevel = req
        .perm
        .parse()
        .map_err(|e: String| AppError::status(StatusCode::BAD_REQUEST, e))?;
    let calendar_id = Calendar::id_for(&owner, &req.calendar_name);

    state
        .with_store(move |store| {
            calendar_if_permitted(store, &owner, &calendar_id, Permission::Owner)?;
            Ok(store.share(&calendar_id, &req.username, level)?)
        })
        .await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn share(calendar: &str, user: &str, perm: &str) -> serde_json::Value {
        json!({ "calendar_name": calendar, "username": user, "perm": perm })
    }

    #[tokio::test]
    async fn test_share_grants_and_revokes_access() {
        let (_dir, app) = app();

        let (status, _) = send(&app, Method::GET, "/c/alice/alice", Some("bob"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sharing",
            Some("alice"),
            Some(share("alice", "bob", "view")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::GET, "/c/alice/alice", Some("bob"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view_users"][0], "bob");

        send(
            &app,
            Method::POST,
            "/api/sharing",
            Some("alice"),
            Some(share("alice", "bob", "none")),
        )
        .await;
        let (status, _) = send(&app, Method::GET, "/c/alice/alice", Some("bob"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_share_rejects_bad_requests() {
        let (_dir, app) = app();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sharing",
            Some("alice"),
            Some(share("alice", "bob", "admin")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sharing",
            Some("alice"),
            Some(share("alice", "nobody", "view")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sharing",
            Some("alice"),
            Some(share("missing", "bob", "view")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sharing",
            Some("alice"),
            Some(share("alice", "alice", "edit")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
