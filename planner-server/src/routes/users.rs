//! Registration, account deletion and the user's calendar list

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use planner_core::{Permission, PlannerError};

use crate::routes::{AppError, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/user", delete(delete_user))
        .route("/calendars", get(list_calendars))
}

/// Request body for registering a user
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    /// Already hashed by the gateway; the store keeps it verbatim.
    pub password_hash: String,
}

/// POST /api/register - Create a user with its default calendar
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, AppError> {
    state
        .with_store(move |store| Ok(store.add_user(&req.username, &req.password_hash)?))
        .await?;

    Ok(StatusCode::CREATED)
}

/// DELETE /api/user - Delete the current user and everything it owns
async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
) -> Result<StatusCode, AppError> {
    state
        .with_store(move |store| Ok(store.delete_user(&username)?))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Calendar info returned by API
#[derive(Serialize)]
pub struct CalendarInfo {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub permission: Permission,
}

/// GET /calendars - List the calendars the current user can reach
async fn list_calendars(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
) -> Result<Json<Vec<CalendarInfo>>, AppError> {
    let calendars = state
        .with_store(move |store| {
            let user = store.get_user(&username)?;

            let mut calendars = Vec::new();
            for reference in user.calendar_references {
                // A reference can outlive its calendar after a crash.
                let calendar = match store.get_calendar(&reference.calendar_id) {
                    Ok(calendar) => calendar,
                    Err(PlannerError::NotFound { .. }) => continue,
                    Err(e) => return Err(e.into()),
                };
                calendars.push(CalendarInfo {
                    id: reference.calendar_id,
                    permission: calendar.permission_for(&username),
                    owner: calendar.owner,
                    name: calendar.name,
                    description: calendar.description,
                });
            }
            Ok(calendars)
        })
        .await?;

    Ok(Json(calendars))
}
