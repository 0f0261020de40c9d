//! Calendar endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use planner_core::record::CalendarPatch;
use planner_core::{Calendar, Permission};

use crate::routes::{AppError, CurrentUser, calendar_if_permitted};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/c", post(create_calendar))
        .route(
            "/c/{owner}/{name}",
            get(get_calendar).put(update_calendar).delete(delete_calendar),
        )
}

/// Request body for creating a calendar
#[derive(Deserialize)]
pub struct CreateCalendarRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// POST /c - Create a calendar owned by the current user
async fn create_calendar(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Json(req): Json<CreateCalendarRequest>,
) -> Result<(StatusCode, Json<Calendar>), AppError> {
    let calendar = state
        .with_store(move |store| {
            store.add_calendar(&owner, &req.name)?;
            let calendar_id = Calendar::id_for(&owner, &req.name);
            if !req.description.is_empty() {
                store.modify_calendar(&calendar_id, |calendar| {
                    calendar.description = req.description;
                    Ok(())
                })?;
            }
            Ok(store.get_calendar(&calendar_id)?)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(calendar)))
}

/// GET /c/:owner/:name - Fetch a calendar with its items
async fn get_calendar(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<Calendar>, AppError> {
    let calendar_id = Calendar::id_for(&owner, &name);
    let calendar = state
        .with_store(move |store| {
            calendar_if_permitted(store, &username, &calendar_id, Permission::Read)
        })
        .await?;

    Ok(Json(calendar))
}

/// PUT /c/:owner/:name - Update calendar metadata
async fn update_calendar(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    Path((owner, name)): Path<(String, String)>,
    Json(patch): Json<CalendarPatch>,
) -> Result<Json<Calendar>, AppError> {
    let calendar_id = Calendar::id_for(&owner, &name);
    let calendar = state
        .with_store(move |store| {
            calendar_if_permitted(store, &username, &calendar_id, Permission::Edit)?;
            Ok(store.modify_calendar(&calendar_id, |calendar| {
                calendar.apply(patch);
                Ok(calendar.clone())
            })?)
        })
        .await?;

    Ok(Json(calendar))
}

/// DELETE /c/:owner/:name - Delete a calendar the current user owns
async fn delete_calendar(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    Path((owner, name)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let calendar_id = Calendar::id_for(&owner, &name);
    state
        .with_store(move |store| {
            let calendar =
                calendar_if_permitted(store, &username, &calendar_id, Permission::Owner)?;
            if calendar.is_default() {
                return Err(AppError::status(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "the default calendar cannot be deleted",
                ));
            }
            Ok(store.delete_calendar(&calendar_id)?)
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
