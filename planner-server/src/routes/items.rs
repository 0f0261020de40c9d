//! Appointment, milestone and task endpoints
//!
//! Every item kind gets the same four routes under
//! `/c/{owner}/{name}/{collection}`; reading needs view access, changes need
//! edit access.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Serialize, de::DeserializeOwned};

use planner_core::record::{Appointment, CalendarItem, Milestone, Task};
use planner_core::{Calendar, Permission};

use crate::routes::{AppError, CurrentUser, calendar_if_permitted};
use crate::state::AppState;

/// An item kind that can travel over the API.
pub trait ApiItem:
    CalendarItem<Patch: DeserializeOwned + Send + 'static>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<T> ApiItem for T where
    T: CalendarItem<Patch: DeserializeOwned + Send + 'static>
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(collection::<Appointment>())
        .merge(collection::<Milestone>())
        .merge(collection::<Task>())
}

fn collection<T: ApiItem>() -> Router<AppState> {
    let base = format!("/c/{{owner}}/{{name}}/{}", T::COLLECTION);
    let single = format!("{base}/{{item_id}}");

    Router::new()
        .route(&base, get(list_items::<T>).post(add_item::<T>))
        .route(&single, put(update_item::<T>).delete(remove_item::<T>))
}

/// GET /c/:owner/:name/:collection - List items of one kind
async fn list_items<T: ApiItem>(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<Vec<T>>, AppError> {
    let calendar_id = Calendar::id_for(&owner, &name);
    let items = state
        .with_store(move |store| {
            let calendar = calendar_if_permitted(store, &username, &calendar_id, Permission::Read)?;
            Ok(T::items(&calendar).to_vec())
        })
        .await?;

    Ok(Json(items))
}

/// POST /c/:owner/:name/:collection - Add an item; any client id is replaced
async fn add_item<T: ApiItem>(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    Path((owner, name)): Path<(String, String)>,
    Json(mut item): Json<T>,
) -> Result<(StatusCode, Json<T>), AppError> {
    item.renew_id();
    let calendar_id = Calendar::id_for(&owner, &name);
    let item = state
        .with_store(move |store| {
            calendar_if_permitted(store, &username, &calendar_id, Permission::Edit)?;
            Ok(store.modify_calendar(&calendar_id, |calendar| {
                calendar.add_item(item.clone());
                Ok(item)
            })?)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /c/:owner/:name/:collection/:item_id - Patch an item
async fn update_item<T: ApiItem>(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    Path((owner, name, item_id)): Path<(String, String, String)>,
    Json(patch): Json<T::Patch>,
) -> Result<Json<T>, AppError> {
    let calendar_id = Calendar::id_for(&owner, &name);
    let item = state
        .with_store(move |store| {
            calendar_if_permitted(store, &username, &calendar_id, Permission::Edit)?;
            Ok(store.modify_calendar(&calendar_id, |calendar| {
                calendar.update_item::<T>(&item_id, patch)
            })?)
        })
        .await?;

    Ok(Json(item))
}

/// DELETE /c/:owner/:name/:collection/:item_id - Remove an item
async fn remove_item<T: ApiItem>(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    Path((owner, name, item_id)): Path<(String, String, String)>,
) -> Result<StatusCode, AppError> {
    let calendar_id = Calendar::id_for(&owner, &name);
    state
        .with_store(move |store| {
            calendar_if_permitted(store, &username, &calendar_id, Permission::Edit)?;
            store.modify_calendar(&calendar_id, |calendar| {
                calendar.remove_item::<T>(&item_id)
            })?;
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
