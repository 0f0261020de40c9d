pub mod calendars;
pub mod items;
pub mod sharing;
pub mod users;

use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use planner_core::{Calendar, Permission, PlannerError, Store};

use crate::state::AppState;

/// Header carrying the authenticated username, set by the fronting gateway.
pub const USER_HEADER: &str = "x-planner-user";

/// All routes, with state attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(users::router())
        .merge(calendars::router())
        .merge(sharing::router())
        .merge(items::router())
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert store and internal errors to HTTP responses
pub struct AppError {
    status: Option<StatusCode>,
    error: anyhow::Error,
}

impl AppError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        AppError {
            status: Some(status),
            error: anyhow::anyhow!(message.into()),
        }
    }

    fn status_code(&self) -> StatusCode {
        if let Some(status) = self.status {
            return status;
        }
        match self.error.downcast_ref::<PlannerError>() {
            Some(PlannerError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Some(PlannerError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            Some(PlannerError::InvalidName(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %format!("{:#}", self.error), "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.error.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError {
            status: None,
            error: err.into(),
        }
    }
}

/// The user a request acts as.
pub struct CurrentUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|name| !name.is_empty())
            .map(|name| CurrentUser(name.to_string()))
            .ok_or_else(|| AppError::status(StatusCode::UNAUTHORIZED, "not authenticated"))
    }
}

/// Fetch a calendar, requiring `username` to hold at least `required` on it.
pub fn calendar_if_permitted(
    store: &Store,
    username: &str,
    calendar_id: &str,
    required: Permission,
) -> Result<Calendar, AppError> {
    let calendar = store.get_calendar(calendar_id)?;
    if !calendar.permission_for(username).allows(required) {
        return Err(AppError::status(
            StatusCode::FORBIDDEN,
            format!("{required} access to {calendar_id} required"),
        ));
    }
    Ok(calendar)
}
