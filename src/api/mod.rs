// HTTP surface: thin axum handlers that validate bodies and call the
// repositories. Failures render through `AppError`'s `IntoResponse`.

pub mod catalog;
pub mod films;
pub mod users;

use axum::Router;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(films::routes())
        .merge(users::routes())
        .merge(catalog::routes())
        .with_state(state)
}

/// Id carried in the body of a PUT to a collection route
fn body_id(id: Option<i64>, kind: &str) -> AppResult<i64> {
    id.ok_or_else(|| AppError::InvalidArgument(format!("{} id is required for update", kind)))
}
