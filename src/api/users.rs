use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};

use super::body_id;
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserId};
use crate::validation::{normalize_user, validate_user};

pub async fn list_users_handler(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.repositories.users.find_all().await?))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> AppResult<(StatusCode, Json<User>)> {
    validate_user(&user)?;
    let created = state.repositories.users.create(normalize_user(user)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> AppResult<Json<User>> {
    validate_user(&user)?;
    let id = body_id(user.id, "User")?;
    Ok(Json(
        state
            .repositories
            .users
            .update(id, normalize_user(user))
            .await?,
    ))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<UserId>,
) -> AppResult<Json<User>> {
    Ok(Json(state.repositories.users.get(id).await?))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<UserId>,
) -> AppResult<Json<Value>> {
    if !state.repositories.users.delete(id).await? {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }
    Ok(Json(json!({ "deleted": id })))
}

pub async fn request_friend_handler(
    State(state): State<AppState>,
    AxumPath((id, friend_id)): AxumPath<(UserId, UserId)>,
) -> AppResult<Json<Value>> {
    let outcome = state
        .repositories
        .users
        .request_friend(id, friend_id)
        .await?;
    Ok(Json(json!({ "user_id": id, "friend_id": friend_id, "outcome": outcome })))
}

pub async fn remove_friend_handler(
    State(state): State<AppState>,
    AxumPath((id, friend_id)): AxumPath<(UserId, UserId)>,
) -> AppResult<Json<Value>> {
    let removed = state.repositories.users.remove_friend(id, friend_id).await?;
    Ok(Json(json!({ "user_id": id, "friend_id": friend_id, "removed": removed })))
}

pub async fn list_friends_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<UserId>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.repositories.users.list_friends(id).await?))
}

pub async fn common_friends_handler(
    State(state): State<AppState>,
    AxumPath((id, other_id)): AxumPath<(UserId, UserId)>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(
        state
            .repositories
            .users
            .list_mutual_friends(id, other_id)
            .await?,
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users_handler)
                .post(create_user_handler)
                .put(update_user_handler),
        )
        .route("/users/{id}", get(get_user_handler).delete(delete_user_handler))
        .route("/users/{id}/friends", get(list_friends_handler))
        .route(
            "/users/{id}/friends/{friend_id}",
            put(request_friend_handler).delete(remove_friend_handler),
        )
        .route(
            "/users/{id}/friends/common/{other_id}",
            get(common_friends_handler),
        )
}
