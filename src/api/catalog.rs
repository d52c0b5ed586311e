use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::body_id;
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{Genre, GenreId, Mpa, MpaId};
use crate::validation::{validate_genre, validate_mpa};

// Genres

pub async fn list_genres_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.repositories.genres.find_all().await?))
}

pub async fn create_genre_handler(
    State(state): State<AppState>,
    Json(genre): Json<Genre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    validate_genre(&genre)?;
    let created = state.repositories.genres.create(genre).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_genre_handler(
    State(state): State<AppState>,
    Json(genre): Json<Genre>,
) -> AppResult<Json<Genre>> {
    validate_genre(&genre)?;
    let id = body_id(genre.id, "Genre")?;
    Ok(Json(state.repositories.genres.update(id, genre).await?))
}

pub async fn get_genre_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<GenreId>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.repositories.genres.get(id).await?))
}

pub async fn delete_genre_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<GenreId>,
) -> AppResult<Json<Value>> {
    if !state.repositories.genres.delete(id).await? {
        return Err(AppError::NotFound(format!("Genre {} not found", id)));
    }
    Ok(Json(json!({ "deleted": id })))
}

// Ratings

pub async fn list_mpa_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Mpa>>> {
    Ok(Json(state.repositories.mpa.find_all().await?))
}

pub async fn create_mpa_handler(
    State(state): State<AppState>,
    Json(mpa): Json<Mpa>,
) -> AppResult<(StatusCode, Json<Mpa>)> {
    validate_mpa(&mpa)?;
    let created = state.repositories.mpa.create(mpa).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_mpa_handler(
    State(state): State<AppState>,
    Json(mpa): Json<Mpa>,
) -> AppResult<Json<Mpa>> {
    validate_mpa(&mpa)?;
    let id = body_id(mpa.id, "Mpa")?;
    Ok(Json(state.repositories.mpa.update(id, mpa).await?))
}

pub async fn get_mpa_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<MpaId>,
) -> AppResult<Json<Mpa>> {
    Ok(Json(state.repositories.mpa.get(id).await?))
}

pub async fn delete_mpa_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<MpaId>,
) -> AppResult<Json<Value>> {
    if !state.repositories.mpa.delete(id).await? {
        return Err(AppError::NotFound(format!("Mpa {} not found", id)));
    }
    Ok(Json(json!({ "deleted": id })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/genres",
            get(list_genres_handler)
                .post(create_genre_handler)
                .put(update_genre_handler),
        )
        .route(
            "/genres/{id}",
            get(get_genre_handler).delete(delete_genre_handler),
        )
        .route(
            "/mpa",
            get(list_mpa_handler)
                .post(create_mpa_handler)
                .put(update_mpa_handler),
        )
        .route("/mpa/{id}", get(get_mpa_handler).delete(delete_mpa_handler))
}
