use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::body_id;
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{Film, FilmId, UserId};
use crate::validation::validate_film;

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub count: Option<i64>,
}

pub async fn list_films_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.repositories.films.find_all().await?))
}

pub async fn create_film_handler(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<(StatusCode, Json<Film>)> {
    validate_film(&film)?;
    let created = state.repositories.films.create(film).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_film_handler(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<Json<Film>> {
    validate_film(&film)?;
    let id = body_id(film.id, "Film")?;
    Ok(Json(state.repositories.films.update(id, film).await?))
}

pub async fn get_film_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<FilmId>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.repositories.films.get(id).await?))
}

pub async fn delete_film_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<FilmId>,
) -> AppResult<Json<Value>> {
    if !state.repositories.films.delete(id).await? {
        return Err(AppError::NotFound(format!("Film {} not found", id)));
    }
    Ok(Json(json!({ "deleted": id })))
}

pub async fn add_like_handler(
    State(state): State<AppState>,
    AxumPath((id, user_id)): AxumPath<(FilmId, UserId)>,
) -> AppResult<Json<Value>> {
    let added = state.repositories.films.add_like(id, user_id).await?;
    Ok(Json(json!({ "film_id": id, "user_id": user_id, "added": added })))
}

pub async fn remove_like_handler(
    State(state): State<AppState>,
    AxumPath((id, user_id)): AxumPath<(FilmId, UserId)>,
) -> AppResult<Json<Value>> {
    if !state.repositories.films.remove_like(id, user_id).await? {
        return Err(AppError::InvalidArgument(format!(
            "Like of film {} by user {} was not deleted",
            id, user_id
        )));
    }
    Ok(Json(json!({ "film_id": id, "user_id": user_id, "removed": true })))
}

pub async fn popular_films_handler(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let count = params
        .count
        .unwrap_or(state.config.films.popular_default_count);
    Ok(Json(state.repositories.films.top_films(count).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/films",
            get(list_films_handler)
                .post(create_film_handler)
                .put(update_film_handler),
        )
        .route("/films/popular", get(popular_films_handler))
        .route("/films/{id}", get(get_film_handler).delete(delete_film_handler))
        .route(
            "/films/{id}/like/{user_id}",
            put(add_like_handler).delete(remove_like_handler),
        )
}
