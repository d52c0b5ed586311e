use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{not_found, require};
use crate::core::top_films;
use crate::error::{AppError, AppResult};
use crate::infrastructure::Storage;
use crate::models::{Film, FilmId, UserId};

#[derive(Clone)]
pub struct FilmRepository {
    storage: Arc<dyn Storage>,
}

impl FilmRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Store a new film. A caller-supplied id that is already taken is a
    /// conflict; any other supplied id is replaced by a fresh one.
    #[instrument(skip(self, film), fields(name = %film.name))]
    pub async fn create(&self, film: Film) -> AppResult<Film> {
        if let Some(id) = film.id {
            if self.storage.film_exists(id).await? {
                warn!(film_id = id, "rejected create with an id in use");
                return Err(AppError::Conflict(format!("Film {} already exists", id)));
            }
        }
        let created = self.storage.create_film(film).await?;
        info!(film_id = ?created.id, "film created");
        Ok(created)
    }

    pub async fn find_by_id(&self, id: FilmId) -> AppResult<Option<Film>> {
        self.storage.get_film(id).await
    }

    pub async fn get(&self, id: FilmId) -> AppResult<Film> {
        require(self.find_by_id(id).await?, "Film", id)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Film>> {
        self.storage.get_all_films().await
    }

    /// Replace every field and association set of film `id`
    #[instrument(skip(self, film))]
    pub async fn update(&self, id: FilmId, film: Film) -> AppResult<Film> {
        match self.storage.update_film(id, film).await? {
            Some(updated) => {
                info!(film_id = id, "film updated");
                Ok(updated)
            }
            None => {
                warn!(film_id = id, "update of unknown film");
                Err(not_found("Film", id))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: FilmId) -> AppResult<bool> {
        let removed = self.storage.delete_film(id).await?;
        if removed {
            info!(film_id = id, "film deleted");
        }
        Ok(removed)
    }

    async fn ensure_film_and_user(&self, id: FilmId, user_id: UserId) -> AppResult<()> {
        if !self.storage.film_exists(id).await? {
            return Err(not_found("Film", id));
        }
        if !self.storage.user_exists(user_id).await? {
            return Err(not_found("User", user_id));
        }
        Ok(())
    }

    /// `true` if the like was new
    #[instrument(skip(self))]
    pub async fn add_like(&self, id: FilmId, user_id: UserId) -> AppResult<bool> {
        self.ensure_film_and_user(id, user_id).await?;
        let added = self.storage.add_like(id, user_id).await?;
        info!(film_id = id, user_id, added, "like stored");
        Ok(added)
    }

    #[instrument(skip(self))]
    pub async fn remove_like(&self, id: FilmId, user_id: UserId) -> AppResult<bool> {
        self.ensure_film_and_user(id, user_id).await?;
        let removed = self.storage.remove_like(id, user_id).await?;
        if !removed {
            warn!(film_id = id, user_id, "no like to remove");
        }
        Ok(removed)
    }

    /// Most liked films first, ties by ascending id; `count <= 0` is empty
    pub async fn top_films(&self, count: i64) -> AppResult<Vec<Film>> {
        if count <= 0 {
            return Ok(Vec::new());
        }
        let films = self.storage.get_all_films().await?;
        Ok(top_films(films, count))
    }
}
