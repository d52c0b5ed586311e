// Genre and rating catalogs. Plain (id, name) rows with no associations of
// their own; deletes cascade into films at the storage level.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{not_found, require};
use crate::error::{AppError, AppResult};
use crate::infrastructure::Storage;
use crate::models::{Genre, GenreId, Mpa, MpaId};

#[derive(Clone)]
pub struct GenreRepository {
    storage: Arc<dyn Storage>,
}

impl GenreRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    #[instrument(skip(self, genre), fields(name = %genre.name))]
    pub async fn create(&self, genre: Genre) -> AppResult<Genre> {
        if let Some(id) = genre.id {
            if self.storage.get_genre(id).await?.is_some() {
                return Err(AppError::Conflict(format!("Genre {} already exists", id)));
            }
        }
        let created = self.storage.create_genre(genre).await?;
        info!(genre_id = ?created.id, "genre created");
        Ok(created)
    }

    pub async fn find_by_id(&self, id: GenreId) -> AppResult<Option<Genre>> {
        self.storage.get_genre(id).await
    }

    pub async fn get(&self, id: GenreId) -> AppResult<Genre> {
        require(self.find_by_id(id).await?, "Genre", id)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Genre>> {
        self.storage.get_all_genres().await
    }

    #[instrument(skip(self, genre))]
    pub async fn update(&self, id: GenreId, genre: Genre) -> AppResult<Genre> {
        match self.storage.update_genre(id, genre).await? {
            Some(updated) => Ok(updated),
            None => {
                warn!(genre_id = id, "update of unknown genre");
                Err(not_found("Genre", id))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: GenreId) -> AppResult<bool> {
        self.storage.delete_genre(id).await
    }
}

#[derive(Clone)]
pub struct MpaRepository {
    storage: Arc<dyn Storage>,
}

impl MpaRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    #[instrument(skip(self, mpa), fields(name = %mpa.name))]
    pub async fn create(&self, mpa: Mpa) -> AppResult<Mpa> {
        if let Some(id) = mpa.id {
            if self.storage.get_mpa(id).await?.is_some() {
                return Err(AppError::Conflict(format!("Mpa {} already exists", id)));
            }
        }
        let created = self.storage.create_mpa(mpa).await?;
        info!(mpa_id = ?created.id, "rating created");
        Ok(created)
    }

    pub async fn find_by_id(&self, id: MpaId) -> AppResult<Option<Mpa>> {
        self.storage.get_mpa(id).await
    }

    pub async fn get(&self, id: MpaId) -> AppResult<Mpa> {
        require(self.find_by_id(id).await?, "Mpa", id)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Mpa>> {
        self.storage.get_all_mpa().await
    }

    #[instrument(skip(self, mpa))]
    pub async fn update(&self, id: MpaId, mpa: Mpa) -> AppResult<Mpa> {
        match self.storage.update_mpa(id, mpa).await? {
            Some(updated) => Ok(updated),
            None => {
                warn!(mpa_id = id, "update of unknown rating");
                Err(not_found("Mpa", id))
            }
        }
    }

    /// Films rated `id` keep existing with no rating
    #[instrument(skip(self))]
    pub async fn delete(&self, id: MpaId) -> AppResult<bool> {
        self.storage.delete_mpa(id).await
    }
}
