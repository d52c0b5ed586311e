use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{FilmId, Genre, GenreId, Mpa, MpaId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    #[serde(default)]
    pub id: Option<FilmId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    #[serde(default)]
    pub mpa: Option<Mpa>,
    /// Unique by genre id, ascending once read back from a store
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub likes: BTreeSet<UserId>,
}

impl Film {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        release_date: NaiveDate,
        duration: i32,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            release_date,
            duration,
            mpa: None,
            genres: Vec::new(),
            likes: BTreeSet::new(),
        }
    }

    pub fn with_mpa(mut self, mpa_id: MpaId) -> Self {
        self.mpa = Some(Mpa::reference(mpa_id));
        self
    }

    pub fn with_genres(mut self, genre_ids: impl IntoIterator<Item = GenreId>) -> Self {
        self.genres = genre_ids.into_iter().map(Genre::reference).collect();
        self
    }

    pub fn mpa_id(&self) -> Option<MpaId> {
        self.mpa.as_ref().and_then(|m| m.id)
    }

    /// Distinct genre ids, ascending. References without an id are skipped.
    pub fn genre_ids(&self) -> BTreeSet<GenreId> {
        self.genres.iter().filter_map(|g| g.id).collect()
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}
