// Storage capability - the operations every storage variant provides
// Implemented by `SqliteDatabase` (sqlx) and `InMemoryDatabase`. Ids passed in
// an aggregate's `id` field are ignored on create: the store assigns them.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::core::FriendshipOutcome;
use crate::error::AppResult;
use crate::models::{Film, FilmId, Genre, GenreId, Mpa, MpaId, User, UserId};

#[async_trait]
pub trait FilmStorage: Send + Sync {
    /// Insert a film with its genre and like sets as one unit
    async fn create_film(&self, film: Film) -> AppResult<Film>;
    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>>;
    /// All films in ascending id (creation) order
    async fn get_all_films(&self) -> AppResult<Vec<Film>>;
    /// Replace scalar columns and every association set; `None` if absent
    async fn update_film(&self, id: FilmId, film: Film) -> AppResult<Option<Film>>;
    async fn delete_film(&self, id: FilmId) -> AppResult<bool>;
    async fn film_exists(&self, id: FilmId) -> AppResult<bool>;

    /// `true` if the like was new
    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool>;
    /// `true` if a like was removed
    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool>;
}

#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn create_user(&self, user: User) -> AppResult<User>;
    async fn get_user(&self, id: UserId) -> AppResult<Option<User>>;
    /// All users in ascending id order
    async fn get_all_users(&self) -> AppResult<Vec<User>>;
    /// Users with the given ids, ascending; unknown ids are skipped
    async fn get_users(&self, ids: &BTreeSet<UserId>) -> AppResult<Vec<User>>;
    async fn update_user(&self, id: UserId, user: User) -> AppResult<Option<User>>;
    async fn delete_user(&self, id: UserId) -> AppResult<bool>;
    async fn user_exists(&self, id: UserId) -> AppResult<bool>;

    async fn request_friend(&self, user_id: UserId, friend_id: UserId)
        -> AppResult<FriendshipOutcome>;
    /// Remove any edge between the pair, in either direction
    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool>;
    /// Ids joined to `user_id` by a CONFIRMED edge
    async fn confirmed_friend_ids(&self, user_id: UserId) -> AppResult<BTreeSet<UserId>>;
}

#[async_trait]
pub trait GenreStorage: Send + Sync {
    async fn create_genre(&self, genre: Genre) -> AppResult<Genre>;
    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>>;
    async fn get_all_genres(&self) -> AppResult<Vec<Genre>>;
    async fn update_genre(&self, id: GenreId, genre: Genre) -> AppResult<Option<Genre>>;
    async fn delete_genre(&self, id: GenreId) -> AppResult<bool>;
}

#[async_trait]
pub trait MpaStorage: Send + Sync {
    async fn create_mpa(&self, mpa: Mpa) -> AppResult<Mpa>;
    async fn get_mpa(&self, id: MpaId) -> AppResult<Option<Mpa>>;
    async fn get_all_mpa(&self) -> AppResult<Vec<Mpa>>;
    async fn update_mpa(&self, id: MpaId, mpa: Mpa) -> AppResult<Option<Mpa>>;
    async fn delete_mpa(&self, id: MpaId) -> AppResult<bool>;
}

/// Everything a repository needs from a store
pub trait Storage: FilmStorage + UserStorage + GenreStorage + MpaStorage {
    fn backend_name(&self) -> &'static str;
}
