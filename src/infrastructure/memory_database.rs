// In-memory storage variant
// Enforces the same referential rules as the SQL schema. Every write first
// validates the whole change and only then applies it, all under one write
// lock, so a rejected update leaves no partial state behind.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::friendship::{
    confirmed_friends, linked_from, plan_outgoing, plan_request, FriendshipAction,
    FriendshipOutcome,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{
    FilmStorage, GenreStorage, MpaStorage, Storage, UserStorage,
};
use crate::infrastructure::id_generator::IdGenerator;
use crate::infrastructure::schema::{SEED_GENRES, SEED_MPA};
use crate::infrastructure::synchronizer::replace_all;
use crate::models::{
    Film, FilmId, Friendship, FriendshipStatus, Genre, GenreId, Mpa, MpaId, User, UserId,
};

#[derive(Debug, Clone)]
struct FilmRecord {
    name: String,
    description: String,
    release_date: NaiveDate,
    duration: i32,
    mpa_id: Option<MpaId>,
    genre_ids: BTreeSet<GenreId>,
    likes: BTreeSet<UserId>,
}

#[derive(Debug, Clone)]
struct UserRecord {
    email: String,
    login: String,
    name: String,
    birthday: NaiveDate,
}

#[derive(Debug, Default)]
struct MemoryState {
    films: BTreeMap<FilmId, FilmRecord>,
    users: BTreeMap<UserId, UserRecord>,
    genres: BTreeMap<GenreId, String>,
    mpa: BTreeMap<MpaId, String>,
    friendships: BTreeMap<(UserId, UserId), FriendshipStatus>,
}

impl MemoryState {
    fn incident_edges(&self, user: UserId) -> Vec<Friendship> {
        self.friendships
            .iter()
            .filter(|((from, to), _)| *from == user || *to == user)
            .map(|(&(user_id, friend_id), &status)| Friendship {
                user_id,
                friend_id,
                status,
            })
            .collect()
    }

    fn materialize_film(&self, id: FilmId, record: &FilmRecord) -> Film {
        let mpa = record
            .mpa_id
            .and_then(|mpa_id| self.mpa.get(&mpa_id).map(|name| Mpa::new(mpa_id, name.clone())));
        let genres = record
            .genre_ids
            .iter()
            .filter_map(|genre_id| {
                self.genres
                    .get(genre_id)
                    .map(|name| Genre::new(*genre_id, name.clone()))
            })
            .collect();
        Film {
            id: Some(id),
            name: record.name.clone(),
            description: record.description.clone(),
            release_date: record.release_date,
            duration: record.duration,
            mpa,
            genres,
            likes: record.likes.clone(),
        }
    }

    fn materialize_user(&self, id: UserId, record: &UserRecord) -> User {
        User {
            id: Some(id),
            email: record.email.clone(),
            login: record.login.clone(),
            name: record.name.clone(),
            birthday: record.birthday,
            friends: linked_from(&self.incident_edges(id), id),
        }
    }

    fn check_film_references(&self, film: &Film) -> AppResult<()> {
        if let Some(mpa_id) = film.mpa_id() {
            if !self.mpa.contains_key(&mpa_id) {
                return Err(AppError::IntegrityViolation(format!(
                    "Mpa {} does not exist",
                    mpa_id
                )));
            }
        }
        if let Some(genre_id) = film.genre_ids().into_iter().find(|id| !self.genres.contains_key(id)) {
            return Err(AppError::IntegrityViolation(format!(
                "Genre {} does not exist",
                genre_id
            )));
        }
        self.check_users(&film.likes)
    }

    fn check_users(&self, ids: &BTreeSet<UserId>) -> AppResult<()> {
        match ids.iter().find(|id| !self.users.contains_key(id)) {
            Some(missing) => Err(AppError::IntegrityViolation(format!(
                "User {} does not exist",
                missing
            ))),
            None => Ok(()),
        }
    }

    fn film_record(film: &Film) -> FilmRecord {
        let mut record = FilmRecord {
            name: film.name.clone(),
            description: film.description.clone(),
            release_date: film.release_date,
            duration: film.duration,
            mpa_id: film.mpa_id(),
            genre_ids: BTreeSet::new(),
            likes: BTreeSet::new(),
        };
        replace_all(&mut record.genre_ids, film.genre_ids());
        replace_all(&mut record.likes, film.likes.iter().copied());
        record
    }

    fn user_record(user: &User) -> UserRecord {
        UserRecord {
            email: user.email.clone(),
            login: user.login.clone(),
            name: user.name.clone(),
            birthday: user.birthday,
        }
    }

    /// Same edge rewrite as the SQL variant; references must be checked first
    fn sync_user_friends(&mut self, user_id: UserId, desired: &BTreeSet<UserId>) {
        let outgoing_confirmed: BTreeSet<UserId> = self
            .friendships
            .iter()
            .filter(|((from, _), status)| *from == user_id && **status == FriendshipStatus::Confirmed)
            .map(|((_, to), _)| *to)
            .collect();
        let incoming: BTreeMap<UserId, FriendshipStatus> = self
            .friendships
            .iter()
            .filter(|((_, to), _)| *to == user_id)
            .map(|((from, _), status)| (*from, *status))
            .collect();

        let plan = plan_outgoing(user_id, desired, &outgoing_confirmed, &incoming);

        self.friendships.retain(|(from, _), _| *from != user_id);
        for other in plan.outgoing {
            let status = if plan.keep_confirmed.contains(&other) {
                FriendshipStatus::Confirmed
            } else {
                FriendshipStatus::Unconfirmed
            };
            self.friendships.insert((user_id, other), status);
        }
        for other in plan.confirm_incoming {
            self.friendships
                .insert((other, user_id), FriendshipStatus::Confirmed);
        }
    }
}

/// Storage variant backed by process memory; ids come from generators owned
/// by the instance, so two instances never share a sequence.
#[derive(Debug)]
pub struct InMemoryDatabase {
    state: RwLock<MemoryState>,
    film_ids: IdGenerator,
    user_ids: IdGenerator,
    genre_ids: IdGenerator,
    mpa_ids: IdGenerator,
}

impl InMemoryDatabase {
    /// Empty store with the seeded rating and genre catalogs
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        let genre_ids = IdGenerator::default();
        let mpa_ids = IdGenerator::default();

        for (id, name) in SEED_MPA {
            state.mpa.insert(*id, name.to_string());
            mpa_ids.advance_past(*id);
        }
        for (id, name) in SEED_GENRES {
            state.genres.insert(*id, name.to_string());
            genre_ids.advance_past(*id);
        }

        Self {
            state: RwLock::new(state),
            film_ids: IdGenerator::default(),
            user_ids: IdGenerator::default(),
            genre_ids,
            mpa_ids,
        }
    }
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilmStorage for InMemoryDatabase {
    async fn create_film(&self, film: Film) -> AppResult<Film> {
        let mut state = self.state.write().await;
        state.check_film_references(&film)?;

        let id = self.film_ids.next_id();
        let record = MemoryState::film_record(&film);
        let created = state.materialize_film(id, &record);
        state.films.insert(id, record);
        Ok(created)
    }

    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        let state = self.state.read().await;
        Ok(state
            .films
            .get(&id)
            .map(|record| state.materialize_film(id, record)))
    }

    async fn get_all_films(&self) -> AppResult<Vec<Film>> {
        let state = self.state.read().await;
        Ok(state
            .films
            .iter()
            .map(|(id, record)| state.materialize_film(*id, record))
            .collect())
    }

    async fn update_film(&self, id: FilmId, film: Film) -> AppResult<Option<Film>> {
        let mut state = self.state.write().await;
        if !state.films.contains_key(&id) {
            return Ok(None);
        }
        state.check_film_references(&film)?;

        let record = MemoryState::film_record(&film);
        let updated = state.materialize_film(id, &record);
        state.films.insert(id, record);
        debug!(film_id = id, "film replaced");
        Ok(Some(updated))
    }

    async fn delete_film(&self, id: FilmId) -> AppResult<bool> {
        Ok(self.state.write().await.films.remove(&id).is_some())
    }

    async fn film_exists(&self, id: FilmId) -> AppResult<bool> {
        Ok(self.state.read().await.films.contains_key(&id))
    }

    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::IntegrityViolation(format!(
                "User {} does not exist",
                user_id
            )));
        }
        let record = state
            .films
            .get_mut(&film_id)
            .ok_or_else(|| AppError::NotFound(format!("Film {} not found", film_id)))?;
        Ok(record.likes.insert(user_id))
    }

    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .films
            .get_mut(&film_id)
            .map(|record| record.likes.remove(&user_id))
            .unwrap_or(false))
    }
}

#[async_trait]
impl UserStorage for InMemoryDatabase {
    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut state = self.state.write().await;
        state.check_users(&user.friends)?;

        let id = self.user_ids.next_id();
        let record = MemoryState::user_record(&user);
        state.users.insert(id, record.clone());
        state.sync_user_friends(id, &user.friends);
        Ok(state.materialize_user(id, &record))
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&id)
            .map(|record| state.materialize_user(id, record)))
    }

    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .map(|(id, record)| state.materialize_user(*id, record))
            .collect())
    }

    async fn get_users(&self, ids: &BTreeSet<UserId>) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                state
                    .users
                    .get(id)
                    .map(|record| state.materialize_user(*id, record))
            })
            .collect())
    }

    async fn update_user(&self, id: UserId, user: User) -> AppResult<Option<User>> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        state.check_users(&user.friends)?;

        let record = MemoryState::user_record(&user);
        state.users.insert(id, record.clone());
        state.sync_user_friends(id, &user.friends);
        Ok(Some(state.materialize_user(id, &record)))
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state
            .friendships
            .retain(|(from, to), _| *from != id && *to != id);
        for record in state.films.values_mut() {
            record.likes.remove(&id);
        }
        Ok(true)
    }

    async fn user_exists(&self, id: UserId) -> AppResult<bool> {
        Ok(self.state.read().await.users.contains_key(&id))
    }

    async fn request_friend(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> AppResult<FriendshipOutcome> {
        let mut state = self.state.write().await;
        state.check_users(&[user_id, friend_id].into_iter().collect())?;

        let forward = state.friendships.get(&(user_id, friend_id)).copied();
        let reverse = state.friendships.get(&(friend_id, user_id)).copied();
        let action = plan_request(forward, reverse);

        match action {
            FriendshipAction::ConfirmReverse => {
                state
                    .friendships
                    .insert((friend_id, user_id), FriendshipStatus::Confirmed);
            }
            FriendshipAction::CreatePending => {
                state
                    .friendships
                    .insert((user_id, friend_id), FriendshipStatus::Unconfirmed);
            }
            FriendshipAction::NoChange => {}
        }
        Ok(action.into())
    }

    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let forward = state.friendships.remove(&(user_id, friend_id)).is_some();
        let reverse = state.friendships.remove(&(friend_id, user_id)).is_some();
        Ok(forward || reverse)
    }

    async fn confirmed_friend_ids(&self, user_id: UserId) -> AppResult<BTreeSet<UserId>> {
        let state = self.state.read().await;
        Ok(confirmed_friends(&state.incident_edges(user_id), user_id))
    }
}

#[async_trait]
impl GenreStorage for InMemoryDatabase {
    async fn create_genre(&self, genre: Genre) -> AppResult<Genre> {
        let id = self.genre_ids.next_id();
        self.state.write().await.genres.insert(id, genre.name.clone());
        Ok(Genre::new(id, genre.name))
    }

    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>> {
        let state = self.state.read().await;
        Ok(state.genres.get(&id).map(|name| Genre::new(id, name.clone())))
    }

    async fn get_all_genres(&self) -> AppResult<Vec<Genre>> {
        let state = self.state.read().await;
        Ok(state
            .genres
            .iter()
            .map(|(id, name)| Genre::new(*id, name.clone()))
            .collect())
    }

    async fn update_genre(&self, id: GenreId, genre: Genre) -> AppResult<Option<Genre>> {
        let mut state = self.state.write().await;
        match state.genres.get_mut(&id) {
            Some(name) => {
                *name = genre.name.clone();
                Ok(Some(Genre::new(id, genre.name)))
            }
            None => Ok(None),
        }
    }

    async fn delete_genre(&self, id: GenreId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.genres.remove(&id).is_none() {
            return Ok(false);
        }
        for record in state.films.values_mut() {
            record.genre_ids.remove(&id);
        }
        Ok(true)
    }
}

#[async_trait]
impl MpaStorage for InMemoryDatabase {
    async fn create_mpa(&self, mpa: Mpa) -> AppResult<Mpa> {
        let id = self.mpa_ids.next_id();
        self.state.write().await.mpa.insert(id, mpa.name.clone());
        Ok(Mpa::new(id, mpa.name))
    }

    async fn get_mpa(&self, id: MpaId) -> AppResult<Option<Mpa>> {
        let state = self.state.read().await;
        Ok(state.mpa.get(&id).map(|name| Mpa::new(id, name.clone())))
    }

    async fn get_all_mpa(&self) -> AppResult<Vec<Mpa>> {
        let state = self.state.read().await;
        Ok(state
            .mpa
            .iter()
            .map(|(id, name)| Mpa::new(*id, name.clone()))
            .collect())
    }

    async fn update_mpa(&self, id: MpaId, mpa: Mpa) -> AppResult<Option<Mpa>> {
        let mut state = self.state.write().await;
        match state.mpa.get_mut(&id) {
            Some(name) => {
                *name = mpa.name.clone();
                Ok(Some(Mpa::new(id, mpa.name)))
            }
            None => Ok(None),
        }
    }

    async fn delete_mpa(&self, id: MpaId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.mpa.remove(&id).is_none() {
            return Ok(false);
        }
        for record in state.films.values_mut() {
            if record.mpa_id == Some(id) {
                record.mpa_id = None;
            }
        }
        Ok(true)
    }
}

impl Storage for InMemoryDatabase {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
