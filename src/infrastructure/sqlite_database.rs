use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteConnection};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::core::folder::{FoldAggregate, Folded, Folder};
use crate::core::friendship::{plan_outgoing, plan_request, FriendshipAction, FriendshipOutcome};
use crate::error::{db_error, AppError, AppResult};
use crate::infrastructure::database::{
    FilmStorage, GenreStorage, MpaStorage, Storage, UserStorage,
};
use crate::infrastructure::schema::{FILM_SELECT, SCHEMA, SEED_GENRES, SEED_MPA, USER_SELECT};
use crate::infrastructure::synchronizer::{synchronize, FILM_GENRES, FILM_LIKES, FRIENDSHIPS};
use crate::models::{
    Film, FilmId, FriendshipStatus, Genre, GenreId, Mpa, MpaId, User, UserId,
};

/// SQLite implementation of the storage capability
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::DatabaseError(format!("Invalid database url: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        // an in-memory database lives as long as its single connection
        let pool = SqlitePoolOptions::new()
            .max_connections(config.effective_max_connections())
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to {}: {}", config.url, e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        info!(url = %config.url, "SQLite storage ready");
        Ok(db)
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        Self::connect(&crate::config::Config::default().database).await
    }

    /// Create tables if missing and seed the rating and genre catalogs
    pub async fn initialize(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to create schema"))?;
        }

        for (id, name) in SEED_MPA {
            sqlx::query("INSERT OR IGNORE INTO mpa (id, name) VALUES (?, ?)")
                .bind(*id)
                .bind(*name)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to seed mpa"))?;
        }
        for (id, name) in SEED_GENRES {
            sqlx::query("INSERT OR IGNORE INTO genres (id, name) VALUES (?, ?)")
                .bind(*id)
                .bind(*name)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to seed genres"))?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Stream the rows of a join query straight into a folder
    async fn fold_query<'args, A>(
        &self,
        mut qb: QueryBuilder<'args, Sqlite>,
        context: &'static str,
    ) -> AppResult<Folded<A>>
    where
        A: FoldAggregate + Send,
        A::Row: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut folder = Folder::new();
        let mut rows = qb.build_query_as::<A::Row>().fetch(&self.pool);
        while let Some(row) = rows.try_next().await.map_err(db_error(context))? {
            folder.push(row);
        }
        let folded = folder.finish();
        debug!(aggregates = folded.len(), context, "rows folded");
        Ok(folded)
    }

    async fn exists(&self, table: &str, id: i64) -> AppResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to check existence"))?;
        Ok(row.is_some())
    }

    async fn delete_by_id(&self, table: &str, id: i64) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete row"))?;
        Ok(result.rows_affected() > 0)
    }
}

async fn sync_film_associations(
    conn: &mut SqliteConnection,
    film_id: FilmId,
    film: &Film,
) -> AppResult<()> {
    synchronize(conn, &FILM_GENRES, film_id, film.genre_ids()).await?;
    synchronize(conn, &FILM_LIKES, film_id, film.likes.iter().copied()).await?;
    Ok(())
}

async fn friendship_status(
    conn: &mut SqliteConnection,
    user_id: UserId,
    friend_id: UserId,
) -> AppResult<Option<FriendshipStatus>> {
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM friendships WHERE user_id = ? AND friend_id = ?")
            .bind(user_id)
            .bind(friend_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_error("Failed to read friendship"))?;
    status.map(|s| s.parse()).transpose()
}

#[derive(Debug, Clone, Copy)]
enum EdgeDirection {
    /// edges `(user, x)`
    Outgoing,
    /// edges `(x, user)`
    Incoming,
}

async fn confirm_edges(
    conn: &mut SqliteConnection,
    user_id: UserId,
    others: &BTreeSet<UserId>,
    direction: EdgeDirection,
) -> AppResult<()> {
    if others.is_empty() {
        return Ok(());
    }
    let (fixed, varying) = match direction {
        EdgeDirection::Outgoing => ("user_id", "friend_id"),
        EdgeDirection::Incoming => ("friend_id", "user_id"),
    };
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE friendships SET status = 'CONFIRMED' WHERE ");
    qb.push(fixed).push(" = ").push_bind(user_id);
    qb.push(" AND ").push(varying).push(" IN (");
    let mut separated = qb.separated(", ");
    for id in others {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    qb.build()
        .execute(&mut *conn)
        .await
        .map_err(db_error("Failed to confirm friendships"))?;
    Ok(())
}

/// Replace the outgoing edges of `user_id` with `desired`, keeping confirmed
/// status and accepting pending requests from users in `desired`
async fn sync_user_friends(
    conn: &mut SqliteConnection,
    user_id: UserId,
    desired: &BTreeSet<UserId>,
) -> AppResult<()> {
    let outgoing_confirmed: BTreeSet<UserId> = sqlx::query_scalar::<_, i64>(
        "SELECT friend_id FROM friendships WHERE user_id = ? AND status = 'CONFIRMED'",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("Failed to read outgoing friendships"))?
    .into_iter()
    .collect();

    let mut incoming = BTreeMap::new();
    let rows = sqlx::query("SELECT user_id, status FROM friendships WHERE friend_id = ?")
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("Failed to read incoming friendships"))?;
    for row in rows {
        let status: String = row.get("status");
        incoming.insert(row.get::<i64, _>("user_id"), status.parse::<FriendshipStatus>()?);
    }

    let plan = plan_outgoing(user_id, desired, &outgoing_confirmed, &incoming);
    synchronize(conn, &FRIENDSHIPS, user_id, plan.outgoing.iter().copied()).await?;
    confirm_edges(conn, user_id, &plan.keep_confirmed, EdgeDirection::Outgoing).await?;
    confirm_edges(conn, user_id, &plan.confirm_incoming, EdgeDirection::Incoming).await?;
    Ok(())
}

fn genre_from_row(row: &SqliteRow) -> Genre {
    Genre::new(row.get("id"), row.get::<String, _>("name"))
}

fn mpa_from_row(row: &SqliteRow) -> Mpa {
    Mpa::new(row.get("id"), row.get::<String, _>("name"))
}

#[async_trait]
impl FilmStorage for SqliteDatabase {
    async fn create_film(&self, film: Film) -> AppResult<Film> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let id = sqlx::query(
            "INSERT INTO films (name, description, release_date, duration, mpa_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa_id())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert film"))?
        .last_insert_rowid();

        sync_film_associations(&mut tx, id, &film).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit film"))?;

        self.get_film(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Film {} vanished after insert", id)))
    }

    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        let mut qb = QueryBuilder::<Sqlite>::new(FILM_SELECT);
        qb.push(" WHERE f.id = ").push_bind(id);
        let folded: Folded<Film> = self.fold_query(qb, "Failed to load film").await?;
        Ok(folded.take(id))
    }

    async fn get_all_films(&self) -> AppResult<Vec<Film>> {
        let mut qb = QueryBuilder::<Sqlite>::new(FILM_SELECT);
        qb.push(" ORDER BY f.id");
        let folded: Folded<Film> = self.fold_query(qb, "Failed to load films").await?;
        Ok(folded.into_vec())
    }

    async fn update_film(&self, id: FilmId, film: Film) -> AppResult<Option<Film>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let result = sqlx::query(
            "UPDATE films SET name = ?, description = ?, release_date = ?, duration = ?, mpa_id = ? WHERE id = ?",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa_id())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update film"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sync_film_associations(&mut tx, id, &film).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit film update"))?;

        self.get_film(id).await
    }

    async fn delete_film(&self, id: FilmId) -> AppResult<bool> {
        self.delete_by_id("films", id).await
    }

    async fn film_exists(&self, id: FilmId) -> AppResult<bool> {
        self.exists("films", id).await
    }

    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO likes (film_id, user_id) VALUES (?, ?)")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to add like"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE film_id = ? AND user_id = ?")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to remove like"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStorage for SqliteDatabase {
    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let id = sqlx::query("INSERT INTO users (email, login, name, birthday) VALUES (?, ?, ?, ?)")
            .bind(&user.email)
            .bind(&user.login)
            .bind(&user.name)
            .bind(user.birthday)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert user"))?
            .last_insert_rowid();

        sync_user_friends(&mut tx, id, &user.friends).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit user"))?;

        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("User {} vanished after insert", id)))
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let mut qb = QueryBuilder::<Sqlite>::new(USER_SELECT);
        qb.push(" WHERE u.id = ").push_bind(id);
        let folded: Folded<User> = self.fold_query(qb, "Failed to load user").await?;
        Ok(folded.take(id))
    }

    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        let mut qb = QueryBuilder::<Sqlite>::new(USER_SELECT);
        qb.push(" ORDER BY u.id");
        let folded: Folded<User> = self.fold_query(qb, "Failed to load users").await?;
        Ok(folded.into_vec())
    }

    async fn get_users(&self, ids: &BTreeSet<UserId>) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(USER_SELECT);
        qb.push(" WHERE u.id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        qb.push(" ORDER BY u.id");
        let folded: Folded<User> = self.fold_query(qb, "Failed to load users").await?;
        Ok(folded.into_vec())
    }

    async fn update_user(&self, id: UserId, user: User) -> AppResult<Option<User>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let result = sqlx::query(
            "UPDATE users SET email = ?, login = ?, name = ?, birthday = ? WHERE id = ?",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update user"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sync_user_friends(&mut tx, id, &user.friends).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit user update"))?;

        self.get_user(id).await
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        self.delete_by_id("users", id).await
    }

    async fn user_exists(&self, id: UserId) -> AppResult<bool> {
        self.exists("users", id).await
    }

    async fn request_friend(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> AppResult<FriendshipOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let forward = friendship_status(&mut tx, user_id, friend_id).await?;
        let reverse = friendship_status(&mut tx, friend_id, user_id).await?;
        let action = plan_request(forward, reverse);

        match action {
            FriendshipAction::ConfirmReverse => {
                sqlx::query(
                    "UPDATE friendships SET status = 'CONFIRMED' WHERE user_id = ? AND friend_id = ?",
                )
                .bind(friend_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to confirm friendship"))?;
            }
            FriendshipAction::CreatePending => {
                sqlx::query(
                    "INSERT INTO friendships (user_id, friend_id, status) VALUES (?, ?, 'UNCONFIRMED')",
                )
                .bind(user_id)
                .bind(friend_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to request friendship"))?;
            }
            FriendshipAction::NoChange => {}
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit friendship"))?;
        Ok(action.into())
    }

    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM friendships WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)",
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(friend_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to remove friendship"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn confirmed_friend_ids(&self, user_id: UserId) -> AppResult<BTreeSet<UserId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT friend_id FROM friendships WHERE user_id = ? AND status = 'CONFIRMED'
            UNION
            SELECT user_id FROM friendships WHERE friend_id = ? AND status = 'CONFIRMED'
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load friends"))?;
        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl GenreStorage for SqliteDatabase {
    async fn create_genre(&self, genre: Genre) -> AppResult<Genre> {
        let id = sqlx::query("INSERT INTO genres (name) VALUES (?)")
            .bind(&genre.name)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to insert genre"))?
            .last_insert_rowid();
        Ok(Genre::new(id, genre.name))
    }

    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>> {
        let row = sqlx::query("SELECT id, name FROM genres WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load genre"))?;
        Ok(row.as_ref().map(genre_from_row))
    }

    async fn get_all_genres(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to load genres"))?;
        Ok(rows.iter().map(genre_from_row).collect())
    }

    async fn update_genre(&self, id: GenreId, genre: Genre) -> AppResult<Option<Genre>> {
        let result = sqlx::query("UPDATE genres SET name = ? WHERE id = ?")
            .bind(&genre.name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update genre"))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(Genre::new(id, genre.name)))
    }

    async fn delete_genre(&self, id: GenreId) -> AppResult<bool> {
        self.delete_by_id("genres", id).await
    }
}

#[async_trait]
impl MpaStorage for SqliteDatabase {
    async fn create_mpa(&self, mpa: Mpa) -> AppResult<Mpa> {
        let id = sqlx::query("INSERT INTO mpa (name) VALUES (?)")
            .bind(&mpa.name)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to insert mpa"))?
            .last_insert_rowid();
        Ok(Mpa::new(id, mpa.name))
    }

    async fn get_mpa(&self, id: MpaId) -> AppResult<Option<Mpa>> {
        let row = sqlx::query("SELECT id, name FROM mpa WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load mpa"))?;
        Ok(row.as_ref().map(mpa_from_row))
    }

    async fn get_all_mpa(&self) -> AppResult<Vec<Mpa>> {
        let rows = sqlx::query("SELECT id, name FROM mpa ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to load mpa"))?;
        Ok(rows.iter().map(mpa_from_row).collect())
    }

    async fn update_mpa(&self, id: MpaId, mpa: Mpa) -> AppResult<Option<Mpa>> {
        let result = sqlx::query("UPDATE mpa SET name = ? WHERE id = ?")
            .bind(&mpa.name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update mpa"))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(Mpa::new(id, mpa.name)))
    }

    async fn delete_mpa(&self, id: MpaId) -> AppResult<bool> {
        self.delete_by_id("mpa", id).await
    }
}

impl Storage for SqliteDatabase {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
