// Flat rows as produced by the LEFT JOIN read queries. Parent columns repeat
// once per child row; child columns are NULL when the outer join found nothing.

use chrono::NaiveDate;
use sqlx::FromRow;

use super::{FilmId, GenreId, MpaId, UserId};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FilmRow {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa_id: Option<MpaId>,
    pub mpa_name: Option<String>,
    pub genre_id: Option<GenreId>,
    pub genre_name: Option<String>,
    pub like_user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
    pub friend_id: Option<UserId>,
}
