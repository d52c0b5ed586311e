#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;

use filmorate_store::infrastructure::{InMemoryDatabase, SqliteDatabase};
use filmorate_store::models::{Film, User};
use filmorate_store::Repositories;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One fresh, isolated store per variant
pub async fn stores() -> Vec<(&'static str, Repositories)> {
    let sqlite = SqliteDatabase::new_in_memory()
        .await
        .expect("in-memory sqlite store");
    vec![
        ("sqlite", Repositories::new(Arc::new(sqlite))),
        ("memory", Repositories::new(Arc::new(InMemoryDatabase::new()))),
    ]
}

pub fn film(name: &str) -> Film {
    Film::new(name, format!("About {}", name), date(1999, 3, 31), 136).with_mpa(4)
}

pub fn user(login: &str) -> User {
    User::new(
        format!("{}@example.com", login),
        login,
        login.to_uppercase(),
        date(1990, 5, 17),
    )
}

pub async fn create_users(repos: &Repositories, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for n in 0..count {
        let created = repos
            .users
            .create(user(&format!("user{}", n)))
            .await
            .unwrap();
        ids.push(created.id.unwrap());
    }
    ids
}
