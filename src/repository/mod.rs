// Aggregate repositories
// Each repository owns a handle to one storage variant and adds the checks
// that must happen before any mutation: id conflicts on create, unknown ids
// on update, missing users in like and friendship operations.

pub mod catalog;
pub mod films;
pub mod users;

pub use catalog::{GenreRepository, MpaRepository};
pub use films::FilmRepository;
pub use users::UserRepository;

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::infrastructure::Storage;

/// All repositories over one shared store
#[derive(Clone)]
pub struct Repositories {
    pub films: FilmRepository,
    pub users: UserRepository,
    pub genres: GenreRepository,
    pub mpa: MpaRepository,
}

impl Repositories {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            films: FilmRepository::new(storage.clone()),
            users: UserRepository::new(storage.clone()),
            genres: GenreRepository::new(storage.clone()),
            mpa: MpaRepository::new(storage),
        }
    }
}

fn not_found(kind: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{} {} not found", kind, id))
}

/// Turn a storage-level "absent" into NotFound
fn require<T>(value: Option<T>, kind: &str, id: i64) -> AppResult<T> {
    value.ok_or_else(|| not_found(kind, id))
}
