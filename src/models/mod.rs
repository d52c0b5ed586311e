// Domain aggregates and the flat row shapes they are folded from

pub mod catalog;
pub mod film;
pub mod rows;
pub mod user;

pub use catalog::{Genre, Mpa};
pub use film::Film;
pub use rows::{FilmRow, UserRow};
pub use user::{Friendship, FriendshipStatus, User};

pub type FilmId = i64;
pub type UserId = i64;
pub type GenreId = i64;
pub type MpaId = i64;
