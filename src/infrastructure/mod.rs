// Storage infrastructure
pub mod database;          // Storage capability traits
pub mod id_generator;      // Per-instance id sequences
pub mod memory_database;   // In-memory storage variant
pub mod schema;            // SQL schema, seeds and join queries
pub mod sqlite_database;   // sqlx/SQLite storage variant
pub mod synchronizer;      // Replace-all association writes

pub use database::{FilmStorage, GenreStorage, MpaStorage, Storage, UserStorage};
pub use id_generator::IdGenerator;
pub use memory_database::InMemoryDatabase;
pub use sqlite_database::SqliteDatabase;
pub use synchronizer::{replace_all, synchronize, AssociationTable, SyncReport};
