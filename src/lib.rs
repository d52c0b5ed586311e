// Filmorate store - film and user aggregates over relational association tables

// Core reconciliation logic: row folding, friendship rules, ranking
pub mod core;

// Domain aggregates and row shapes
pub mod models;

// Storage variants, schema and association synchronization
pub mod infrastructure;

// Aggregate repositories composed over a storage variant
pub mod repository;

// HTTP surface
pub mod api;
pub mod app_state;
pub mod validation;

// Common utilities
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use repository::{FilmRepository, GenreRepository, MpaRepository, Repositories, UserRepository};
