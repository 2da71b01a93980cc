#![forbid(unsafe_code)]

//! Progress store for the course engine: repository traits plus an
//! in-memory implementation for tests and a SQLite-backed one for durable
//! client-local state.

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryProgressStore, ProgressRepository, Storage, StorageError, SubmissionRepository,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
