//! Authentication backends.

mod database;

pub use database::DatabaseBackend;
