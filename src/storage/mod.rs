//! Storage Layer
//!
//! Handles all data persistence: the SQLite tree store and the JSON config.

pub mod config;
pub mod database;

pub use config::ConfigService;
pub use database::{Database, DbConnection, DbPool};
