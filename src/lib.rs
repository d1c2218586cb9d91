//! Fractal History - Tree Engine Library
//!
//! Generation and consistency for a hierarchical tree of historical "anchors".
//! It includes:
//! - Command functions returning `CommandResponse` envelopes
//! - Tree services (context assembly, prompts, response parsing, persistence)
//! - Storage layer (SQLite tree store, JSON config)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used items from commands
pub use commands::{
    // Health commands
    get_health,
    // Settings commands
    get_settings, update_settings,
    // Tree commands
    generate_children, get_ancestor_path, get_root, list_children, list_children_at_position,
    seed_tree,
};
// Re-export models (avoiding settings module conflict)
pub use models::response::*;
pub use models::settings::{AppConfig, BatchPolicy, SettingsUpdate};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
