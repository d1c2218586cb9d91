//! Commands
//!
//! Caller-facing entry points. The binary maps each subcommand onto one of
//! these functions and prints the returned `CommandResponse` as JSON.

pub mod health;
pub mod settings;
pub mod tree;

pub use health::*;
pub use settings::*;
pub use tree::*;
