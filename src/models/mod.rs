//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod anchor;
pub mod response;
pub mod settings;

pub use anchor::*;
pub use response::*;
pub use settings::*;
