//! Fractal Tree Services
//!
//! Generation and consistency of the anchor tree:
//!
//! - `ids` - level derivation and identifier minting
//! - `context` - ancestor path and sibling lookup
//! - `prompt` - axis-specific instruction documents
//! - `parser` - completion text to child candidates
//! - `writer` - transactional child persistence
//! - `generator` - the end-to-end "generate children" flow
//! - `seed` - the initial root and first-level anchors

pub mod context;
pub mod generator;
pub mod ids;
pub mod parser;
pub mod prompt;
pub mod seed;
pub mod writer;

pub use context::ContextAssembler;
pub use generator::{GenerateRequest, GenerationService};
pub use parser::{AnalyticalParser, ResponseParser, TemporalParser};
pub use seed::seed_tree;
pub use writer::{TreeWriter, WriteReport};
