//! Fractal History Core
//!
//! Domain vocabulary for the Fractal History tree engine. This crate has zero
//! dependencies on application-level code (database, LLM providers, CLI).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `tree` - Stored records (`Anchor`, `TreePosition`) and their enums
//! - `candidate` - Parsed child candidates with axis-specific payloads
//! - `context` - Ancestor and sibling records assembled for a generation request
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror** - keeps build times minimal
//! 2. **Axis dispatch happens once** - `GenerationAxis` is a closed enum, not a string
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod candidate;
pub mod context;
pub mod error;
pub mod tree;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Tree Records ───────────────────────────────────────────────────────
pub use tree::{Anchor, Breadth, GenerationAxis, GenerationStatus, TreePosition, ROOT_ID};

// ── Candidates ─────────────────────────────────────────────────────────
pub use candidate::{
    final_score, CandidateAnchor, CandidateDetail, TimeBoundaries, CAUSAL_WEIGHT, IMPACT_WEIGHT,
};

// ── Generation Context ─────────────────────────────────────────────────
pub use context::{AncestorEntry, GenerationContext, ParentNode, SiblingEntry};
