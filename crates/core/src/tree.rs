//! Tree Records
//!
//! The two persisted record kinds of the fractal tree and the small enums
//! they carry. An `Anchor` is a topic; a `TreePosition` places one anchor
//! under one parent along one breadth axis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Identifier shared by the root anchor and its single tree position.
pub const ROOT_ID: &str = "0-ROOT";

/// Organizing axis of a position relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Breadth {
    /// Analytical: the most essential aspects of the parent
    #[serde(rename = "A")]
    A,
    /// Temporal: chronological periods of the parent
    #[serde(rename = "B")]
    B,
    /// Geographic: spatial coverage of the parent
    #[serde(rename = "C")]
    C,
    /// The root position only
    #[serde(rename = "ROOT")]
    Root,
}

impl Breadth {
    /// Storage representation (`A`, `B`, `C`, `ROOT`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Breadth::A => "A",
            Breadth::B => "B",
            Breadth::C => "C",
            Breadth::Root => "ROOT",
        }
    }

    /// The letter used in position identifiers. The root has none.
    pub fn letter(&self) -> Option<char> {
        match self {
            Breadth::A => Some('A'),
            Breadth::B => Some('B'),
            Breadth::C => Some('C'),
            Breadth::Root => None,
        }
    }
}

impl fmt::Display for Breadth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Breadth {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Breadth::A),
            "B" => Ok(Breadth::B),
            "C" => Ok(Breadth::C),
            "ROOT" => Ok(Breadth::Root),
            other => Err(CoreError::validation(format!(
                "Unknown breadth '{}'. Must be one of A, B, C",
                other
            ))),
        }
    }
}

/// Axes for which children can be generated.
///
/// Each variant selects its own prompt grammar and response parser; the
/// dispatch happens once at the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationAxis {
    /// Breadth A
    Analytical,
    /// Breadth B
    Temporal,
}

impl GenerationAxis {
    /// The breadth stored on positions generated along this axis.
    pub fn breadth(&self) -> Breadth {
        match self {
            GenerationAxis::Analytical => Breadth::A,
            GenerationAxis::Temporal => Breadth::B,
        }
    }

    /// Map a breadth onto a generation axis. Geographic and root breadths
    /// have no generation grammar.
    pub fn from_breadth(breadth: Breadth) -> CoreResult<Self> {
        match breadth {
            Breadth::A => Ok(GenerationAxis::Analytical),
            Breadth::B => Ok(GenerationAxis::Temporal),
            Breadth::C => Err(CoreError::validation(
                "Breadth C (geographic) generation is not supported",
            )),
            Breadth::Root => Err(CoreError::validation(
                "Children cannot be generated along the ROOT breadth",
            )),
        }
    }
}

impl fmt::Display for GenerationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationAxis::Analytical => write!(f, "analytical"),
            GenerationAxis::Temporal => write!(f, "temporal"),
        }
    }
}

impl FromStr for GenerationAxis {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analytical" => Ok(GenerationAxis::Analytical),
            "temporal" => Ok(GenerationAxis::Temporal),
            _ => GenerationAxis::from_breadth(s.parse()?),
        }
    }
}

/// Lifecycle marker for whether narrative content exists for an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Generated through the full-context flow, narrative not yet written
    Pending,
    /// Loaded by the seed flow
    Placeholder,
    /// Narrative authored
    Complete,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Placeholder => "placeholder",
            GenerationStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "pending" => Ok(GenerationStatus::Pending),
            "placeholder" => Ok(GenerationStatus::Placeholder),
            "complete" => Ok(GenerationStatus::Complete),
            other => Err(CoreError::validation(format!(
                "Unknown generation status: {}",
                other
            ))),
        }
    }
}

/// A historical topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub id: String,
    pub title: String,
    pub scope: String,
    pub generation_status: GenerationStatus,
}

/// One placement of an anchor in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePosition {
    pub position_id: String,
    pub anchor_id: String,
    pub parent_position_id: Option<String>,
    pub level: u32,
    pub breadth: Breadth,
    pub position: u32,
}

impl TreePosition {
    /// Whether this is the root position (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_position_id.is_none()
    }
}
