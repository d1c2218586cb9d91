//! Tree Node Models
//!
//! Rows returned to callers: persisted nodes, freshly inserted children, and
//! the outcome of a generation run.

use serde::{Deserialize, Serialize};

use fractal_history_core::{
    Breadth, CandidateAnchor, GenerationAxis, GenerationStatus, TimeBoundaries,
};

/// An anchor joined with one of its tree positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Anchor id
    pub id: String,
    pub position_id: String,
    pub parent_position_id: Option<String>,
    pub title: String,
    pub scope: String,
    pub generation_status: GenerationStatus,
    pub level: u32,
    pub breadth: Breadth,
    pub position: u32,
}

/// A child written by a generation run, with the scores it was selected by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedChild {
    #[serde(flatten)]
    pub node: TreeNode,
    pub causal_significance: f64,
    pub human_impact: f64,
    pub final_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_boundaries: Option<TimeBoundaries>,
}

impl InsertedChild {
    /// Attach a candidate's scores to the node it was stored as.
    pub fn from_candidate(node: TreeNode, candidate: &CandidateAnchor) -> Self {
        Self {
            node,
            causal_significance: candidate.causal_significance,
            human_impact: candidate.human_impact,
            final_score: candidate.final_score,
            time_boundaries: candidate.time_boundaries().cloned(),
        }
    }
}

/// A candidate that could not be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFailure {
    pub title: String,
    /// Position the candidate would have occupied
    pub position: u32,
    pub category: String,
    pub error: String,
}

/// Result of a "generate children" run, including debug context
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub request_id: String,
    pub parent_id: String,
    pub parent_position_id: String,
    pub axis: GenerationAxis,
    pub anchors_generated: usize,
    pub anchors: Vec<InsertedChild>,
    pub failures: Vec<WriteFailure>,
    pub ancestor_titles: Vec<String>,
    pub sibling_titles: Vec<String>,
    pub raw_response: String,
    pub model: String,
}

/// Counts reported by the seed loader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub anchors_inserted: usize,
    pub positions_inserted: usize,
}
