//! Generation Context
//!
//! Records assembled from the tree before a generation request: the parent
//! node, its ancestor chain (root first) and the children that already exist
//! on the target axis.

use serde::{Deserialize, Serialize};

use crate::tree::Breadth;

/// One ancestor on the path from the root down to a node's parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AncestorEntry {
    pub id: String,
    pub title: String,
    pub scope: String,
    pub level: u32,
    pub breadth: Breadth,
}

/// A child that already exists under the parent on the target axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiblingEntry {
    pub id: String,
    pub title: String,
    pub scope: String,
}

/// The node children are being generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentNode {
    pub anchor_id: String,
    pub position_id: String,
    pub title: String,
    pub scope: String,
    pub level: u32,
}

/// Everything a prompt needs about the parent's surroundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub parent: ParentNode,
    pub ancestors: Vec<AncestorEntry>,
    pub siblings: Vec<SiblingEntry>,
}

impl GenerationContext {
    /// Titles a child must not repeat: every ancestor plus the parent itself.
    pub fn forbidden_titles(&self) -> Vec<&str> {
        self.ancestors
            .iter()
            .map(|a| a.title.as_str())
            .chain(std::iter::once(self.parent.title.as_str()))
            .collect()
    }

    pub fn ancestor_titles(&self) -> Vec<String> {
        self.ancestors.iter().map(|a| a.title.clone()).collect()
    }

    pub fn sibling_titles(&self) -> Vec<String> {
        self.siblings.iter().map(|s| s.title.clone()).collect()
    }
}
