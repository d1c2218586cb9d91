//! Tree Commands
//!
//! Caller-facing operations on the anchor tree. Every command returns a
//! `CommandResponse`; failures carry an error category.

use fractal_history_core::{AncestorEntry, Breadth, GenerationAxis};

use crate::models::anchor::{GenerationOutcome, SeedReport, TreeNode};
use crate::models::response::CommandResponse;
use crate::services::tree::{seed, ContextAssembler, GenerateRequest};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

fn required<'a>(value: &'a str, name: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::validation(format!("{} is required", name)))
    } else {
        Ok(trimmed)
    }
}

fn parse_breadth(value: &str) -> AppResult<Breadth> {
    let breadth: Breadth = required(value, "breadth")?.parse()?;
    if breadth == Breadth::Root {
        return Err(AppError::validation("Children are never listed along the ROOT breadth"));
    }
    Ok(breadth)
}

/// List persisted children of a parent (anchor id or position id) along one breadth
pub fn list_children(state: &AppState, parent_id: &str, breadth: &str) -> CommandResponse<Vec<TreeNode>> {
    let result = (|| -> AppResult<_> {
        let parent_id = required(parent_id, "parent_id")?;
        let breadth = parse_breadth(breadth)?;
        let position = ContextAssembler::new(state.database()).require_position(parent_id)?;
        state
            .database()
            .list_child_nodes(&position.position_id, breadth)
    })();
    result.into()
}

/// List persisted children of a specific position along one breadth
pub fn list_children_at_position(
    state: &AppState,
    parent_position_id: &str,
    breadth: &str,
) -> CommandResponse<Vec<TreeNode>> {
    let result = (|| -> AppResult<_> {
        let parent_position_id = required(parent_position_id, "parent_position_id")?;
        let breadth = parse_breadth(breadth)?;
        state.database().list_child_nodes(parent_position_id, breadth)
    })();
    result.into()
}

/// Get the root node
pub fn get_root(state: &AppState) -> CommandResponse<TreeNode> {
    let result = state.database().get_root().and_then(|root| {
        root.ok_or_else(|| AppError::not_found("Tree has no root; run the seed loader first"))
    });
    result.into()
}

/// Ancestors of a node, root first
pub fn get_ancestor_path(state: &AppState, anchor_id: &str) -> CommandResponse<Vec<AncestorEntry>> {
    let result = (|| -> AppResult<_> {
        let anchor_id = required(anchor_id, "anchor_id")?;
        let assembler = ContextAssembler::new(state.database());
        let position = assembler.require_position(anchor_id)?;
        assembler.ancestor_path(&position.position_id)
    })();
    result.into()
}

/// Generate children for a parent along an analytical (A) or temporal (B) axis
pub async fn generate_children(
    state: &AppState,
    parent_id: &str,
    breadth: &str,
    title: Option<String>,
    scope: Option<String>,
) -> CommandResponse<GenerationOutcome> {
    let request = (|| -> AppResult<GenerateRequest> {
        let parent_id = required(parent_id, "parent_id")?;
        let axis: GenerationAxis = required(breadth, "breadth")?.parse()?;
        Ok(GenerateRequest {
            title,
            scope,
            ..GenerateRequest::new(parent_id, axis)
        })
    })();

    let result = match request {
        Ok(request) => state.generation_service().generate_children(request).await,
        Err(e) => Err(e),
    };
    result.into()
}

/// Load the root and first-level anchors
pub fn seed_tree(state: &AppState) -> CommandResponse<SeedReport> {
    seed::seed_tree(state.database()).into()
}
