//! Context Assembly
//!
//! Reads the tree around a parent node: its ancestor chain (root first) and
//! the children that already exist on the target axis. Read-only.

use std::collections::HashSet;

use tracing::{debug, warn};

use fractal_history_core::{
    AncestorEntry, Breadth, GenerationAxis, GenerationContext, ParentNode, SiblingEntry,
    TreePosition,
};

use crate::storage::Database;
use crate::utils::error::{AppError, AppResult};

/// Assembles generation context from the tree store
pub struct ContextAssembler<'a> {
    db: &'a Database,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Resolve a node reference to a tree position.
    ///
    /// The reference may be a position id (`1A-G7H2K`) or an anchor id
    /// (`G7H2K`); position ids are tried first, then the anchor's primary
    /// position.
    pub fn resolve_position(&self, node_ref: &str) -> AppResult<Option<TreePosition>> {
        if let Some(position) = self.db.get_position(node_ref)? {
            return Ok(Some(position));
        }
        self.db.get_primary_position(node_ref)
    }

    /// Like `resolve_position`, but a missing position is a not-found error.
    pub fn require_position(&self, node_ref: &str) -> AppResult<TreePosition> {
        self.resolve_position(node_ref)?
            .ok_or_else(|| AppError::not_found(format!("No tree position for node: {}", node_ref)))
    }

    /// Ancestors strictly above `node_ref`, root first.
    ///
    /// Missing rows end the walk early and the partial path is returned. A
    /// parent chain that revisits a position also ends the walk.
    pub fn ancestor_path(&self, node_ref: &str) -> AppResult<Vec<AncestorEntry>> {
        let Some(start) = self.resolve_position(node_ref)? else {
            debug!(node = node_ref, "context: node has no position, empty ancestor path");
            return Ok(Vec::new());
        };

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start.position_id.clone());

        let mut path = Vec::new();
        let mut next = start.parent_position_id;

        while let Some(position_id) = next {
            if !visited.insert(position_id.clone()) {
                warn!(position_id = %position_id, "context: cycle in parent chain, stopping walk");
                break;
            }

            let Some(position) = self.db.get_position(&position_id)? else {
                debug!(position_id = %position_id, "context: missing parent position");
                break;
            };
            let Some(anchor) = self.db.get_anchor(&position.anchor_id)? else {
                debug!(anchor_id = %position.anchor_id, "context: missing ancestor anchor");
                break;
            };

            path.push(AncestorEntry {
                id: anchor.id,
                title: anchor.title,
                scope: anchor.scope,
                level: position.level,
                breadth: position.breadth,
            });
            next = position.parent_position_id;
        }

        path.reverse();
        debug!(node = node_ref, len = path.len(), "context: ancestor path assembled");
        Ok(path)
    }

    /// Existing children of a position on one breadth, ordered by position.
    pub fn siblings(&self, parent_position_id: &str, breadth: Breadth) -> AppResult<Vec<SiblingEntry>> {
        let siblings = self
            .db
            .list_child_nodes(parent_position_id, breadth)?
            .into_iter()
            .map(|node| SiblingEntry {
                id: node.id,
                title: node.title,
                scope: node.scope,
            })
            .collect();
        Ok(siblings)
    }

    /// Everything a prompt needs about `parent_ref`.
    ///
    /// `title` and `scope` override the stored values when the caller supplies
    /// them.
    pub fn assemble(
        &self,
        parent_ref: &str,
        axis: GenerationAxis,
        title: Option<&str>,
        scope: Option<&str>,
    ) -> AppResult<GenerationContext> {
        let position = self.require_position(parent_ref)?;
        let anchor = self.db.get_anchor(&position.anchor_id)?.ok_or_else(|| {
            AppError::not_found(format!("Anchor not found: {}", position.anchor_id))
        })?;

        let ancestors = self.ancestor_path(&position.position_id)?;
        let siblings = self.siblings(&position.position_id, axis.breadth())?;

        let parent = ParentNode {
            anchor_id: anchor.id,
            position_id: position.position_id,
            title: non_blank(title).unwrap_or(anchor.title),
            scope: non_blank(scope).unwrap_or(anchor.scope),
            level: position.level,
        };

        Ok(GenerationContext {
            parent,
            ancestors,
            siblings,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tree::seed::seed_tree;
    use fractal_history_core::{Anchor, GenerationStatus, ROOT_ID};

    fn seeded() -> Database {
        let db = Database::new_in_memory().unwrap();
        seed_tree(&db).unwrap();
        db
    }

    fn add_child(db: &Database, parent_position: &str, level: u32, anchor_id: &str, title: &str) {
        db.insert_anchor(&Anchor {
            id: anchor_id.to_string(),
            title: title.to_string(),
            scope: String::new(),
            generation_status: GenerationStatus::Pending,
        })
        .unwrap();
        let count = db.last_child_position(parent_position, Breadth::A).unwrap();
        db.insert_position(&TreePosition {
            position_id: format!("{}A-{}", level, anchor_id),
            anchor_id: anchor_id.to_string(),
            parent_position_id: Some(parent_position.to_string()),
            level,
            breadth: Breadth::A,
            position: count + 1,
        })
        .unwrap();
    }

    #[test]
    fn test_resolve_by_anchor_or_position_id() {
        let db = seeded();
        let ctx = ContextAssembler::new(&db);
        let by_anchor = ctx.resolve_position("G7H2K").unwrap().unwrap();
        let by_position = ctx.resolve_position("1A-G7H2K").unwrap().unwrap();
        assert_eq!(by_anchor, by_position);
        assert!(ctx.resolve_position("NOPE1").unwrap().is_none());
    }

    #[test]
    fn test_require_position_not_found() {
        let db = seeded();
        let err = ContextAssembler::new(&db)
            .require_position("NOPE1")
            .unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn test_root_has_empty_ancestor_path() {
        let db = seeded();
        let path = ContextAssembler::new(&db).ancestor_path(ROOT_ID).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_ancestor_path_is_root_first() {
        let db = seeded();
        add_child(&db, "1A-G7H2K", 2, "PLANT", "Plant Domestication");
        add_child(&db, "2A-PLANT", 3, "WHEAT", "Wheat Cultivation");

        let path = ContextAssembler::new(&db).ancestor_path("WHEAT").unwrap();
        let titles: Vec<&str> = path.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "The Story of Everything",
                "Agricultural Revolution",
                "Plant Domestication"
            ]
        );
        assert_eq!(path[0].level, 0);
        assert_eq!(path[2].level, 2);
    }

    #[test]
    fn test_unknown_node_has_empty_path() {
        let db = seeded();
        let path = ContextAssembler::new(&db).ancestor_path("NOPE1").unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_siblings_follow_position_order() {
        let db = seeded();
        let siblings = ContextAssembler::new(&db)
            .siblings(ROOT_ID, Breadth::A)
            .unwrap();
        let ids: Vec<&str> = siblings.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["E8F2G", "Q7R2S", "G7H2K", "C9D3E"]);
    }

    #[test]
    fn test_assemble_context_for_parent() {
        let db = seeded();
        let context = ContextAssembler::new(&db)
            .assemble("G7H2K", GenerationAxis::Analytical, None, None)
            .unwrap();
        assert_eq!(context.parent.position_id, "1A-G7H2K");
        assert_eq!(context.parent.level, 1);
        assert_eq!(context.ancestor_titles(), vec!["The Story of Everything"]);
        assert!(context.siblings.is_empty());
        assert_eq!(
            context.forbidden_titles(),
            vec!["The Story of Everything", "Agricultural Revolution"]
        );
    }

    #[test]
    fn test_assemble_prefers_caller_title_and_scope() {
        let db = seeded();
        let context = ContextAssembler::new(&db)
            .assemble(
                "G7H2K",
                GenerationAxis::Temporal,
                Some("Neolithic Revolution"),
                Some("  "),
            )
            .unwrap();
        assert_eq!(context.parent.title, "Neolithic Revolution");
        assert!(context.parent.scope.contains("10,000 BCE"));
    }
}
