//! Tree Writer
//!
//! Persists parsed candidates under a parent position: one anchor row and
//! one tree position row per candidate, in ascending `position` order.
//!
//! Stored positions continue after the highest position already present on
//! the same `(parent, breadth)`, so a fresh parent gets exactly `1..k`.

use rusqlite::Connection;
use tracing::{debug, warn};

use fractal_history_core::{
    Anchor, CandidateAnchor, GenerationAxis, GenerationStatus, TreePosition,
};

use crate::models::anchor::{InsertedChild, TreeNode, WriteFailure};
use crate::models::settings::BatchPolicy;
use crate::services::tree::ids::{mint_anchor_id, mint_position_id};
use crate::storage::database::{get_position, insert_anchor, insert_position, last_child_position};
use crate::storage::Database;
use crate::utils::error::{AppError, AppResult};

/// Attempts at minting an unused anchor id before giving up
pub const MAX_ID_ATTEMPTS: u32 = 3;

/// Rows written by one batch, and the candidates that could not be stored
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub inserted: Vec<InsertedChild>,
    pub failures: Vec<WriteFailure>,
}

/// Writes generated children into the tree store
pub struct TreeWriter<'a> {
    db: &'a Database,
    policy: BatchPolicy,
}

impl<'a> TreeWriter<'a> {
    pub fn new(db: &'a Database, policy: BatchPolicy) -> Self {
        Self { db, policy }
    }

    /// Store `candidates` as children of `parent_position_id` along `axis`.
    ///
    /// Under `BestEffort` each candidate commits on its own and failures are
    /// collected in the report. Under `Atomic` the first failure rolls back
    /// the whole batch and is returned as the error.
    pub fn write_children(
        &self,
        parent_id: &str,
        axis: GenerationAxis,
        parent_position_id: &str,
        candidates: &[CandidateAnchor],
        status: GenerationStatus,
    ) -> AppResult<WriteReport> {
        if self.db.get_position(parent_position_id)?.is_none() {
            return Err(AppError::not_found(format!(
                "Parent has no tree position: {}",
                parent_position_id
            )));
        }

        let mut ordered: Vec<&CandidateAnchor> = candidates.iter().collect();
        ordered.sort_by_key(|c| c.position);

        let report = match self.policy {
            BatchPolicy::BestEffort => {
                self.write_best_effort(axis, parent_position_id, &ordered, status)?
            }
            BatchPolicy::Atomic => self.write_atomic(axis, parent_position_id, &ordered, status)?,
        };

        debug!(
            parent_id,
            breadth = %axis.breadth(),
            count = report.inserted.len(),
            failed = report.failures.len(),
            "writer: children written"
        );
        Ok(report)
    }

    fn write_best_effort(
        &self,
        axis: GenerationAxis,
        parent_position_id: &str,
        candidates: &[&CandidateAnchor],
        status: GenerationStatus,
    ) -> AppResult<WriteReport> {
        let offset = self.db.last_child_position(parent_position_id, axis.breadth())?;
        let mut report = WriteReport::default();

        for candidate in candidates {
            let result = self.db.with_transaction(|tx| {
                write_child(tx, axis, parent_position_id, offset, candidate, status)
            });

            match result {
                Ok(node) => report
                    .inserted
                    .push(InsertedChild::from_candidate(node, candidate)),
                Err(e) => {
                    warn!(
                        title = %candidate.title,
                        position = offset + candidate.position,
                        error = %e,
                        "writer: failed to store child"
                    );
                    report.failures.push(WriteFailure {
                        title: candidate.title.clone(),
                        position: offset + candidate.position,
                        category: e.category().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn write_atomic(
        &self,
        axis: GenerationAxis,
        parent_position_id: &str,
        candidates: &[&CandidateAnchor],
        status: GenerationStatus,
    ) -> AppResult<WriteReport> {
        self.db.with_transaction(|tx| {
            let offset = last_child_position(tx, parent_position_id, axis.breadth())?;
            let mut report = WriteReport::default();
            for candidate in candidates {
                let node = write_child(tx, axis, parent_position_id, offset, candidate, status)?;
                report
                    .inserted
                    .push(InsertedChild::from_candidate(node, candidate));
            }
            Ok(report)
        })
    }
}

/// Insert one anchor and its position. The parent level is read fresh.
fn write_child(
    conn: &Connection,
    axis: GenerationAxis,
    parent_position_id: &str,
    offset: u32,
    candidate: &CandidateAnchor,
    status: GenerationStatus,
) -> AppResult<TreeNode> {
    let parent = get_position(conn, parent_position_id)?.ok_or_else(|| {
        AppError::not_found(format!("Parent has no tree position: {}", parent_position_id))
    })?;
    let level = parent.level + 1;
    let breadth = axis.breadth();

    let anchor = insert_anchor_with_fresh_id(conn, candidate, status)?;

    let position = TreePosition {
        position_id: mint_position_id(level, breadth, &anchor.id),
        anchor_id: anchor.id.clone(),
        parent_position_id: Some(parent.position_id),
        level,
        breadth,
        position: offset + candidate.position,
    };
    insert_position(conn, &position)?;

    Ok(TreeNode {
        id: anchor.id,
        position_id: position.position_id,
        parent_position_id: position.parent_position_id,
        title: anchor.title,
        scope: anchor.scope,
        generation_status: anchor.generation_status,
        level,
        breadth,
        position: position.position,
    })
}

/// Insert the candidate's anchor row, minting a new id on a primary-key conflict.
fn insert_anchor_with_fresh_id(
    conn: &Connection,
    candidate: &CandidateAnchor,
    status: GenerationStatus,
) -> AppResult<Anchor> {
    let mut attempt = 1;
    loop {
        let anchor = Anchor {
            id: mint_anchor_id(),
            title: candidate.title.clone(),
            scope: candidate.scope.clone(),
            generation_status: status,
        };

        match insert_anchor(conn, &anchor) {
            Ok(()) => return Ok(anchor),
            Err(e) if e.is_primary_key_conflict() && attempt < MAX_ID_ATTEMPTS => {
                debug!(id = %anchor.id, attempt, "writer: anchor id taken, minting again");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
