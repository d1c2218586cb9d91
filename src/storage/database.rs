//! SQLite Database
//!
//! Embedded tree store using rusqlite with r2d2 connection pooling.
//!
//! Two tables: `anchors` (topics) and `tree_positions` (placements of an
//! anchor under a parent along one breadth). Row helpers that write take a
//! plain `&Connection` so callers can run them inside a transaction.

use std::path::Path;
use std::str::FromStr;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use tracing::debug;

use fractal_history_core::{Anchor, Breadth, CoreError, TreePosition};

use crate::models::anchor::TreeNode;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{database_path, ensure_parent_dir};

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// A pooled connection
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const NODE_COLUMNS: &str = "a.id, p.position_id, p.parent_position_id, a.title, a.scope, \
     a.generation_status, p.level, p.breadth, p.position";

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create an in-memory database for testing.
    ///
    /// A single pooled connection keeps every caller on the same in-memory
    /// database.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(enable_foreign_keys);
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Open the database at the default location (~/.fractal-history/tree.db)
    pub fn new() -> AppResult<Self> {
        Self::open(&database_path()?)
    }

    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> AppResult<Self> {
        ensure_parent_dir(path)?;

        let manager = SqliteConnectionManager::file(path).with_init(enable_foreign_keys);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        debug!(path = %path.display(), "database: opened");
        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS anchors (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                scope TEXT NOT NULL DEFAULT '',
                generation_status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (generation_status IN ('pending', 'placeholder', 'complete')),
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tree_positions (
                position_id TEXT PRIMARY KEY,
                anchor_id TEXT NOT NULL REFERENCES anchors(id),
                parent_position_id TEXT REFERENCES tree_positions(position_id),
                level INTEGER NOT NULL CHECK (level >= 0),
                breadth TEXT NOT NULL CHECK (breadth IN ('A', 'B', 'C', 'ROOT')),
                position INTEGER NOT NULL CHECK (position >= 1),
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (parent_position_id, breadth, position)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tree_positions_anchor ON tree_positions(anchor_id)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tree_positions_parent
             ON tree_positions(parent_position_id, breadth, position)",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }

    /// Run `f` inside a transaction. The transaction commits only if `f`
    /// returns `Ok`; otherwise it is rolled back when dropped.
    pub fn with_transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> AppResult<T>,
    {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    // ========================================================================
    // Anchors
    // ========================================================================

    /// Insert an anchor row
    pub fn insert_anchor(&self, anchor: &Anchor) -> AppResult<()> {
        let conn = self.get_connection()?;
        insert_anchor(&conn, anchor)
    }

    /// Get an anchor by id
    pub fn get_anchor(&self, id: &str) -> AppResult<Option<Anchor>> {
        let conn = self.get_connection()?;
        let result = conn.query_row(
            "SELECT id, title, scope, generation_status FROM anchors WHERE id = ?1",
            params![id],
            row_to_anchor,
        );

        match result {
            Ok(anchor) => Ok(Some(anchor)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Count all anchor rows
    pub fn count_anchors(&self) -> AppResult<u32> {
        let conn = self.get_connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM anchors", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========================================================================
    // Tree positions
    // ========================================================================

    /// Insert a tree position row
    pub fn insert_position(&self, position: &TreePosition) -> AppResult<()> {
        let conn = self.get_connection()?;
        insert_position(&conn, position)
    }

    /// Get a tree position by its position id
    pub fn get_position(&self, position_id: &str) -> AppResult<Option<TreePosition>> {
        let conn = self.get_connection()?;
        get_position(&conn, position_id)
    }

    /// The position an anchor is primarily known by: lowest level first,
    /// then the earliest inserted.
    pub fn get_primary_position(&self, anchor_id: &str) -> AppResult<Option<TreePosition>> {
        let conn = self.get_connection()?;
        let result = conn
            .query_row(
                "SELECT position_id, anchor_id, parent_position_id, level, breadth, position
                 FROM tree_positions
                 WHERE anchor_id = ?1
                 ORDER BY level ASC, rowid ASC
                 LIMIT 1",
                params![anchor_id],
                row_to_position,
            )
            .optional()?;
        Ok(result)
    }

    /// The root node (the single position without a parent)
    pub fn get_root(&self) -> AppResult<Option<TreeNode>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {} FROM tree_positions p
             JOIN anchors a ON a.id = p.anchor_id
             WHERE p.parent_position_id IS NULL AND p.breadth = 'ROOT'
             ORDER BY p.rowid ASC
             LIMIT 1",
            NODE_COLUMNS
        );
        let result = conn.query_row(&sql, [], row_to_node).optional()?;
        Ok(result)
    }

    /// Children of a position along one breadth, ordered by `position`
    pub fn list_child_nodes(
        &self,
        parent_position_id: &str,
        breadth: Breadth,
    ) -> AppResult<Vec<TreeNode>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {} FROM tree_positions p
             JOIN anchors a ON a.id = p.anchor_id
             WHERE p.parent_position_id = ?1 AND p.breadth = ?2
             ORDER BY p.position ASC",
            NODE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![parent_position_id, breadth.as_str()], row_to_node)?;

        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(row?);
        }
        Ok(nodes)
    }

    /// Highest `position` among the children of a position along one breadth (0 if none)
    pub fn last_child_position(&self, parent_position_id: &str, breadth: Breadth) -> AppResult<u32> {
        let conn = self.get_connection()?;
        last_child_position(&conn, parent_position_id, breadth)
    }
}

fn enable_foreign_keys(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON")
}

// ============================================================================
// Connection-level row helpers (usable inside transactions)
// ============================================================================

/// Insert an anchor row
pub fn insert_anchor(conn: &Connection, anchor: &Anchor) -> AppResult<()> {
    conn.execute(
        "INSERT INTO anchors (id, title, scope, generation_status) VALUES (?1, ?2, ?3, ?4)",
        params![
            anchor.id,
            anchor.title,
            anchor.scope,
            anchor.generation_status.as_str()
        ],
    )?;
    Ok(())
}

/// Insert an anchor row unless the id already exists. Returns whether a row was written.
pub fn insert_anchor_if_absent(conn: &Connection, anchor: &Anchor) -> AppResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO anchors (id, title, scope, generation_status)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            anchor.id,
            anchor.title,
            anchor.scope,
            anchor.generation_status.as_str()
        ],
    )?;
    Ok(changed > 0)
}

/// Insert a tree position row
pub fn insert_position(conn: &Connection, position: &TreePosition) -> AppResult<()> {
    conn.execute(
        "INSERT INTO tree_positions
            (position_id, anchor_id, parent_position_id, level, breadth, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            position.position_id,
            position.anchor_id,
            position.parent_position_id,
            position.level,
            position.breadth.as_str(),
            position.position
        ],
    )?;
    Ok(())
}

/// Insert a tree position row unless it already exists. Returns whether a row was written.
pub fn insert_position_if_absent(conn: &Connection, position: &TreePosition) -> AppResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO tree_positions
            (position_id, anchor_id, parent_position_id, level, breadth, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            position.position_id,
            position.anchor_id,
            position.parent_position_id,
            position.level,
            position.breadth.as_str(),
            position.position
        ],
    )?;
    Ok(changed > 0)
}

/// Get a tree position by id
pub fn get_position(conn: &Connection, position_id: &str) -> AppResult<Option<TreePosition>> {
    let result = conn
        .query_row(
            "SELECT position_id, anchor_id, parent_position_id, level, breadth, position
             FROM tree_positions WHERE position_id = ?1",
            params![position_id],
            row_to_position,
        )
        .optional()?;
    Ok(result)
}

/// Highest `position` among the children of a position along one breadth.
///
/// Gaps left by earlier partial batches are skipped over, not refilled.
pub fn last_child_position(
    conn: &Connection,
    parent_position_id: &str,
    breadth: Breadth,
) -> AppResult<u32> {
    let last = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) FROM tree_positions
         WHERE parent_position_id = ?1 AND breadth = ?2",
        params![parent_position_id, breadth.as_str()],
        |row| row.get(0),
    )?;
    Ok(last)
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = CoreError>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: CoreError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_anchor(row: &Row<'_>) -> rusqlite::Result<Anchor> {
    Ok(Anchor {
        id: row.get(0)?,
        title: row.get(1)?,
        scope: row.get(2)?,
        generation_status: parse_column(row, 3)?,
    })
}

fn row_to_position(row: &Row<'_>) -> rusqlite::Result<TreePosition> {
    Ok(TreePosition {
        position_id: row.get(0)?,
        anchor_id: row.get(1)?,
        parent_position_id: row.get(2)?,
        level: row.get(3)?,
        breadth: parse_column(row, 4)?,
        position: row.get(5)?,
    })
}

fn row_to_node(row: &Row<'_>) -> rusqlite::Result<TreeNode> {
    Ok(TreeNode {
        id: row.get(0)?,
        position_id: row.get(1)?,
        parent_position_id: row.get(2)?,
        title: row.get(3)?,
        scope: row.get(4)?,
        generation_status: parse_column(row, 5)?,
        level: row.get(6)?,
        breadth: parse_column(row, 7)?,
        position: row.get(8)?,
    })
}
