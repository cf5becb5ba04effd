//! Caller-owned registry of shared SQLite connections.
//!
//! # Responsibility
//! - Open a connection lazily on first request for an identifier.
//! - Return the same shared handle for every later request.
//!
//! # Invariants
//! - At most one open connection per trimmed identifier.
//! - Connections close only when the registry and all handles are dropped.

use super::open::{open_db, open_db_in_memory, MEMORY_IDENTIFIER};
use super::{DbError, DbResult};
use log::debug;
use rusqlite::{Connection, OptionalExtension, Params, Row};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Shared handle to one registry connection. Cloning is cheap.
#[derive(Clone)]
pub struct DbHandle {
    identifier: Rc<str>,
    conn: Rc<Connection>,
}

impl DbHandle {
    fn new(identifier: &str, conn: Connection) -> Self {
        Self {
            identifier: Rc::from(identifier),
            conn: Rc::new(conn),
        }
    }

    /// Opens a standalone in-memory handle outside any registry.
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::new(MEMORY_IDENTIFIER, open_db_in_memory()?))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Borrows the underlying connection for prepared statements.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Executes one statement and returns the number of changed rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> DbResult<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        Ok(self.conn.execute_batch(sql)?)
    }

    /// Runs a single-row query; `None` when no row matches.
    pub fn query_row<T, P, F>(&self, sql: &str, params: P, map: F) -> DbResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        Ok(self.conn.query_row(sql, params, map).optional()?)
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Opens an explicit transaction; pair with `commit`.
    pub fn begin(&self) -> DbResult<()> {
        self.execute_batch("BEGIN;")
    }

    /// Commits an open transaction. No-op in autocommit mode.
    pub fn commit(&self) -> DbResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.execute_batch("COMMIT;")
    }

    /// Whether both handles share one connection.
    pub fn same_connection(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.conn, &other.conn)
    }
}

impl Debug for DbHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbHandle")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// One shared connection per database identifier.
///
/// The identifier is a filesystem path or `:memory:`.
#[derive(Default)]
pub struct ConnectionRegistry {
    handles: BTreeMap<String, DbHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `identifier`, opening it on first use.
    pub fn connect(&mut self, identifier: &str) -> DbResult<DbHandle> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(DbError::EmptyIdentifier);
        }
        if let Some(handle) = self.handles.get(identifier) {
            debug!("event=db_connect module=db status=reused identifier={identifier}");
            return Ok(handle.clone());
        }

        let conn = if identifier == MEMORY_IDENTIFIER {
            open_db_in_memory()?
        } else {
            open_db(identifier)?
        };
        let handle = DbHandle::new(identifier, conn);
        self.handles.insert(identifier.to_string(), handle.clone());
        debug!("event=db_connect module=db status=opened identifier={identifier}");
        Ok(handle)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.handles.contains_key(identifier.trim())
    }

    /// Sorted identifiers of every open connection.
    pub fn identifiers(&self) -> Vec<String> {
        self.handles.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
