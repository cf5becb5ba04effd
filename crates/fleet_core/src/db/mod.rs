//! SQLite connection bootstrap and the shared connection registry.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the relational backend.
//! - Hand out one shared handle per database identifier.
//!
//! # Invariants
//! - Declared foreign keys stay unenforced (`PRAGMA foreign_keys` is off).
//! - Handles are single-threaded (`Rc`-based, `!Send`).

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
mod registry;

pub use open::{open_db, open_db_in_memory, MEMORY_IDENTIFIER};
pub use registry::{ConnectionRegistry, DbHandle};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    EmptyIdentifier,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "database path error: {err}"),
            Self::EmptyIdentifier => write!(f, "database identifier cannot be empty"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::EmptyIdentifier => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
