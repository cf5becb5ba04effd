//! Repository error taxonomy.

use crate::db::DbError;
use crate::model::{EntityId, ValidationError};
use crate::repo::observer::ObserverError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Record rejected before persistence.
    Validation(ValidationError),
    /// Persisted record no longer passes validation.
    InvalidData {
        entity: &'static str,
        reason: ValidationError,
    },
    NotFound {
        entity: &'static str,
        id: EntityId,
    },
    UnknownField {
        entity: &'static str,
        field: String,
    },
    Io(std::io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    Db(DbError),
    /// A subscribed observer failed after the mutation was persisted.
    Observer(ObserverError),
}

impl RepoError {
    /// Whether the failure comes from the storage backend.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Db(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData { entity, reason } => {
                write!(f, "invalid persisted {entity} data: {reason}")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UnknownField { entity, field } => {
                write!(f, "field `{field}` does not exist on {entity}")
            }
            Self::Io(err) => write!(f, "storage i/o error: {err}"),
            Self::Json(err) => write!(f, "json storage error: {err}"),
            Self::Yaml(err) => write!(f, "yaml storage error: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Observer(err) => write!(f, "observer failed: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidData { reason, .. } => Some(reason),
            Self::NotFound { .. } | Self::UnknownField { .. } => None,
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Yaml(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Observer(err) => Some(err),
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<serde_yaml::Error> for RepoError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl From<ObserverError> for RepoError {
    fn from(value: ObserverError) -> Self {
        Self::Observer(value)
    }
}
