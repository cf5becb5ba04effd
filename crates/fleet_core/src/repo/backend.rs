//! Storage strategy selected when a repository is constructed.

use crate::config::{BackendKind, StoreConfig};
use crate::db::{ConnectionRegistry, DbHandle, DbResult};
use crate::repo::file_store::FileStore;
use crate::repo::sqlite_store::SqliteStore;
use std::path::Path;

/// Where a repository keeps its collection.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Whole collection rewritten on every mutation.
    File(FileStore),
    /// One statement per mutation, committed immediately.
    Sqlite(SqliteStore),
}

impl Backend {
    pub fn json(path: impl AsRef<Path>) -> Self {
        Self::File(FileStore::json(path))
    }

    pub fn yaml(path: impl AsRef<Path>) -> Self {
        Self::File(FileStore::yaml(path))
    }

    pub fn sqlite(db: DbHandle) -> Self {
        Self::Sqlite(SqliteStore::new(db))
    }

    /// Builds the backend named by `config`, sharing SQLite connections
    /// through `registry`.
    pub fn from_config(config: &StoreConfig, registry: &mut ConnectionRegistry) -> DbResult<Self> {
        let backend = match config.backend {
            BackendKind::Json => Self::json(&config.location),
            BackendKind::Yaml => Self::yaml(&config.location),
            BackendKind::Sqlite => {
                Self::sqlite(registry.connect(&config.location.to_string_lossy())?)
            }
        };
        Ok(backend)
    }

    /// Short backend name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::File(store) => store.format().as_str(),
            Self::Sqlite(_) => "sqlite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntityKind;

    #[test]
    fn sqlite_configs_share_registry_connection() {
        let mut registry = ConnectionRegistry::new();
        let drivers = StoreConfig::new(
            EntityKind::Drivers,
            BackendKind::Sqlite,
            Some(":memory:".into()),
        );
        let routes = StoreConfig::new(
            EntityKind::Routes,
            BackendKind::Sqlite,
            Some(":memory:".into()),
        );

        let first = Backend::from_config(&drivers, &mut registry).unwrap();
        let second = Backend::from_config(&routes, &mut registry).unwrap();

        match (first, second) {
            (Backend::Sqlite(a), Backend::Sqlite(b)) => {
                assert!(a.handle().same_connection(b.handle()))
            }
            other => panic!("unexpected backends: {other:?}"),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn file_configs_do_not_touch_registry() {
        let mut registry = ConnectionRegistry::new();
        let config = StoreConfig::new(EntityKind::Drivers, BackendKind::Yaml, None);
        let backend = Backend::from_config(&config, &mut registry).unwrap();
        assert_eq!(backend.name(), "yaml");
        assert!(registry.is_empty());
    }
}
