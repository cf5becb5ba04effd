//! Storage selection shared by every front-end.
//!
//! # Responsibility
//! - Name the entity collection and backend a process works with.
//! - Derive default store locations when none is configured.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Default SQLite file; every entity table lives in the same database.
pub const DEFAULT_DATABASE_FILE: &str = "fleet.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownEntity(String),
    UnknownBackend(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntity(value) => write!(
                f,
                "unknown entity `{value}`; expected drivers|routes|shipments"
            ),
            Self::UnknownBackend(value) => {
                write!(f, "unknown backend `{value}`; expected json|yaml|sqlite")
            }
        }
    }
}

impl Error for ConfigError {}

/// Which entity collection to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Drivers,
    Routes,
    Shipments,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drivers => "drivers",
            Self::Routes => "routes",
            Self::Shipments => "shipments",
        }
    }
}

impl FromStr for EntityKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "drivers" | "driver" => Ok(Self::Drivers),
            "routes" | "route" => Ok(Self::Routes),
            "shipments" | "shipment" => Ok(Self::Shipments),
            other => Err(ConfigError::UnknownEntity(other.to_string())),
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence mechanism behind a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Json,
    Yaml,
    Sqlite,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Sqlite => "sqlite",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "sqlite" | "db" => Ok(Self::Sqlite),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved storage selection for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub entity: EntityKind,
    pub backend: BackendKind,
    pub location: PathBuf,
}

impl StoreConfig {
    /// Uses `location` when given, otherwise `default_location`.
    pub fn new(entity: EntityKind, backend: BackendKind, location: Option<PathBuf>) -> Self {
        Self {
            entity,
            backend,
            location: location.unwrap_or_else(|| default_location(entity, backend)),
        }
    }
}

/// `drivers.json`, `routes.yaml`, or the shared database file.
pub fn default_location(entity: EntityKind, backend: BackendKind) -> PathBuf {
    match backend {
        BackendKind::Json => PathBuf::from(format!("{entity}.json")),
        BackendKind::Yaml => PathBuf::from(format!("{entity}.yaml")),
        BackendKind::Sqlite => PathBuf::from(DEFAULT_DATABASE_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Drivers".parse::<EntityKind>().unwrap(), EntityKind::Drivers);
        assert_eq!(" yml ".parse::<BackendKind>().unwrap(), BackendKind::Yaml);
        assert_eq!(
            "mysql".parse::<BackendKind>().unwrap_err(),
            ConfigError::UnknownBackend("mysql".to_string())
        );
    }

    #[test]
    fn default_locations_follow_backend() {
        let config = StoreConfig::new(EntityKind::Routes, BackendKind::Yaml, None);
        assert_eq!(config.location, PathBuf::from("routes.yaml"));

        let config = StoreConfig::new(EntityKind::Shipments, BackendKind::Sqlite, None);
        assert_eq!(config.location, PathBuf::from("fleet.sqlite3"));

        let explicit = PathBuf::from("/tmp/custom.json");
        let config = StoreConfig::new(EntityKind::Drivers, BackendKind::Json, Some(explicit.clone()));
        assert_eq!(config.location, explicit);
    }
}
