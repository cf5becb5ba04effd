//! Core domain logic for the fleet registry.
//! Drivers, routes and shipments live here together with their storage,
//! change notification and controller contracts.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{BackendKind, ConfigError, EntityKind, StoreConfig};
pub use controller::{Controller, ControllerError, ControllerResult, View};
pub use db::{ConnectionRegistry, DbError, DbHandle, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{
    Driver, DriverCard, Entity, EntityId, FieldMap, FieldValue, Route, Shipment,
    ValidationError, ValidationResult,
};
pub use repo::{
    Backend, ChangeEvent, ChangeKind, Observer, ObserverError, RepoError, RepoResult,
    Repository, SubscriptionId, TableEntity,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
