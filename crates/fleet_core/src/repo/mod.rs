//! Repository layer: one generic repository over pluggable storage.
//!
//! # Responsibility
//! - Provide CRUD, pagination, sorting and change notification for every
//!   entity type.
//! - Isolate file formats and SQL from controllers and front-ends.
//!
//! # Invariants
//! - Writes only ever persist validated entities.
//! - Reads rebuild entities through validation; raw rows never escape.

pub mod backend;
pub mod error;
pub mod file_store;
pub mod observer;
pub mod repository;
pub mod sqlite_store;

pub use backend::Backend;
pub use error::{RepoError, RepoResult};
pub use file_store::{FileFormat, FileStore};
pub use observer::{ChangeEvent, ChangeKind, Observer, ObserverError, SubscriptionId};
pub use repository::Repository;
pub use sqlite_store::{SqliteStore, TableEntity};
