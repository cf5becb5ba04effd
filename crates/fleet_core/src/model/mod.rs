//! Domain model for the fleet registry.
//!
//! # Responsibility
//! - Define drivers, routes and shipments and the validators they share.
//! - Keep construction the only way to obtain a record.
//!
//! # Invariants
//! - No entity value exists with an invalid field.
//! - Identity is an integer assigned by the repository on insert.

pub mod driver;
pub mod entity;
pub mod route;
pub mod shipment;
pub mod validate;

pub use driver::{Driver, DriverCard, DriverRecord};
pub use entity::{Entity, EntityId, FieldMap, FieldValue};
pub use route::{Route, RouteRecord};
pub use shipment::{Shipment, ShipmentRecord};
pub use validate::{ValidationError, ValidationResult};
