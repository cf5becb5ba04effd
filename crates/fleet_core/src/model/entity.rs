//! Entity contract shared by drivers, routes and shipments.
//!
//! # Responsibility
//! - Describe what a repository needs from a record: identity, field
//!   names, comparable field values and validated construction.
//! - Provide helpers for building entities from raw form input.
//!
//! # Invariants
//! - Ids are positive; a record without an id has not been stored yet.
//! - `FIELDS` lists every name accepted by `Entity::field`.

use crate::model::validate::{self, ValidationError, ValidationResult};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Repository-assigned identity.
pub type EntityId = i64;

/// Raw `field -> text` input produced by a presentation layer.
pub type FieldMap = BTreeMap<String, String>;

/// Comparable projection of one entity field, used for sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Absent,
    Integer(i64),
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    /// Total order: absent values first, then by value within one kind.
    ///
    /// Mixed kinds never occur for one field; they are ordered by kind rank.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Absent => 0,
            Self::Integer(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
            Self::Date(_) => 4,
        }
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::Absent, |text| Self::Text(text.to_string()))
    }
}

/// Validated domain record held by a repository.
pub trait Entity: Clone + Debug + PartialEq + Serialize + DeserializeOwned + 'static {
    /// Singular lowercase name, used in logs and errors.
    const KIND: &'static str;
    /// Serialized name of the identity field.
    const ID_FIELD: &'static str;
    /// Every sortable field name, identity included.
    const FIELDS: &'static [&'static str];

    fn id(&self) -> Option<EntityId>;

    /// Returns the same record tagged with `id`.
    fn with_id(self, id: EntityId) -> ValidationResult<Self>;

    /// Comparable value of `name`, or `None` when the field does not exist.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Builds a record from raw form input, validating every field.
    fn from_fields(fields: &FieldMap) -> ValidationResult<Self>;

    /// One-line rendering for list views.
    fn summary(&self) -> String;

    /// Labelled field values for detail views, in declaration order.
    fn details(&self) -> Vec<(&'static str, String)>;

    fn has_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

pub(crate) fn checked_id(id: EntityId, field: &'static str) -> ValidationResult<EntityId> {
    validate::positive_integer(id, field)
}

pub(crate) fn optional_id(
    id: Option<EntityId>,
    field: &'static str,
) -> ValidationResult<Option<EntityId>> {
    id.map(|value| checked_id(value, field)).transpose()
}

pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> ValidationResult<T> {
    value.ok_or(ValidationError::Missing { field })
}

/// Looks up `field`; blank input counts as absent.
pub(crate) fn text_field<'a>(fields: &'a FieldMap, field: &str) -> Option<&'a str> {
    fields
        .get(field)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

pub(crate) fn required_text<'a>(
    fields: &'a FieldMap,
    field: &'static str,
) -> ValidationResult<&'a str> {
    match fields.get(field) {
        Some(value) => Ok(value.as_str()),
        None => Err(ValidationError::Missing { field }),
    }
}

pub(crate) fn required_integer(fields: &FieldMap, field: &'static str) -> ValidationResult<i64> {
    let raw = text_field(fields, field).ok_or(ValidationError::Missing { field })?;
    validate::parse_integer(raw, field)
}

pub(crate) fn optional_integer(
    fields: &FieldMap,
    field: &'static str,
) -> ValidationResult<Option<i64>> {
    text_field(fields, field)
        .map(|raw| validate::parse_integer(raw, field))
        .transpose()
}

pub(crate) fn required_number(fields: &FieldMap, field: &'static str) -> ValidationResult<f64> {
    let raw = text_field(fields, field).ok_or(ValidationError::Missing { field })?;
    validate::parse_number(raw, field)
}
