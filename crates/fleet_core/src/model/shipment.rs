//! Shipment domain model.
//!
//! # Invariants
//! - `route_id` and `driver_id` are positive; the referenced rows are not
//!   checked here.
//! - `departure_date <= arrival_date`.
//! - `bonus` is a finite number `>= 0`.

use crate::model::entity::{
    checked_id, optional_id, optional_integer, required, required_integer, required_number,
    required_text, Entity, EntityId, FieldMap, FieldValue,
};
use crate::model::validate::{self, ValidationError, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One trip of a driver along a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShipmentRecord", into = "ShipmentRecord")]
pub struct Shipment {
    id: Option<EntityId>,
    route_id: EntityId,
    driver_id: EntityId,
    departure_date: NaiveDate,
    arrival_date: NaiveDate,
    bonus: f64,
}

/// Flat wire shape of a shipment. Values are unchecked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<f64>,
}

impl Shipment {
    /// Creates an unsaved shipment; dates are `DD.MM.YYYY` text.
    pub fn new(
        route_id: EntityId,
        driver_id: EntityId,
        departure_date: &str,
        arrival_date: &str,
        bonus: f64,
    ) -> ValidationResult<Self> {
        let departure = validate::date(departure_date, "departure_date")?;
        let arrival = validate::date(arrival_date, "arrival_date")?;
        validate::date_range(departure, arrival, "departure_date", "arrival_date")?;

        Ok(Self {
            id: None,
            route_id: validate::positive_integer(route_id, "route_id")?,
            driver_id: validate::positive_integer(driver_id, "driver_id")?,
            departure_date: departure,
            arrival_date: arrival,
            bonus: validate::non_negative_number(bonus, "bonus")?,
        })
    }

    pub fn route_id(&self) -> EntityId {
        self.route_id
    }

    pub fn driver_id(&self) -> EntityId {
        self.driver_id
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn arrival_date(&self) -> NaiveDate {
        self.arrival_date
    }

    pub fn bonus(&self) -> f64 {
        self.bonus
    }

    /// Trip length in whole days (zero for same-day delivery).
    pub fn duration_days(&self) -> i64 {
        self.arrival_date
            .signed_duration_since(self.departure_date)
            .num_days()
    }
}

impl TryFrom<ShipmentRecord> for Shipment {
    type Error = ValidationError;

    fn try_from(record: ShipmentRecord) -> Result<Self, Self::Error> {
        let id = optional_id(record.shipment_id, "shipment_id")?;
        let mut shipment = Self::new(
            required(record.route_id, "route_id")?,
            required(record.driver_id, "driver_id")?,
            &required(record.departure_date, "departure_date")?,
            &required(record.arrival_date, "arrival_date")?,
            required(record.bonus, "bonus")?,
        )?;
        shipment.id = id;
        Ok(shipment)
    }
}

impl From<Shipment> for ShipmentRecord {
    fn from(shipment: Shipment) -> Self {
        Self {
            shipment_id: shipment.id,
            route_id: Some(shipment.route_id),
            driver_id: Some(shipment.driver_id),
            departure_date: Some(validate::format_date(shipment.departure_date)),
            arrival_date: Some(validate::format_date(shipment.arrival_date)),
            bonus: Some(shipment.bonus),
        }
    }
}

impl Entity for Shipment {
    const KIND: &'static str = "shipment";
    const ID_FIELD: &'static str = "shipment_id";
    const FIELDS: &'static [&'static str] = &[
        "shipment_id",
        "route_id",
        "driver_id",
        "departure_date",
        "arrival_date",
        "bonus",
    ];

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn with_id(mut self, id: EntityId) -> ValidationResult<Self> {
        self.id = Some(checked_id(id, Self::ID_FIELD)?);
        Ok(self)
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "shipment_id" => self.id.map_or(FieldValue::Absent, FieldValue::Integer),
            "route_id" => FieldValue::Integer(self.route_id),
            "driver_id" => FieldValue::Integer(self.driver_id),
            "departure_date" => FieldValue::Date(self.departure_date),
            "arrival_date" => FieldValue::Date(self.arrival_date),
            "bonus" => FieldValue::Number(self.bonus),
            _ => return None,
        };
        Some(value)
    }

    fn from_fields(fields: &FieldMap) -> ValidationResult<Self> {
        let id = optional_integer(fields, Self::ID_FIELD)?;
        let mut shipment = Self::new(
            required_integer(fields, "route_id")?,
            required_integer(fields, "driver_id")?,
            required_text(fields, "departure_date")?,
            required_text(fields, "arrival_date")?,
            required_number(fields, "bonus")?,
        )?;
        shipment.id = optional_id(id, Self::ID_FIELD)?;
        Ok(shipment)
    }

    fn summary(&self) -> String {
        format!(
            "#{} route {} / driver {}, {} - {}",
            self.id.unwrap_or_default(),
            self.route_id,
            self.driver_id,
            validate::format_date(self.departure_date),
            validate::format_date(self.arrival_date)
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("shipment_id", self.id.map(|id| id.to_string()).unwrap_or_default()),
            ("route_id", self.route_id.to_string()),
            ("driver_id", self.driver_id.to_string()),
            ("departure_date", validate::format_date(self.departure_date)),
            ("arrival_date", validate::format_date(self.arrival_date)),
            ("bonus", self.bonus.to_string()),
        ]
    }
}

impl Display for Shipment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Shipment ID: {}, route {}, driver {}, {} - {}, bonus {}",
            self.id.unwrap_or_default(),
            self.route_id,
            self.driver_id,
            validate::format_date(self.departure_date),
            validate::format_date(self.arrival_date),
            self.bonus
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_arrival_before_departure() {
        let err = Shipment::new(1, 1, "10.05.2024", "09.05.2024", 0.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DateOrder {
                start_field: "departure_date",
                end_field: "arrival_date",
            }
        );
    }

    #[test]
    fn same_day_delivery_is_valid() {
        let shipment = Shipment::new(2, 3, "10.05.2024", "10.05.2024", 1500.5).unwrap();
        assert_eq!(shipment.duration_days(), 0);
        assert_eq!(shipment.bonus(), 1500.5);
    }

    #[test]
    fn rejects_negative_bonus_and_bad_references() {
        assert_eq!(
            Shipment::new(1, 1, "01.01.2024", "02.01.2024", -1.0)
                .unwrap_err()
                .field(),
            "bonus"
        );
        assert_eq!(
            Shipment::new(0, 1, "01.01.2024", "02.01.2024", 0.0)
                .unwrap_err()
                .field(),
            "route_id"
        );
    }
}
