//! Route domain model.

use crate::model::entity::{
    checked_id, optional_id, optional_integer, required, required_integer, required_text, Entity,
    EntityId, FieldMap, FieldValue,
};
use crate::model::validate::{self, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Delivery route with a fixed payment for the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RouteRecord", into = "RouteRecord")]
pub struct Route {
    id: Option<EntityId>,
    route_name: String,
    start_route: String,
    end_route: String,
    distance: i64,
    driver_payment: i64,
}

/// Flat wire shape of a route. Values are unchecked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_payment: Option<i64>,
}

impl Route {
    pub fn new(
        route_name: &str,
        start_route: &str,
        end_route: &str,
        distance: i64,
        driver_payment: i64,
    ) -> ValidationResult<Self> {
        Ok(Self {
            id: None,
            route_name: validate::non_empty_string(route_name, "route_name")?,
            start_route: validate::non_empty_string(start_route, "start_route")?,
            end_route: validate::non_empty_string(end_route, "end_route")?,
            distance: validate::positive_integer(distance, "distance")?,
            driver_payment: validate::positive_integer(driver_payment, "driver_payment")?,
        })
    }

    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    pub fn start_route(&self) -> &str {
        &self.start_route
    }

    pub fn end_route(&self) -> &str {
        &self.end_route
    }

    /// Length in kilometres.
    pub fn distance(&self) -> i64 {
        self.distance
    }

    pub fn driver_payment(&self) -> i64 {
        self.driver_payment
    }
}

impl TryFrom<RouteRecord> for Route {
    type Error = ValidationError;

    fn try_from(record: RouteRecord) -> Result<Self, Self::Error> {
        let id = optional_id(record.route_id, "route_id")?;
        let mut route = Self::new(
            &required(record.route_name, "route_name")?,
            &required(record.start_route, "start_route")?,
            &required(record.end_route, "end_route")?,
            required(record.distance, "distance")?,
            required(record.driver_payment, "driver_payment")?,
        )?;
        route.id = id;
        Ok(route)
    }
}

impl From<Route> for RouteRecord {
    fn from(route: Route) -> Self {
        Self {
            route_id: route.id,
            route_name: Some(route.route_name),
            start_route: Some(route.start_route),
            end_route: Some(route.end_route),
            distance: Some(route.distance),
            driver_payment: Some(route.driver_payment),
        }
    }
}

impl Entity for Route {
    const KIND: &'static str = "route";
    const ID_FIELD: &'static str = "route_id";
    const FIELDS: &'static [&'static str] = &[
        "route_id",
        "route_name",
        "start_route",
        "end_route",
        "distance",
        "driver_payment",
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
            "route_id" => self.id.map_or(FieldValue::Absent, FieldValue::Integer),
            "route_name" => FieldValue::Text(self.route_name.clone()),
            "start_route" => FieldValue::Text(self.start_route.clone()),
            "end_route" => FieldValue::Text(self.end_route.clone()),
            "distance" => FieldValue::Integer(self.distance),
            "driver_payment" => FieldValue::Integer(self.driver_payment),
            _ => return None,
        };
        Some(value)
    }

    fn from_fields(fields: &FieldMap) -> ValidationResult<Self> {
        let id = optional_integer(fields, Self::ID_FIELD)?;
        let mut route = Self::new(
            required_text(fields, "route_name")?,
            required_text(fields, "start_route")?,
            required_text(fields, "end_route")?,
            required_integer(fields, "distance")?,
            required_integer(fields, "driver_payment")?,
        )?;
        route.id = optional_id(id, Self::ID_FIELD)?;
        Ok(route)
    }

    fn summary(&self) -> String {
        format!(
            "#{} {}: {} -> {}, {} km",
            self.id.unwrap_or_default(),
            self.route_name,
            self.start_route,
            self.end_route,
            self.distance
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("route_id", self.id.map(|id| id.to_string()).unwrap_or_default()),
            ("route_name", self.route_name.clone()),
            ("start_route", self.start_route.clone()),
            ("end_route", self.end_route.clone()),
            ("distance", self.distance.to_string()),
            ("driver_payment", self.driver_payment.to_string()),
        ]
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Route ID: {}, {} ({} -> {}), {} km, payment {}",
            self.id.unwrap_or_default(),
            self.route_name,
            self.start_route,
            self.end_route,
            self.distance,
            self.driver_payment
        )
    }
}
