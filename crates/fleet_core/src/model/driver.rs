//! Driver domain model.
//!
//! # Responsibility
//! - Define the driver record and its optional document card.
//! - Validate every field before a `Driver` value can exist.
//!
//! # Invariants
//! - Name parts are trimmed and non-empty; `experience >= 0`.
//! - The document card is either complete (all six fields) or absent.
//! - Deserialization goes through the same validation as `Driver::new`.

use crate::model::entity::{
    checked_id, optional_id, optional_integer, required, required_integer, required_text,
    text_field, Entity, EntityId, FieldMap, FieldValue,
};
use crate::model::validate::{self, ValidationError, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const CARD_GROUP: &str = "driver card";
const CARD_FIELDS: [&str; 6] = [
    "birthday",
    "phone_number",
    "driver_license",
    "vehicle_title",
    "insurance_policy",
    "license_plate",
];

/// Registered driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DriverRecord", into = "DriverRecord")]
pub struct Driver {
    id: Option<EntityId>,
    last_name: String,
    first_name: String,
    patronymic: String,
    experience: i64,
    card: Option<DriverCard>,
}

/// Personal documents of a driver (extended registry variant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCard {
    birthday: NaiveDate,
    phone_number: String,
    driver_license: String,
    vehicle_title: String,
    insurance_policy: String,
    license_plate: String,
}

/// Flat wire shape of a driver, shared by file and table storage.
///
/// Values are unchecked; convert with `Driver::try_from`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
}

impl Driver {
    /// Creates an unsaved driver without a document card.
    pub fn new(
        last_name: &str,
        first_name: &str,
        patronymic: &str,
        experience: i64,
    ) -> ValidationResult<Self> {
        Ok(Self {
            id: None,
            last_name: validate::non_empty_string(last_name, "last_name")?,
            first_name: validate::non_empty_string(first_name, "first_name")?,
            patronymic: validate::non_empty_string(patronymic, "patronymic")?,
            experience: validate::non_negative_integer(experience, "experience")?,
            card: None,
        })
    }

    /// Attaches a validated document card.
    pub fn with_card(mut self, card: DriverCard) -> Self {
        self.card = Some(card);
        self
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn patronymic(&self) -> &str {
        &self.patronymic
    }

    /// Driving experience in full years.
    pub fn experience(&self) -> i64 {
        self.experience
    }

    pub fn card(&self) -> Option<&DriverCard> {
        self.card.as_ref()
    }

    /// Last name with initials, e.g. `Ivanov I. I.`.
    pub fn short_name(&self) -> String {
        format!(
            "{} {}. {}.",
            self.last_name,
            initial(&self.first_name),
            initial(&self.patronymic)
        )
    }
}

impl DriverCard {
    pub fn new(
        birthday: &str,
        phone_number: &str,
        driver_license: &str,
        vehicle_title: &str,
        insurance_policy: &str,
        license_plate: &str,
    ) -> ValidationResult<Self> {
        Ok(Self {
            birthday: validate::date(birthday, "birthday")?,
            phone_number: validate::phone_number(phone_number, "phone_number")?,
            driver_license: validate::license(driver_license, "driver_license")?,
            vehicle_title: validate::license(vehicle_title, "vehicle_title")?,
            insurance_policy: validate::insurance_policy(insurance_policy, "insurance_policy")?,
            license_plate: validate::license_plate(license_plate, "license_plate")?,
        })
    }

    pub fn birthday(&self) -> NaiveDate {
        self.birthday
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn driver_license(&self) -> &str {
        &self.driver_license
    }

    pub fn vehicle_title(&self) -> &str {
        &self.vehicle_title
    }

    pub fn insurance_policy(&self) -> &str {
        &self.insurance_policy
    }

    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    fn from_parts(parts: [Option<&str>; 6]) -> ValidationResult<Option<Self>> {
        if parts.iter().all(Option::is_none) {
            return Ok(None);
        }
        if let Some(index) = parts.iter().position(Option::is_none) {
            return Err(ValidationError::Incomplete {
                group: CARD_GROUP,
                missing: CARD_FIELDS[index],
            });
        }
        let [birthday, phone, license, title, policy, plate] = parts.map(Option::unwrap_or_default);
        Self::new(birthday, phone, license, title, policy, plate).map(Some)
    }
}

impl TryFrom<DriverRecord> for Driver {
    type Error = ValidationError;

    fn try_from(record: DriverRecord) -> Result<Self, Self::Error> {
        let id = optional_id(record.driver_id, "driver_id")?;
        let last_name = required(record.last_name, "last_name")?;
        let first_name = required(record.first_name, "first_name")?;
        let patronymic = required(record.patronymic, "patronymic")?;
        let experience = required(record.experience, "experience")?;
        let card = DriverCard::from_parts([
            record.birthday.as_deref(),
            record.phone_number.as_deref(),
            record.driver_license.as_deref(),
            record.vehicle_title.as_deref(),
            record.insurance_policy.as_deref(),
            record.license_plate.as_deref(),
        ])?;

        let mut driver = Self::new(&last_name, &first_name, &patronymic, experience)?;
        driver.id = id;
        driver.card = card;
        Ok(driver)
    }
}

impl From<Driver> for DriverRecord {
    fn from(driver: Driver) -> Self {
        let card = driver.card;
        Self {
            driver_id: driver.id,
            last_name: Some(driver.last_name),
            first_name: Some(driver.first_name),
            patronymic: Some(driver.patronymic),
            experience: Some(driver.experience),
            birthday: card.as_ref().map(|c| validate::format_date(c.birthday)),
            phone_number: card.as_ref().map(|c| c.phone_number.clone()),
            driver_license: card.as_ref().map(|c| c.driver_license.clone()),
            vehicle_title: card.as_ref().map(|c| c.vehicle_title.clone()),
            insurance_policy: card.as_ref().map(|c| c.insurance_policy.clone()),
            license_plate: card.map(|c| c.license_plate),
        }
    }
}

impl Entity for Driver {
    const KIND: &'static str = "driver";
    const ID_FIELD: &'static str = "driver_id";
    const FIELDS: &'static [&'static str] = &[
        "driver_id",
        "last_name",
        "first_name",
        "patronymic",
        "experience",
        "birthday",
        "phone_number",
        "driver_license",
        "vehicle_title",
        "insurance_policy",
        "license_plate",
    ];

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn with_id(mut self, id: EntityId) -> ValidationResult<Self> {
        self.id = Some(checked_id(id, Self::ID_FIELD)?);
        Ok(self)
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let card = self.card.as_ref();
        let value = match name {
            "driver_id" => self.id.map_or(FieldValue::Absent, FieldValue::Integer),
            "last_name" => FieldValue::Text(self.last_name.clone()),
            "first_name" => FieldValue::Text(self.first_name.clone()),
            "patronymic" => FieldValue::Text(self.patronymic.clone()),
            "experience" => FieldValue::Integer(self.experience),
            "birthday" => card.map_or(FieldValue::Absent, |c| FieldValue::Date(c.birthday)),
            "phone_number" => card.map(|c| c.phone_number.as_str()).into(),
            "driver_license" => card.map(|c| c.driver_license.as_str()).into(),
            "vehicle_title" => card.map(|c| c.vehicle_title.as_str()).into(),
            "insurance_policy" => card.map(|c| c.insurance_policy.as_str()).into(),
            "license_plate" => card.map(|c| c.license_plate.as_str()).into(),
            _ => return None,
        };
        Some(value)
    }

    fn from_fields(fields: &FieldMap) -> ValidationResult<Self> {
        let id = optional_integer(fields, Self::ID_FIELD)?;
        let mut driver = Self::new(
            required_text(fields, "last_name")?,
            required_text(fields, "first_name")?,
            required_text(fields, "patronymic")?,
            required_integer(fields, "experience")?,
        )?;
        driver.card = DriverCard::from_parts(CARD_FIELDS.map(|name| text_field(fields, name)))?;
        driver.id = optional_id(id, Self::ID_FIELD)?;
        Ok(driver)
    }

    fn summary(&self) -> String {
        format!(
            "#{} {}, experience {} years",
            self.id.unwrap_or_default(),
            self.short_name(),
            self.experience
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("driver_id", self.id.map(|id| id.to_string()).unwrap_or_default()),
            ("last_name", self.last_name.clone()),
            ("first_name", self.first_name.clone()),
            ("patronymic", self.patronymic.clone()),
            ("experience", self.experience.to_string()),
        ];
        if let Some(card) = &self.card {
            rows.extend([
                ("birthday", validate::format_date(card.birthday)),
                ("phone_number", card.phone_number.clone()),
                ("driver_license", card.driver_license.clone()),
                ("vehicle_title", card.vehicle_title.clone()),
                ("insurance_policy", card.insurance_policy.clone()),
                ("license_plate", card.license_plate.clone()),
            ]);
        }
        rows
    }
}

impl Display for Driver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Driver ID: {}, Name: {} {} {}, Experience: {} years",
            self.id.unwrap_or_default(),
            self.last_name,
            self.first_name,
            self.patronymic,
            self.experience
        )
    }
}

fn initial(value: &str) -> char {
    value.chars().next().unwrap_or(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_card() -> DriverCard {
        DriverCard::new(
            "15.03.1985",
            "+7(912)345-67-89",
            "12 34 567890",
            "98 76 543210",
            "123 456789012345",
            "А123ВС77",
        )
        .unwrap()
    }

    #[test]
    fn short_name_uses_initials() {
        let driver = Driver::new("Иванов", "Иван", "Иванович", 5).unwrap();
        assert_eq!(driver.short_name(), "Иванов И. И.");
    }

    #[test]
    fn partial_card_is_rejected() {
        let record = DriverRecord {
            last_name: Some("Petrov".to_string()),
            first_name: Some("Petr".to_string()),
            patronymic: Some("Petrovich".to_string()),
            experience: Some(3),
            birthday: Some("01.01.1990".to_string()),
            ..DriverRecord::default()
        };
        assert_eq!(
            Driver::try_from(record).unwrap_err(),
            ValidationError::Incomplete {
                group: "driver card",
                missing: "phone_number",
            }
        );
    }

    #[test]
    fn record_conversion_keeps_card() {
        let driver = Driver::new("Petrov", "Petr", "Petrovich", 3)
            .unwrap()
            .with_card(full_card())
            .with_id(4)
            .unwrap();
        let record = DriverRecord::from(driver.clone());
        assert_eq!(record.birthday.as_deref(), Some("15.03.1985"));
        assert_eq!(Driver::try_from(record).unwrap(), driver);
    }

    #[test]
    fn field_lookup_covers_declared_fields() {
        let driver = Driver::new("Petrov", "Petr", "Petrovich", 3)
            .unwrap()
            .with_card(full_card());
        for name in Driver::FIELDS {
            assert!(driver.field(name).is_some(), "missing field {name}");
        }
        assert!(driver.field("salary").is_none());
        assert_eq!(driver.field("driver_id"), Some(FieldValue::Absent));
    }

    #[test]
    fn with_id_rejects_non_positive() {
        let driver = Driver::new("Petrov", "Petr", "Petrovich", 3).unwrap();
        assert!(driver.with_id(0).is_err());
    }
}
