//! Field validators shared by every entity constructor.
//!
//! # Responsibility
//! - Check raw field values against the formats the registry accepts.
//! - Return the normalized value so constructors store canonical data.
//!
//! # Invariants
//! - Validators are pure: no I/O, no shared mutable state.
//! - Every failure names the offending field and the expected format.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire and storage format for every date field.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+7\([0-9]{3}\)[0-9]{3}-[0-9]{2}-[0-9]{2}$").expect("phone pattern is valid")
});
static LICENSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2} [0-9]{2} [0-9]{6}$").expect("license pattern is valid"));
static POLICY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3} [0-9]{12}$").expect("policy pattern is valid"));
static PLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[А-Яа-яЁё][0-9]{3}[А-Яа-яЁё]{2}[0-9]{2,3}$").expect("plate pattern is valid")
});

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rejected field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text is empty or whitespace only.
    Empty { field: &'static str },
    /// Required field was not supplied at all.
    Missing { field: &'static str },
    /// Value does not match the expected textual format.
    Format {
        field: &'static str,
        expected: &'static str,
    },
    /// Numeric value outside the accepted range.
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },
    /// Start date is later than end date.
    DateOrder {
        start_field: &'static str,
        end_field: &'static str,
    },
    /// Field group must be supplied as a whole.
    Incomplete {
        group: &'static str,
        missing: &'static str,
    },
}

impl ValidationError {
    /// Field label the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::Missing { field }
            | Self::Format { field, .. }
            | Self::OutOfRange { field, .. } => field,
            Self::DateOrder { start_field, .. } => start_field,
            Self::Incomplete { missing, .. } => missing,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must be a non-empty string"),
            Self::Missing { field } => write!(f, "{field} is required"),
            Self::Format { field, expected } => {
                write!(f, "{field} has invalid format; expected {expected}")
            }
            Self::OutOfRange { field, expected } => write!(f, "{field} must be {expected}"),
            Self::DateOrder {
                start_field,
                end_field,
            } => write!(f, "{start_field} must not be later than {end_field}"),
            Self::Incomplete { group, missing } => {
                write!(f, "{group} is incomplete; {missing} is required")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects empty text.
pub fn non_empty_string(value: &str, field: &'static str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

pub fn positive_integer(value: i64, field: &'static str) -> ValidationResult<i64> {
    if value <= 0 {
        return Err(ValidationError::OutOfRange {
            field,
            expected: "a positive integer",
        });
    }
    Ok(value)
}

pub fn non_negative_integer(value: i64, field: &'static str) -> ValidationResult<i64> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field,
            expected: "a non-negative integer",
        });
    }
    Ok(value)
}

/// Accepts finite numbers `>= 0`.
pub fn non_negative_number(value: f64, field: &'static str) -> ValidationResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field,
            expected: "a number >= 0",
        });
    }
    Ok(value)
}

/// Parses a `DD.MM.YYYY` date.
pub fn date(value: &str, field: &'static str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::Format {
        field,
        expected: "DD.MM.YYYY",
    })
}

/// Renders a date back to its `DD.MM.YYYY` wire form.
pub fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Phone mask `+7(XXX)XXX-XX-XX`.
pub fn phone_number(value: &str, field: &'static str) -> ValidationResult<String> {
    matching(&PHONE_RE, value, field, "+7(XXX)XXX-XX-XX")
}

/// Driver license / vehicle title number `NN NN NNNNNN`.
pub fn license(value: &str, field: &'static str) -> ValidationResult<String> {
    matching(&LICENSE_RE, value, field, "NN NN NNNNNN")
}

/// Insurance policy number `NNN NNNNNNNNNNNN`.
pub fn insurance_policy(value: &str, field: &'static str) -> ValidationResult<String> {
    matching(&POLICY_RE, value, field, "NNN NNNNNNNNNNNN")
}

/// Vehicle plate: Cyrillic letter, three digits, two Cyrillic letters, region.
pub fn license_plate(value: &str, field: &'static str) -> ValidationResult<String> {
    matching(&PLATE_RE, value, field, "А111АА11 or А111АА111")
}

/// Rejects a window whose start is later than its end.
pub fn date_range(
    start: NaiveDate,
    end: NaiveDate,
    start_field: &'static str,
    end_field: &'static str,
) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::DateOrder {
            start_field,
            end_field,
        });
    }
    Ok(())
}

/// Parses raw form text into an integer.
pub fn parse_integer(value: &str, field: &'static str) -> ValidationResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::Format {
            field,
            expected: "an integer",
        })
}

/// Parses raw form text into a number; accepts `,` as decimal separator.
pub fn parse_number(value: &str, field: &'static str) -> ValidationResult<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ValidationError::Format {
            field,
            expected: "a number",
        })
}

fn matching(
    pattern: &Regex,
    value: &str,
    field: &'static str,
    expected: &'static str,
) -> ValidationResult<String> {
    let trimmed = value.trim();
    if !pattern.is_match(trimmed) {
        return Err(ValidationError::Format { field, expected });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_string_trims_and_rejects_blank() {
        assert_eq!(non_empty_string("  Ivanov ", "last_name").unwrap(), "Ivanov");
        assert_eq!(
            non_empty_string(" \t ", "last_name").unwrap_err(),
            ValidationError::Empty { field: "last_name" }
        );
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(positive_integer(1, "distance").unwrap(), 1);
        assert!(positive_integer(0, "distance").is_err());
        assert_eq!(non_negative_integer(0, "experience").unwrap(), 0);
        assert!(non_negative_integer(-1, "experience").is_err());
    }

    #[test]
    fn non_negative_number_rejects_nan_and_negatives() {
        assert_eq!(non_negative_number(0.0, "bonus").unwrap(), 0.0);
        assert!(non_negative_number(-0.5, "bonus").is_err());
        assert!(non_negative_number(f64::NAN, "bonus").is_err());
    }

    #[test]
    fn date_accepts_day_month_year_and_normalizes() {
        let parsed = date("1.2.2001", "birthday").unwrap();
        assert_eq!(format_date(parsed), "01.02.2001");
        assert!(date("2001-02-01", "birthday").is_err());
        assert!(date("31.02.2001", "birthday").is_err());
    }

    #[test]
    fn phone_license_policy_patterns() {
        assert!(phone_number("+7(912)345-67-89", "phone_number").is_ok());
        assert!(phone_number("8(912)345-67-89", "phone_number").is_err());
        assert!(license("12 34 567890", "driver_license").is_ok());
        assert!(license("1234 567890", "driver_license").is_err());
        assert!(insurance_policy("123 456789012345", "insurance_policy").is_ok());
        assert!(insurance_policy("123 45678901234", "insurance_policy").is_err());
    }

    #[test]
    fn license_plate_requires_cyrillic_letters() {
        assert!(license_plate("А123ВС77", "license_plate").is_ok());
        assert!(license_plate("а123вс777", "license_plate").is_ok());
        assert!(license_plate("A123BC77", "license_plate").is_err());
        assert!(license_plate("А123ВС7", "license_plate").is_err());
    }

    #[test]
    fn date_range_rejects_reversed_window() {
        let start = date("10.05.2024", "departure_date").unwrap();
        let end = date("09.05.2024", "arrival_date").unwrap();
        assert_eq!(
            date_range(start, end, "departure_date", "arrival_date").unwrap_err(),
            ValidationError::DateOrder {
                start_field: "departure_date",
                end_field: "arrival_date",
            }
        );
        assert!(date_range(end, end, "departure_date", "arrival_date").is_ok());
    }

    #[test]
    fn parse_helpers_report_field_and_format() {
        assert_eq!(parse_integer(" 42 ", "experience").unwrap(), 42);
        let err = parse_integer("five", "experience").unwrap_err();
        assert_eq!(err.field(), "experience");
        assert!(err.to_string().contains("an integer"));
        assert_eq!(parse_number("12,5", "bonus").unwrap(), 12.5);
    }
}
