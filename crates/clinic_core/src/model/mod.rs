//! Record model for the patient and doctor collections.
//!
//! # Responsibility
//! - Define canonical record, creation-input and partial-update shapes.
//! - Own required-field validation applied at the store boundary.
//!
//! # Invariants
//! - Every record is identified by a store-assigned UUID.
//! - Required text fields are non-empty after trimming.
//! - The patient→doctor link is a plain id, never an owned doctor record.

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod doctor;
pub mod patient;

/// Required-field violation detected before a record is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is absent or blank.
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    /// Numeric field is NaN or infinite.
    NonFiniteNumber {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { entity, field } => {
                write!(f, "{entity} validation failed: `{field}` is required")
            }
            Self::NonFiniteNumber { entity, field } => {
                write!(f, "{entity} validation failed: `{field}` must be a finite number")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_finite(
    entity: &'static str,
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteNumber { entity, field });
    }
    Ok(())
}

/// Overwrites `target` only when a replacement was supplied.
pub(crate) fn replace_if_some<T: Clone>(target: &mut T, replacement: &Option<T>) {
    if let Some(value) = replacement {
        *target = value.clone();
    }
}

/// Overwrites an optional field only when a replacement was supplied.
pub(crate) fn replace_optional_if_some<T: Clone>(target: &mut Option<T>, replacement: &Option<T>) {
    if let Some(value) = replacement {
        *target = Some(value.clone());
    }
}

// Phone numbers arrive as JSON numbers and older clients send them as floats
// (`5551234.0`); only whole values are accepted.
struct WholeNumber(i64);

impl<'de> Deserialize<'de> for WholeNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WholeNumberVisitor)
    }
}

struct WholeNumberVisitor;

impl Visitor<'_> for WholeNumberVisitor {
    type Value = WholeNumber;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("a whole number")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<WholeNumber, E> {
        Ok(WholeNumber(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<WholeNumber, E> {
        i64::try_from(value)
            .map(WholeNumber)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<WholeNumber, E> {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
        if value.is_finite() && value.fract() == 0.0 && in_range {
            return Ok(WholeNumber(value as i64));
        }
        Err(E::invalid_value(Unexpected::Float(value), &self))
    }
}

pub(crate) fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    WholeNumber::deserialize(deserializer).map(|number| number.0)
}

pub(crate) fn deserialize_optional_whole_number<'de, D>(
    deserializer: D,
) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WholeNumber>::deserialize(deserializer).map(|number| number.map(|n| n.0))
}
