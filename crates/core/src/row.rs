//! Typed column values for the `Patient` table

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::RowValueError;
use crate::model::NormalizedPatientRow;

/// Column order of the `Patient` table. `ID` is generated by the store.
pub const PATIENT_COLUMNS: [&str; 14] = [
    "ID",
    "PID",
    "SSN",
    "FirstName",
    "LastName",
    "Gender",
    "BirthDate",
    "TreatmentType",
    "InsuranceType",
    "AddrStreet",
    "AddrZip",
    "AddrCity",
    "DateOfEntry",
    "DateOfDeparture",
];

/// A single bindable column value
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RowValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Instant(DateTime<FixedOffset>),
}

impl RowValue {
    /// Convert a source JSON value. Only strings, numbers and null are accepted.
    pub fn from_json(value: &JsonValue) -> Result<Self, RowValueError> {
        match value {
            JsonValue::Null => Ok(RowValue::Null),
            JsonValue::String(s) => Ok(RowValue::Text(s.clone())),
            JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(RowValue::Integer(i)),
                (None, Some(f)) => Ok(RowValue::Real(f)),
                (None, None) => Err(RowValueError::Unsupported("number")),
            },
            JsonValue::Bool(_) => Err(RowValueError::Unsupported("boolean")),
            JsonValue::Array(_) => Err(RowValueError::Unsupported("array")),
            JsonValue::Object(_) => Err(RowValueError::Unsupported("object")),
        }
    }

    /// Text form stored for instants
    pub fn instant_text(instant: &DateTime<FixedOffset>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        RowValue::Text(value.to_string())
    }
}

impl From<DateTime<FixedOffset>> for RowValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        RowValue::Instant(value)
    }
}

impl<T: Into<RowValue>> From<Option<T>> for RowValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RowValue::Null)
    }
}

impl NormalizedPatientRow {
    /// Values for every column after `ID`, in `PATIENT_COLUMNS` order
    pub fn values(&self) -> Vec<RowValue> {
        vec![
            self.pid.clone(),
            self.ssn.clone(),
            self.first_name.as_str().into(),
            self.last_name.as_str().into(),
            self.gender.as_str().into(),
            self.birth_date.as_str().into(),
            self.treatment_type.as_str().into(),
            self.insurance_type.as_str().into(),
            self.addr_street.as_str().into(),
            self.addr_zip.as_str().into(),
            self.addr_city.as_str().into(),
            self.date_of_entry.into(),
            self.date_of_departure.into(),
        ]
    }
}
