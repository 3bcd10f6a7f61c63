//! Source records and the merged patient row

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::iso::parse_iso_datetime;
use crate::row::RowValue;

/// One person as returned by the demographic generator
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawPersonRecord {
    #[serde(default, deserialize_with = "one_or_many")]
    pub name: Vec<PersonName>,
    #[serde(default)]
    pub gender: String,
    #[serde(deserialize_with = "calendar_date")]
    pub birth_date: NaiveDate,
    #[serde(default, deserialize_with = "one_or_many")]
    pub address: Vec<PersonAddress>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PersonName {
    #[serde(default)]
    pub given: Vec<String>,
    #[serde(default)]
    pub family: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonAddress {
    #[serde(default)]
    pub line: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
}

impl RawPersonRecord {
    pub fn first_name(&self) -> &str {
        self.name
            .first()
            .and_then(|n| n.given.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn last_name(&self) -> &str {
        self.name.first().map(|n| n.family.as_str()).unwrap_or_default()
    }

    fn primary_address(&self) -> Option<&PersonAddress> {
        self.address.first()
    }

    pub fn street(&self) -> &str {
        self.primary_address()
            .and_then(|a| a.line.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn postal_code(&self) -> &str {
        self.primary_address()
            .map(|a| a.postal_code.as_str())
            .unwrap_or_default()
    }

    pub fn city(&self) -> &str {
        self.primary_address()
            .map(|a| a.city.as_str())
            .unwrap_or_default()
    }
}

/// One administrative record from the mock-data batch endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawMockRecord {
    #[serde(rename = "PID", default)]
    pub pid: JsonValue,
    #[serde(rename = "SSN", default)]
    pub ssn: JsonValue,
    #[serde(rename = "TreatmentType", default)]
    pub treatment_type: String,
    #[serde(rename = "InsuranceType", default)]
    pub insurance_type: String,
    #[serde(rename = "DateOfDeparture", default)]
    pub date_of_departure: Option<String>,

    /// Fields the importer does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl RawMockRecord {
    pub fn treatment_category(&self) -> TreatmentCategory {
        TreatmentCategory::from(self.treatment_type.as_str())
    }

    /// The departure date, if the source string is a valid ISO date
    pub fn departure_date(&self) -> Option<DateTime<FixedOffset>> {
        self.date_of_departure.as_deref().and_then(parse_iso_datetime)
    }
}

/// Care setting of a treatment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreatmentCategory {
    /// Same-day entry and departure
    Ambulant,
    /// Multi-day stay with a morning discharge
    Stationary,
    Other(String),
}

impl From<&str> for TreatmentCategory {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "ambulant" => TreatmentCategory::Ambulant,
            "stationary" => TreatmentCategory::Stationary,
            _ => TreatmentCategory::Other(value.to_string()),
        }
    }
}

/// Which end of a stay a derived date describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRole {
    Entry,
    Departure,
}

/// A merged row of the `Patient` table, minus the generated `ID`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct NormalizedPatientRow {
    pub pid: RowValue,
    pub ssn: RowValue,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    /// ISO-8601 instant at UTC midnight
    pub birth_date: String,
    pub treatment_type: String,
    pub insurance_type: String,
    pub addr_street: String,
    pub addr_zip: String,
    pub addr_city: String,
    pub date_of_entry: DateTime<FixedOffset>,
    pub date_of_departure: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(values)) => values,
        Some(OneOrMany::One(value)) => vec![value],
        None => Vec::new(),
    })
}

fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_iso_datetime(&raw)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid birth date: {raw:?}")))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn person_record_accepts_fhir_arrays() {
        let record: RawPersonRecord = serde_json::from_value(json!({
            "name": [{"given": ["Anna", "Maria"], "family": "Muster"}],
            "gender": "female",
            "birthDate": "1985-03-04",
            "address": [{"line": ["Bahnhofstrasse 1"], "postalCode": "3000", "city": "Bern"}]
        }))
        .unwrap();

        assert_eq!(record.first_name(), "Anna");
        assert_eq!(record.last_name(), "Muster");
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1985, 3, 4).unwrap());
        assert_eq!(record.street(), "Bahnhofstrasse 1");
        assert_eq!(record.postal_code(), "3000");
        assert_eq!(record.city(), "Bern");
    }

    #[test]
    fn person_record_accepts_single_objects_and_numeric_zip() {
        let record: RawPersonRecord = serde_json::from_value(json!({
            "name": {"given": ["Peter"], "family": "Meier"},
            "gender": "male",
            "birthDate": "1970-01-02T08:30:00.000Z",
            "address": {"line": ["Hauptgasse 7"], "postalCode": 4500, "city": "Solothurn"}
        }))
        .unwrap();

        assert_eq!(record.first_name(), "Peter");
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());
        assert_eq!(record.postal_code(), "4500");
    }

    #[test]
    fn person_record_without_name_or_address_yields_empty_fields() {
        let record: RawPersonRecord =
            serde_json::from_value(json!({"birthDate": "1990-12-31"})).unwrap();
        assert_eq!(record.first_name(), "");
        assert_eq!(record.last_name(), "");
        assert_eq!(record.street(), "");
        assert_eq!(record.city(), "");
    }

    #[test]
    fn person_record_rejects_invalid_birth_date() {
        let result: Result<RawPersonRecord, _> =
            serde_json::from_value(json!({"birthDate": "not a date"}));
        assert!(result.is_err());
    }

    #[test]
    fn mock_record_keeps_passthrough_fields() {
        let record: RawMockRecord = serde_json::from_value(json!({
            "PID": 42,
            "SSN": "756.1234.5678.97",
            "TreatmentType": "Stationary",
            "InsuranceType": "private",
            "DateOfDeparture": "",
            "Ward": "B2"
        }))
        .unwrap();

        assert_eq!(record.pid, json!(42));
        assert_eq!(record.treatment_category(), TreatmentCategory::Stationary);
        assert_eq!(record.departure_date(), None);
        assert_eq!(record.extra.get("Ward"), Some(&json!("B2")));
    }

    #[test]
    fn treatment_category_falls_back_to_other() {
        assert_eq!(TreatmentCategory::from("ambulant"), TreatmentCategory::Ambulant);
        assert_eq!(
            TreatmentCategory::from("day-clinic"),
            TreatmentCategory::Other("day-clinic".to_string())
        );
    }
}
