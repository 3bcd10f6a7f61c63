//! Positional merge of person and mock records into patient rows

use chrono::{NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use rand::Rng;

use crate::dates::DateGenerator;
use crate::error::MergeError;
use crate::model::{DateRole, NormalizedPatientRow, RawMockRecord, RawPersonRecord};
use crate::row::RowValue;

/// Pair `persons[i]` with `mocks[i]` and derive the synthetic stay dates.
///
/// Both slices must have the same length. The batch is all-or-nothing: on
/// any error no rows are returned.
pub fn merge<R, Tz>(
    persons: &[RawPersonRecord],
    mocks: &[RawMockRecord],
    dates: &mut DateGenerator<R, Tz>,
) -> Result<Vec<NormalizedPatientRow>, MergeError>
where
    R: Rng,
    Tz: TimeZone,
{
    if persons.len() != mocks.len() {
        return Err(MergeError::LengthMismatch {
            persons: persons.len(),
            mocks: mocks.len(),
        });
    }

    persons
        .iter()
        .zip(mocks)
        .enumerate()
        .map(|(index, (person, mock))| merge_one(index, person, mock, dates))
        .collect()
}

fn merge_one<R, Tz>(
    index: usize,
    person: &RawPersonRecord,
    mock: &RawMockRecord,
    dates: &mut DateGenerator<R, Tz>,
) -> Result<NormalizedPatientRow, MergeError>
where
    R: Rng,
    Tz: TimeZone,
{
    let pid = column_value(index, "PID", &mock.pid)?;
    let ssn = column_value(index, "SSN", &mock.ssn)?;
    let category = mock.treatment_category();

    let entry_range = dates.entry_range();
    let date_of_entry = dates
        .derive_date(entry_range, &category, DateRole::Entry)
        .fixed_offset();

    let date_of_departure = match mock.departure_date() {
        Some(_) => {
            let departure_range = dates.departure_range();
            Some(
                dates
                    .derive_date(departure_range, &category, DateRole::Departure)
                    .fixed_offset(),
            )
        }
        None => None,
    };

    Ok(NormalizedPatientRow {
        pid,
        ssn,
        first_name: person.first_name().to_string(),
        last_name: person.last_name().to_string(),
        gender: person.gender.clone(),
        birth_date: birth_instant(person.birth_date),
        treatment_type: mock.treatment_type.clone(),
        insurance_type: mock.insurance_type.clone(),
        addr_street: person.street().to_string(),
        addr_zip: person.postal_code().to_string(),
        addr_city: person.city().to_string(),
        date_of_entry,
        date_of_departure,
    })
}

fn column_value(
    index: usize,
    field: &'static str,
    value: &serde_json::Value,
) -> Result<RowValue, MergeError> {
    RowValue::from_json(value).map_err(|source| MergeError::UnsupportedValue {
        index,
        field,
        source,
    })
}

fn birth_instant(date: NaiveDate) -> String {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PersonAddress, PersonName};
    use chrono::{DateTime, Timelike};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn person(given: &str, year: i32) -> RawPersonRecord {
        RawPersonRecord {
            name: vec![PersonName {
                given: vec![given.to_string(), "Second".to_string()],
                family: format!("{given}son"),
            }],
            gender: "female".to_string(),
            birth_date: NaiveDate::from_ymd_opt(year, 3, 4).unwrap(),
            address: vec![PersonAddress {
                line: vec![format!("{given}weg 1"), "c/o".to_string()],
                postal_code: "3000".to_string(),
                city: "Bern".to_string(),
            }],
        }
    }

    fn mock(pid: i64, treatment: &str, departure: Option<&str>) -> RawMockRecord {
        serde_json::from_value(json!({
            "PID": pid,
            "SSN": format!("756.{pid:04}"),
            "TreatmentType": treatment,
            "InsuranceType": "general",
            "DateOfDeparture": departure,
        }))
        .unwrap()
    }

    fn dates() -> DateGenerator<StdRng, Utc> {
        let now: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap();
        DateGenerator::new(StdRng::seed_from_u64(5), now)
    }

    #[test]
    fn rejects_unequal_lengths() {
        let persons = vec![person("A", 1980), person("B", 1981), person("C", 1982)];
        let mocks = vec![mock(1, "ambulant", None), mock(2, "ambulant", None)];
        let result = merge(&persons, &mocks, &mut dates());
        assert_eq!(
            result,
            Err(MergeError::LengthMismatch {
                persons: 3,
                mocks: 2
            })
        );
    }

    #[test]
    fn pairs_records_by_index() {
        let persons = vec![person("Anna", 1980), person("Beat", 1990)];
        let mocks = vec![mock(1, "stationary", None), mock(2, "ambulant", None)];
        let rows = merge(&persons, &mocks, &mut dates()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].first_name, "Anna");
        assert_eq!(rows[0].last_name, "Annason");
        assert_eq!(rows[0].pid, RowValue::Integer(1));
        assert_eq!(rows[0].treatment_type, "stationary");
        assert_eq!(rows[0].addr_street, "Annaweg 1");
        assert_eq!(rows[1].first_name, "Beat");
        assert_eq!(rows[1].pid, RowValue::Integer(2));
        assert_eq!(rows[1].ssn, RowValue::Text("756.0002".into()));
    }

    #[test]
    fn birth_date_is_an_iso_instant() {
        let rows = merge(&[person("Anna", 1985)], &[mock(1, "x", None)], &mut dates()).unwrap();
        assert_eq!(rows[0].birth_date, "1985-03-04T00:00:00.000Z");
    }

    #[test]
    fn departure_absent_for_invalid_source_string() {
        let persons = vec![person("A", 1980), person("B", 1980)];
        let mocks = vec![
            mock(1, "stationary", Some("")),
            mock(2, "stationary", Some("2024-05-01T00:00:00Z")),
        ];
        let rows = merge(&persons, &mocks, &mut dates()).unwrap();

        assert_eq!(rows[0].date_of_departure, None);
        let departure = rows[1].date_of_departure.expect("departure date");
        assert!((6..=10).contains(&departure.hour()));
    }

    #[test]
    fn departure_ignores_source_value() {
        let rows = merge(
            &[person("A", 1980)],
            &[mock(1, "other", Some("1999-01-01"))],
            &mut dates(),
        )
        .unwrap();
        let departure = rows[0].date_of_departure.unwrap();
        assert!(departure >= Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn unsupported_pid_fails_the_whole_batch() {
        let persons = vec![person("A", 1980), person("B", 1980)];
        let mut bad = mock(2, "ambulant", None);
        bad.pid = json!({"nested": true});
        let mocks = vec![mock(1, "ambulant", None), bad];

        let err = merge(&persons, &mocks, &mut dates()).unwrap_err();
        assert!(matches!(
            err,
            MergeError::UnsupportedValue {
                index: 1,
                field: "PID",
                ..
            }
        ));
    }

    #[test]
    fn empty_batches_merge_to_nothing() {
        let rows = merge(&[], &[], &mut dates()).unwrap();
        assert!(rows.is_empty());
    }
}
