//! SQLite output for merged patient rows

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use patseed_core::{NormalizedPatientRow, RowValue};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, params_from_iter};

use crate::error::StoreError;

// PID and SSN carry no declared type so numeric and text identifiers keep their storage class.
const CREATE_PATIENT_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS Patient (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        PID,
        SSN,
        FirstName TEXT,
        LastName TEXT,
        Gender TEXT,
        BirthDate TEXT,
        TreatmentType TEXT,
        InsuranceType TEXT,
        AddrStreet TEXT,
        AddrZip TEXT,
        AddrCity TEXT,
        DateOfEntry TEXT,
        DateOfDeparture TEXT
    )";

const INSERT_PATIENT: &str = "
    INSERT INTO Patient (
        PID, SSN, FirstName, LastName, Gender, BirthDate, TreatmentType,
        InsuranceType, AddrStreet, AddrZip, AddrCity, DateOfEntry, DateOfDeparture
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

/// File name for a run started at `now`: `patients_<date>_<unix millis>.sqlite`
pub fn output_file_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "patients_{}_{}.sqlite",
        now.format("%Y-%m-%d"),
        now.timestamp_millis()
    )
}

/// Single-writer handle on the `Patient` table
pub struct PatientStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl PatientStore {
    /// Create a new database file. An existing file is never reused.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            return Err(StoreError::Exists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        tracing::info!(path = %path.display(), "Created output database");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the `Patient` table. Safe to call more than once.
    pub fn create_table(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(CREATE_PATIENT_TABLE)?;
        Ok(())
    }

    pub fn insert_row(&self, row: &NormalizedPatientRow) -> Result<(), StoreError> {
        self.conn
            .prepare_cached(INSERT_PATIENT)?
            .execute(params_from_iter(row.values().iter().map(sql_value)))?;
        Ok(())
    }

    /// Insert all rows in one transaction; either every row is written or none.
    pub fn insert_rows(&mut self, rows: &[NormalizedPatientRow]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_PATIENT)?;
            for row in rows {
                stmt.execute(params_from_iter(row.values().iter().map(sql_value)))?;
            }
        }
        tx.commit()?;
        tracing::debug!(rows = rows.len(), "Inserted patient rows");
        Ok(rows.len())
    }

    pub fn count_rows(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Patient", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn sql_value(value: &RowValue) -> SqlValue {
    match value {
        RowValue::Null => SqlValue::Null,
        RowValue::Integer(i) => SqlValue::Integer(*i),
        RowValue::Real(f) => SqlValue::Real(*f),
        RowValue::Text(s) => SqlValue::Text(s.clone()),
        RowValue::Instant(instant) => SqlValue::Text(RowValue::instant_text(instant)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn output_name_has_date_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap();
        assert_eq!(
            output_file_name(&now),
            format!("patients_2024-04-10_{}.sqlite", now.timestamp_millis())
        );
    }

    #[test]
    fn instants_are_bound_as_text() {
        let instant = DateTime::parse_from_rfc3339("2024-05-01T09:00:00+02:00").unwrap();
        assert_eq!(
            sql_value(&RowValue::Instant(instant)),
            SqlValue::Text("2024-05-01T09:00:00.000+02:00".to_string())
        );
        assert_eq!(sql_value(&RowValue::Null), SqlValue::Null);
    }
}
