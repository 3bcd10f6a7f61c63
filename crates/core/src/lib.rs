//! patseed-core: Domain types and merge logic for the patient seeder
//!
//! This crate holds everything that does not touch the network or disk:
//! the raw source records, the validity filter, the synthetic date
//! generator and the record merger that produces `Patient` table rows.

pub mod dates;
pub mod error;
pub mod iso;
pub mod merge;
pub mod model;
pub mod row;
pub mod validity;

pub use dates::{DateGenerator, DateRange};
pub use error::{MergeError, RowValueError};
pub use iso::parse_iso_datetime;
pub use merge::merge;
pub use model::{
    DateRole, NormalizedPatientRow, PersonAddress, PersonName, RawMockRecord, RawPersonRecord,
    TreatmentCategory,
};
pub use row::{PATIENT_COLUMNS, RowValue};
pub use validity::{BIRTH_YEAR_THRESHOLD, is_valid};
