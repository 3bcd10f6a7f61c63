//! Filter for usable demographic records

use chrono::Datelike;

use crate::model::RawPersonRecord;

/// Latest birth year accepted into a sample
pub const BIRTH_YEAR_THRESHOLD: i32 = 2000;

/// A person record is usable iff it was born in or before `BIRTH_YEAR_THRESHOLD`.
pub fn is_valid(record: &RawPersonRecord) -> bool {
    record.birth_date.year() <= BIRTH_YEAR_THRESHOLD
}
