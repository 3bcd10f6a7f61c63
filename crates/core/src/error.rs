use thiserror::Error;

/// Errors raised while converting source values into row values
#[derive(Debug, Error, PartialEq)]
pub enum RowValueError {
    #[error("unsupported value type: {0}")]
    Unsupported(&'static str),
}

/// Errors raised by the record merger
#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("length mismatch: {persons} person records, {mocks} mock records")]
    LengthMismatch { persons: usize, mocks: usize },

    #[error("record {index}: field {field}: {source}")]
    UnsupportedValue {
        index: usize,
        field: &'static str,
        #[source]
        source: RowValueError,
    },
}
