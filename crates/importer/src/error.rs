//! Importer error types

use std::path::PathBuf;

use patseed_core::MergeError;
use thiserror::Error;

/// A single HTTP fetch failed
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Collecting the two source samples failed
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("mock source unavailable: {0}")]
    Transport(#[from] TransportError),

    #[error("collected {collected} of {target} valid person records after {attempts} attempts")]
    QuotaUnreachable {
        target: usize,
        collected: usize,
        attempts: usize,
    },

    #[error("mock source returned {received} records, expected {expected}")]
    LengthMismatch { expected: usize, received: usize },
}

/// SQLite output errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("output file already exists: {}", .0.display())]
    Exists(PathBuf),

    #[error("cannot prepare output directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Invalid environment configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Any failure that aborts an import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
