//! patseed library crate
//!
//! Exposes the collector, store and `run` pipeline for integration tests.
//! The binary entrypoint is in `main.rs`.

pub mod collector;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sources;
pub mod store;

pub use collector::{CollectStats, SourceCollector};
pub use config::Config;
pub use error::{CollectError, ConfigError, ImportError, StoreError, TransportError};
pub use pipeline::{RunSummary, run, run_with};
pub use store::PatientStore;
