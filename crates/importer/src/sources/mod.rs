//! Upstream record sources

mod client;

use std::future::Future;

use patseed_core::{RawMockRecord, RawPersonRecord};

use crate::error::TransportError;

pub use client::{MockClient, PersonClient, http_client};

/// Generator of single demographic records (source A)
pub trait PersonSource {
    fn fetch_one(&self) -> impl Future<Output = Result<RawPersonRecord, TransportError>>;
}

/// Batch endpoint of administrative mock records (source B)
pub trait MockSource {
    fn fetch_batch(
        &self,
        count: usize,
    ) -> impl Future<Output = Result<Vec<RawMockRecord>, TransportError>>;
}
