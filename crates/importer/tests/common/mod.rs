//! Fake sources shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use patseed::TransportError;
use patseed::sources::{MockSource, PersonSource};
use patseed_core::{RawMockRecord, RawPersonRecord};
use serde_json::json;

pub fn person(given: &str, birth_year: i32) -> RawPersonRecord {
    serde_json::from_value(json!({
        "name": [{"given": [given], "family": "Tester"}],
        "gender": "other",
        "birthDate": format!("{birth_year}-07-01"),
        "address": [{"line": ["Teststrasse 5"], "postalCode": "2502", "city": "Biel"}]
    }))
    .expect("valid person fixture")
}

pub fn mock(pid: i64, treatment: &str, departure: &str) -> RawMockRecord {
    serde_json::from_value(json!({
        "PID": pid,
        "SSN": format!("756.0000.{pid:04}"),
        "TreatmentType": treatment,
        "InsuranceType": "general",
        "DateOfDeparture": departure,
    }))
    .expect("valid mock fixture")
}

pub fn unavailable() -> TransportError {
    TransportError::Status {
        url: "http://fake.invalid/source".to_string(),
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: String::new(),
    }
}

/// Person source replaying a fixed script, failing once it runs out
pub struct ScriptedPersons {
    script: Mutex<VecDeque<Result<RawPersonRecord, TransportError>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedPersons {
    pub fn new(script: Vec<Result<RawPersonRecord, TransportError>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            script: Mutex::new(script.into()),
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }

    pub fn valid(count: usize) -> (Self, Arc<AtomicUsize>) {
        Self::new((0..count).map(|i| Ok(person(&format!("P{i}"), 1970))).collect())
    }
}

impl PersonSource for ScriptedPersons {
    async fn fetch_one(&self) -> Result<RawPersonRecord, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }
}

/// Mock source returning the same batch (or failure) every call
pub struct FixedMocks {
    batch: Option<Vec<RawMockRecord>>,
}

impl FixedMocks {
    pub fn new(batch: Vec<RawMockRecord>) -> Self {
        Self { batch: Some(batch) }
    }

    pub fn failing() -> Self {
        Self { batch: None }
    }
}

impl MockSource for FixedMocks {
    async fn fetch_batch(&self, _count: usize) -> Result<Vec<RawMockRecord>, TransportError> {
        self.batch.clone().ok_or_else(unavailable)
    }
}

pub fn loads(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}
