//! Sample collection from the two upstream sources

use patseed_core::{RawMockRecord, RawPersonRecord, is_valid};

use crate::error::CollectError;
use crate::sources::{MockSource, PersonSource};

/// Polls the person source until enough valid records exist and fetches
/// one matching batch from the mock source.
pub struct SourceCollector<P, M> {
    persons: P,
    mocks: M,
    max_attempts: usize,
}

/// Counters from one collection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub attempts: usize,
    pub discarded: usize,
    pub failed: usize,
}

impl<P: PersonSource, M: MockSource> SourceCollector<P, M> {
    pub fn new(persons: P, mocks: M, max_attempts: usize) -> Self {
        Self {
            persons,
            mocks,
            max_attempts,
        }
    }

    /// Collect exactly `target_count` valid person records and as many mock records.
    pub async fn collect(
        &self,
        target_count: usize,
    ) -> Result<(Vec<RawPersonRecord>, Vec<RawMockRecord>), CollectError> {
        let mocks = self.collect_mocks(target_count).await?;
        let (persons, stats) = self.collect_persons(target_count).await?;

        tracing::info!(
            persons = persons.len(),
            mocks = mocks.len(),
            attempts = stats.attempts,
            discarded = stats.discarded,
            failed = stats.failed,
            "Collected source samples"
        );

        Ok((persons, mocks))
    }

    async fn collect_mocks(&self, target_count: usize) -> Result<Vec<RawMockRecord>, CollectError> {
        let mut mocks = self.mocks.fetch_batch(target_count).await?;
        if mocks.len() < target_count {
            return Err(CollectError::LengthMismatch {
                expected: target_count,
                received: mocks.len(),
            });
        }
        if mocks.len() > target_count {
            tracing::debug!(
                received = mocks.len(),
                kept = target_count,
                "Truncating mock batch"
            );
            mocks.truncate(target_count);
        }
        Ok(mocks)
    }

    /// Poll the person source one record at a time, sequentially.
    pub async fn collect_persons(
        &self,
        target_count: usize,
    ) -> Result<(Vec<RawPersonRecord>, CollectStats), CollectError> {
        let mut persons = Vec::with_capacity(target_count);
        let mut stats = CollectStats::default();

        while persons.len() < target_count {
            if stats.attempts >= self.max_attempts {
                return Err(CollectError::QuotaUnreachable {
                    target: target_count,
                    collected: persons.len(),
                    attempts: stats.attempts,
                });
            }
            stats.attempts += 1;

            match self.persons.fetch_one().await {
                Ok(record) if is_valid(&record) => persons.push(record),
                Ok(record) => {
                    stats.discarded += 1;
                    tracing::debug!(birth_date = %record.birth_date, "Discarding person record");
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(error = %e, attempt = stats.attempts, "Person fetch failed");
                }
            }
        }

        Ok((persons, stats))
    }
}
