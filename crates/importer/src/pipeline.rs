//! One import run: collect, merge, persist

use std::path::PathBuf;

use chrono::{Local, TimeZone};
use patseed_core::{DateGenerator, merge};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::Instrument;
use uuid::Uuid;

use crate::collector::SourceCollector;
use crate::config::Config;
use crate::error::ImportError;
use crate::sources::{MockClient, MockSource, PersonClient, PersonSource, http_client};
use crate::store::{PatientStore, output_file_name};

/// What a finished run wrote
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub output: PathBuf,
    pub rows: usize,
}

/// Run a full import against the configured endpoints.
pub async fn run(config: &Config) -> Result<RunSummary, ImportError> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("import", %run_id);

    async move {
        let now = Local::now();
        let http = http_client(config.http_timeout)?;
        let persons = PersonClient::new(http.clone(), config.patient_source_url.clone());
        let mocks = MockClient::new(
            http,
            config.mock_source_url.clone(),
            config.mock_api_key.clone(),
        );
        let collector = SourceCollector::new(persons, mocks, config.max_fetch_attempts);

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let dates = DateGenerator::new(rng, now);

        let output = config.output_dir.join(output_file_name(&now));
        let mut store = PatientStore::create(&output)?;

        let rows = run_with(&collector, &mut store, config.sample_count, dates).await?;
        tracing::info!(rows, output = %output.display(), "Import finished");

        Ok::<_, ImportError>(RunSummary {
            run_id,
            output,
            rows,
        })
    }
    .instrument(span)
    .await
}

/// Create the table, collect `sample_count` records, merge and insert them.
///
/// Nothing is inserted unless collection and merging both succeed.
pub async fn run_with<P, M, R, Tz>(
    collector: &SourceCollector<P, M>,
    store: &mut PatientStore,
    sample_count: usize,
    mut dates: DateGenerator<R, Tz>,
) -> Result<usize, ImportError>
where
    P: PersonSource,
    M: MockSource,
    R: Rng,
    Tz: TimeZone,
{
    store.create_table()?;

    let (persons, mocks) = collector.collect(sample_count).await?;
    let rows = merge(&persons, &mocks, &mut dates)?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        for (index, row) in rows.iter().enumerate() {
            match serde_json::to_string(row) {
                Ok(json) => tracing::debug!(index, row = %json, "Merged patient row"),
                Err(e) => tracing::debug!(index, error = %e, "Merged row is not serializable"),
            }
        }
    }

    let written = store.insert_rows(&rows)?;
    tracing::info!(written, total = store.count_rows()?, "Persisted patient rows");
    Ok(written)
}
