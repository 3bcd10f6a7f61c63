//! Importer configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PATIENT_SOURCE_URL: &str = "http://patient-generator.i4mi.bfh.ch/patient/get";
pub const DEFAULT_MOCK_SOURCE_URL: &str = "https://my.api.mockaroo.com/patients.json";
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

/// Source-A attempts allowed per requested record when no explicit budget is set
const ATTEMPTS_PER_SAMPLE: usize = 20;

/// Importer configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub patient_source_url: String,
    pub mock_source_url: String,
    pub mock_api_key: Option<String>,
    pub sample_count: usize,
    pub max_fetch_attempts: usize,
    pub output_dir: PathBuf,
    pub http_timeout: Duration,
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patient_source_url: DEFAULT_PATIENT_SOURCE_URL.to_string(),
            mock_source_url: DEFAULT_MOCK_SOURCE_URL.to_string(),
            mock_api_key: None,
            sample_count: DEFAULT_SAMPLE_COUNT,
            max_fetch_attempts: DEFAULT_SAMPLE_COUNT * ATTEMPTS_PER_SAMPLE,
            output_dir: PathBuf::from("."),
            http_timeout: Duration::from_secs(30),
            rng_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let sample_count =
            parse_positive(&lookup, "SAMPLE_COUNT")?.unwrap_or(defaults.sample_count);

        Ok(Self {
            patient_source_url: lookup("PATIENT_SOURCE_URL").unwrap_or(defaults.patient_source_url),
            mock_source_url: lookup("MOCK_SOURCE_URL").unwrap_or(defaults.mock_source_url),
            mock_api_key: lookup("MOCK_API_KEY").filter(|key| !key.is_empty()),
            sample_count,
            max_fetch_attempts: parse_positive(&lookup, "MAX_FETCH_ATTEMPTS")?
                .unwrap_or(sample_count.saturating_mul(ATTEMPTS_PER_SAMPLE)),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            http_timeout: parse_positive(&lookup, "HTTP_TIMEOUT_SECS")?
                .map(|secs| Duration::from_secs(secs as u64))
                .unwrap_or(defaults.http_timeout),
            rng_seed: match lookup("RNG_SEED") {
                Some(value) => Some(value.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: "RNG_SEED",
                    value,
                })?),
                None => None,
            },
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<usize>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::Invalid { var, value }),
        },
    }
}
