use std::path::PathBuf;
use std::time::Duration;

use hwpgen_core::progress::ProgressConfig;

use crate::api::GeneratorApi;
use crate::ocr::OcrApi;
use crate::poller::{PollPolicy, TransportErrorPolicy};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_OCR_URL: &str = "http://localhost:8080/api/scanner/v1/get-ocr";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// A configuration value could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the document-generation service.
    pub api_url: String,
    /// Full URL of the OCR recognition endpoint.
    pub ocr_url: String,
    /// Token sent to the OCR service, if any.
    pub ocr_token: Option<String>,
    pub poll: PollPolicy,
    pub progress: ProgressConfig,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Where downloaded documents are written.
    pub output_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                                         |
    /// |--------------------------------|-------------------------------------------------|
    /// | `HWPGEN_API_URL`               | `http://localhost:8000`                         |
    /// | `HWPGEN_OCR_URL`               | `http://localhost:8080/api/scanner/v1/get-ocr`  |
    /// | `HWPGEN_OCR_TOKEN`             | unset                                           |
    /// | `HWPGEN_POLL_INTERVAL_MS`      | `1000`                                          |
    /// | `HWPGEN_POLL_MAX_ATTEMPTS`     | unset (poll until terminal)                     |
    /// | `HWPGEN_POLL_TOLERATE_ERRORS`  | unset (first failed check aborts)               |
    /// | `HWPGEN_REQUEST_TIMEOUT_SECS`  | `30`                                            |
    /// | `HWPGEN_OUTPUT_DIR`            | `.`                                             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("HWPGEN_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let ocr_url = non_empty("HWPGEN_OCR_URL").unwrap_or_else(|| DEFAULT_OCR_URL.into());
        let ocr_token = non_empty("HWPGEN_OCR_TOKEN");

        let poll_interval_ms = parse_u64(
            "HWPGEN_POLL_INTERVAL_MS",
            non_empty("HWPGEN_POLL_INTERVAL_MS"),
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        if poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "HWPGEN_POLL_INTERVAL_MS",
                expected: "a positive number of milliseconds",
                value: "0".into(),
            });
        }

        let max_attempts = non_empty("HWPGEN_POLL_MAX_ATTEMPTS")
            .map(|v| parse_positive_u32("HWPGEN_POLL_MAX_ATTEMPTS", &v))
            .transpose()?;

        let on_transport_error = match non_empty("HWPGEN_POLL_TOLERATE_ERRORS") {
            Some(v) => TransportErrorPolicy::Tolerate {
                max_consecutive: parse_positive_u32("HWPGEN_POLL_TOLERATE_ERRORS", &v)?,
            },
            None => TransportErrorPolicy::Abort,
        };

        let request_timeout_secs = parse_u64(
            "HWPGEN_REQUEST_TIMEOUT_SECS",
            non_empty("HWPGEN_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let output_dir = non_empty("HWPGEN_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            api_url,
            ocr_url,
            ocr_token,
            poll: PollPolicy {
                interval: Duration::from_millis(poll_interval_ms),
                max_attempts,
                on_transport_error,
            },
            progress: ProgressConfig::default(),
            request_timeout: Duration::from_secs(request_timeout_secs),
            output_dir,
        })
    }

    /// Shared HTTP client with the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?)
    }

    pub fn generator_api(&self, client: reqwest::Client) -> GeneratorApi {
        GeneratorApi::with_client(client, self.api_url.clone())
    }

    pub fn ocr_api(&self, client: reqwest::Client) -> OcrApi {
        OcrApi::new(client, self.ocr_url.clone(), self.ocr_token.clone())
    }
}

fn parse_u64(var: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected: "an unsigned integer",
            value: v,
        }),
    }
}

/// Zero is rejected: a limit of zero would either end polling after the
/// first check or behave like no tolerance at all.
fn parse_positive_u32(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            var,
            expected: "a positive integer",
            value: value.to_string(),
        }),
    }
}
