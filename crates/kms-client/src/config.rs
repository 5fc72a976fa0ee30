//! Client configuration

use kms_core::{KeyGenRequest, KmsError, KmsResult, DEFAULT_PARTIES, DEFAULT_THRESHOLD};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// KMS used when no server URL is configured
pub const DEFAULT_SERVER_URL: &str = "https://kms.lux.network";

/// How long a wait loop keeps polling a pending request
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Pause between two polls of a pending request
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Shortest pause a wait loop takes between polls
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

const ENV_SERVER_URL: &str = "LUXFHE_KMS_URL";
const ENV_THRESHOLD: &str = "LUXFHE_KMS_THRESHOLD";
const ENV_PARTIES: &str = "LUXFHE_KMS_PARTIES";
const ENV_REQUEST_TIMEOUT: &str = "LUXFHE_KMS_REQUEST_TIMEOUT_MS";
const ENV_WAIT_TIMEOUT: &str = "LUXFHE_KMS_WAIT_TIMEOUT_MS";
const ENV_POLL_INTERVAL: &str = "LUXFHE_KMS_POLL_INTERVAL_MS";

/// Connection settings for a KMS server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmsConfig {
    /// Server base URL
    pub server_url: String,

    /// Default threshold for key generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,

    /// Default party count for key generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parties: Option<u32>,

    /// Per-HTTP-request timeout (milliseconds); unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl KmsConfig {
    /// Configuration for `server_url` with no key generation defaults
    pub fn new(server_url: impl Into<String>) -> Self {
        KmsConfig {
            server_url: server_url.into(),
            threshold: None,
            parties: None,
            request_timeout_ms: None,
        }
    }

    /// Set the default threshold
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the default party count
    pub fn with_parties(mut self, parties: u32) -> Self {
        self.parties = Some(parties);
        self
    }

    /// Bound every HTTP request; saturates at `u64::MAX` milliseconds
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Per-request timeout, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Load from `LUXFHE_KMS_*` environment variables
    pub fn from_env() -> KmsResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> KmsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup(ENV_SERVER_URL).unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        Ok(KmsConfig {
            server_url,
            threshold: parse_var(&lookup, ENV_THRESHOLD)?,
            parties: parse_var(&lookup, ENV_PARTIES)?,
            request_timeout_ms: parse_var(&lookup, ENV_REQUEST_TIMEOUT)?,
        })
    }

    /// Fill key generation parameters: request, then config, then 3-of-5.
    /// Zero counts as unset.
    pub fn keygen_request(&self, request: Option<KeyGenRequest>) -> KeyGenRequest {
        let pick = |requested: Option<u32>, configured: Option<u32>, fallback: u32| {
            requested
                .filter(|v| *v > 0)
                .or(configured.filter(|v| *v > 0))
                .unwrap_or(fallback)
        };

        KeyGenRequest {
            threshold: pick(request.map(|r| r.threshold), self.threshold, DEFAULT_THRESHOLD),
            parties: pick(request.map(|r| r.parties), self.parties, DEFAULT_PARTIES),
        }
    }
}

impl Default for KmsConfig {
    fn default() -> Self {
        KmsConfig::new(DEFAULT_SERVER_URL)
    }
}

/// Strip trailing slashes and parse the server base URL
pub fn normalize_server_url(server_url: &str) -> KmsResult<(String, Url)> {
    let trimmed = server_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(KmsError::Configuration("server URL must not be empty".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| KmsError::Configuration(format!("invalid server URL {}: {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(KmsError::Configuration(format!(
            "server URL must be an http(s) base URL: {}",
            trimmed
        )));
    }

    Ok((trimmed.to_string(), url))
}

/// Deadline and cadence of a wait loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up once this much time has elapsed
    pub timeout: Duration,
    /// Pause between polls
    pub poll_interval: Duration,
}

impl WaitOptions {
    /// Explicit deadline and interval. The interval is raised to
    /// [`MIN_POLL_INTERVAL`] so the loop always yields between polls.
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        WaitOptions {
            timeout,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// From milliseconds; zero selects the default
    pub fn from_millis(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        let or_default = |ms: u64, default: Duration| {
            if ms == 0 {
                default
            } else {
                Duration::from_millis(ms)
            }
        };

        WaitOptions {
            timeout: or_default(timeout_ms, DEFAULT_WAIT_TIMEOUT),
            poll_interval: or_default(poll_interval_ms, DEFAULT_POLL_INTERVAL),
        }
    }

    /// Load from `LUXFHE_KMS_WAIT_TIMEOUT_MS` and `LUXFHE_KMS_POLL_INTERVAL_MS`
    pub fn from_env() -> KmsResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> KmsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = parse_var::<u64, _>(&lookup, ENV_WAIT_TIMEOUT)?.unwrap_or(0);
        let interval = parse_var::<u64, _>(&lookup, ENV_POLL_INTERVAL)?.unwrap_or(0);
        Ok(Self::from_millis(timeout, interval))
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitOptions {
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> KmsResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| KmsError::Configuration(format!("{} must be an integer, got {:?}", name, raw))),
        _ => Ok(None),
    }
}
