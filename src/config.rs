//! Configuration types for freshlist

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// External API access configuration
///
/// Groups settings for the hosted repository API client. Used as a nested
/// sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the repository API (default: "https://api.github.com")
    ///
    /// Overridable so tests and GitHub Enterprise deployments can point the
    /// client elsewhere.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access token sent as a bearer credential (None = unauthenticated)
    ///
    /// The library reads no environment variables; the embedding application
    /// decides where the token comes from.
    #[serde(default)]
    pub token: Option<String>,

    /// HTTP request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header value (default: "freshlist")
    ///
    /// GitHub rejects requests without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Batch scheduling configuration
///
/// Controls how many lookups run at once and how batches are spaced to ease
/// API pressure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of concurrent fetch tasks per batch (default: 10)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between consecutive batches (default: 2 seconds)
    #[serde(default = "default_batch_pause", with = "duration_serde")]
    pub batch_pause: Duration,

    /// Courtesy delay before the first lookup of each entry (default: 100 ms)
    #[serde(default = "default_courtesy_delay", with = "duration_ms_serde")]
    pub courtesy_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_pause: default_batch_pause(),
            courtesy_delay: default_courtesy_delay(),
        }
    }
}

/// Retry configuration for failed lookups
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of backoff retries for access-denied failures
    /// (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff; attempt n waits
    /// `base_delay * 2^n` (default: 1 second)
    #[serde(default = "default_base_delay", with = "duration_serde")]
    pub base_delay: Duration,

    /// Add random jitter to backoff delays (default: false)
    ///
    /// Off by default so the backoff schedule is exactly the documented
    /// 1 s / 2 s / 4 s progression.
    #[serde(default)]
    pub jitter: bool,

    /// Minimum wait when the rate limit is exhausted (default: 60 seconds)
    ///
    /// The limiter's advertised reset time can already be in the past by the
    /// time the failure is observed.
    #[serde(default = "default_min_reset_wait", with = "duration_serde")]
    pub min_reset_wait: Duration,

    /// Safety buffer added on top of every rate-limit wait (default: 10
    /// seconds)
    #[serde(default = "default_reset_wait_buffer", with = "duration_serde")]
    pub reset_wait_buffer: Duration,

    /// Upper bound on cumulative rate-limit waiting per entry (default: None)
    ///
    /// Rate-limit waits do not consume retry attempts and would otherwise
    /// repeat until the limiter resets, indefinitely. With a budget set, a
    /// fetch that has already waited this long degrades to an empty result
    /// instead of waiting again.
    #[serde(default, with = "optional_duration_serde")]
    pub reset_wait_budget: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay: default_base_delay(),
            jitter: false,
            min_reset_wait: default_min_reset_wait(),
            reset_wait_buffer: default_reset_wait_buffer(),
            reset_wait_budget: None,
        }
    }
}

/// Main configuration for the freshness pipeline
///
/// Fields are organized into logical sub-configs:
/// - [`api`](ApiConfig) — API endpoint, credential, timeout
/// - [`batch`](BatchConfig) — concurrency, batch spacing, courtesy delay
/// - [`retry`](RetryConfig) — backoff schedule and rate-limit waits
///
/// Sub-config fields are flattened for serialization, so the JSON/TOML format
/// stays un-nested.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// API access settings
    #[serde(flatten)]
    pub api: ApiConfig,

    /// Batch scheduling settings
    #[serde(flatten)]
    pub batch: BatchConfig,

    /// Retry and backoff settings
    #[serde(flatten)]
    pub retry: RetryConfig,

    /// Sentinel date recorded for registry-only packages (default:
    /// 1999-01-01)
    ///
    /// Encodes the policy that packages without a repository are treated as
    /// indeterminately old so they sort last.
    #[serde(default = "default_registry_sentinel")]
    pub registry_sentinel: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            batch: BatchConfig::default(),
            retry: RetryConfig::default(),
            registry_sentinel: default_registry_sentinel(),
        }
    }
}

impl Config {
    /// Validate settings that have no sensible degenerate interpretation
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `batch_size` is
    /// zero or `base_url` is empty.
    pub fn validate(&self) -> crate::Result<()> {
        if self.batch.batch_size == 0 {
            return Err(crate::Error::Config {
                message: "batch_size must be at least 1".to_string(),
                key: Some("batch_size".to_string()),
            });
        }
        if self.api.base_url.is_empty() {
            return Err(crate::Error::Config {
                message: "base_url must not be empty".to_string(),
                key: Some("base_url".to_string()),
            });
        }
        Ok(())
    }
}

// Default value functions for serde

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    "freshlist".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_pause() -> Duration {
    Duration::from_secs(2)
}

fn default_courtesy_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_min_reset_wait() -> Duration {
    Duration::from_secs(60)
}

fn default_reset_wait_buffer() -> Duration {
    Duration::from_secs(10)
}

fn default_registry_sentinel() -> NaiveDate {
    // 1999-01-01 is always a valid calendar date
    NaiveDate::from_ymd_opt(1999, 1, 1).unwrap_or_default()
}

/// Serde support for Duration as seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Serde support for Duration as milliseconds (sub-second settings)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Serde support for Option<Duration> as seconds
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
