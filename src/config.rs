//! Configuration types for moviehub-fetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fetch behavior configuration (event buffering, timeouts, shutdown)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Capacity of the lifecycle event broadcast channel (default: 256)
    ///
    /// Subscribers that fall further behind than this miss the oldest events.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Upper bound for a single repository fetch (default: none)
    ///
    /// When set, the repository is wrapped in a
    /// [`TimeoutRepository`](crate::repository::TimeoutRepository) and fetches
    /// that run longer fail with a timeout error.
    #[serde(default, with = "optional_duration_serde")]
    pub fetch_timeout: Option<Duration>,

    /// How long `shutdown()` waits for cancelled fetch tasks to wind down (default: 30 seconds)
    ///
    /// Durations are written as seconds and may carry a fractional part.
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            fetch_timeout: None,
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Top-level configuration for a [`FetchOrchestrator`](crate::FetchOrchestrator)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Fetch behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Check that every setting is usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid key.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.event_channel_capacity == 0 {
            return Err(Error::config(
                "event_channel_capacity",
                "event channel capacity must be greater than zero",
            ));
        }
        if self.fetch.fetch_timeout == Some(Duration::ZERO) {
            return Err(Error::config(
                "fetch_timeout",
                "fetch timeout must be greater than zero when set",
            ));
        }
        Ok(())
    }
}

fn default_event_channel_capacity() -> usize {
    256
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

// Duration serialization helper (seconds, fractional part kept)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<f64>::deserialize(deserializer)? {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
