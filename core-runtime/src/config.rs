//! # Core Configuration Module
//!
//! Timings and cache lifetimes for the player core.
//!
//! ## Overview
//!
//! A [`CoreConfig`] is assembled with [`CoreConfigBuilder`] and validated when
//! built: every duration must be non-zero, so a misconfigured host fails at
//! startup instead of spinning a zero-period poller or caching nothing.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .poll_interval(Duration::from_millis(500))
//!     .catalog_ttl(Duration::from_secs(600))
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.playback.skip_increment, Duration::from_secs(30));
//! ```
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! CoreConfig::builder()
//!     .poll_interval(Duration::ZERO)
//!     .build()
//!     .expect("zero poll interval is rejected");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Period of the transport poller.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Forward/replay step.
pub const DEFAULT_SKIP_INCREMENT: Duration = Duration::from_secs(30);

/// How long the error state is shown before falling back to stop.
pub const DEFAULT_ERROR_RECOVERY_DELAY: Duration = Duration::from_secs(3);

/// Lifetime of the cached catalog listing.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(15 * 60);

/// Lifetime of a cached download URL. Kept short: backends sign them.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(5 * 60);

/// Settings consumed by the playback controller and poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub poll_interval: Duration,
    pub skip_increment: Duration,
    pub error_recovery_delay: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            skip_increment: DEFAULT_SKIP_INCREMENT,
            error_recovery_delay: DEFAULT_ERROR_RECOVERY_DELAY,
        }
    }
}

/// TTLs used by the media repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub catalog_ttl: Duration,
    pub url_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            catalog_ttl: DEFAULT_CATALOG_TTL,
            url_ttl: DEFAULT_URL_TTL,
        }
    }
}

/// Validated configuration for the player core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub playback: PlaybackSettings,
    pub cache: CacheSettings,
    /// Per-subscriber buffer of the event bus
    pub event_buffer_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackSettings::default(),
            cache: CacheSettings::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Check every setting; returns the first offending one.
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("poll_interval", self.playback.poll_interval),
            ("skip_increment", self.playback.skip_increment),
            ("error_recovery_delay", self.playback.error_recovery_delay),
            ("catalog_ttl", self.cache.catalog_ttl),
            ("url_ttl", self.cache.url_ttl),
        ];

        for (field, value) in durations {
            if value.is_zero() {
                return Err(invalid(field, "must be greater than zero"));
            }
        }

        if self.event_buffer_size == 0 {
            return Err(invalid("event_buffer_size", "must be greater than zero"));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> Error {
    Error::InvalidSetting {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Builder for [`CoreConfig`]. Unset values keep their defaults.
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.playback.poll_interval = interval;
        self
    }

    pub fn skip_increment(mut self, increment: Duration) -> Self {
        self.config.playback.skip_increment = increment;
        self
    }

    pub fn error_recovery_delay(mut self, delay: Duration) -> Self {
        self.config.playback.error_recovery_delay = delay;
        self
    }

    pub fn catalog_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache.catalog_ttl = ttl;
        self
    }

    pub fn url_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache.url_ttl = ttl;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.config.event_buffer_size = size;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CoreConfig::builder().build().unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.playback.poll_interval, Duration::from_secs(1));
        assert_eq!(config.playback.error_recovery_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_builder_overrides() {
        let config = CoreConfig::builder()
            .skip_increment(Duration::from_secs(10))
            .url_ttl(Duration::from_secs(60))
            .event_buffer_size(8)
            .build()
            .unwrap();

        assert_eq!(config.playback.skip_increment, Duration::from_secs(10));
        assert_eq!(config.cache.url_ttl, Duration::from_secs(60));
        assert_eq!(config.cache.catalog_ttl, DEFAULT_CATALOG_TTL);
        assert_eq!(config.event_buffer_size, 8);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let err = CoreConfig::builder()
            .catalog_ttl(Duration::ZERO)
            .build()
            .unwrap_err();

        match err {
            Error::InvalidSetting { field, .. } => assert_eq!(field, "catalog_ttl"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_partial_settings_deserialize_with_defaults() {
        let json = r#"{"url_ttl":{"secs":30,"nanos":0}}"#;
        let cache: CacheSettings = serde_json::from_str(json).unwrap();

        assert_eq!(cache.url_ttl, Duration::from_secs(30));
        assert_eq!(cache.catalog_ttl, DEFAULT_CATALOG_TTL);
    }

    #[test]
    fn test_zero_event_buffer_rejected() {
        assert!(CoreConfig::builder().event_buffer_size(0).build().is_err());
    }
}
