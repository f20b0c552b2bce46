//! Client configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! connect_timeout_ms = 2000
//! read_timeout_ms = 5000
//! recv_chunk_size = 4096
//! framing = "strict"
//! ```
//!
//! Timeouts left unset block indefinitely.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a body that disagrees with its `Content-Length` is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramingPolicy {
    /// Take whatever was buffered when the peer closed.
    #[default]
    Lenient,
    /// Reject short or overlong bodies.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub write_timeout_ms: Option<u64>,
    /// Size of each socket read.
    pub recv_chunk_size: usize,
    /// Initial capacity of the receive and output buffers.
    pub initial_buffer_capacity: usize,
    pub framing: FramingPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: None,
            read_timeout_ms: None,
            write_timeout_ms: None,
            recv_chunk_size: 4096,
            initial_buffer_capacity: 8192,
            framing: FramingPolicy::Lenient,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recv_chunk_size == 0 {
            return Err(ConfigError::Invalid("recv_chunk_size must be >= 1".to_string()));
        }
        for (name, value) in [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("read_timeout_ms", self.read_timeout_ms),
            ("write_timeout_ms", self.write_timeout_ms),
        ] {
            if value == Some(0) {
                return Err(ConfigError::Invalid(format!("{name} must be > 0")));
            }
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }

    /// Builder method: set connect and read deadlines.
    ///
    /// Durations are rounded up to whole milliseconds, with a 1 ms minimum.
    pub fn with_timeouts(mut self, connect: Option<Duration>, read: Option<Duration>) -> Self {
        self.connect_timeout_ms = connect.map(duration_to_ms);
        self.read_timeout_ms = read.map(duration_to_ms);
        self
    }

    /// Builder method: set the framing policy.
    pub fn with_framing(mut self, framing: FramingPolicy) -> Self {
        self.framing = framing;
        self
    }
}

fn duration_to_ms(d: Duration) -> u64 {
    let ms = d.as_nanos().div_ceil(1_000_000);
    u64::try_from(ms).unwrap_or(u64::MAX).max(1)
}
