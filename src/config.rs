//! Configuration for zset-client
//!
//! Centralized configuration with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ZSetError};

/// Main configuration shared by the client, the TCP transport and the
/// development server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Client Configuration
    // -------------------------------------------------------------------------
    /// How score tokens that fail to parse are treated
    pub score_decoding: ScoreDecoding,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Remote store address (host:port)
    pub server_addr: String,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Largest single block accepted from the wire (bytes)
    pub max_frame_size: usize,

    // -------------------------------------------------------------------------
    // Development Server Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,
}

/// Numeric coercion policy for score tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDecoding {
    /// Malformed tokens surface a decode error
    #[default]
    Strict,

    /// Malformed tokens decode as zero (compatible with older callers)
    Lenient,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            score_decoding: ScoreDecoding::Strict,
            server_addr: "127.0.0.1:8888".to_string(),
            connect_timeout_ms: 3000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            max_frame_size: 16 * 1024 * 1024, // 16 MB
            listen_addr: "127.0.0.1:8888".to_string(),
            max_connections: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings no transport or server can run with
    pub fn validate(&self) -> Result<()> {
        if self.server_addr.trim().is_empty() {
            return Err(ZSetError::Config("server_addr must not be empty".to_string()));
        }
        if self.listen_addr.trim().is_empty() {
            return Err(ZSetError::Config("listen_addr must not be empty".to_string()));
        }
        if self.max_frame_size == 0 {
            return Err(ZSetError::Config(
                "max_frame_size must be greater than 0".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ZSetError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the score coercion policy
    pub fn score_decoding(mut self, mode: ScoreDecoding) -> Self {
        self.config.score_decoding = mode;
        self
    }

    /// Set the remote store address
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum accepted block size (in bytes)
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate
    pub fn try_build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
