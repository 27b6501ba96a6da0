//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::codec::channels::{ChannelSet, CHANNELS_COUNT, CHANNEL_VALUE_CENTER, CHANNEL_VALUE_MAX, PACKED_CHANNELS_COUNT};
use crate::error::{RcLinkError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub channels: ChannelsConfig,

    #[serde(default)]
    pub recorder: RecorderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Frame generation configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_packet_rate_hz")]
    pub packet_rate_hz: u32,

    #[serde(default = "default_status_interval_packets")]
    pub status_interval_packets: u64,
}

/// Channel values sent in every frame
#[derive(Debug, Deserialize, Clone)]
pub struct ChannelsConfig {
    #[serde(default = "default_channel_values")]
    pub values: Vec<u16>,

    #[serde(default)]
    pub initial_id: u32,

    #[serde(default)]
    pub failsafe: bool,
}

/// Frame recorder configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RecorderConfig {
    #[serde(default = "default_recorder_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_record_format")]
    pub format: String,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub log_dir: Option<String>,
}

// Default value functions
fn default_packet_rate_hz() -> u32 { 250 }
fn default_status_interval_packets() -> u64 { 1000 }

fn default_channel_values() -> Vec<u16> { vec![CHANNEL_VALUE_CENTER; PACKED_CHANNELS_COUNT] }

fn default_recorder_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_record_format() -> String { "jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            packet_rate_hz: default_packet_rate_hz(),
            status_interval_packets: default_status_interval_packets(),
        }
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            values: default_channel_values(),
            initial_id: 0,
            failsafe: false,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: default_recorder_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_record_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ChannelsConfig {
    /// Configured values laid into a full channel set
    ///
    /// Slots without a configured value are zero.
    pub fn channel_set(&self) -> ChannelSet {
        let mut channels = [0u16; CHANNELS_COUNT];
        for (slot, &value) in channels.iter_mut().zip(&self.values) {
            *slot = value;
        }
        channels
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rc_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Channel values above 2047 are accepted; the codec masks them to 11 bits.
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Validate link configuration
        if ![50, 150, 250, 500].contains(&self.link.packet_rate_hz) {
            return Err(config_error("packet_rate_hz must be one of: 50, 150, 250, 500"));
        }

        if self.link.status_interval_packets == 0 {
            return Err(config_error("status_interval_packets must be greater than 0"));
        }

        // Validate channel values
        if self.channels.values.len() > CHANNELS_COUNT {
            return Err(config_error(format!(
                "channels.values has {} entries (at most {} allowed)",
                self.channels.values.len(),
                CHANNELS_COUNT
            )));
        }

        for (index, &value) in self.channels.values.iter().enumerate() {
            if value > CHANNEL_VALUE_MAX {
                warn!(
                    "Channel {} value {} exceeds {} and will be masked to {}",
                    index,
                    value,
                    CHANNEL_VALUE_MAX,
                    value & CHANNEL_VALUE_MAX
                );
            }
        }

        // Validate recorder configuration
        if self.recorder.enabled && self.recorder.log_dir.is_empty() {
            return Err(config_error("recorder log_dir cannot be empty when enabled"));
        }

        if self.recorder.max_records_per_file == 0 {
            return Err(config_error("max_records_per_file must be greater than 0"));
        }

        if self.recorder.max_files_to_keep == 0 {
            return Err(config_error("max_files_to_keep must be greater than 0"));
        }

        if self.recorder.format != "jsonl" {
            return Err(config_error("recorder format must be 'jsonl' (only supported format)"));
        }

        // Validate logging configuration
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(config_error("logging level must be one of: trace, debug, info, warn, error"));
        }

        if matches!(&self.logging.log_dir, Some(dir) if dir.is_empty()) {
            return Err(config_error("logging log_dir cannot be empty when set"));
        }

        Ok(())
    }
}

fn config_error(msg: impl std::fmt::Display) -> RcLinkError {
    RcLinkError::Config(toml::de::Error::custom(msg))
}
