//! # Error Types
//!
//! Custom error types for RC Link using `thiserror`.

use thiserror::Error;

/// Main error type for RC Link
#[derive(Debug, Error)]
pub enum RcLinkError {
    /// Destination buffer cannot hold the packed fields
    #[error("Buffer too small for packing: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Source buffer does not contain all packed fields
    #[error("Buffer too short for parsing: need {needed} bytes, got {actual}")]
    BufferTooShort { needed: usize, actual: usize },

    /// Field width outside what the bit packer supports
    #[error("Invalid field width {width} (must be 1-{max} bits)")]
    InvalidFieldWidth { width: u32, max: u32 },

    /// Packet-level errors reported by a serial protocol implementation
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame record serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for RC Link
pub type Result<T> = std::result::Result<T, RcLinkError>;
