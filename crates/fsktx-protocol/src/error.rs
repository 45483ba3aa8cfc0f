//! Error types for the console protocol.

use thiserror::Error;

/// Errors that can occur when building protocol commands.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// Transmit power outside the range the radio accepts.
    #[error("transmit power {power} dBm out of range ({min}..={max} dBm)")]
    PowerOutOfRange {
        /// Requested power.
        power: i32,
        /// Minimum accepted power.
        min: i32,
        /// Maximum accepted power.
        max: i32,
    },

    /// Frequency outside the tunable range.
    #[error("frequency {frequency} MHz out of range ({min}..={max} MHz)")]
    FrequencyOutOfRange {
        /// Requested frequency.
        frequency: f64,
        /// Minimum tunable frequency.
        min: f64,
        /// Maximum tunable frequency.
        max: f64,
    },

    /// Payload exceeds the firmware receive buffer.
    #[error("payload too large: maximum {max} bytes, got {actual}")]
    PayloadTooLarge {
        /// Maximum allowed length.
        max: usize,
        /// Actual payload length.
        actual: usize,
    },

    /// Payload is empty; the firmware rejects zero-length transfers.
    #[error("payload is empty")]
    EmptyPayload,
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
