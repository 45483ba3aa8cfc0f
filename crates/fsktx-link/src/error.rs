//! Error types for the link driver.

use std::time::Duration;

use fsktx_protocol::ProtocolError;
use thiserror::Error;

/// Errors from the transport layer (open, read, write, reset).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Serial port operation failed.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error on the byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Both reset strategies failed.
    #[error("device reset failed (control signal: {signal}; reopen: {reopen})")]
    ResetFailed {
        /// Why the control-signal toggle failed.
        signal: String,
        /// Why the close-and-reopen fallback failed.
        reopen: String,
    },
}

/// Errors that can occur while driving the console protocol.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The firmware reported an error on the awaited channel.
    #[error("device error (code {code}): {message}")]
    Device {
        /// Nonzero status code from the response line.
        code: i32,
        /// Message text from the response line.
        message: String,
    },

    /// No matching response arrived before the deadline. The device has
    /// already been reset by the time this is returned.
    #[error("no valid {channel} response after {after:?}")]
    Timeout {
        /// Channel that was being awaited.
        channel: String,
        /// How long the wait lasted.
        after: Duration,
    },

    /// The payload write completed short of the full length.
    #[error("partial write: {written}/{expected} bytes")]
    PartialWrite {
        /// Bytes actually written.
        written: usize,
        /// Bytes that should have been written.
        expected: usize,
    },

    /// The firmware acknowledged a different byte count than was sent. The
    /// device has already been reset by the time this is returned.
    #[error("device accepted wrong byte count (expected {expected}): {response}")]
    AcceptedCountMismatch {
        /// Byte count that was sent.
        expected: usize,
        /// The acknowledgement message received instead.
        response: String,
    },

    /// A command could not be built from the given parameters.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias for link operations.
pub type LinkResult<T> = Result<T, LinkError>;
