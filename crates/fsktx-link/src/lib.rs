//! Serial link driver for the FSK transmitter.
//!
//! This crate drives the console protocol defined in `fsktx-protocol` over a
//! real serial port:
//!
//! - [`transport`] -- line-level I/O with explicit deadlines and a
//!   best-effort hardware reset, behind the [`Transport`] trait
//! - [`matcher`] -- the wait-for-response loop that skips chatter and turns
//!   firmware error codes and missed deadlines into typed failures
//! - [`recovery`] -- the reset-and-drain procedure that returns a stalled
//!   device to a known state
//! - [`device`] -- the transmission orchestrator sequencing configuration
//!   and payload transfer as one fixed protocol script
//!
//! The driver is fully synchronous: every wait is a bounded blocking read,
//! and the serial port is a single exclusively-owned resource for the whole
//! operation.

pub mod device;
pub mod error;
pub mod matcher;
pub mod recovery;
pub mod transport;

pub use device::FskTransmitter;
pub use error::{LinkError, LinkResult, TransportError};
pub use matcher::ResponseMatcher;
pub use recovery::RecoveryController;
pub use transport::{SerialTransport, Transport};

#[cfg(test)]
pub(crate) mod testutil;
