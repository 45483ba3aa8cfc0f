//! FSK Transmitter Serial Console Protocol
//!
//! This crate provides types and utilities for talking to the TTGO FSK
//! transmitter firmware over its serial console. The console is a simple
//! line-based text protocol: one ASCII line per message in each direction,
//! with the single exception of the raw payload bytes that follow an armed
//! transfer.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → firmware): a single letter plus one argument,
//!   terminated with `\n`:
//!   - `f <freq>` - set the carrier frequency in MHz
//!   - `p <power>` - set the transmit power in dBm
//!   - `m <length>` - arm a transfer of exactly `length` raw bytes, which the
//!     host sends immediately afterwards with no further delimiter
//! - **Responses** (firmware → host): lines of the form `CHANNEL:CODE:MESSAGE`
//!   where `CODE` is `0` on success and nonzero on a firmware-reported error.
//!   Two channels matter to the host: console acknowledgements and the final
//!   transmission status.
//!
//! The firmware also prints free-form diagnostic text (boot banners, status
//! lines); anything that does not parse as `CHANNEL:CODE:MESSAGE` is expected
//! and must be skipped, never treated as an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use fsktx_protocol::{Command, ResponseLine, CHANNEL_CONSOLE};
//!
//! // Build a command
//! let cmd = Command::set_power(10)?;
//! let line = cmd.encode();
//!
//! // Parse a response
//! let response = ResponseLine::parse("CONSOLE:0:Transmit power set to 10");
//! ```

mod codec;
mod commands;
mod error;
mod limits;
mod responses;

pub use codec::*;
pub use commands::*;
pub use error::*;
pub use limits::*;
pub use responses::*;
