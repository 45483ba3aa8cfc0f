//! Commands understood by the transmitter console.
//!
//! Every command is a single letter plus one argument. The `m` command arms
//! a transfer; the host must follow it with exactly the announced number of
//! raw payload bytes.

use crate::error::{ProtocolError, ProtocolResult};
use crate::limits::{
    MAX_FREQUENCY_MHZ, MAX_PAYLOAD, MAX_TX_POWER_DBM, MIN_FREQUENCY_MHZ, MIN_TX_POWER_DBM,
};

/// A command that can be sent to the transmitter.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Tune the carrier frequency in MHz (`f <freq>`).
    SetFrequency(f64),

    /// Set the transmit power in dBm (`p <power>`).
    SetPower(i32),

    /// Arm a transfer of `length` raw bytes (`m <length>`).
    BeginTransfer {
        /// Payload length in bytes.
        length: usize,
    },
}

impl Command {
    /// Build a frequency command, validating the tunable range.
    pub fn set_frequency(mhz: f64) -> ProtocolResult<Command> {
        if !(MIN_FREQUENCY_MHZ..=MAX_FREQUENCY_MHZ).contains(&mhz) {
            return Err(ProtocolError::FrequencyOutOfRange {
                frequency: mhz,
                min: MIN_FREQUENCY_MHZ,
                max: MAX_FREQUENCY_MHZ,
            });
        }
        Ok(Command::SetFrequency(mhz))
    }

    /// Build a power command, validating the supported dBm range.
    pub fn set_power(dbm: i32) -> ProtocolResult<Command> {
        if !(MIN_TX_POWER_DBM..=MAX_TX_POWER_DBM).contains(&dbm) {
            return Err(ProtocolError::PowerOutOfRange {
                power: dbm,
                min: MIN_TX_POWER_DBM,
                max: MAX_TX_POWER_DBM,
            });
        }
        Ok(Command::SetPower(dbm))
    }

    /// Build a transfer command, validating the payload size bounds.
    pub fn begin_transfer(length: usize) -> ProtocolResult<Command> {
        if length == 0 {
            return Err(ProtocolError::EmptyPayload);
        }
        if length > MAX_PAYLOAD {
            return Err(ProtocolError::PayloadTooLarge {
                max: MAX_PAYLOAD,
                actual: length,
            });
        }
        Ok(Command::BeginTransfer { length })
    }

    /// Get the command line as sent over the wire, without the terminator.
    pub fn encode(&self) -> String {
        match self {
            Command::SetFrequency(mhz) => format!("f {}", mhz),
            Command::SetPower(dbm) => format!("p {}", dbm),
            Command::BeginTransfer { length } => format!("m {}", length),
        }
    }
}
