//! Protocol limits and defaults.

/// Maximum payload the firmware receive buffer can hold, in bytes.
pub const MAX_PAYLOAD: usize = 2048;

/// Minimum transmit power in dBm.
pub const MIN_TX_POWER_DBM: i32 = 2;

/// Maximum transmit power in dBm.
pub const MAX_TX_POWER_DBM: i32 = 17;

/// Lower bound of the tunable frequency range in MHz.
pub const MIN_FREQUENCY_MHZ: f64 = 100.0;

/// Upper bound of the tunable frequency range in MHz.
pub const MAX_FREQUENCY_MHZ: f64 = 1000.0;

/// Default baud rate of the firmware console.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Default time to wait for a protocol response, in seconds.
pub const DEFAULT_RESPONSE_TIMEOUT_SECS: f64 = 30.0;
