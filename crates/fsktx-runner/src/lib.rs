//! CLI runner for the FSK file transmitter.
//!
//! Parses and validates command-line arguments, opens the serial port,
//! configures the device, and transmits the payload file. All protocol work
//! lives in `fsktx-link`; this crate is the glue around it.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing::info;

use fsktx_link::{FskTransmitter, LinkError, SerialTransport, TransportError};
use fsktx_protocol::{Command, ProtocolError, DEFAULT_BAUD, DEFAULT_RESPONSE_TIMEOUT_SECS, MAX_PAYLOAD};

/// How long to listen for pre-existing start-up chatter before the first
/// command.
const STARTUP_DRAIN_WINDOW: Duration = Duration::from_millis(500);

/// Transmit a file over FSK through the transmitter's serial console.
#[derive(Debug, Parser)]
#[command(
    name = "fsktx",
    version,
    about = "Transmits a file over FSK using the serial console of the transmitter firmware"
)]
pub struct Args {
    /// Serial port device (e.g. /dev/ttyUSB0, COM3).
    pub port: String,

    /// File to transmit (at most 2048 bytes).
    pub file: PathBuf,

    /// Frequency in MHz to set before transmission (100-1000).
    #[arg(short = 'f', long, value_name = "MHZ")]
    pub frequency: Option<f64>,

    /// Transmit power in dBm (2-17).
    #[arg(short = 'p', long, value_name = "DBM")]
    pub power: Option<i32>,

    /// Serial baud rate.
    #[arg(short = 'b', long, value_name = "RATE", default_value_t = DEFAULT_BAUD)]
    pub baud: u32,

    /// Response timeout in seconds.
    #[arg(short = 't', long, value_name = "SECONDS", default_value_t = DEFAULT_RESPONSE_TIMEOUT_SECS)]
    pub timeout: f64,

    /// Enable verbose logging.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Validate parameters without transmitting.
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Validate argument ranges and the payload file before any I/O on the
    /// port.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if let Some(dbm) = self.power {
            Command::set_power(dbm)?;
        }
        if let Some(mhz) = self.frequency {
            Command::set_frequency(mhz)?;
        }
        if self.timeout <= 0.0 {
            return Err(RunnerError::Usage("timeout must be positive".to_string()));
        }
        if !self.file.is_file() {
            return Err(RunnerError::Usage(format!(
                "file '{}' does not exist or is not a file",
                self.file.display()
            )));
        }
        Ok(())
    }

    /// The response timeout as a duration.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

/// Top-level failures reported by the CLI.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Invalid command-line parameters.
    #[error("{0}")]
    Usage(String),

    /// Could not read the payload file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid payload or parameter for the protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Could not open or reset the serial port.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The protocol exchange failed.
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Execute the full transfer: validate, open, drain, configure, transmit.
///
/// Returns the number of bytes transmitted (zero for a dry run).
pub fn run(args: &Args) -> Result<usize, RunnerError> {
    args.validate()?;

    let payload = fs::read(&args.file).map_err(|source| RunnerError::FileRead {
        path: args.file.clone(),
        source,
    })?;
    // Reject empty or oversized files before touching the port.
    Command::begin_transfer(payload.len())?;

    info!("target: {} at {} baud", args.port, args.baud);
    info!(
        "file: {} ({} bytes, limit {})",
        args.file.display(),
        payload.len(),
        MAX_PAYLOAD
    );

    if args.dry_run {
        info!("dry run: validation complete, nothing transmitted");
        return Ok(0);
    }

    let transport = SerialTransport::open(&args.port, args.baud)?;
    let mut transmitter = FskTransmitter::new(transport);

    let drained = transmitter.drain_startup(STARTUP_DRAIN_WINDOW);
    if drained > 0 {
        info!("device ready ({} start-up lines)", drained);
    } else {
        info!("device ready (no start-up chatter)");
    }

    let timeout = Some(args.response_timeout());
    transmitter.configure(args.frequency, args.power, timeout)?;
    let sent = transmitter.transmit(&payload, timeout)?;

    info!("transmitted {} bytes", sent);
    Ok(sent)
}
