//! Line-level serial transport with explicit deadlines.
//!
//! The firmware console speaks newline-terminated ASCII over a serial port.
//! [`Transport`] is the seam the rest of the driver is written against;
//! [`SerialTransport`] is the `serialport`-backed implementation used on
//! real hardware.

use std::io::{self, ErrorKind};
use std::thread;
use std::time::{Duration, Instant};

use fsktx_protocol::LineBuffer;
use tracing::{debug, trace, warn};

use crate::error::TransportError;

/// How long the DTR line is held low to trigger a reset.
const DTR_TOGGLE_DELAY: Duration = Duration::from_millis(100);

/// How long the device takes to restart after a reset signal.
const RESET_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Hardware read timeout configured on the port; single reads never block
/// longer than this.
const PORT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Line-oriented byte-stream transport to the transmitter.
pub trait Transport {
    /// Write one command line, appending the terminator, and flush.
    fn write_line(&mut self, line: &str) -> Result<(), TransportError>;

    /// Read the next complete line, waiting at most `timeout`.
    ///
    /// Returns `Ok(None)` if no line completes in time; never blocks past
    /// the timeout. Bytes that fail to decode are replaced, so a garbled
    /// read yields a garbled line rather than an error.
    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, TransportError>;

    /// Write raw payload bytes and flush, returning the count written.
    ///
    /// The count may be short of `data.len()`; the caller decides what a
    /// short write means.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Reset the device and wait for it to settle.
    ///
    /// Anything the device prints while restarting is start-up chatter that
    /// the caller must drain before resuming the protocol.
    fn reset(&mut self) -> Result<(), TransportError>;
}

/// [`Transport`] implementation over a physical serial port.
///
/// The port is opened with 8N1 framing and held exclusively. The name and
/// baud rate are kept so the close-and-reopen reset fallback can recreate
/// the connection with identical parameters.
pub struct SerialTransport {
    /// `None` only after a failed reopen; every operation afterwards fails.
    port: Option<Box<dyn serialport::SerialPort>>,
    port_name: String,
    baud: u32,
    lines: LineBuffer,
}

fn open_port(name: &str, baud: u32) -> Result<Box<dyn serialport::SerialPort>, serialport::Error> {
    serialport::new(name, baud)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(PORT_READ_TIMEOUT)
        .open()
}

impl SerialTransport {
    /// Open a serial port with 8N1 framing at the given baud rate.
    pub fn open(port_name: &str, baud: u32) -> Result<SerialTransport, TransportError> {
        debug!("opening serial port {} at {} baud", port_name, baud);
        let port = open_port(port_name, baud)?;
        Ok(SerialTransport {
            port: Some(port),
            port_name: port_name.to_string(),
            baud,
            lines: LineBuffer::new(),
        })
    }

    /// The device name this transport was opened on.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn handle(&mut self) -> Result<&mut dyn serialport::SerialPort, TransportError> {
        match self.port.as_deref_mut() {
            Some(port) => Ok(port),
            None => Err(TransportError::Io(io::Error::new(
                ErrorKind::NotConnected,
                "serial port is closed",
            ))),
        }
    }

    /// Trigger a hardware reset by pulsing the DTR line low.
    fn toggle_dtr(&mut self) -> Result<(), TransportError> {
        let port = self.handle()?;
        port.write_data_terminal_ready(false)
            .map_err(TransportError::Serial)?;
        thread::sleep(DTR_TOGGLE_DELAY);
        let port = self.handle()?;
        port.write_data_terminal_ready(true)
            .map_err(TransportError::Serial)?;
        Ok(())
    }

    /// Close the port and reopen it with identical parameters.
    fn reopen(&mut self) -> Result<(), TransportError> {
        // The port is held exclusively, so it must be dropped before the
        // reopen can succeed.
        drop(self.port.take());
        thread::sleep(DTR_TOGGLE_DELAY);
        let port = open_port(&self.port_name, self.baud)?;
        self.port = Some(port);
        Ok(())
    }
}

impl Transport for SerialTransport {
    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        let frame = LineBuffer::encode_command(line);
        let port = self.handle()?;
        port.write_all(&frame).map_err(TransportError::Io)?;
        port.flush().map_err(TransportError::Io)?;
        debug!("sent command: {}", line);
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, TransportError> {
        if let Some(line) = self.lines.next_line() {
            trace!("received: {}", line);
            return Ok(Some(line));
        }

        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 256];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }

            let read_result = {
                let port = self.handle()?;
                port.set_timeout(remaining.min(PORT_READ_TIMEOUT))
                    .map_err(TransportError::Serial)?;
                port.read(&mut chunk)
            };

            match read_result {
                Ok(0) => {}
                Ok(n) => {
                    self.lines.push(&chunk[..n]);
                    if let Some(line) = self.lines.next_line() {
                        trace!("received: {}", line);
                        return Ok(Some(line));
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let port = self.handle()?;
        let written = port.write(data).map_err(TransportError::Io)?;
        port.flush().map_err(TransportError::Io)?;
        trace!("wrote {} of {} payload bytes", written, data.len());
        Ok(written)
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        warn!("resetting device on {}", self.port_name);

        if let Err(signal_err) = self.toggle_dtr() {
            debug!(
                "control-signal reset failed ({}), reopening port",
                signal_err
            );
            if let Err(reopen_err) = self.reopen() {
                return Err(TransportError::ResetFailed {
                    signal: signal_err.to_string(),
                    reopen: reopen_err.to_string(),
                });
            }
        }

        // Stale partial lines from before the reset must not leak into the
        // restarted conversation.
        self.lines.clear();

        thread::sleep(RESET_SETTLE_DELAY);
        Ok(())
    }
}
