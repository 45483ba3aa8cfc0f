//! Transmission orchestration.
//!
//! Sequences configuration and payload transfer as one fixed protocol
//! script against a single exclusively-owned transport. Configuration and
//! transmission are strictly sequential; a failure in any step aborts the
//! whole operation.

use std::time::Duration;

use fsktx_protocol::Command;
use tracing::{debug, error, info};

use crate::error::{LinkError, LinkResult};
use crate::matcher::ResponseMatcher;
use crate::recovery::RecoveryController;
use crate::transport::Transport;

/// Acknowledgement prefix for a power command.
const POWER_SET_PREFIX: &str = "Transmit power set to";

/// Acknowledgement prefix for a frequency command.
const FREQUENCY_SET_PREFIX: &str = "Frequency set to";

/// Acknowledgement prefix for an accepted payload; the exact byte count is
/// validated separately.
const ACCEPTED_PREFIX: &str = "Accepted ";

/// Drives the configure-then-transmit protocol script over one transport.
pub struct FskTransmitter<T: Transport> {
    transport: T,
    console: ResponseMatcher,
    tx_status: ResponseMatcher,
    recovery: RecoveryController,
}

impl<T: Transport> FskTransmitter<T> {
    /// Create a transmitter driving the given transport.
    pub fn new(transport: T) -> Self {
        FskTransmitter {
            transport,
            console: ResponseMatcher::console(),
            tx_status: ResponseMatcher::transmit_status(),
            recovery: RecoveryController::default(),
        }
    }

    /// Override the recovery behavior used after stalls.
    pub fn with_recovery(mut self, recovery: RecoveryController) -> Self {
        self.console = self.console.with_recovery(recovery.clone());
        self.tx_status = self.tx_status.with_recovery(recovery.clone());
        self.recovery = recovery;
        self
    }

    /// Flush whatever the device printed since power-up.
    ///
    /// Returns the number of lines discarded.
    pub fn drain_startup(&mut self, window: Duration) -> usize {
        self.recovery.drain(&mut self.transport, window)
    }

    /// Apply transmission parameters.
    ///
    /// Power is set before frequency; both are optional, and neither being
    /// present sends nothing at all.
    pub fn configure(
        &mut self,
        frequency: Option<f64>,
        power: Option<i32>,
        timeout: Option<Duration>,
    ) -> LinkResult<()> {
        if let Some(dbm) = power {
            let cmd = Command::set_power(dbm)?;
            info!("setting transmit power to {} dBm", dbm);
            self.transport.write_line(&cmd.encode())?;
            let response = self
                .console
                .wait(&mut self.transport, &[POWER_SET_PREFIX], timeout)?;
            debug!("power acknowledged: {}", response);
        }

        if let Some(mhz) = frequency {
            let cmd = Command::set_frequency(mhz)?;
            info!("setting frequency to {} MHz", mhz);
            self.transport.write_line(&cmd.encode())?;
            let response = self
                .console
                .wait(&mut self.transport, &[FREQUENCY_SET_PREFIX], timeout)?;
            debug!("frequency acknowledged: {}", response);
        }

        Ok(())
    }

    /// Push one payload to the device and wait for it to go out on the air.
    ///
    /// Returns the number of bytes transmitted.
    pub fn transmit(&mut self, payload: &[u8], timeout: Option<Duration>) -> LinkResult<usize> {
        let size = payload.len();
        let cmd = Command::begin_transfer(size)?;

        info!("starting transmission of {} bytes", size);
        self.transport.write_line(&cmd.encode())?;

        let ready = format!("Waiting for {} bytes", size);
        let response = self
            .console
            .wait(&mut self.transport, &[ready.as_str()], timeout)?;
        debug!("device ready for data: {}", response);

        let written = self.transport.write_bytes(payload)?;
        if written != size {
            // A short write on a synchronous stream means the transport
            // itself is broken, so no device reset is attempted.
            error!("partial payload write: {}/{} bytes", written, size);
            return Err(LinkError::PartialWrite {
                written,
                expected: size,
            });
        }

        let response = self
            .console
            .wait(&mut self.transport, &[ACCEPTED_PREFIX], timeout)?;
        let accepted = format!("Accepted {} bytes", size);
        if !response.contains(&accepted) {
            error!("device accepted wrong number of bytes: {}", response);
            self.recovery.recover(&mut self.transport)?;
            return Err(LinkError::AcceptedCountMismatch {
                expected: size,
                response,
            });
        }
        debug!("data accepted: {}", response);

        let status = self.tx_status.wait(&mut self.transport, &[], timeout)?;
        info!("transmission complete: {}", status);

        Ok(size)
    }

    /// Consume the transmitter and hand the transport back.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockTransport;
    use fsktx_protocol::ProtocolError;

    const TIMEOUT: Option<Duration> = Some(Duration::from_millis(40));

    fn transmitter(transport: MockTransport) -> FskTransmitter<MockTransport> {
        FskTransmitter::new(transport)
            .with_recovery(RecoveryController::with_drain_window(Duration::from_millis(10)))
    }

    #[test]
    fn test_transmit_happy_path() {
        let mut transport = MockTransport::new();
        transport.push_line("CONSOLE:0:Waiting for 8 bytes");
        transport.push_line("CONSOLE:0:Accepted 8 bytes");
        transport.push_line("TX:0:Transmission finished successfully!");

        let mut tx = transmitter(transport);
        let sent = tx.transmit(b"\x01\x02\x03\x04\x05\x06\x07\x08", TIMEOUT).unwrap();

        assert_eq!(sent, 8);
        let transport = tx.into_inner();
        assert_eq!(transport.sent_lines, vec!["m 8"]);
        assert_eq!(transport.sent_payloads.len(), 1);
        assert_eq!(transport.sent_payloads[0].len(), 8);
        assert_eq!(transport.resets, 0);
    }

    #[test]
    fn test_transmit_skips_informational_lines() {
        let mut transport = MockTransport::new();
        transport.push_line("status: idle");
        transport.push_line("CONSOLE:0:Waiting for 4 bytes");
        transport.push_line("TX:0:chatter on another channel");
        transport.push_line("CONSOLE:0:Accepted 4 bytes");
        transport.push_line("TX:0:done");

        let mut tx = transmitter(transport);
        let sent = tx.transmit(b"data", TIMEOUT).unwrap();

        assert_eq!(sent, 4);
    }

    #[test]
    fn test_transmit_accepted_count_mismatch_recovers() {
        let mut transport = MockTransport::new();
        transport.push_line("CONSOLE:0:Waiting for 8 bytes");
        transport.push_line("CONSOLE:0:Accepted 7 bytes");

        let mut tx = transmitter(transport);
        let err = tx.transmit(&[0u8; 8], TIMEOUT).unwrap_err();

        match err {
            LinkError::AcceptedCountMismatch { expected, response } => {
                assert_eq!(expected, 8);
                assert_eq!(response, "Accepted 7 bytes");
            }
            other => panic!("expected AcceptedCountMismatch, got {:?}", other),
        }
        assert_eq!(tx.into_inner().resets, 1);
    }

    #[test]
    fn test_transmit_prefix_sharing_count_is_rejected() {
        // "Accepted 1 bytes" is a prefix of "Accepted 16 bytes" in reverse;
        // the containment check must compare the full count string.
        let mut transport = MockTransport::new();
        transport.push_line("CONSOLE:0:Waiting for 16 bytes");
        transport.push_line("CONSOLE:0:Accepted 1 bytes");

        let mut tx = transmitter(transport);
        let err = tx.transmit(&[0u8; 16], TIMEOUT).unwrap_err();

        assert!(matches!(err, LinkError::AcceptedCountMismatch { .. }));
    }

    #[test]
    fn test_transmit_partial_write_does_not_recover() {
        let mut transport = MockTransport::new();
        transport.push_line("CONSOLE:0:Waiting for 8 bytes");
        transport.short_write = Some(5);

        let mut tx = transmitter(transport);
        let err = tx.transmit(&[0u8; 8], TIMEOUT).unwrap_err();

        match err {
            LinkError::PartialWrite { written, expected } => {
                assert_eq!(written, 5);
                assert_eq!(expected, 8);
            }
            other => panic!("expected PartialWrite, got {:?}", other),
        }
        assert_eq!(tx.into_inner().resets, 0);
    }

    #[test]
    fn test_transmit_device_error_aborts() {
        let mut transport = MockTransport::new();
        transport.push_line("CONSOLE:9:Invalid parameter");

        let mut tx = transmitter(transport);
        let err = tx.transmit(b"data", TIMEOUT).unwrap_err();

        assert!(matches!(err, LinkError::Device { code: 9, .. }));
    }

    #[test]
    fn test_transmit_rejects_empty_payload() {
        let mut tx = transmitter(MockTransport::new());
        let err = tx.transmit(&[], TIMEOUT).unwrap_err();

        assert!(matches!(
            err,
            LinkError::Protocol(ProtocolError::EmptyPayload)
        ));
        assert!(tx.into_inner().sent_lines.is_empty());
    }

    #[test]
    fn test_configure_power_then_frequency() {
        let mut transport = MockTransport::new();
        transport.push_line("CONSOLE:0:Transmit power set to 10");
        transport.push_line("CONSOLE:0:Frequency set to 433.5000");

        let mut tx = transmitter(transport);
        tx.configure(Some(433.5), Some(10), TIMEOUT).unwrap();

        assert_eq!(tx.into_inner().sent_lines, vec!["p 10", "f 433.5"]);
    }

    #[test]
    fn test_configure_frequency_only() {
        let mut transport = MockTransport::new();
        transport.push_line("CONSOLE:0:Frequency set to 868.1000");

        let mut tx = transmitter(transport);
        tx.configure(Some(868.1), None, TIMEOUT).unwrap();

        assert_eq!(tx.into_inner().sent_lines, vec!["f 868.1"]);
    }

    #[test]
    fn test_configure_nothing_is_a_noop() {
        let mut tx = transmitter(MockTransport::new());
        tx.configure(None, None, TIMEOUT).unwrap();

        let transport = tx.into_inner();
        assert!(transport.sent_lines.is_empty());
        assert!(transport.sent_payloads.is_empty());
    }

    #[test]
    fn test_configure_rejects_out_of_range_power() {
        let mut tx = transmitter(MockTransport::new());
        let err = tx.configure(None, Some(30), TIMEOUT).unwrap_err();

        assert!(matches!(
            err,
            LinkError::Protocol(ProtocolError::PowerOutOfRange { .. })
        ));
        assert!(tx.into_inner().sent_lines.is_empty());
    }

    #[test]
    fn test_drain_startup_reports_count() {
        let mut transport = MockTransport::new();
        transport.push_line("FSK transmitter ready");
        transport.push_line("CONSOLE:0:idle");

        let mut tx = transmitter(transport);
        let drained = tx.drain_startup(Duration::from_millis(20));

        assert_eq!(drained, 2);
    }
}
