//! Device recovery after a protocol stall.
//!
//! A device that stopped answering mid-protocol is reset and its start-up
//! chatter drained, so stale output is never mistaken for a protocol
//! response.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::TransportError;
use crate::transport::Transport;

/// How long to keep discarding lines after a reset.
const RESET_DRAIN_WINDOW: Duration = Duration::from_secs(3);

/// Per-read granularity while draining.
const DRAIN_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Resets a stalled device and flushes its start-up output.
#[derive(Debug, Clone)]
pub struct RecoveryController {
    drain_window: Duration,
}

impl Default for RecoveryController {
    fn default() -> Self {
        RecoveryController {
            drain_window: RESET_DRAIN_WINDOW,
        }
    }
}

impl RecoveryController {
    /// Create a controller with a custom post-reset drain window.
    pub fn with_drain_window(drain_window: Duration) -> Self {
        RecoveryController { drain_window }
    }

    /// Reset the device and drain its start-up chatter.
    ///
    /// Returns the number of lines discarded; an empty drain is not an
    /// error. Fails only if the reset itself failed both ways.
    pub fn recover<T: Transport>(&self, transport: &mut T) -> Result<usize, TransportError> {
        transport.reset()?;
        let drained = self.drain(transport, self.drain_window);
        info!("device reset complete ({} start-up lines drained)", drained);
        Ok(drained)
    }

    /// Discard every line that arrives within `window`, returning the count.
    ///
    /// Also used before the first command of a session to flush whatever the
    /// device printed since power-up. Each discarded line is logged so device
    /// output stays visible to the operator.
    pub fn drain<T: Transport>(&self, transport: &mut T, window: Duration) -> usize {
        let deadline = Instant::now() + window;
        let mut drained = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match transport.read_line(remaining.min(DRAIN_READ_TIMEOUT)) {
                Ok(Some(line)) => {
                    info!("device: {}", line);
                    drained += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    // Draining is best effort; a read error here must not
                    // mask the condition that led to the reset.
                    debug!("read error while draining: {}", e);
                    break;
                }
            }
        }

        drained
    }
}
