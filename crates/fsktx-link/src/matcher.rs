//! The wait-for-response loop.
//!
//! Blocks until an expected success line arrives on one fixed channel, a
//! firmware error arrives, or time runs out. Everything else on the wire is
//! skipped in arrival order and never buffered: the device emits diagnostic
//! text and informational zero-code lines that do not belong to the wait.

use std::time::{Duration, Instant};

use fsktx_protocol::{ResponseLine, CHANNEL_CONSOLE, CHANNEL_TX};
use tracing::{debug, error, trace};

use crate::error::{LinkError, LinkResult};
use crate::recovery::RecoveryController;
use crate::transport::Transport;

/// Upper bound on a single blocking read, so the overall deadline is checked
/// at least this often even on a transport with coarse read granularity.
const READ_SLICE: Duration = Duration::from_secs(1);

/// Waits for a success response on one fixed channel.
///
/// An error code on the channel fails the wait immediately; a missed
/// deadline resets the device first and then fails with
/// [`LinkError::Timeout`], so a device stuck mid-protocol is back in a known
/// state before the caller decides what to do next.
#[derive(Debug, Clone)]
pub struct ResponseMatcher {
    channel: &'static str,
    recovery: RecoveryController,
}

impl ResponseMatcher {
    /// Matcher for console acknowledgements (configuration and transfer
    /// setup replies).
    pub fn console() -> Self {
        ResponseMatcher {
            channel: CHANNEL_CONSOLE,
            recovery: RecoveryController::default(),
        }
    }

    /// Matcher for the final transmission status.
    pub fn transmit_status() -> Self {
        ResponseMatcher {
            channel: CHANNEL_TX,
            recovery: RecoveryController::default(),
        }
    }

    /// Override the recovery behavior used on timeout.
    pub fn with_recovery(mut self, recovery: RecoveryController) -> Self {
        self.recovery = recovery;
        self
    }

    /// The channel this matcher listens on.
    pub fn channel(&self) -> &'static str {
        self.channel
    }

    /// Block until a success response arrives on this matcher's channel.
    ///
    /// `prefixes` lists the accepted message prefixes; an empty list accepts
    /// any success message on the channel. A `timeout` of `None` waits
    /// indefinitely.
    pub fn wait<T: Transport>(
        &self,
        transport: &mut T,
        prefixes: &[&str],
        timeout: Option<Duration>,
    ) -> LinkResult<String> {
        let start = Instant::now();
        let deadline = timeout.map(|t| start + t);
        debug!(
            "awaiting {} response (prefixes: {:?}, timeout: {:?})",
            self.channel, prefixes, timeout
        );

        loop {
            let slice = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return self.fail_timeout(transport, start);
                    }
                    remaining.min(READ_SLICE)
                }
                None => READ_SLICE,
            };

            let line = match transport.read_line(slice)? {
                Some(line) => line,
                None => continue,
            };

            let response = match ResponseLine::parse(&line) {
                Some(response) => response,
                None => {
                    trace!("skipping unparseable line: {}", line);
                    continue;
                }
            };

            if !response.is_on_channel(self.channel) {
                trace!(
                    "ignoring {} line while awaiting {}",
                    response.channel,
                    self.channel
                );
                continue;
            }

            if !response.is_success() {
                error!(
                    "device error on {} (code {}): {}",
                    self.channel, response.code, response.message
                );
                return Err(LinkError::Device {
                    code: response.code,
                    message: response.message,
                });
            }

            if prefixes.is_empty() || prefixes.iter().any(|p| response.message.starts_with(p)) {
                trace!("matched {} response: {}", self.channel, response.message);
                return Ok(response.message);
            }

            trace!(
                "{} response '{}' matched no expected prefix",
                self.channel,
                response.message
            );
        }
    }

    fn fail_timeout<T: Transport>(&self, transport: &mut T, start: Instant) -> LinkResult<String> {
        let after = start.elapsed();
        error!(
            "no valid {} response after {:?}, resetting device",
            self.channel, after
        );
        self.recovery.recover(transport)?;
        Err(LinkError::Timeout {
            channel: self.channel.to_string(),
            after,
        })
    }
}
