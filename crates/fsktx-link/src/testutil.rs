//! Scripted transport fake for driver tests.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::TransportError;
use crate::transport::Transport;

/// A [`Transport`] that replays scripted lines and records writes.
///
/// `read_line` pops the next scripted line immediately and reports "no
/// data" once the script runs out, so deadline-driven loops still observe
/// their timeouts without real delays.
#[derive(Default)]
pub struct MockTransport {
    script: VecDeque<String>,
    post_reset: VecDeque<String>,
    /// Command lines written, in order, without terminators.
    pub sent_lines: Vec<String>,
    /// Raw payload writes, in order.
    pub sent_payloads: Vec<Vec<u8>>,
    /// Number of reset calls observed.
    pub resets: usize,
    /// Override for the reported written-byte count, to simulate a short
    /// write.
    pub short_write: Option<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a line for `read_line` to return.
    pub fn push_line(&mut self, line: &str) {
        self.script.push_back(line.to_string());
    }

    /// Queue start-up chatter that appears only after a reset.
    pub fn push_post_reset(&mut self, line: &str) {
        self.post_reset.push_back(line.to_string());
    }

    /// Whether every scripted line has been consumed.
    pub fn script_is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

impl Transport for MockTransport {
    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.sent_lines.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> Result<Option<String>, TransportError> {
        Ok(self.script.pop_front())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.sent_payloads.push(data.to_vec());
        Ok(self.short_write.unwrap_or(data.len()))
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.resets += 1;
        self.script = std::mem::take(&mut self.post_reset);
        Ok(())
    }
}
