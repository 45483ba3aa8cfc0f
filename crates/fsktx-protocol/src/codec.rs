//! Line accumulation for the serial console stream.
//!
//! The console is line oriented, but reads from a serial port arrive in
//! arbitrary chunks. Incoming bytes are buffered until a complete line is
//! available; outbound commands get the `\n` terminator appended.

use bytes::BytesMut;

/// Terminator appended to outbound command lines.
pub const COMMAND_TERMINATOR: u8 = b'\n';

/// Accumulates raw serial bytes and yields complete text lines.
///
/// Invalid UTF-8 is replaced rather than rejected: a garbled read surfaces as
/// a garbled line that downstream parsing will skip, never as an error.
#[derive(Debug, Default)]
pub struct LineBuffer {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl LineBuffer {
    /// Create a new, empty line buffer.
    pub fn new() -> Self {
        LineBuffer {
            buffer: BytesMut::with_capacity(256),
        }
    }

    /// Append received bytes to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the next complete line out of the buffer.
    ///
    /// Lines are terminated by `\r` or `\n`; terminators are consumed and
    /// empty lines are skipped. Returns `None` if no complete line is
    /// buffered yet.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let end = self
                .buffer
                .iter()
                .position(|&byte| byte == b'\r' || byte == b'\n')?;

            let line_data = self.buffer.split_to(end);

            // Consume the terminator(s) that follow the line.
            while !self.buffer.is_empty()
                && (self.buffer[0] == b'\r' || self.buffer[0] == b'\n')
            {
                let _ = self.buffer.split_to(1);
            }

            if line_data.is_empty() {
                continue;
            }

            return Some(String::from_utf8_lossy(&line_data).to_string());
        }
    }

    /// Encode a command line for transmission, appending the terminator.
    pub fn encode_command(cmd: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(cmd.len() + 1);
        buf.extend_from_slice(cmd.as_bytes());
        buf.push(COMMAND_TERMINATOR);
        buf
    }

    /// Get the number of buffered bytes not yet consumed.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Discard everything in the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        let encoded = LineBuffer::encode_command("m 2048");
        assert_eq!(encoded, b"m 2048\n");
    }

    #[test]
    fn test_next_line() {
        let mut lines = LineBuffer::new();
        lines.push(b"CONSOLE:0:ready\n");

        assert_eq!(lines.next_line(), Some("CONSOLE:0:ready".to_string()));
        assert!(lines.next_line().is_none());
    }

    #[test]
    fn test_partial_line() {
        let mut lines = LineBuffer::new();
        lines.push(b"CONSOLE:0:Wait");

        assert!(lines.next_line().is_none());

        lines.push(b"ing for 8 bytes\r\n");

        assert_eq!(
            lines.next_line(),
            Some("CONSOLE:0:Waiting for 8 bytes".to_string())
        );
    }

    #[test]
    fn test_multiple_lines() {
        let mut lines = LineBuffer::new();
        lines.push(b"line1\r\nline2\r\n");

        assert_eq!(lines.next_line(), Some("line1".to_string()));
        assert_eq!(lines.next_line(), Some("line2".to_string()));
        assert!(lines.next_line().is_none());
    }

    #[test]
    fn test_empty_lines_skipped() {
        let mut lines = LineBuffer::new();
        lines.push(b"\r\n\r\nTX:0:done\n");

        assert_eq!(lines.next_line(), Some("TX:0:done".to_string()));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut lines = LineBuffer::new();
        lines.push(b"\xff\xfe boot\n");

        // Garbled bytes become a garbled line, not an error.
        let line = lines.next_line().expect("line should decode");
        assert!(line.ends_with(" boot"));
    }

    #[test]
    fn test_clear() {
        let mut lines = LineBuffer::new();
        lines.push(b"partial");
        assert_eq!(lines.buffered_len(), 7);

        lines.clear();
        assert_eq!(lines.buffered_len(), 0);
        assert!(lines.next_line().is_none());
    }
}
