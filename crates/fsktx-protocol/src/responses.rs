//! Response parsing for the transmitter console.
//!
//! Responses from the firmware are single lines of the form
//! `CHANNEL:CODE:MESSAGE`. The firmware also prints free-form diagnostic
//! text; lines that do not fit the shape are skipped by callers, never
//! escalated.

use log::trace;

/// Channel carrying console acknowledgements (configuration and transfer
/// setup replies).
pub const CHANNEL_CONSOLE: &str = "CONSOLE";

/// Channel carrying the final transmission status.
pub const CHANNEL_TX: &str = "TX";

/// A parsed response line from the firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    /// Response channel (first field).
    pub channel: String,
    /// Status code; `0` means success.
    pub code: i32,
    /// Free-form message text.
    pub message: String,
}

impl ResponseLine {
    /// Parse a raw text line into a response.
    ///
    /// Splits on the first two `:` only, so the message may itself contain
    /// `:`. Returns `None` for lines with fewer than three fields, an empty
    /// channel, or a non-integer code.
    pub fn parse(line: &str) -> Option<ResponseLine> {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');

        let mut parts = line.splitn(3, ':');
        let channel = parts.next()?;
        let code_str = parts.next()?;
        let message = parts.next()?;

        if channel.is_empty() {
            trace!("discarding line with empty channel: {}", line);
            return None;
        }

        let code: i32 = match code_str.trim().parse() {
            Ok(code) => code,
            Err(_) => {
                trace!("discarding line with non-integer code: {}", line);
                return None;
            }
        };

        Some(ResponseLine {
            channel: channel.to_string(),
            code,
            message: message.to_string(),
        })
    }

    /// Check whether this line reports success.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Check whether this line belongs to the given channel.
    pub fn is_on_channel(&self, channel: &str) -> bool {
        self.channel == channel
    }
}
