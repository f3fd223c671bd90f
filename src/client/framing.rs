//! Newline framing for long-polling bodies.
//!
//! A held-open `application/x-ndjson` response delivers one message per
//! line. Network chunks do not respect line boundaries, so [`LineFramer`]
//! buffers bytes until a full line is available.
//!
//! # Examples
//!
//! ```
//! use typed_rest::client::LineFramer;
//!
//! let mut framer = LineFramer::new();
//! assert!(framer.feed(b"{\"n\":").unwrap().is_empty());
//!
//! let lines = framer.feed(b"1}\r\n{\"n\":2}\n").unwrap();
//! assert_eq!(lines.len(), 2);
//! assert_eq!(&lines[0][..], b"{\"n\":1}");
//! assert!(framer.finish().is_none());
//! ```

use crate::error::TransportError;
use bytes::{Bytes, BytesMut};

/// Default upper bound for one framed message, 16 MiB.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Incremental line splitter.
///
/// Line endings (`\n` or `\r\n`) are stripped and blank lines, which servers
/// send as keep-alives, are skipped. A line longer than the limit, or an
/// unterminated tail that grows past it, fails with
/// [`TransportError::MessageTooLarge`].
#[derive(Debug)]
pub struct LineFramer {
    /// Bytes not yet terminated by a newline
    buffer: BytesMut,
    max_message_bytes: usize,
}

impl LineFramer {
    /// Create an empty framer with [`DEFAULT_MAX_MESSAGE_BYTES`].
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_MESSAGE_BYTES)
    }

    /// Create an empty framer that rejects lines longer than `max_message_bytes`.
    pub fn with_limit(max_message_bytes: usize) -> Self {
        LineFramer {
            buffer: BytesMut::with_capacity(max_message_bytes.min(8192)),
            max_message_bytes,
        }
    }

    /// Feed bytes, returning every line they complete.
    ///
    /// # Errors
    ///
    /// [`TransportError::MessageTooLarge`] once a line exceeds the limit. The
    /// framer should not be fed again afterwards.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Bytes>, TransportError> {
        self.buffer.extend_from_slice(data);
        let mut lines = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line = self.buffer.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            if line.len() > self.max_message_bytes {
                return Err(self.too_large());
            }
            if !line.is_empty() {
                lines.push(line.freeze());
            }
        }

        if self.buffer.len() > self.max_message_bytes {
            return Err(self.too_large());
        }
        Ok(lines)
    }

    /// Take whatever trails the last newline once the stream has ended.
    pub fn finish(&mut self) -> Option<Bytes> {
        let rest = self.buffer.split().freeze();
        let trimmed = rest.strip_suffix(b"\r").map_or(rest.len(), <[u8]>::len);
        let rest = rest.slice(..trimmed);
        (!rest.is_empty()).then_some(rest)
    }

    /// Number of buffered, unterminated bytes.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn too_large(&mut self) -> TransportError {
        self.buffer.clear();
        TransportError::MessageTooLarge {
            limit: self.max_message_bytes,
        }
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_across_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"hel").unwrap().is_empty());
        assert_eq!(framer.pending(), 3);
        let lines = framer.feed(b"lo\nwor").unwrap();
        assert_eq!(lines, vec![Bytes::from_static(b"hello")]);
        assert_eq!(framer.finish(), Some(Bytes::from_static(b"wor")));
    }

    #[test]
    fn test_blank_keepalive_lines_skipped() {
        let mut framer = LineFramer::new();
        let lines = framer.feed(b"\n\r\na\n\n").unwrap();
        assert_eq!(lines, vec![Bytes::from_static(b"a")]);
    }

    #[test]
    fn test_finish_empty() {
        let mut framer = LineFramer::new();
        framer.feed(b"done\n").unwrap();
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_finish_strips_carriage_return() {
        let mut framer = LineFramer::new();
        framer.feed(b"tail\r").unwrap();
        assert_eq!(framer.finish(), Some(Bytes::from_static(b"tail")));
    }

    #[test]
    fn test_unterminated_tail_over_limit() {
        let mut framer = LineFramer::with_limit(8);
        assert!(framer.feed(b"12345").unwrap().is_empty());
        assert_eq!(
            framer.feed(b"6789"),
            Err(TransportError::MessageTooLarge { limit: 8 })
        );
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_complete_line_over_limit() {
        let mut framer = LineFramer::with_limit(4);
        assert_eq!(
            framer.feed(b"ok\ntoo long\n"),
            Err(TransportError::MessageTooLarge { limit: 4 })
        );
    }

    #[test]
    fn test_line_at_limit_passes() {
        let mut framer = LineFramer::with_limit(4);
        let lines = framer.feed(b"abcd\r\n").unwrap();
        assert_eq!(lines, vec![Bytes::from_static(b"abcd")]);
    }
}
