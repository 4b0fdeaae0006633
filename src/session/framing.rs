//! NETCONF 1.0 end-of-message framing.
//!
//! NETCONF over an SSH subsystem delimits messages with the literal marker
//! `]]>]]>`. Devices differ in how they flush the channel: some emit whole
//! lines, some dribble unbuffered bytes. The reader picks a [`FramingMode`]
//! once, from the shape of the device's initial hello, and keeps it for the
//! life of the session.
//!
//! The marker scan runs over the cumulative buffer with a `memmem` finder and
//! a remembered scan offset — memory aside, cost is O(message length) even
//! when the marker arrives split across reads.

use std::time::Duration;

use bytes::{Buf, BytesMut};
use log::trace;
use memchr::memmem::Finder;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::time::{Instant, timeout_at};

use crate::error::{ProtocolError, Result, TransportError};

/// The NETCONF 1.0 end-of-message marker.
pub const MESSAGE_TERMINATOR: &str = "]]>]]>";

/// How messages are read off the channel for the rest of a session.
///
/// Decided once, from the device's initial hello, and never revisited:
/// a hello containing a newline before the marker means the device writes
/// line-buffered output, so subsequent reads go line-by-line. Anything else
/// falls back to plain chunked reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    /// Chunked reads, marker searched in the cumulative buffer. The safe
    /// fallback for devices with unbuffered output.
    ByteWise,

    /// Line-by-line reads, each appended line checked for the marker. Assumes
    /// the marker lands at a line boundary, which line-buffered devices honor.
    LineWise,
}

/// Accumulates channel bytes into discrete NETCONF messages.
///
/// Bytes that follow a marker in the same read are not discarded; they are
/// carried forward and served at the start of the next [`read_message`]
/// call, so a device that flushes two messages in one write loses nothing.
///
/// [`read_message`]: FrameReader::read_message
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: BufReader<R>,

    /// Leftover bytes past the previous message's marker.
    carry: BytesMut,

    finder: Finder<'static>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            carry: BytesMut::new(),
            finder: Finder::new(MESSAGE_TERMINATOR.as_bytes()),
        }
    }

    /// Read the device's initial message and decide the framing mode for the
    /// rest of the session.
    ///
    /// The first read is always byte-wise; the mode only affects subsequent
    /// messages.
    pub async fn read_initial(&mut self, timeout: Duration) -> Result<(String, FramingMode)> {
        let message = self.read_bytewise(timeout).await?;

        let mode = if message.contains('\n') {
            FramingMode::LineWise
        } else {
            FramingMode::ByteWise
        };
        trace!("initial message selects {mode:?} framing");

        Ok((message, mode))
    }

    /// Read one complete message, marker stripped.
    ///
    /// Fails with [`ProtocolError::Incomplete`] if the channel closes before
    /// the marker, and [`ProtocolError::Timeout`] if `timeout` elapses first.
    pub async fn read_message(&mut self, mode: FramingMode, timeout: Duration) -> Result<String> {
        match mode {
            FramingMode::ByteWise => self.read_bytewise(timeout).await,
            FramingMode::LineWise => self.read_linewise(timeout).await,
        }
    }

    async fn read_bytewise(&mut self, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        let mut buf = self.carry.split();
        let mut scan_from = 0;

        loop {
            // Scan the unscanned region, backed up far enough to catch a
            // marker straddling the previous chunk boundary.
            if let Some(pos) = self.finder.find(&buf[scan_from..]) {
                return self.take_message(buf, scan_from + pos);
            }
            scan_from = buf.len().saturating_sub(MESSAGE_TERMINATOR.len() - 1);

            let n = timeout_at(deadline, self.reader.read_buf(&mut buf))
                .await
                .map_err(|_| ProtocolError::Timeout(timeout))?
                .map_err(TransportError::Io)?;
            if n == 0 {
                return Err(ProtocolError::Incomplete.into());
            }
            trace!("framing: +{n} bytes ({} buffered)", buf.len());
        }
    }

    async fn read_linewise(&mut self, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        let mut buf = self.carry.split();

        // A previous read may have carried a complete message forward.
        if let Some(pos) = self.finder.find(&buf) {
            return self.take_message(buf, pos);
        }

        let mut line = Vec::new();
        loop {
            line.clear();
            let n = timeout_at(deadline, self.reader.read_until(b'\n', &mut line))
                .await
                .map_err(|_| ProtocolError::Timeout(timeout))?
                .map_err(TransportError::Io)?;
            if n == 0 {
                return Err(ProtocolError::Incomplete.into());
            }

            buf.extend_from_slice(&line);
            if let Some(pos) = self.finder.find(&line) {
                // Marker is at a line boundary; locate it in the full buffer.
                let at = buf.len() - line.len() + pos;
                return self.take_message(buf, at);
            }
        }
    }

    /// Split `buf` at the marker: everything before it is the message,
    /// everything after it is carried to the next read.
    fn take_message(&mut self, mut buf: BytesMut, at: usize) -> Result<String> {
        let message = buf.split_to(at);
        buf.advance(MESSAGE_TERMINATOR.len());
        self.carry = buf;

        String::from_utf8(message.to_vec())
            .map_err(|_| ProtocolError::malformed("message is not valid UTF-8").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_bytewise_single_message() {
        let io = tokio_test::io::Builder::new()
            .read(b"<hello/>]]>]]>")
            .build();
        let mut reader = FrameReader::new(io);

        let msg = reader
            .read_message(FramingMode::ByteWise, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(msg, "<hello/>");
    }

    #[tokio::test]
    async fn test_bytewise_marker_split_across_reads() {
        let io = tokio_test::io::Builder::new()
            .read(b"<rpc-reply/>]]")
            .read(b">]]")
            .read(b">")
            .build();
        let mut reader = FrameReader::new(io);

        let msg = reader
            .read_message(FramingMode::ByteWise, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(msg, "<rpc-reply/>");
    }

    #[tokio::test]
    async fn test_bytewise_trailing_bytes_carried_forward() {
        let io = tokio_test::io::Builder::new()
            .read(b"<a/>]]>]]><b/>]]>]]>")
            .build();
        let mut reader = FrameReader::new(io);

        let first = reader
            .read_message(FramingMode::ByteWise, TIMEOUT)
            .await
            .unwrap();
        let second = reader
            .read_message(FramingMode::ByteWise, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(first, "<a/>");
        assert_eq!(second, "<b/>");
    }

    #[tokio::test]
    async fn test_linewise_message() {
        let io = tokio_test::io::Builder::new()
            .read(b"<rpc-reply>\n")
            .read(b"<ok/>\n")
            .read(b"</rpc-reply>\n")
            .read(b"]]>]]>\n")
            .build();
        let mut reader = FrameReader::new(io);

        let msg = reader
            .read_message(FramingMode::LineWise, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(msg, "<rpc-reply>\n<ok/>\n</rpc-reply>\n");
    }

    #[tokio::test]
    async fn test_linewise_carry_serves_next_message() {
        let io = tokio_test::io::Builder::new()
            .read(b"<a/>\n]]>]]><b/>\n]]>]]>\n")
            .build();
        let mut reader = FrameReader::new(io);

        let first = reader
            .read_message(FramingMode::LineWise, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(first, "<a/>\n");

        let second = reader
            .read_message(FramingMode::LineWise, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(second, "<b/>\n");
    }

    #[tokio::test]
    async fn test_initial_newline_selects_linewise() {
        let io = tokio_test::io::Builder::new()
            .read(b"<hello>\n<cap/>\n</hello>\n]]>]]>")
            .build();
        let mut reader = FrameReader::new(io);

        let (msg, mode) = reader.read_initial(TIMEOUT).await.unwrap();
        assert_eq!(mode, FramingMode::LineWise);
        assert!(msg.starts_with("<hello>"));
    }

    #[tokio::test]
    async fn test_initial_no_newline_selects_bytewise() {
        let io = tokio_test::io::Builder::new()
            .read(b"<hello><cap/></hello>]]>]]>")
            .build();
        let mut reader = FrameReader::new(io);

        let (_, mode) = reader.read_initial(TIMEOUT).await.unwrap();
        assert_eq!(mode, FramingMode::ByteWise);
    }

    #[tokio::test]
    async fn test_eof_before_marker_is_incomplete() {
        let io = tokio_test::io::Builder::new().read(b"<partial").build();
        let mut reader = FrameReader::new(io);

        let err = reader
            .read_message(FramingMode::ByteWise, TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Incomplete)));
    }

    #[tokio::test]
    async fn test_stalled_stream_times_out() {
        let (client, _server) = tokio::io::duplex(64);
        let mut reader = FrameReader::new(client);

        let err = reader
            .read_message(FramingMode::ByteWise, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Timeout(_))));
    }
}
