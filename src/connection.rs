// ABOUTME: Buffered TCP transport for the telnet console
// ABOUTME: Writes command lines and accumulates filtered console text for pattern matching

use crate::telnet::TelnetFilter;
use bytes::{Buf, BytesMut};
use std::{io, str};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

/// Line terminator expected by the console
pub const LINE_TERMINATOR: &str = "\r\n";

/// Console transport
///
/// Handles the byte level of a console session: telnet negotiation is
/// filtered out (and answered) as bytes arrive, and the remaining console
/// output accumulates as text until a caller recognises a complete reply and
/// consumes it.
///
/// The connection does not know about prompts or session state; the session
/// layer drives it.
#[derive(Debug)]
pub struct Connection {
    // The `TcpStream`, decorated with a `BufWriter` so a command line and its
    // terminator go out in a single write.
    stream: BufWriter<TcpStream>,

    // Raw bytes of the last read
    buffer: BytesMut,

    // Filtered bytes not yet decoded: the start of a UTF-8 sequence whose
    // remaining bytes are still in flight
    pending: BytesMut,

    // Console text received but not yet consumed by a match
    text: String,

    telnet: TelnetFilter,
}

impl Connection {
    /// Create a new `Connection`, backed by `socket`.
    pub fn new(socket: TcpStream) -> Connection {
        Connection {
            stream: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(4 * 1024),
            pending: BytesMut::new(),
            text: String::new(),
            telnet: TelnetFilter::new(),
        }
    }

    /// Text received so far and not yet consumed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Drop the first `len` bytes of received text
    pub fn consume(&mut self, len: usize) {
        let len = len.min(self.text.len());
        self.text.drain(..len);
    }

    /// Read once from the socket and append whatever console text arrived.
    ///
    /// Returns the number of raw bytes read; `0` means the peer closed the
    /// connection.
    pub async fn read_chunk(&mut self) -> io::Result<usize> {
        self.buffer.clear();
        let read = self.stream.read_buf(&mut self.buffer).await?;
        if read == 0 {
            return Ok(0);
        }

        let filtered = self.telnet.feed(&self.buffer);
        if !filtered.replies.is_empty() {
            self.stream.write_all(&filtered.replies).await?;
            self.stream.flush().await?;
        }
        self.pending.extend_from_slice(&filtered.data);
        decode_utf8(&mut self.pending, &mut self.text);

        Ok(read)
    }

    /// Write `line` followed by the line terminator and flush
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(LINE_TERMINATOR.as_bytes()).await?;
        self.stream.flush().await
    }

    /// Flush and close the write half
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.flush().await?;
        self.stream.shutdown().await
    }
}

/// Move every complete character of `pending` to `text`.
///
/// An incomplete sequence at the end stays in `pending` for the next read.
/// Invalid bytes become U+FFFD.
fn decode_utf8(pending: &mut BytesMut, text: &mut String) {
    loop {
        match str::from_utf8(pending) {
            Ok(valid) => {
                text.push_str(valid);
                pending.clear();
                return;
            }
            Err(e) => {
                let (valid, _) = pending.split_at(e.valid_up_to());
                text.push_str(str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(invalid) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        pending.advance(e.valid_up_to() + invalid);
                    }
                    None => {
                        pending.advance(e.valid_up_to());
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(chunks: &[&[u8]]) -> (String, usize) {
        let mut pending = BytesMut::new();
        let mut text = String::new();
        for chunk in chunks {
            pending.extend_from_slice(chunk);
            decode_utf8(&mut pending, &mut text);
        }
        (text, pending.len())
    }

    #[test]
    fn test_character_split_across_reads() {
        let (text, left) = decode_all(&[b"#caf\xC3".as_slice(), b"\xA9\r\n".as_slice()]);
        assert_eq!(text, "#caf\u{e9}\r\n");
        assert_eq!(left, 0);
    }

    #[test]
    fn test_incomplete_tail_is_held_back() {
        let (text, left) = decode_all(&[b"ok \xE2\x82".as_slice()]);
        assert_eq!(text, "ok ");
        assert_eq!(left, 2);
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let (text, left) = decode_all(&[b"a\xFFb".as_slice(), b"\xC3(c".as_slice()]);
        assert_eq!(text, "a\u{fffd}b\u{fffd}(c");
        assert_eq!(left, 0);
    }
}
