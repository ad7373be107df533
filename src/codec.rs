//! Telnet line codec
//!
//! Decodes `\n` terminated UTF-8 lines (a trailing `\r` is dropped) with a
//! length cap, and encodes outgoing lines with a `\r\n` terminator as
//! telnet clients expect.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

/// Default cap on an incoming line, in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16384;

const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Line codec for telnet-style clients
#[derive(Debug, Clone)]
pub struct TelnetLineCodec {
    inner: LinesCodec,
}

impl TelnetLineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
        }
    }
}

impl Default for TelnetLineCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl Decoder for TelnetLineCodec {
    type Item = String;
    type Error = LinesCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        self.inner.decode(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        self.inner.decode_eof(src)
    }
}

impl<T: AsRef<str>> Encoder<T> for TelnetLineCodec {
    type Error = LinesCodecError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> Result<(), LinesCodecError> {
        let line = line.as_ref();
        dst.reserve(line.len() + LINE_TERMINATOR.len());
        dst.put_slice(line.as_bytes());
        dst.put_slice(LINE_TERMINATOR);
        Ok(())
    }
}
