use bytes::Bytes;

use crate::error::{FrameError, Result};

/// Carriage return: ends a line on both directions.
pub const CR: u8 = b'\r';
/// Line feed: follows CR on the wire; swallowed on read.
pub const LF: u8 = b'\n';
/// NUL: the module may also end a line with it.
pub const NUL: u8 = 0;
/// Terminator appended to every written line.
pub const CRLF: [u8; 2] = [CR, LF];

/// Default maximum line body (before CR LF) accepted by the module.
pub const DEFAULT_MAX_LINE_PAYLOAD: usize = 30;

/// Default maximum size of a single raw write.
pub const DEFAULT_MAX_RAW_WRITE: usize = 32;

/// One line read from the module, terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Bytes seen before the terminator.
    pub bytes: Bytes,
    /// False when the read budget ran out before a terminator arrived.
    pub terminated: bool,
}

impl Line {
    /// The line as text, with invalid UTF-8 replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Length of the line body in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the line body is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Size limits applied by the line framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineConfig {
    /// Maximum line body; longer lines are cut before CR LF is appended.
    pub max_line_payload: usize,
    /// Maximum bytes in one raw write; longer writes are cut.
    pub max_raw_write: usize,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_payload: DEFAULT_MAX_LINE_PAYLOAD,
            max_raw_write: DEFAULT_MAX_RAW_WRITE,
        }
    }
}

/// Encode application payload for the wire.
///
/// Text mode passes bytes through untouched (the caller is responsible for
/// keeping them printable). Binary mode expands every byte into two
/// lowercase hex digits.
pub fn encode_payload(payload: &[u8], text_mode: bool) -> Bytes {
    if text_mode {
        Bytes::copy_from_slice(payload)
    } else {
        Bytes::from(hex::encode(payload).into_bytes())
    }
}

/// Decode a payload received from the wire.
pub fn decode_payload(encoded: &[u8], text_mode: bool) -> Result<Bytes> {
    if text_mode {
        return Ok(Bytes::copy_from_slice(encoded));
    }

    hex::decode(encoded).map(Bytes::from).map_err(|err| match err {
        hex::FromHexError::OddLength => FrameError::OddHexLength(encoded.len()),
        hex::FromHexError::InvalidHexCharacter { index, .. } => {
            FrameError::InvalidHex { offset: index }
        }
        hex::FromHexError::InvalidStringLength => FrameError::OddHexLength(encoded.len()),
    })
}
