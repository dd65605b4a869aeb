//! Wire commands understood by the module.
//!
//! Every command is one ASCII line. All of them are answered with a
//! terminal `OK` line except `RPRM`, which answers with its parameter dump.

use bytes::{BufMut, Bytes, BytesMut};
use im920_frame::encode_payload;

use crate::config::BaudRate;
use crate::error::{RadioError, Result};

/// Unicast transmit.
pub const TXDU: &str = "TXDU";
/// Broadcast transmit, short payload.
pub const TXDA: &str = "TXDA";
/// Broadcast transmit, long payload.
pub const TXDT: &str = "TXDT";
/// Read parameters.
pub const RPRM: &str = "RPRM";
/// Enable text (character I/O) mode.
pub const ECIO: &str = "ECIO";
/// Disable text mode.
pub const DCIO: &str = "DCIO";
/// Set UART rate.
pub const SBRT: &str = "SBRT";
/// Set clock.
pub const STCK: &str = "STCK";
/// Read clock.
pub const RDCK: &str = "RDCK";

/// Positive acknowledgement line.
pub const RESPONSE_OK: &str = "OK";

/// Largest payload sent as a single transmit command.
pub const MAX_SEND_PAYLOAD: usize = 32;
/// Chunk size for payloads above [`MAX_SEND_PAYLOAD`].
pub const CHUNK_SIZE: usize = 8;
/// Largest broadcast payload that uses `TXDA` rather than `TXDT`.
pub const BROADCAST_SHORT_MAX: usize = 8;

/// Read budget for acknowledgement and clock lines.
pub const RESPONSE_LINE_MAX: usize = 32;
/// Read budget for one `RPRM` line.
pub const PARAM_LINE_MAX: usize = 64;
/// Read budget for a packet notification (a 32-byte hex payload plus header).
pub const NOTIFICATION_LINE_MAX: usize = 128;

/// A command ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `TXDU <addr><payload>`: payload already encoded.
    SendTo { address: u16, payload: Bytes },
    /// `TXDA <payload>`: payload already encoded.
    Broadcast { payload: Bytes },
    /// `TXDT <payload>`: payload already encoded.
    BroadcastLong { payload: Bytes },
    /// `RPRM`
    ReadParams,
    /// `ECIO`
    EnableTextMode,
    /// `DCIO`
    DisableTextMode,
    /// `SBRT <code>`
    SetBaud(BaudRate),
    /// `STCK <hh> <mm> <ss>`
    SetClock { hour: u8, minute: u8, second: u8 },
    /// `RDCK`
    ReadClock,
}

impl Command {
    /// Unicast `payload` to `address`, encoding it for the current mode.
    pub fn send_to(address: u16, payload: &[u8], text_mode: bool) -> Self {
        Command::SendTo {
            address,
            payload: encode_payload(payload, text_mode),
        }
    }

    /// Broadcast `payload`, picking `TXDA` or `TXDT` by its raw length.
    pub fn broadcast(payload: &[u8], text_mode: bool) -> Self {
        let encoded = encode_payload(payload, text_mode);
        if payload.len() <= BROADCAST_SHORT_MAX {
            Command::Broadcast { payload: encoded }
        } else {
            Command::BroadcastLong { payload: encoded }
        }
    }

    /// Toggle text mode.
    pub fn text_mode(enabled: bool) -> Self {
        if enabled {
            Command::EnableTextMode
        } else {
            Command::DisableTextMode
        }
    }

    /// Command keyword, for logging.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::SendTo { .. } => TXDU,
            Command::Broadcast { .. } => TXDA,
            Command::BroadcastLong { .. } => TXDT,
            Command::ReadParams => RPRM,
            Command::EnableTextMode => ECIO,
            Command::DisableTextMode => DCIO,
            Command::SetBaud(_) => SBRT,
            Command::SetClock { .. } => STCK,
            Command::ReadClock => RDCK,
        }
    }

    /// The line body, without terminator.
    pub fn to_line(&self) -> Bytes {
        let mut line = BytesMut::with_capacity(16);
        line.put_slice(self.keyword().as_bytes());
        match self {
            Command::SendTo { address, payload } => {
                line.put_slice(format!(" {address:04x}").as_bytes());
                line.put_slice(payload);
            }
            Command::Broadcast { payload } | Command::BroadcastLong { payload } => {
                line.put_u8(b' ');
                line.put_slice(payload);
            }
            Command::SetBaud(rate) => {
                line.put_slice(format!(" {}", rate.code()).as_bytes());
            }
            Command::SetClock {
                hour,
                minute,
                second,
            } => {
                line.put_slice(format!(" {hour:02} {minute:02} {second:02}").as_bytes());
            }
            Command::ReadParams
            | Command::EnableTextMode
            | Command::DisableTextMode
            | Command::ReadClock => {}
        }
        line.freeze()
    }
}

/// Parse a node address written as 1-4 hex digits, with or without `0x`.
pub fn parse_address(input: &str) -> Result<u16> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RadioError::InvalidAddress(input.to_string()));
    }

    u16::from_str_radix(digits, 16).map_err(|_| RadioError::InvalidAddress(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_to_renders_four_digit_lowercase_address() {
        let cmd = Command::send_to(0x0a, b"\x01", false);
        assert_eq!(cmd.to_line().as_ref(), b"TXDU 000a01");

        let cmd = Command::send_to(0xbeef, b"hi", true);
        assert_eq!(cmd.to_line().as_ref(), b"TXDU beefhi");
    }

    #[test]
    fn broadcast_keyword_follows_raw_length() {
        let short = Command::broadcast(&[0u8; 8], false);
        assert_eq!(short.keyword(), TXDA);
        assert_eq!(short.to_line().len(), "TXDA ".len() + 16);

        let long = Command::broadcast(&[0u8; 9], false);
        assert_eq!(long.keyword(), TXDT);
    }

    #[test]
    fn simple_commands() {
        assert_eq!(Command::ReadParams.to_line().as_ref(), b"RPRM");
        assert_eq!(Command::text_mode(true).to_line().as_ref(), b"ECIO");
        assert_eq!(Command::text_mode(false).to_line().as_ref(), b"DCIO");
        assert_eq!(Command::ReadClock.to_line().as_ref(), b"RDCK");
    }

    #[test]
    fn set_baud_sends_code() {
        let cmd = Command::SetBaud(BaudRate::B115200);
        assert_eq!(cmd.to_line().as_ref(), b"SBRT 7");
    }

    #[test]
    fn set_clock_is_zero_padded() {
        let cmd = Command::SetClock {
            hour: 7,
            minute: 5,
            second: 0,
        };
        assert_eq!(cmd.to_line().as_ref(), b"STCK 07 05 00");
    }

    #[test]
    fn parse_address_forms() {
        assert_eq!(parse_address("0102").unwrap(), 0x0102);
        assert_eq!(parse_address("0x1F").unwrap(), 0x1f);
        assert_eq!(parse_address("a").unwrap(), 0x0a);
    }

    #[test]
    fn parse_address_rejects_garbage() {
        for bad in ["", "12345", "zz", "+12", "0x"] {
            assert!(
                matches!(parse_address(bad), Err(RadioError::InvalidAddress(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
