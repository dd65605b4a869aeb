//! Inbound packet notifications.
//!
//! The module reports a received packet as one line with fields at fixed
//! byte offsets:
//!
//! ```text
//! offset  0..3   3..7    7    8..10   10   11..
//!         ???    SSSS    ?    RR      ?    [ ]payload
//! ```
//!
//! `SSSS` is the sender address and `RR` the RSSI magnitude, both hex.
//! These offsets are part of the wire format.

use std::ops::Range;

use bytes::Bytes;
use im920_frame::decode_payload;

use crate::error::{RadioError, Result};

/// Sender address field (4 hex digits).
pub const SENDER_FIELD: Range<usize> = 3..7;
/// RSSI magnitude field (2 hex digits).
pub const RSSI_FIELD: Range<usize> = 8..10;
/// Start of the payload.
pub const PAYLOAD_OFFSET: usize = 11;
/// Shorter lines are not packet notifications.
pub const NOTIFICATION_MIN_LEN: usize = PAYLOAD_OFFSET;

/// A packet received from another node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    sender: u16,
    rssi: i16,
    data: Bytes,
}

impl Packet {
    /// Address of the sending node.
    pub fn sender(&self) -> u16 {
        self.sender
    }

    /// Received signal strength; never positive.
    pub fn rssi(&self) -> i16 {
        self.rssi
    }

    /// Decoded payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Take the payload.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// Parse a packet notification line.
///
/// Exactly one leading space of the payload is dropped: the module emits it
/// on the second and later packets of a burst.
pub fn parse_notification(line: &[u8], text_mode: bool) -> Result<Packet> {
    if line.len() < NOTIFICATION_MIN_LEN {
        return Err(malformed(line, "shorter than 11 bytes"));
    }

    let sender = hex_field(line, SENDER_FIELD, "sender")?;
    let rssi = hex_field(line, RSSI_FIELD, "rssi")?;

    let mut payload = &line[PAYLOAD_OFFSET..];
    if let Some((b' ', rest)) = payload.split_first() {
        payload = rest;
    }
    let data = decode_payload(payload, text_mode)?;

    Ok(Packet {
        sender,
        rssi: -(rssi as i16),
        data,
    })
}

fn hex_field(line: &[u8], range: Range<usize>, name: &str) -> Result<u16> {
    let field = &line[range];
    if !field.iter().all(u8::is_ascii_hexdigit) {
        return Err(malformed(line, &format!("{name} is not hex")));
    }
    let text = std::str::from_utf8(field).map_err(|_| malformed(line, name))?;
    u16::from_str_radix(text, 16).map_err(|_| malformed(line, name))
}

fn malformed(line: &[u8], reason: &str) -> RadioError {
    RadioError::MalformedNotification {
        line: String::from_utf8_lossy(line).into_owned(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use im920_frame::FrameError;

    use super::*;

    #[test]
    fn binary_hello() {
        let packet = parse_notification(b"00,0102,30:48656c6c6f", false).unwrap();
        assert_eq!(packet.sender(), 258);
        assert_eq!(packet.rssi(), -48);
        assert_eq!(packet.data().as_ref(), b"Hello");
    }

    #[test]
    fn leading_space_is_stripped_once() {
        let packet = parse_notification(b"00,0102,30: 48656c6c6f", false).unwrap();
        assert_eq!(packet.data().as_ref(), b"Hello");

        let packet = parse_notification(b"00,0102,30:  hi", true).unwrap();
        assert_eq!(packet.data().as_ref(), b" hi");
    }

    #[test]
    fn text_mode_payload_is_raw() {
        let packet = parse_notification(b"00,00ff,c8:hello world", true).unwrap();
        assert_eq!(packet.sender(), 0xff);
        assert_eq!(packet.rssi(), -200);
        assert_eq!(packet.data().as_ref(), b"hello world");
    }

    #[test]
    fn zero_rssi_is_zero() {
        let packet = parse_notification(b"00,0001,00:", true).unwrap();
        assert_eq!(packet.rssi(), 0);
        assert!(packet.data().is_empty());
    }

    #[test]
    fn separators_are_not_checked() {
        // Shifted by one byte: the sender field reads ":010".
        let packet = parse_notification(b"920:0102:+30 48656c6c6f", false);
        assert!(packet.is_err());

        let packet = parse_notification(b"abcABCDxffy4142", false).unwrap();
        assert_eq!(packet.sender(), 0xabcd);
        assert_eq!(packet.rssi(), -0xff);
        assert_eq!(packet.data().as_ref(), b"AB");
    }

    #[test]
    fn short_line_rejected() {
        let err = parse_notification(b"00,0102,30", false).unwrap_err();
        assert!(matches!(err, RadioError::MalformedNotification { .. }));
    }

    #[test]
    fn non_hex_sender_rejected() {
        let err = parse_notification(b"00,01G2,30:4142", false).unwrap_err();
        match err {
            RadioError::MalformedNotification { reason, .. } => {
                assert_eq!(reason, "sender is not hex")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn odd_hex_payload_rejected() {
        let err = parse_notification(b"00,0102,30:414", false).unwrap_err();
        assert!(matches!(err, RadioError::Frame(FrameError::OddHexLength(3))));
    }

    #[test]
    fn into_data() {
        let packet = parse_notification(b"00,0102,30:4142", false).unwrap();
        assert_eq!(packet.into_data().as_ref(), b"AB");
    }
}
