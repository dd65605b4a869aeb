use serde::Serialize;

use crate::error::{RadioError, Result};

/// Module clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeInfo {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
    /// Whether the module clock is synchronized with the network.
    pub sync: bool,
}

/// Parse an `RDCK` response: `HH:MM:SS.mmm X`, where `X == 'Y'` means
/// synchronized.
///
/// All five fields must be present. Anything after the sync flag is
/// ignored.
pub fn parse_time(line: &str) -> Result<TimeInfo> {
    let malformed = || RadioError::MalformedTime(line.to_string());
    let mut scan = Scanner::new(line);

    let hour = scan.number(2).ok_or_else(malformed)?;
    scan.literal(b':').ok_or_else(malformed)?;
    let minute = scan.number(2).ok_or_else(malformed)?;
    scan.literal(b':').ok_or_else(malformed)?;
    let second = scan.number(2).ok_or_else(malformed)?;
    scan.literal(b'.').ok_or_else(malformed)?;
    let millisecond = scan.number(5).ok_or_else(malformed)?;
    scan.skip_spaces();
    let flag = scan.byte().ok_or_else(malformed)?;

    Ok(TimeInfo {
        hour: u8::try_from(hour).map_err(|_| malformed())?,
        minute: u8::try_from(minute).map_err(|_| malformed())?,
        second: u8::try_from(second).map_err(|_| malformed())?,
        millisecond: u16::try_from(millisecond).map_err(|_| malformed())?,
        sync: flag == b'Y',
    })
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// One to `max_digits` decimal digits.
    fn number(&mut self, max_digits: usize) -> Option<u32> {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && self.pos - start < max_digits
            && self.bytes[self.pos].is_ascii_digit()
        {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.bytes[start..self.pos]
            .iter()
            .try_fold(0u32, |acc, &b| acc.checked_mul(10)?.checked_add(u32::from(b - b'0')))
    }

    fn literal(&mut self, expected: u8) -> Option<()> {
        if self.bytes.get(self.pos) == Some(&expected) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn skip_spaces(&mut self) {
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn byte(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronized_reading() {
        let time = parse_time("12:34:56.789 Y").unwrap();
        assert_eq!(
            time,
            TimeInfo {
                hour: 12,
                minute: 34,
                second: 56,
                millisecond: 789,
                sync: true,
            }
        );
    }

    #[test]
    fn unsynchronized_reading() {
        let time = parse_time("00:00:07.010 N").unwrap();
        assert_eq!(time.second, 7);
        assert_eq!(time.millisecond, 10);
        assert!(!time.sync);
    }

    #[test]
    fn trailing_bytes_are_tolerated() {
        let time = parse_time("23:59:59.999 Yes please").unwrap();
        assert!(time.sync);
        assert_eq!(time.hour, 23);
    }

    #[test]
    fn missing_sync_flag_is_an_error() {
        assert!(matches!(
            parse_time("12:34:56.789"),
            Err(RadioError::MalformedTime(_))
        ));
        assert!(matches!(
            parse_time("12:34:56.789 "),
            Err(RadioError::MalformedTime(_))
        ));
    }

    #[test]
    fn malformed_readings() {
        for bad in ["", "OK", "12-34-56.789 Y", "12:34:56 Y", "123:45:67.000 Y"] {
            assert!(
                matches!(parse_time(bad), Err(RadioError::MalformedTime(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn single_digit_fields() {
        let time = parse_time("1:2:3.4 Y").unwrap();
        assert_eq!((time.hour, time.minute, time.second, time.millisecond), (1, 2, 3, 4));
    }
}
