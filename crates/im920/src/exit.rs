use std::fmt;
use std::io;

use im920_frame::FrameError;
use im920_radio::RadioError;
use im920_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => TRANSPORT_ERROR,
        io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        FrameError::Truncated { .. }
        | FrameError::OddHexLength(_)
        | FrameError::InvalidHex { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn radio_error(context: &str, err: RadioError) -> CliError {
    match err {
        RadioError::Transport(err) => transport_error(context, err),
        RadioError::Frame(err) => frame_error(context, err),
        RadioError::UnexpectedResponse(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        RadioError::InvalidTime { .. }
        | RadioError::InvalidAddress(_)
        | RadioError::InvalidBaudCode(_)
        | RadioError::UnsupportedBaudRate(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_124() {
        let err = radio_error(
            "read failed",
            RadioError::Frame(FrameError::Io(io::Error::from(io::ErrorKind::TimedOut))),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("read failed: "));
    }

    #[test]
    fn rejected_command_is_failure() {
        let err = radio_error("send failed", RadioError::UnexpectedResponse("NG".into()));
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn bad_input_is_usage() {
        let err = radio_error("baud", RadioError::UnsupportedBaudRate("12345".into()));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn malformed_module_output_is_data_invalid() {
        let err = radio_error("time", RadioError::MalformedTime("??".into()));
        assert_eq!(err.code, DATA_INVALID);
        let err = frame_error("listen", FrameError::OddHexLength(3));
        assert_eq!(err.code, DATA_INVALID);
    }
}
