/// Errors that can occur in radio operations.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] im920_transport::TransportError),

    /// Line framing or payload decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] im920_frame::FrameError),

    /// The module answered something other than `OK`.
    #[error("unexpected response: {0:?}")]
    UnexpectedResponse(String),

    /// A packet notification did not match the fixed-offset layout.
    #[error("malformed packet notification ({reason}): {line:?}")]
    MalformedNotification { line: String, reason: String },

    /// A parameter the driver depends on was absent from the `RPRM` dump.
    #[error("parameter {0} missing from module response")]
    MissingParameter(String),

    /// The node id parameter was not a decimal number.
    #[error("invalid node id: {0:?}")]
    InvalidNodeId(String),

    /// The clock response did not match `HH:MM:SS.mmm X`.
    #[error("malformed clock response: {0:?}")]
    MalformedTime(String),

    /// A clock value outside 00:00:00..=23:59:59 was requested.
    #[error("invalid time {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u8, minute: u8, second: u8 },

    /// A node address was not 1-4 hex digits.
    #[error("invalid node address: {0:?}")]
    InvalidAddress(String),

    /// A baud code outside the module's table.
    #[error("invalid baud code {0} (expected 0-9)")]
    InvalidBaudCode(u8),

    /// A rate the module cannot be switched to.
    #[error("unsupported baud rate {0:?}")]
    UnsupportedBaudRate(String),
}

pub type Result<T> = std::result::Result<T, RadioError>;
