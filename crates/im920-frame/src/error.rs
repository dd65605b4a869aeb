/// Errors that can occur while framing lines or decoding payloads.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading or writing lines.
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a line terminator was received.
    #[error("connection closed (incomplete line)")]
    ConnectionClosed,

    /// No terminator was found within the read budget.
    #[error("line not terminated within {max_len} bytes")]
    Truncated { max_len: usize },

    /// A hex payload had an odd number of digits.
    #[error("hex payload has odd length ({0} digits)")]
    OddHexLength(usize),

    /// A hex payload contained a non-hex character.
    #[error("invalid hex digit at offset {offset}")]
    InvalidHex { offset: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
