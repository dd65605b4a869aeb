//! Line framing and payload encoding for the IM920 command protocol.
//!
//! The module speaks ASCII lines:
//! - commands go out terminated by CR LF and capped at 32 bytes,
//! - responses and packet notifications come back terminated by CR (with a
//!   trailing LF that is swallowed) or by NUL,
//! - payload bytes travel either verbatim (text mode) or as lowercase
//!   ASCII hex (binary mode).

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_payload, encode_payload, Line, LineConfig, CR, CRLF, DEFAULT_MAX_LINE_PAYLOAD,
    DEFAULT_MAX_RAW_WRITE, LF, NUL,
};
pub use error::{FrameError, Result};
pub use reader::LineReader;
pub use writer::LineWriter;
