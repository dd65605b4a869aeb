//! Serial byte-stream transport for IM920 radio modules.
//!
//! The module talks 8N1 UART, usually through a USB bridge. This is the
//! lowest layer of the driver: everything else builds on the
//! [`RadioStream`] type provided here, or on any other `Read + Write`
//! stream a caller brings along.

pub mod config;
pub mod error;
pub mod serial;
pub mod stream;

pub use config::{LinkConfig, DEFAULT_WRITE_TIMEOUT};
pub use error::{Result, TransportError};
pub use serial::{PortInfo, SerialLink};
pub use stream::RadioStream;
