//! Driver for IM920 serial radio modules.
//!
//! The module speaks a line-oriented ASCII command protocol over a UART.
//! This crate ties the layers together:
//!
//! - [`transport`]: serial port discovery and the blocking byte stream
//! - [`frame`]: CR/LF line framing and hex payload encoding
//! - [`radio`]: the command/response session (send, broadcast, receive,
//!   parameters, clock, baud rate)
//!
//! ```no_run
//! use im920::radio::{open, RadioConfig};
//!
//! # fn main() -> im920::radio::Result<()> {
//! let mut radio = open(&RadioConfig::new("/dev/ttyUSB0", 19200))?;
//! radio.broadcast(b"hello")?;
//! let packet = radio.receive_packet()?;
//! println!("{} says {:?}", packet.sender(), packet.data());
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use im920_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use im920_frame::*;
}

/// Re-export radio session types.
pub mod radio {
    pub use im920_radio::*;
}

pub use im920_radio::{open, Packet, Radio, RadioConfig, RadioError};
