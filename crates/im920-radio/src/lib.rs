//! Half-duplex command/response session with an IM920 radio module.
//!
//! This is the "just works" layer. Open a [`Radio`], send unicast or
//! broadcast packets, receive packet notifications, and read or change the
//! module's parameters, clock and UART rate.
//!
//! Exactly one command is outstanding at a time: every command runs inside
//! an [`Exchange`], which mutably borrows the radio until its response has
//! been consumed.

pub mod clock;
pub mod command;
pub mod config;
pub mod connector;
pub mod error;
pub mod guard;
pub mod packet;
pub mod params;
pub mod radio;

pub use clock::{parse_time, TimeInfo};
pub use command::{
    parse_address, Command, BROADCAST_SHORT_MAX, CHUNK_SIZE, MAX_SEND_PAYLOAD,
    NOTIFICATION_LINE_MAX, PARAM_LINE_MAX, RESPONSE_LINE_MAX, RESPONSE_OK,
};
pub use config::{BaudRate, ModuleConfig, RadioConfig, DEFAULT_BAUD_RATE};
pub use connector::open;
pub use error::{RadioError, Result};
pub use guard::Exchange;
pub use packet::{
    parse_notification, Packet, NOTIFICATION_MIN_LEN, PAYLOAD_OFFSET, RSSI_FIELD, SENDER_FIELD,
};
pub use params::{ModuleParams, CATCH_ALL_KEY, NODE_ID_KEY, TEXT_MODE_FLAG};
pub use radio::Radio;
