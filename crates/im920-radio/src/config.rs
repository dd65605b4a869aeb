use std::fmt;
use std::str::FromStr;

use im920_frame::LineConfig;
use im920_transport::LinkConfig;
use serde::{Serialize, Serializer};

use crate::error::{RadioError, Result};

/// Factory UART rate of the module.
pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// UART rates the module can be switched to with `SBRT`.
///
/// The discriminant is the code sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BaudRate {
    B1200 = 0,
    B2400 = 1,
    B4800 = 2,
    B9600 = 3,
    B19200 = 4,
    B38400 = 5,
    B57600 = 6,
    B115200 = 7,
    B230400 = 8,
    B460800 = 9,
}

impl BaudRate {
    /// Every rate in code order.
    pub const ALL: [BaudRate; 10] = [
        BaudRate::B1200,
        BaudRate::B2400,
        BaudRate::B4800,
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
        BaudRate::B230400,
        BaudRate::B460800,
    ];

    /// Wire code for `SBRT`.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Rate in bits per second.
    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B1200 => 1200,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
            BaudRate::B230400 => 230400,
            BaudRate::B460800 => 460800,
        }
    }

    /// Look a rate up by wire code.
    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(RadioError::InvalidBaudCode(code))
    }

    /// Look a rate up by bits per second.
    pub fn from_bits_per_second(bps: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| rate.bits_per_second() == bps)
            .ok_or_else(|| RadioError::UnsupportedBaudRate(bps.to_string()))
    }
}

impl TryFrom<u8> for BaudRate {
    type Error = RadioError;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code)
    }
}

impl FromStr for BaudRate {
    type Err = RadioError;

    /// Parses a rate in bits per second (`"115200"`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bps = s
            .parse::<u32>()
            .map_err(|_| RadioError::UnsupportedBaudRate(s.to_string()))?;
        Self::from_bits_per_second(bps)
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits_per_second())
    }
}

impl Serialize for BaudRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits_per_second())
    }
}

/// Module-side state cached by a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleConfig {
    /// Node number from the module's `STNN` parameter, once read.
    pub node_id: Option<u32>,
    /// UART rate the module is believed to run at.
    pub baud_rate: u32,
    /// Whether payloads travel as raw characters instead of hex.
    pub text_mode: bool,
}

impl ModuleConfig {
    /// State for a module running at `baud_rate`, not yet queried.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            node_id: None,
            baud_rate: DEFAULT_BAUD_RATE,
            text_mode: false,
        }
    }
}

/// Everything needed to open a connection.
#[derive(Debug, Clone)]
pub struct RadioConfig {
    /// Serial link settings.
    pub link: LinkConfig,
    /// Line framer limits.
    pub line: LineConfig,
    /// Run `RPRM` right after opening to learn node id and text mode.
    pub read_params_on_open: bool,
}

impl RadioConfig {
    /// Configuration for `port` at `baud_rate` with default limits.
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            link: LinkConfig::new(port, baud_rate),
            line: LineConfig::default(),
            read_params_on_open: true,
        }
    }
}
