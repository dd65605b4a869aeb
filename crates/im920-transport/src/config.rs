use std::time::Duration;

/// Write timeout used when none is configured.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial link settings.
///
/// There is no default device name. The caller always says
/// which port the module is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Device path (`/dev/ttyUSB0`, `COM3`, ...).
    pub port: String,
    /// Host-side UART rate in bits per second.
    pub baud_rate: u32,
    /// Read timeout. `None` blocks until a byte arrives.
    pub read_timeout: Option<Duration>,
    /// Timeout for the open call. The serial driver keeps a single timeout
    /// for both directions, so once the port is open writes share the read
    /// timeout (or the blocking poll interval).
    pub write_timeout: Duration,
}

impl LinkConfig {
    /// Settings for `port` at `baud_rate`, blocking reads.
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            read_timeout: None,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Override the read timeout.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}
