use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::Result;

/// Poll interval used for serial reads when no read timeout is configured.
///
/// The serial driver always needs a finite timeout; a timed-out read is
/// simply retried so callers observe a blocking read.
pub(crate) const BLOCKING_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A connected radio byte stream implementing `Read` and `Write`.
///
/// This is the I/O type returned by [`SerialLink::open`](crate::SerialLink::open).
pub struct RadioStream {
    inner: RadioStreamInner,
    /// Retry timed-out reads instead of reporting them.
    blocking: bool,
}

enum RadioStreamInner {
    Serial(Box<dyn serialport::SerialPort>),
}

impl Read for RadioStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            let result = match &mut self.inner {
                RadioStreamInner::Serial(port) => port.read(buf),
            };
            match result {
                Err(err) if err.kind() == ErrorKind::TimedOut && self.blocking => continue,
                Ok(n) => {
                    trace!(bytes = n, "serial read");
                    return Ok(n);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Write for RadioStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            RadioStreamInner::Serial(port) => port.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            RadioStreamInner::Serial(port) => port.flush(),
        }
    }
}

impl RadioStream {
    /// Wrap an opened serial port.
    pub(crate) fn from_serial(
        port: Box<dyn serialport::SerialPort>,
        read_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut stream = Self {
            inner: RadioStreamInner::Serial(port),
            blocking: true,
        };
        stream.set_read_timeout(read_timeout)?;
        Ok(stream)
    }

    /// Set read timeout on the underlying stream. `None` blocks indefinitely.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.blocking = timeout.is_none();
        match &mut self.inner {
            RadioStreamInner::Serial(port) => {
                port.set_timeout(timeout.unwrap_or(BLOCKING_POLL_INTERVAL))?
            }
        }
        Ok(())
    }

    /// Current read timeout. `None` means reads block.
    pub fn read_timeout(&self) -> Option<Duration> {
        if self.blocking {
            return None;
        }
        match &self.inner {
            RadioStreamInner::Serial(port) => Some(port.timeout()),
        }
    }

    /// Change the host-side UART rate.
    ///
    /// Use this after the module has confirmed its own rate change, or the
    /// two ends stop understanding each other.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        match &mut self.inner {
            RadioStreamInner::Serial(port) => port.set_baud_rate(baud_rate)?,
        }
        debug!(baud_rate, "serial baud rate changed");
        Ok(())
    }

    /// Current host-side UART rate.
    pub fn baud_rate(&self) -> Result<u32> {
        match &self.inner {
            RadioStreamInner::Serial(port) => Ok(port.baud_rate()?),
        }
    }

    /// Try to clone this stream (creates a new handle to the same device).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            RadioStreamInner::Serial(port) => Ok(Self {
                inner: RadioStreamInner::Serial(port.try_clone()?),
                blocking: self.blocking,
            }),
        }
    }

    /// Device name, if the driver knows it.
    pub fn name(&self) -> Option<String> {
        match &self.inner {
            RadioStreamInner::Serial(port) => port.name(),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            RadioStreamInner::Serial(_) => "serial",
        }
    }
}

impl std::fmt::Debug for RadioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            RadioStreamInner::Serial(port) => f
                .debug_struct("RadioStream")
                .field("type", &"serial")
                .field("name", &port.name())
                .field("blocking", &self.blocking)
                .finish(),
        }
    }
}
