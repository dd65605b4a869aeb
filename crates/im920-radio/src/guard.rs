use std::io::{Read, Write};

use im920_frame::Line;
use tracing::{debug, warn};

use crate::command::{Command, RESPONSE_LINE_MAX, RESPONSE_OK};
use crate::error::{RadioError, Result};
use crate::radio::Radio;

/// The one outstanding command on a [`Radio`].
///
/// An exchange holds the radio's only permit: it borrows the radio mutably,
/// so no other command can start until it is finished or released.
/// Dropping an exchange whose response was never consumed marks the radio
/// as possibly out of step with the module (see
/// [`Radio::is_desynchronized`]).
pub struct Exchange<'a, R: Read, W: Write> {
    radio: &'a mut Radio<R, W>,
    command: &'static str,
    settled: bool,
}

impl<'a, R: Read, W: Write> Exchange<'a, R, W> {
    pub(crate) fn new(radio: &'a mut Radio<R, W>, command: &'static str) -> Self {
        if radio.desynchronized {
            warn!(command, "starting command on a possibly desynchronized link");
        }
        Self {
            radio,
            command,
            settled: false,
        }
    }

    /// Keyword of the command this exchange carries.
    pub fn command(&self) -> &'static str {
        self.command
    }

    /// Write one command line.
    pub fn write_line(&mut self, line: &[u8]) -> Result<usize> {
        debug!(line = %String::from_utf8_lossy(line), "command");
        Ok(self.radio.writer.write_line(line)?)
    }

    /// Write a modelled command.
    pub fn write_command(&mut self, command: &Command) -> Result<usize> {
        self.write_line(&command.to_line())
    }

    /// Flush pending writes.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.radio.writer.flush()?)
    }

    /// Read one response line; see [`LineReader::read_line`](im920_frame::LineReader::read_line).
    pub fn read_line(&mut self, max_len: usize) -> Result<Line> {
        let line = self.radio.reader.read_line(max_len)?;
        debug!(line = %line.to_string_lossy(), "response");
        Ok(line)
    }

    /// Read one response line, failing if it is not terminated in budget.
    pub fn read_terminated_line(&mut self, max_len: usize) -> Result<Line> {
        let line = self.radio.reader.read_terminated_line(max_len)?;
        debug!(line = %line.to_string_lossy(), "response");
        Ok(line)
    }

    /// Flush, read the acknowledgement line and require it to be `OK`.
    ///
    /// This returns the permit. A non-`OK` line still counts as the
    /// consumed response; an I/O failure does not.
    pub fn finish(mut self) -> Result<()> {
        self.flush()?;
        let line = self.read_terminated_line(RESPONSE_LINE_MAX)?;
        self.settled = true;
        expect_ok(&line)?;
        self.radio.desynchronized = false;
        Ok(())
    }

    /// Return the permit after the caller consumed the response itself.
    pub fn release(mut self) {
        self.settled = true;
    }
}

impl<R: Read, W: Write> Drop for Exchange<'_, R, W> {
    fn drop(&mut self) {
        if !self.settled {
            self.radio.desynchronized = true;
            warn!(
                command = self.command,
                "response not consumed; next read may see stale lines"
            );
        }
    }
}

/// Accept exactly `OK`.
pub(crate) fn expect_ok(line: &Line) -> Result<()> {
    if line.bytes.as_ref() == RESPONSE_OK.as_bytes() {
        Ok(())
    } else {
        Err(RadioError::UnexpectedResponse(line.to_string_lossy()))
    }
}
