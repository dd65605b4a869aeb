use std::io::{ErrorKind, Read};
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use im920_transport::RadioStream;
use tracing::{debug, trace};

use crate::codec::{Line, CR, NUL};
use crate::error::{FrameError, Result};

/// Reads module lines from any `Read` stream, one byte at a time.
///
/// A line ends at NUL or at CR. The byte after a CR is consumed and thrown
/// away (it is the LF of the pair). Reading byte-wise keeps anything after
/// the current line in the stream for the next caller.
pub struct LineReader<T> {
    inner: T,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Read one line of at most `max_len` body bytes (blocking).
    ///
    /// If the budget runs out first the bytes read so far are returned with
    /// [`Line::terminated`] unset; the rest of that line stays unread.
    pub fn read_line(&mut self, max_len: usize) -> Result<Line> {
        let mut buf = BytesMut::with_capacity(max_len);

        while buf.len() < max_len {
            match self.read_byte()? {
                NUL => return Ok(finish(buf, true)),
                CR => {
                    let _lf = self.read_byte()?;
                    return Ok(finish(buf, true));
                }
                byte => buf.put_u8(byte),
            }
        }

        debug!(max_len, "line read budget exhausted before terminator");
        Ok(finish(buf, false))
    }

    /// Read one line and fail with [`FrameError::Truncated`] if it was not
    /// terminated within `max_len` bytes.
    pub fn read_terminated_line(&mut self, max_len: usize) -> Result<Line> {
        let line = self.read_line(max_len)?;
        if !line.terminated {
            return Err(FrameError::Truncated { max_len });
        }
        Ok(line)
    }

    /// Read a single byte (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(_) => return Ok(byte[0]),
                Err(err)
                    if matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) =>
                {
                    continue
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl LineReader<RadioStream> {
    /// Change the read timeout of the underlying serial stream.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.inner
            .set_read_timeout(timeout)
            .map_err(transport_to_frame_error)
    }

    /// Current read timeout of the underlying serial stream.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.inner.read_timeout()
    }
}

fn finish(buf: BytesMut, terminated: bool) -> Line {
    let line = Line {
        bytes: buf.freeze(),
        terminated,
    };
    trace!(line = %line.to_string_lossy(), terminated, "line read");
    line
}

pub(crate) fn transport_to_frame_error(err: im920_transport::TransportError) -> FrameError {
    match err {
        im920_transport::TransportError::Io(io) => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
