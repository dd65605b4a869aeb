use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};
use tracing::{trace, warn};

use crate::codec::{LineConfig, CRLF};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes command lines to any `Write` stream.
///
/// Nothing is flushed implicitly; callers flush once the command is
/// complete (the result check does this).
pub struct LineWriter<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
}

impl<T: Write> LineWriter<T> {
    /// Create a new line writer with the module's default limits.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line writer with explicit limits.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write `line` followed by CR LF.
    ///
    /// A body longer than [`LineConfig::max_line_payload`] is cut to that
    /// length first. Returns the number of bytes put on the wire.
    pub fn write_line(&mut self, line: &[u8]) -> Result<usize> {
        let max = self.config.max_line_payload;
        let body = if line.len() > max {
            warn!(len = line.len(), max, "line too long, truncating");
            &line[..max]
        } else {
            line
        };

        self.buf.clear();
        self.buf.reserve(body.len() + CRLF.len());
        self.buf.put_slice(body);
        self.buf.put_slice(&CRLF);

        trace!(line = %String::from_utf8_lossy(body), "line write");
        write_all(&mut self.inner, &self.buf)?;
        Ok(self.buf.len())
    }

    /// Write bytes verbatim, cut to [`LineConfig::max_raw_write`].
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<usize> {
        let max = self.config.max_raw_write;
        let bytes = if bytes.len() > max {
            warn!(len = bytes.len(), max, "raw write too long, truncating");
            &bytes[..max]
        } else {
            bytes
        };

        write_all(&mut self.inner, bytes)?;
        Ok(bytes.len())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line writer configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

fn write_all<T: Write>(inner: &mut T, bytes: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match inner.write(&bytes[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    fn written(writer: LineWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn write_line_appends_crlf() {
        let mut writer = LineWriter::new(Cursor::new(Vec::new()));
        let n = writer.write_line(b"RPRM").unwrap();
        assert_eq!(n, 6);
        assert_eq!(written(writer), b"RPRM\r\n");
    }

    #[test]
    fn write_line_truncates_long_body() {
        let mut writer = LineWriter::new(Cursor::new(Vec::new()));
        let long = [b'a'; 40];
        let n = writer.write_line(&long).unwrap();
        assert_eq!(n, 32);

        let out = written(writer);
        assert_eq!(out.len(), 32);
        assert_eq!(&out[..30], &long[..30]);
        assert_eq!(&out[30..], b"\r\n");
    }

    #[test]
    fn write_line_at_cap_is_untouched() {
        let mut writer = LineWriter::new(Cursor::new(Vec::new()));
        let body = [b'b'; 30];
        writer.write_line(&body).unwrap();
        let out = written(writer);
        assert_eq!(&out[..30], &body[..]);
        assert_eq!(&out[30..], b"\r\n");
    }

    #[test]
    fn write_raw_caps_at_32() {
        let mut writer = LineWriter::new(Cursor::new(Vec::new()));
        let n = writer.write_raw(&[b'x'; 50]).unwrap();
        assert_eq!(n, 32);
        assert_eq!(written(writer).len(), 32);
    }

    #[test]
    fn custom_limits() {
        let cfg = LineConfig {
            max_line_payload: 4,
            max_raw_write: 6,
        };
        let mut writer = LineWriter::with_config(Cursor::new(Vec::new()), cfg);
        writer.write_line(b"ECIO-extra").unwrap();
        assert_eq!(writer.config().max_line_payload, 4);
        assert_eq!(written(writer), b"ECIO\r\n");
    }

    #[test]
    fn write_does_not_flush() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = LineWriter::new(sink);

        writer.write_line(b"RDCK").unwrap();
        assert!(!flag.load(Ordering::SeqCst));

        writer.flush().unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let sink = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };
        let mut writer = LineWriter::new(sink);
        writer.write_line(b"ECIO").unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.into_inner().data, b"ECIO\r\n");
    }

    #[test]
    fn zero_length_write_is_connection_closed() {
        let mut writer = LineWriter::new(ZeroWriter);
        let err = writer.write_line(b"ECIO").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = LineWriter::new(Cursor::new(Vec::<u8>::new()));
        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            // Accept at most two bytes per call to exercise the write loop.
            let n = buf.len().min(2);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
