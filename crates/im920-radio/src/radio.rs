use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use im920_frame::{FrameError, Line, LineConfig, LineReader, LineWriter};
use im920_transport::RadioStream;
use tracing::{debug, info};

use crate::clock::{parse_time, TimeInfo};
use crate::command::{
    Command, CHUNK_SIZE, MAX_SEND_PAYLOAD, NOTIFICATION_LINE_MAX, PARAM_LINE_MAX, RDCK, RPRM,
    RESPONSE_LINE_MAX,
};
use crate::config::{BaudRate, ModuleConfig};
use crate::error::{RadioError, Result};
use crate::guard::{expect_ok, Exchange};
use crate::packet::{parse_notification, Packet, NOTIFICATION_MIN_LEN};
use crate::params::ModuleParams;

/// A connection to one radio module.
///
/// Owns both directions of the link and the cached [`ModuleConfig`].
/// The protocol is half-duplex: each command borrows the radio mutably
/// until its response is consumed. Share a radio between threads only
/// behind a lock.
pub struct Radio<R, W> {
    pub(crate) reader: LineReader<R>,
    pub(crate) writer: LineWriter<W>,
    config: ModuleConfig,
    pub(crate) desynchronized: bool,
}

impl<R: Read, W: Write> Radio<R, W> {
    /// Build a radio over a reader/writer pair with default line limits.
    pub fn new(reader: R, writer: W, config: ModuleConfig) -> Self {
        Self::from_parts(LineReader::new(reader), LineWriter::new(writer), config)
    }

    /// Build a radio over a reader/writer pair with explicit line limits.
    pub fn with_line_config(
        reader: R,
        writer: W,
        line_config: LineConfig,
        config: ModuleConfig,
    ) -> Self {
        Self::from_parts(
            LineReader::new(reader),
            LineWriter::with_config(writer, line_config),
            config,
        )
    }

    /// Build a radio from an existing line reader and writer.
    pub fn from_parts(reader: LineReader<R>, writer: LineWriter<W>, config: ModuleConfig) -> Self {
        Self {
            reader,
            writer,
            config,
            desynchronized: false,
        }
    }

    /// Cached module state.
    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Whether payloads are currently sent as raw characters.
    pub fn text_mode(&self) -> bool {
        self.config.text_mode
    }

    /// Node number, once [`read_params`](Self::read_params) has run.
    pub fn node_id(&self) -> Option<u32> {
        self.config.node_id
    }

    /// True when a command was abandoned before its response was read.
    ///
    /// The next response read may belong to that command. Cleared by the
    /// next successful acknowledgement, by [`resync`](Radio::resync) or by
    /// [`clear_desynchronized`](Self::clear_desynchronized).
    pub fn is_desynchronized(&self) -> bool {
        self.desynchronized
    }

    /// Forget a desynchronization mark, e.g. after draining the link.
    pub fn clear_desynchronized(&mut self) {
        self.desynchronized = false;
    }

    /// Start a command. The returned exchange is the only permit.
    pub fn begin(&mut self, command: &'static str) -> Exchange<'_, R, W> {
        Exchange::new(self, command)
    }

    /// Write bytes verbatim (at most 32 with default limits).
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        Ok(self.writer.write_raw(bytes)?)
    }

    /// Write one line followed by CR LF.
    pub fn write_line(&mut self, line: &[u8]) -> Result<usize> {
        Ok(self.writer.write_line(line)?)
    }

    /// Read one line of at most `max_len` bytes.
    pub fn read_line(&mut self, max_len: usize) -> Result<Line> {
        Ok(self.reader.read_line(max_len)?)
    }

    /// Read one terminated response line as text.
    pub fn read_string_line(&mut self) -> Result<String> {
        let line = self.reader.read_terminated_line(RESPONSE_LINE_MAX)?;
        Ok(line.to_string_lossy())
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.reader.read_byte()?)
    }

    /// Flush pending writes.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }

    /// Flush, read one line and require it to be `OK`.
    pub fn check_result(&mut self) -> Result<()> {
        self.flush()?;
        let line = self.reader.read_terminated_line(RESPONSE_LINE_MAX)?;
        debug!(line = %line.to_string_lossy(), "response");
        expect_ok(&line)
    }

    /// Send `payload` to the node at `address`.
    ///
    /// Payloads over 32 bytes go out as consecutive 8-byte chunks, each its
    /// own confirmed command. The first failing chunk aborts the rest;
    /// chunks already sent stay sent.
    pub fn send_to(&mut self, address: u16, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_SEND_PAYLOAD {
            debug!(
                address,
                len = payload.len(),
                chunks = payload.len().div_ceil(CHUNK_SIZE),
                "chunking unicast payload"
            );
            for chunk in payload.chunks(CHUNK_SIZE) {
                self.send_to(address, chunk)?;
            }
            return Ok(());
        }

        self.transmit(&Command::send_to(address, payload, self.config.text_mode))
    }

    /// Send `payload` to every node in range.
    ///
    /// Payloads over 32 bytes go out as consecutive 8-byte chunks and every
    /// chunk, the last one included, waits for its own `OK`.
    pub fn broadcast(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_SEND_PAYLOAD {
            debug!(
                len = payload.len(),
                chunks = payload.len().div_ceil(CHUNK_SIZE),
                "chunking broadcast payload"
            );
            for chunk in payload.chunks(CHUNK_SIZE) {
                self.transmit(&Command::broadcast(chunk, self.config.text_mode))?;
            }
            return Ok(());
        }

        self.transmit(&Command::broadcast(payload, self.config.text_mode))
    }

    /// Block until a packet notification arrives.
    ///
    /// Lines shorter than a notification are skipped. There is no timeout
    /// here; the stream's read timeout, if any, applies.
    pub fn receive_packet(&mut self) -> Result<Packet> {
        loop {
            let line = self.reader.read_terminated_line(NOTIFICATION_LINE_MAX)?;
            if line.len() < NOTIFICATION_MIN_LEN {
                debug!(line = %line.to_string_lossy(), "skipping non-packet line");
                continue;
            }

            let packet = parse_notification(&line.bytes, self.config.text_mode)?;
            debug!(
                sender = packet.sender(),
                rssi = packet.rssi(),
                len = packet.data().len(),
                "packet received"
            );
            return Ok(packet);
        }
    }

    /// Query the module's parameters and refresh the cached text mode and
    /// node id from them.
    pub fn read_params(&mut self) -> Result<ModuleParams> {
        let mut params = ModuleParams::default();
        let mut exchange = self.begin(RPRM);
        exchange.write_command(&Command::ReadParams)?;
        exchange.flush()?;
        loop {
            let line = exchange.read_terminated_line(PARAM_LINE_MAX)?;
            if params.push_line(&line.bytes) {
                break;
            }
        }
        exchange.release();

        self.config.text_mode = params.text_mode();
        let node_id = params.node_id()?;
        self.config.node_id = Some(node_id);
        info!(
            node_id,
            text_mode = self.config.text_mode,
            entries = params.len(),
            "module parameters read"
        );
        Ok(params)
    }

    /// Switch text mode on or off. Does nothing if already in that mode.
    pub fn set_text_mode(&mut self, enabled: bool) -> Result<()> {
        if self.config.text_mode == enabled {
            return Ok(());
        }

        self.transmit(&Command::text_mode(enabled))?;
        self.config.text_mode = enabled;
        info!(text_mode = enabled, "text mode changed");
        Ok(())
    }

    /// Change the module's UART rate.
    ///
    /// Only the module side changes. The host stream must be switched to the
    /// same rate afterwards (see [`RadioStream::set_baud_rate`]).
    pub fn set_baud(&mut self, rate: BaudRate) -> Result<()> {
        self.transmit(&Command::SetBaud(rate))?;
        self.config.baud_rate = rate.bits_per_second();
        info!(baud_rate = rate.bits_per_second(), "module baud rate changed");
        Ok(())
    }

    /// Set the module clock.
    pub fn set_time(&mut self, hour: u8, minute: u8, second: u8) -> Result<()> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(RadioError::InvalidTime {
                hour,
                minute,
                second,
            });
        }

        self.transmit(&Command::SetClock {
            hour,
            minute,
            second,
        })
    }

    /// Read the module clock.
    pub fn get_time(&mut self) -> Result<TimeInfo> {
        let mut exchange = self.begin(RDCK);
        exchange.write_command(&Command::ReadClock)?;
        exchange.flush()?;
        let line = exchange.read_terminated_line(RESPONSE_LINE_MAX)?;
        let time = parse_time(&line.to_string_lossy())?;
        exchange.finish()?;
        Ok(time)
    }

    /// Flush and drop the connection.
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        info!("radio closed");
        Ok(())
    }

    /// Borrow the line reader.
    pub fn reader(&self) -> &LineReader<R> {
        &self.reader
    }

    /// Borrow the line writer.
    pub fn writer(&self) -> &LineWriter<W> {
        &self.writer
    }

    /// Mutably borrow the line reader.
    pub fn reader_mut(&mut self) -> &mut LineReader<R> {
        &mut self.reader
    }

    /// Mutably borrow the line writer.
    pub fn writer_mut(&mut self) -> &mut LineWriter<W> {
        &mut self.writer
    }

    /// Consume the radio and return its reader and writer.
    pub fn into_parts(self) -> (LineReader<R>, LineWriter<W>) {
        (self.reader, self.writer)
    }

    fn transmit(&mut self, command: &Command) -> Result<()> {
        let mut exchange = self.begin(command.keyword());
        exchange.write_command(command)?;
        exchange.finish()
    }
}

impl<W: Write> Radio<RadioStream, W> {
    /// Discard stale lines until the link has been quiet for `quiet`.
    ///
    /// Returns the number of lines discarded and clears the
    /// desynchronization mark. The previous read timeout is restored.
    pub fn resync(&mut self, quiet: Duration) -> Result<usize> {
        let previous = self.reader.read_timeout();
        self.reader.set_read_timeout(Some(quiet))?;

        let mut discarded = 0usize;
        let outcome = loop {
            match self.reader.read_line(NOTIFICATION_LINE_MAX) {
                Ok(line) => {
                    discarded += 1;
                    debug!(line = %line.to_string_lossy(), "discarded stale line");
                }
                Err(FrameError::Io(err)) if err.kind() == ErrorKind::TimedOut => break Ok(()),
                Err(err) => break Err(err),
            }
        };

        self.reader.set_read_timeout(previous)?;
        outcome?;
        self.desynchronized = false;
        info!(discarded, "link resynchronized");
        Ok(discarded)
    }
}
