use im920_frame::{LineReader, LineWriter};
use im920_transport::{RadioStream, SerialLink};
use tracing::info;

use crate::config::{ModuleConfig, RadioConfig};
use crate::error::Result;
use crate::radio::Radio;

/// Open the serial port named in `config` and return a ready radio.
///
/// When [`RadioConfig::read_params_on_open`] is set, `RPRM` runs before
/// returning so node id and text mode are known. A failure there closes
/// the port again.
pub fn open(config: &RadioConfig) -> Result<Radio<RadioStream, RadioStream>> {
    let stream = SerialLink::open(&config.link)?;
    let reader_stream = stream.try_clone()?;

    let reader = LineReader::new(reader_stream);
    let writer = LineWriter::with_config(stream, config.line.clone());
    let mut radio = Radio::from_parts(
        reader,
        writer,
        ModuleConfig::with_baud_rate(config.link.baud_rate),
    );

    if config.read_params_on_open {
        radio.read_params()?;
    }

    info!(
        port = %config.link.port,
        baud_rate = config.link.baud_rate,
        node_id = ?radio.node_id(),
        text_mode = radio.text_mode(),
        "radio opened"
    );
    Ok(radio)
}
