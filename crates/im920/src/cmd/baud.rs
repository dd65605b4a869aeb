use tracing::info;

use crate::cmd::{BaudArgs, LinkArgs};
use crate::exit::{radio_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: BaudArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut radio = link.open(false)?;
    radio
        .set_baud(args.rate)
        .map_err(|err| radio_error("baud change failed", err))?;

    let bps = args.rate.bits_per_second();
    radio
        .writer_mut()
        .get_mut()
        .set_baud_rate(bps)
        .map_err(|err| transport_error("local baud change failed", err))?;
    info!(baud_rate = bps, "host port follows module rate");

    print_status("baud", &bps.to_string(), format);
    Ok(SUCCESS)
}
