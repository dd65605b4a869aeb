use im920_radio::parse_address;
use tracing::info;

use crate::cmd::{LinkArgs, SendArgs};
use crate::exit::{radio_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_status, OutputFormat};

pub fn run(args: SendArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let address = parse_address(&args.address)
        .map_err(|err| CliError::new(USAGE, format!("invalid address: {err}")))?;
    let payload = args.payload.resolve()?;

    let mut radio = link.open(true)?;
    radio
        .send_to(address, &payload)
        .map_err(|err| radio_error("send failed", err))?;
    info!(address, len = payload.len(), "unicast sent");

    print_status(
        "send",
        &format!("{} bytes to {address:04x}", payload.len()),
        format,
    );
    Ok(SUCCESS)
}
