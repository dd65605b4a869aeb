use tracing::info;

use crate::cmd::{BroadcastArgs, LinkArgs};
use crate::exit::{radio_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: BroadcastArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = args.payload.resolve()?;

    let mut radio = link.open(true)?;
    radio
        .broadcast(&payload)
        .map_err(|err| radio_error("broadcast failed", err))?;
    info!(len = payload.len(), "broadcast sent");

    print_status("broadcast", &format!("{} bytes", payload.len()), format);
    Ok(SUCCESS)
}
