use crate::cmd::{LinkArgs, ParamsArgs};
use crate::exit::{radio_error, CliResult, SUCCESS};
use crate::output::{print_params, OutputFormat};

pub fn run(_args: ParamsArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut radio = link.open(false)?;
    let params = radio
        .read_params()
        .map_err(|err| radio_error("read parameters failed", err))?;

    print_params(&params, radio.config(), format);
    Ok(SUCCESS)
}
