use crate::cmd::{LinkArgs, TextModeArgs, TextModeSwitch};
use crate::exit::{radio_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: TextModeArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let enabled = matches!(args.state, TextModeSwitch::On);
    let mut radio = link.open(true)?;
    let changed = radio.text_mode() != enabled;
    radio
        .set_text_mode(enabled)
        .map_err(|err| radio_error("text mode change failed", err))?;

    let detail = match (enabled, changed) {
        (true, true) => "enabled",
        (false, true) => "disabled",
        (true, false) => "already enabled",
        (false, false) => "already disabled",
    };
    print_status("text-mode", detail, format);
    Ok(SUCCESS)
}
