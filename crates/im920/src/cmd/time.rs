use crate::cmd::{LinkArgs, TimeArgs, TimeCommand};
use crate::exit::{radio_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_status, print_time, OutputFormat};

pub fn run(args: TimeArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match args.command {
        TimeCommand::Get => {
            let mut radio = link.open(false)?;
            let time = radio
                .get_time()
                .map_err(|err| radio_error("read clock failed", err))?;
            print_time(&time, format);
        }
        TimeCommand::Set { time } => {
            let (hour, minute, second) = parse_clock(&time)?;
            let mut radio = link.open(false)?;
            radio
                .set_time(hour, minute, second)
                .map_err(|err| radio_error("set clock failed", err))?;
            print_status("time", &format!("{hour:02}:{minute:02}:{second:02}"), format);
        }
    }
    Ok(SUCCESS)
}

fn parse_clock(input: &str) -> CliResult<(u8, u8, u8)> {
    let invalid = || CliError::new(USAGE, format!("invalid time {input:?} (expected HH:MM:SS)"));
    let mut fields = input.trim().split(':').map(|field| field.parse::<u8>());
    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(Ok(hour)), Some(Ok(minute)), Some(Ok(second)), None) => Ok((hour, minute, second)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clock_fields() {
        assert_eq!(parse_clock("09:05:30").unwrap(), (9, 5, 30));
        assert_eq!(parse_clock("23:59:59").unwrap(), (23, 59, 59));
    }

    #[test]
    fn rejects_malformed_clock() {
        for input in ["", "12:30", "12:30:00:00", "aa:bb:cc", "12:300:00"] {
            assert_eq!(parse_clock(input).unwrap_err().code, USAGE, "{input}");
        }
    }
}
