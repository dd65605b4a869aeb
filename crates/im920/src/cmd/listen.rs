use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use im920_frame::FrameError;
use im920_radio::RadioError;
use tracing::info;

use crate::cmd::{LinkArgs, ListenArgs};
use crate::exit::{radio_error, CliError, CliResult, INTERNAL, SUCCESS, TIMEOUT};
use crate::output::{print_packet, OutputFormat};

/// How often a quiet link is checked for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: ListenArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let idle_limit = link.read_timeout()?;
    let mut radio = link.open(true)?;
    radio
        .reader_mut()
        .set_read_timeout(Some(POLL_INTERVAL))
        .map_err(|err| radio_error("configure port failed", err.into()))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut last_packet = Instant::now();

    while running.load(Ordering::SeqCst) {
        let packet = match radio.receive_packet() {
            Ok(packet) => packet,
            Err(err) if is_poll_timeout(&err) => {
                if let Some(limit) = idle_limit {
                    if last_packet.elapsed() >= limit {
                        return Err(CliError::new(
                            TIMEOUT,
                            format!("no packet within {}ms", limit.as_millis()),
                        ));
                    }
                }
                continue;
            }
            Err(err) => return Err(radio_error("receive failed", err)),
        };

        last_packet = Instant::now();
        print_packet(&packet, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    info!(printed, "listen finished");
    Ok(SUCCESS)
}

fn is_poll_timeout(err: &RadioError) -> bool {
    matches!(
        err,
        RadioError::Frame(FrameError::Io(source)) if source.kind() == io::ErrorKind::TimedOut
    )
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timed_out_reads_are_polls() {
        let timed_out = RadioError::Frame(FrameError::Io(io::Error::from(io::ErrorKind::TimedOut)));
        assert!(is_poll_timeout(&timed_out));
        assert!(!is_poll_timeout(&RadioError::Frame(FrameError::ConnectionClosed)));
        assert!(!is_poll_timeout(&RadioError::UnexpectedResponse("NG".into())));
    }
}
