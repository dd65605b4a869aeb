use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use im920_radio::{open, BaudRate, Radio, RadioConfig, DEFAULT_BAUD_RATE};
use im920_transport::RadioStream;

use crate::exit::{io_error, radio_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod baud;
pub mod broadcast;
pub mod listen;
pub mod params;
pub mod ports;
pub mod send;
pub mod text_mode;
pub mod time;
pub mod version;

pub type SerialRadio = Radio<RadioStream, RadioStream>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a packet to one node.
    Send(SendArgs),
    /// Send a packet to every node in range.
    Broadcast(BroadcastArgs),
    /// Print received packets.
    Listen(ListenArgs),
    /// Read and print the module parameters.
    Params(ParamsArgs),
    /// Switch the module between text and binary payloads.
    TextMode(TextModeArgs),
    /// Read or set the module clock.
    Time(TimeArgs),
    /// Change the module UART rate and follow it locally.
    Baud(BaudArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, link, format),
        Command::Broadcast(args) => broadcast::run(args, link, format),
        Command::Listen(args) => listen::run(args, link, format),
        Command::Params(args) => params::run(args, link, format),
        Command::TextMode(args) => text_mode::run(args, link, format),
        Command::Time(args) => time::run(args, link, format),
        Command::Baud(args) => baud::run(args, link, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Serial link options shared by every device command.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial device the module is attached to.
    #[arg(long, short = 'p', env = "IM920_PORT", global = true)]
    pub port: Option<String>,
    /// UART rate of the host port.
    #[arg(long, short = 'b', env = "IM920_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Read timeout (e.g. 2s, 500ms). Reads block when unset.
    #[arg(long, global = true)]
    pub timeout: Option<String>,
}

impl LinkArgs {
    /// Connection settings, failing with a usage error when no port is given.
    pub fn radio_config(&self, read_params_on_open: bool) -> CliResult<RadioConfig> {
        let port = self.port.as_deref().ok_or_else(|| {
            CliError::new(USAGE, "no serial port given (use --port or IM920_PORT)")
        })?;

        let mut config = RadioConfig::new(port, self.baud);
        config.link.read_timeout = self.read_timeout()?;
        config.read_params_on_open = read_params_on_open;
        Ok(config)
    }

    pub fn read_timeout(&self) -> CliResult<Option<Duration>> {
        self.timeout.as_deref().map(parse_duration).transpose()
    }

    /// Open the module. With `read_params_on_open` the cached text mode and
    /// node id are loaded before returning.
    pub fn open(&self, read_params_on_open: bool) -> CliResult<SerialRadio> {
        let config = self.radio_config(read_params_on_open)?;
        open(&config).map_err(|err| radio_error(&format!("open {} failed", config.link.port), err))
    }
}

/// Exactly one payload source.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Payload as a UTF-8 string.
    #[arg(long)]
    pub data: Option<String>,
    /// Payload as hex digits (e.g. 48656c6c6f).
    #[arg(long)]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(digits) = &self.hex {
            return hex::decode(digits.trim())
                .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")));
        }
        if let Some(path) = &self.file {
            return fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
        }
        Ok(Vec::new())
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Destination node address, 1-4 hex digits (e.g. 0102).
    pub address: String,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct BroadcastArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Exit after receiving N packets.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct ParamsArgs {}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum TextModeSwitch {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct TextModeArgs {
    /// Desired payload mode.
    pub state: TextModeSwitch,
}

#[derive(Args, Debug)]
pub struct TimeArgs {
    #[command(subcommand)]
    pub command: TimeCommand,
}

#[derive(Subcommand, Debug)]
pub enum TimeCommand {
    /// Read the module clock.
    Get,
    /// Set the module clock.
    Set {
        /// Time of day as HH:MM:SS.
        time: String,
    },
}

#[derive(Args, Debug)]
pub struct BaudArgs {
    /// New rate in bits per second (1200 to 460800).
    pub rate: BaudRate,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
