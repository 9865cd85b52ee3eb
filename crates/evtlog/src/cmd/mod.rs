use clap::{Args, Subcommand};
use std::path::PathBuf;

use evtlog_frame::DEFAULT_MAX_BUFFERED;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode framed events from a capture file or stdin.
    Decode(DecodeArgs),
    /// Encode a single event as a frame.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to read. Reads stdin when omitted.
    pub file: Option<PathBuf>,
    /// Input is a hex dump instead of raw bytes. Whitespace is ignored.
    #[arg(long)]
    pub hex: bool,
    /// Print reader statistics after the last event.
    #[arg(long)]
    pub stats: bool,
    /// Exit with a data error if any frame failed to decode.
    #[arg(long)]
    pub strict: bool,
    /// Stop after N events.
    #[arg(long)]
    pub count: Option<usize>,
    /// Upper bound on buffered bytes while waiting for a frame end.
    #[arg(long, env = "EVTLOG_MAX_BUFFERED", default_value_t = DEFAULT_MAX_BUFFERED)]
    pub max_buffered: usize,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Severity level, by name or number.
    #[arg(long, default_value = "info")]
    pub level: String,
    /// Source id.
    #[arg(long, default_value = "0")]
    pub source: u8,
    /// Event type id (12 bits on the wire).
    #[arg(long = "type", value_name = "TYPE")]
    pub event_type: u16,
    /// Payload as KIND:VALUE, e.g. u16:300, f32:1.5, str4:BOOT.
    #[arg(long, value_name = "KIND:VALUE")]
    pub payload: Option<String>,
    /// Timestamp to stamp the event with, in ticks.
    #[arg(long, default_value = "0")]
    pub timestamp: u32,
    /// Print the frame as hex instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Append the frame to a file instead of printing it.
    #[arg(long, value_name = "PATH", conflicts_with = "hex")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
