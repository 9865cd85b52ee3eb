use std::fs::File;
use std::io::{self, Cursor, Read};

use evtlog_frame::{FrameError, FrameReader, ReaderConfig, FRAME_SIZE_MAX};
use tracing::info;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_stats, EventPrinter, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.max_buffered < FRAME_SIZE_MAX {
        return Err(CliError::new(
            USAGE,
            format!("--max-buffered must be at least {FRAME_SIZE_MAX} bytes"),
        ));
    }

    let input = open_input(&args)?;
    let config = ReaderConfig {
        max_buffered: args.max_buffered,
    };
    let mut reader = FrameReader::with_config(input, config);
    let mut printer = EventPrinter::new(format);
    let mut printed = 0usize;

    while args.count.is_none_or(|limit| printed < limit) {
        match reader.read_event() {
            Ok(record) => {
                printer.print(&record);
                printed += 1;
            }
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => {
                printer.finish();
                return Err(frame_error("read failed", err));
            }
        }
    }
    printer.finish();

    let stats = reader.stats();
    info!(
        frames = stats.frames,
        invalid = stats.invalid,
        discarded_bytes = stats.discarded_bytes,
        "decode finished"
    );
    if args.stats {
        print_stats(&stats, format);
    }

    if args.strict && stats.invalid > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{} malformed frame(s) in input", stats.invalid),
        ));
    }

    Ok(SUCCESS)
}

fn open_input(args: &DecodeArgs) -> CliResult<Box<dyn Read>> {
    let raw: Box<dyn Read> = match &args.file {
        Some(path) => Box::new(File::open(path).map_err(|err| {
            io_error(&format!("failed opening {}", path.display()), err)
        })?),
        None => Box::new(io::stdin().lock()),
    };

    if !args.hex {
        return Ok(raw);
    }
    let bytes = read_hex(raw)?;
    Ok(Box::new(Cursor::new(bytes)))
}

fn read_hex(mut input: impl Read) -> CliResult<Vec<u8>> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(|err| io_error("failed reading hex input", err))?;
    parse_hex(&text)
}

fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}
