use std::sync::Arc;

use evtlog_frame::level::{parse_level, LEVEL_MAX};
use evtlog_frame::{Event, EventEncoder, Payload};
use evtlog_transport::{FixedTime, MemorySink, WriteSink};

use crate::cmd::EncodeArgs;
use crate::exit::{transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::print_raw;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let level = parse_level(&args.level)
        .filter(|level| *level <= LEVEL_MAX)
        .ok_or_else(|| CliError::new(USAGE, format!("invalid level: {}", args.level)))?;
    let payload = match &args.payload {
        Some(raw) => parse_payload(raw)?,
        None => Payload::None,
    };
    let event = Event::new(level, args.source, args.event_type).with_payload(payload);
    let encoder = EventEncoder::new().with_time_source(FixedTime(args.timestamp));

    if let Some(path) = &args.out {
        let sink = WriteSink::open(path)
            .map_err(|err| transport_error(&format!("failed opening {}", path.display()), err))?;
        encoder.with_sink(sink).emit(&event);
        return Ok(SUCCESS);
    }

    let sink = Arc::new(MemorySink::new());
    encoder.with_shared_sink(sink.clone()).emit(&event);
    let wire = sink.to_wire();
    if args.hex {
        println!("{}", hex::encode(&wire));
    } else {
        print_raw(&wire);
    }

    Ok(SUCCESS)
}

/// Parse `KIND:VALUE` into a payload. `none` needs no value.
fn parse_payload(input: &str) -> CliResult<Payload> {
    let (kind, value) = match input.split_once(':') {
        Some((kind, value)) => (kind.trim(), value),
        None => (input.trim(), ""),
    };
    let bad = |what: &str| CliError::new(USAGE, format!("invalid {what} payload: {value:?}"));

    let payload = match kind.to_ascii_lowercase().as_str() {
        "none" => Payload::None,
        "bool" => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Payload::Bool(true),
            "false" | "0" => Payload::Bool(false),
            _ => return Err(bad("bool")),
        },
        "i8" => Payload::I8(parse_int(value).ok_or_else(|| bad("i8"))?),
        "u8" => Payload::U8(parse_int(value).ok_or_else(|| bad("u8"))?),
        "i16" => Payload::I16(parse_int(value).ok_or_else(|| bad("i16"))?),
        "u16" => Payload::U16(parse_int(value).ok_or_else(|| bad("u16"))?),
        "i32" => Payload::I32(parse_int(value).ok_or_else(|| bad("i32"))?),
        "u32" => Payload::U32(parse_int(value).ok_or_else(|| bad("u32"))?),
        "f32" => Payload::F32(value.trim().parse().map_err(|_| bad("f32"))?),
        "str2" if value.len() <= 2 => Payload::str2(value),
        "str4" if value.len() <= 4 => Payload::str4(value),
        "str2" | "str4" => return Err(bad(kind)),
        _ => return Err(CliError::new(USAGE, format!("unknown payload kind: {kind}"))),
    };
    Ok(payload)
}

fn parse_int<T: TryFrom<i64>>(value: &str) -> Option<T> {
    parse_signed(value).and_then(|v| T::try_from(v).ok())
}

fn parse_unsigned(value: &str) -> Option<u64> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn parse_signed(value: &str) -> Option<i64> {
    let value = value.trim();
    match value.strip_prefix('-') {
        Some(rest) => parse_unsigned(rest)
            .and_then(|v| i64::try_from(v).ok())
            .map(|v| -v),
        None => parse_unsigned(value).and_then(|v| i64::try_from(v).ok()),
    }
}
