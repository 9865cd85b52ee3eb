use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use evtlog_frame::{level_name, EventRecord, Payload, ReaderStats};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    level: u8,
    level_name: &'a str,
    source: u8,
    event_type: u16,
    timestamp: u32,
    format: &'a str,
    payload: Value,
}

impl<'a> EventOutput<'a> {
    fn new(record: &'a EventRecord) -> Self {
        Self {
            level: record.level,
            level_name: level_name(record.level),
            source: record.source,
            event_type: record.event_type,
            timestamp: record.timestamp,
            format: record.payload.format().name(),
            payload: payload_json(&record.payload),
        }
    }
}

#[derive(Serialize)]
struct StatsOutput {
    frames: u64,
    invalid: u64,
    discarded_bytes: u64,
}

/// Prints decoded events as they arrive. Table output is collected and
/// rendered by [`EventPrinter::finish`].
pub struct EventPrinter {
    format: OutputFormat,
    rows: Vec<Vec<String>>,
}

impl EventPrinter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            rows: Vec::new(),
        }
    }

    pub fn print(&mut self, record: &EventRecord) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string(&EventOutput::new(record))
                        .unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table => {
                self.rows.push(vec![
                    record.timestamp.to_string(),
                    level_name(record.level).to_string(),
                    record.source.to_string(),
                    record.event_type.to_string(),
                    record.payload.format().name().to_string(),
                    record.payload.to_string(),
                ]);
            }
            OutputFormat::Pretty => println!("{}", pretty_line(record)),
        }
    }

    pub fn finish(self) {
        if !matches!(self.format, OutputFormat::Table) || self.rows.is_empty() {
            return;
        }
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["TIME", "LEVEL", "SOURCE", "TYPE", "FORMAT", "PAYLOAD"]);
        for row in self.rows {
            table.add_row(row);
        }
        println!("{table}");
    }
}

pub fn print_stats(stats: &ReaderStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatsOutput {
                frames: stats.frames,
                invalid: stats.invalid,
                discarded_bytes: stats.discarded_bytes,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["FRAMES", "INVALID", "DISCARDED BYTES"])
                .add_row(vec![
                    stats.frames.to_string(),
                    stats.invalid.to_string(),
                    stats.discarded_bytes.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frames={} invalid={} discarded_bytes={}",
                stats.frames, stats.invalid, stats.discarded_bytes
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn pretty_line(record: &EventRecord) -> String {
    format!(
        "t={} level={} source={} type={} {}={}",
        record.timestamp,
        level_name(record.level),
        record.source,
        record.event_type,
        record.payload.format().name(),
        record.payload
    )
}

fn payload_json(payload: &Payload) -> Value {
    match *payload {
        Payload::None => Value::Null,
        Payload::Bool(v) => json!(v),
        Payload::I8(v) => json!(v),
        Payload::U8(v) => json!(v),
        Payload::I16(v) => json!(v),
        Payload::U16(v) => json!(v),
        Payload::I32(v) => json!(v),
        Payload::U32(v) => json!(v),
        // Non-finite floats have no JSON form and come out as null.
        Payload::F32(v) => json!(v),
        Payload::Str2(_) | Payload::Str4(_) => json!(payload.as_text().unwrap_or_default()),
    }
}
