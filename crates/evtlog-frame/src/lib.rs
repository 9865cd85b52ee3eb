//! Event packets and byte-stuffed framing for low-bandwidth serial links.
//!
//! This is the core of evtlog. Every event is serialised into a fixed
//! 12-byte packet:
//! - A header word with version, level, payload format and event type
//! - A word with the source id and a 24-bit wrapping timestamp
//! - A 4-byte payload area interpreted according to the format
//!
//! Packets travel inside frames delimited by `[` and `]`, with reserved bytes
//! escaped. The decoder recovers events from arbitrary, possibly corrupt byte
//! streams and always reports how far it got, so callers can resynchronise.

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod event;
pub mod level;
pub mod packet;
pub mod payload;
pub mod reader;

pub use codec::{encode_frame, encode_packet, END, ESC, FRAME_SIZE_MAX, OFFSET, START};
pub use decoder::{decode_frame, resume_offset, Decoded, Frames};
pub use encoder::EventEncoder;
pub use error::{DecodeError, FrameError, Result};
pub use event::{Event, EventRecord, EVENT_START, EVENT_STOP, SOURCE_MAIN};
pub use level::{level_name, DEBUG, ERROR, FATAL, INFO, TRACE, WARN};
pub use packet::{Packet, PACKET_SIZE, TIMESTAMP_MODULUS, VERSION};
pub use payload::{Payload, PayloadFormat, PAYLOAD_SIZE};
pub use reader::{FrameReader, ReaderConfig, ReaderStats, DEFAULT_MAX_BUFFERED};
