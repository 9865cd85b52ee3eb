//! Compact firmware event logging over serial links.
//!
//! evtlog packs severity, origin, type and a small typed value into a fixed
//! 12-byte packet and frames it with byte-stuffing so that a receiver can pick
//! events out of a noisy serial stream.
//!
//! # Crate Structure
//!
//! - [`transport`]: Frame sinks and time sources the encoder is wired to
//! - [`frame`]: Packet layout, payloads, frame encoder/decoder, stream reader

/// Re-export transport types.
pub mod transport {
    pub use evtlog_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use evtlog_frame::*;
}

pub use evtlog_frame::{decode_frame, Event, EventEncoder, EventRecord, Payload};
