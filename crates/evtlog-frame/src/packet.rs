use bytes::{Buf, BufMut};

use crate::event::{Event, EventRecord};
use crate::payload::{Payload, PAYLOAD_SIZE};

/// Bytes in every packet, whatever its payload.
pub const PACKET_SIZE: usize = 12;

/// Wire format revision carried in the low nibble of the first byte.
///
/// Chosen so that the first byte can never equal a marker or the escape byte.
pub const VERSION: u8 = 2;

/// Timestamps wrap at this many ticks.
pub const TIMESTAMP_MODULUS: u32 = 1 << TIMESTAMP_BITS;

const TIMESTAMP_BITS: u32 = 24;
const TIMESTAMP_MASK: u32 = TIMESTAMP_MODULUS - 1;
const NIBBLE: u8 = 0x0F;
const TYPE_MASK: u16 = 0x0FFF;

/// One event serialised for the wire.
///
/// Fields hold exactly what is (or would be) on the wire, so a packet built
/// by [`Packet::from_bytes`] may carry a format no [`Payload`] variant uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub version: u8,
    pub level: u8,
    pub format: u8,
    pub source: u8,
    pub event_type: u16,
    pub timestamp: u32,
    pub data: [u8; PAYLOAD_SIZE],
}

impl Packet {
    /// Stamp a header for `event` and place its payload.
    ///
    /// Fields are masked to their wire width; nothing is validated.
    pub fn assemble(event: &Event, timestamp: u32) -> Self {
        let (format, data) = event.payload.to_wire();
        Self {
            version: VERSION,
            level: event.level & NIBBLE,
            format: format.as_u8(),
            source: event.source,
            event_type: event.event_type & TYPE_MASK,
            timestamp: timestamp & TIMESTAMP_MASK,
            data,
        }
    }

    /// Serialise into the wire layout.
    ///
    /// ```text
    /// ┌─────────┬───────┬────────┬──────┬──────────┬──────┬────────┬───────────┬──────────┐
    /// │ version │ level │ format │ rsvd │ type     │ rsvd │ source │ timestamp │ payload  │
    /// │ 4 bits  │ 4     │ 4      │ 4    │ 12       │ 4    │ 8      │ 24        │ 4 bytes  │
    /// ├─────────┴───────┴────────┴──────┴──────────┴──────┼────────┴───────────┼──────────┤
    /// │ word 0 (u32 LE)                                    │ word 1 (u32 LE)    │ word 2   │
    /// └────────────────────────────────────────────────────┴────────────────────┴──────────┘
    /// ```
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let word0 = u32::from(self.version & NIBBLE)
            | u32::from(self.level & NIBBLE) << 4
            | u32::from(self.format & NIBBLE) << 8
            | u32::from(self.event_type & TYPE_MASK) << 16;
        let word1 = u32::from(self.source) | (self.timestamp & TIMESTAMP_MASK) << 8;

        let mut out = [0u8; PACKET_SIZE];
        let mut dst = &mut out[..];
        dst.put_u32_le(word0);
        dst.put_u32_le(word1);
        dst.put_slice(&self.data);
        out
    }

    /// Parse the wire layout. Reserved bits are ignored.
    pub fn from_bytes(bytes: &[u8; PACKET_SIZE]) -> Self {
        let mut src = &bytes[..];
        let word0 = src.get_u32_le();
        let word1 = src.get_u32_le();
        let mut data = [0u8; PAYLOAD_SIZE];
        src.copy_to_slice(&mut data);

        Self {
            version: (word0 & 0x0F) as u8,
            level: ((word0 >> 4) & 0x0F) as u8,
            format: ((word0 >> 8) & 0x0F) as u8,
            event_type: ((word0 >> 16) as u16) & TYPE_MASK,
            source: (word1 & 0xFF) as u8,
            timestamp: word1 >> 8,
            data,
        }
    }

    /// The payload this packet carries. Unknown formats read as
    /// [`Payload::None`].
    pub fn payload(&self) -> Payload {
        Payload::from_wire(self.format, self.data)
    }

    /// Project into a typed record.
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            level: self.level,
            source: self.source,
            event_type: self.event_type,
            timestamp: self.timestamp,
            payload: self.payload(),
        }
    }
}
