use bytes::{BufMut, BytesMut};
use tracing::warn;

use crate::packet::{Packet, PACKET_SIZE};

/// Start-of-frame marker: `[`.
pub const START: u8 = 0x5B;

/// End-of-frame marker: `]`.
pub const END: u8 = 0x5D;

/// Escape byte (ASCII ESC).
pub const ESC: u8 = 0x1B;

/// Added to a reserved byte after an escape. The escaped forms (0x7B, 0x7D,
/// 0x3B) collide with none of the reserved bytes.
pub const OFFSET: u8 = 0x20;

/// Worst case: every packet byte escaped, plus both markers.
pub const FRAME_SIZE_MAX: usize = PACKET_SIZE * 2 + 2;

/// Returns true if `byte` must be escaped inside a frame body.
pub fn is_reserved(byte: u8) -> bool {
    matches!(byte, START | END | ESC)
}

/// Append one frame carrying `packet` to `dst`, returning the frame length.
///
/// Wire format:
/// ```text
/// ┌───────┬────────────────────────────────────┬─────┐
/// │ START │ packet bytes, with each of         │ END │
/// │ 0x5B  │ START / END / ESC sent as          │0x5D │
/// │       │ ESC, byte + OFFSET                 │     │
/// └───────┴────────────────────────────────────┴─────┘
/// ```
///
/// A frame never exceeds [`FRAME_SIZE_MAX`] bytes. Input that would overflow
/// it (only possible when `packet` is longer than [`PACKET_SIZE`]) is cut at
/// the first byte that does not fit; the end marker is always written. No
/// error is returned. A truncated frame fails to decode with a size mismatch
/// unless exactly [`PACKET_SIZE`] bytes happened to survive.
pub fn encode_frame(packet: &[u8], dst: &mut BytesMut) -> usize {
    dst.reserve(FRAME_SIZE_MAX);
    dst.put_u8(START);
    let mut len = 1usize;

    for (i, &byte) in packet.iter().enumerate() {
        let need = if is_reserved(byte) { 2 } else { 1 };
        // Keep one byte for the end marker.
        if len + need + 1 > FRAME_SIZE_MAX {
            warn!(
                packet_len = packet.len(),
                dropped = packet.len() - i,
                "frame capacity exceeded; truncating"
            );
            break;
        }
        if need == 2 {
            dst.put_u8(ESC);
            dst.put_u8(byte + OFFSET);
        } else {
            dst.put_u8(byte);
        }
        len += need;
    }

    dst.put_u8(END);
    len + 1
}

/// Serialise and frame a packet.
pub fn encode_packet(packet: &Packet, dst: &mut BytesMut) -> usize {
    encode_frame(&packet.to_bytes(), dst)
}
