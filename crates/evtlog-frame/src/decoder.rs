use crate::codec::{END, ESC, OFFSET, START};
use crate::error::DecodeError;
use crate::event::EventRecord;
use crate::packet::{Packet, PACKET_SIZE};

/// Outcome of one decode attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    /// Input bytes inspected, markers and escape pairs included. Set on
    /// failure too, so a caller scanning a longer buffer can always advance.
    pub consumed: usize,
    pub result: Result<EventRecord, DecodeError>,
}

impl Decoded {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }

    pub fn record(&self) -> Option<&EventRecord> {
        self.result.as_ref().ok()
    }

    fn failed(consumed: usize, err: DecodeError) -> Self {
        Self {
            consumed,
            result: Err(err),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    ScanningForStart,
    InBody,
    Escaped,
    Invalid(DecodeError),
}

/// Fixed-size assembly buffer. Writes past [`PACKET_SIZE`] are counted but
/// never stored.
struct Assembly {
    buf: [u8; PACKET_SIZE],
    len: usize,
}

impl Assembly {
    fn push(&mut self, byte: u8) {
        if let Some(slot) = self.buf.get_mut(self.len) {
            *slot = byte;
        }
        self.len = self.len.saturating_add(1);
    }
}

fn unescape(byte: u8) -> Option<u8> {
    const ESC_START: u8 = START + OFFSET;
    const ESC_END: u8 = END + OFFSET;
    const ESC_ESC: u8 = ESC + OFFSET;

    match byte {
        ESC_START | ESC_END | ESC_ESC => Some(byte - OFFSET),
        _ => None,
    }
}

/// Decode the first frame in `src`.
///
/// A one-shot parse: bytes before the first start marker are skipped, the
/// parse stops at the first end marker, and anything after it is left alone.
/// After a malformed escape the decoder keeps scanning up to the next end
/// marker so that `consumed` moves past the damaged frame. Running out of
/// input before an end marker is a failure; there is no "need more data"
/// result.
///
/// `consumed` never exceeds `src.len()`.
pub fn decode_frame(src: &[u8]) -> Decoded {
    let mut packet = Assembly {
        buf: [0u8; PACKET_SIZE],
        len: 0,
    };
    let mut state = State::ScanningForStart;

    for (pos, &byte) in src.iter().enumerate() {
        let consumed = pos + 1;
        state = match state {
            State::ScanningForStart if byte == START => State::InBody,
            State::ScanningForStart => State::ScanningForStart,
            State::InBody => match byte {
                ESC => State::Escaped,
                END => return complete(&packet, consumed),
                _ => {
                    packet.push(byte);
                    State::InBody
                }
            },
            State::Escaped => match unescape(byte) {
                Some(original) => {
                    packet.push(original);
                    State::InBody
                }
                None => {
                    let err = DecodeError::InvalidEscape {
                        position: pos,
                        byte,
                    };
                    if byte == END {
                        return Decoded::failed(consumed, err);
                    }
                    State::Invalid(err)
                }
            },
            State::Invalid(err) if byte == END => return Decoded::failed(consumed, err),
            invalid @ State::Invalid(_) => invalid,
        };
    }

    let err = match state {
        State::ScanningForStart => DecodeError::MissingStart,
        State::InBody | State::Escaped => DecodeError::Unterminated,
        State::Invalid(err) => err,
    };
    Decoded::failed(src.len(), err)
}

fn complete(packet: &Assembly, consumed: usize) -> Decoded {
    if packet.len != PACKET_SIZE {
        return Decoded::failed(
            consumed,
            DecodeError::SizeMismatch {
                expected: PACKET_SIZE,
                actual: packet.len,
            },
        );
    }
    Decoded {
        consumed,
        result: Ok(Packet::from_bytes(&packet.buf).to_record()),
    }
}

/// Where to retry after `decoded`, which was produced from `src`.
///
/// A valid frame resumes right after its end marker. A failed one resumes at
/// the next start marker inside the bytes it consumed, if there is one (an
/// unescaped start marker never occurs inside a real frame body, so it marks
/// a frame that began while the damaged one was still open); otherwise right
/// after the consumed bytes.
pub fn resume_offset(src: &[u8], decoded: &Decoded) -> usize {
    let consumed = decoded.consumed.min(src.len());
    if decoded.is_valid() {
        return consumed;
    }
    let scanned = &src[..consumed];
    let Some(first) = scanned.iter().position(|&b| b == START) else {
        return consumed;
    };
    scanned[first + 1..]
        .iter()
        .position(|&b| b == START)
        .map_or(consumed, |next| first + 1 + next)
}

/// Iterator over every decode attempt in a buffer, resynchronising after
/// failures with [`resume_offset`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    src: &'a [u8],
    offset: usize,
}

impl<'a> Frames<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, offset: 0 }
    }

    /// Offset into the original buffer where the next attempt starts.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for Frames<'_> {
    type Item = Decoded;

    fn next(&mut self) -> Option<Decoded> {
        let rest = &self.src[self.offset..];
        if rest.is_empty() {
            return None;
        }
        let decoded = decode_frame(rest);
        // Each attempt inspects at least one byte, so this always advances.
        self.offset += resume_offset(rest, &decoded).max(1);
        Some(decoded)
    }
}
