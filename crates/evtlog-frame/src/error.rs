/// Why a frame failed to decode.
///
/// A decode failure is never fatal: it travels inside [`crate::Decoded`]
/// together with the number of bytes the decoder inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The input contained no start marker.
    #[error("no start marker in input")]
    MissingStart,

    /// The input ended inside a frame, before its end marker.
    #[error("input ended before the end marker")]
    Unterminated,

    /// An escape byte was followed by a byte that is not a valid escaped form.
    #[error("invalid escape sequence 0x{byte:02X} at offset {position}")]
    InvalidEscape { position: usize, byte: u8 },

    /// A balanced frame carried the wrong number of packet bytes.
    #[error("frame carries {actual} packet bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Errors that can occur while reading frames from a stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended. Any partial frame left in the buffer was discarded.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
