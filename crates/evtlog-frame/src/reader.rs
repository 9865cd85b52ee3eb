use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::codec::{END, FRAME_SIZE_MAX, START};
use crate::decoder::{decode_frame, resume_offset};
use crate::error::{FrameError, Result};
use crate::event::EventRecord;

/// Default cap on bytes held while waiting for an end marker.
pub const DEFAULT_MAX_BUFFERED: usize = 4 * 1024;

const READ_CHUNK_SIZE: usize = 1024;

/// Configuration for [`FrameReader`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Once this many bytes are buffered without a complete frame, the
    /// buffer is cut back to its last start marker. Default: 4 KiB.
    ///
    /// Values below [`FRAME_SIZE_MAX`] are raised to it, otherwise a frame
    /// arriving in pieces would be cut before its end marker.
    pub max_buffered: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_buffered: DEFAULT_MAX_BUFFERED,
        }
    }
}

/// Counters kept by a [`FrameReader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Frames decoded successfully.
    pub frames: u64,
    /// Frames that failed to decode and were skipped.
    pub invalid: u64,
    /// Bytes thrown away outside of any frame, or dropped by the buffer cap.
    pub discarded_bytes: u64,
}

/// Reads events from any `Read` stream (a serial port, a capture file).
///
/// Handles partial reads and line noise internally: callers only ever see
/// valid events. Malformed frames are skipped and counted in [`ReaderStats`].
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: ReaderConfig,
    stats: ReaderStats,
    eof: bool,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReaderConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, mut config: ReaderConfig) -> Self {
        config.max_buffered = config.max_buffered.max(FRAME_SIZE_MAX);
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
            config,
            stats: ReaderStats::default(),
            eof: false,
        }
    }

    /// Read the next valid event (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` once the stream is
    /// exhausted; a trailing partial frame is discarded and counted as
    /// invalid.
    pub fn read_event(&mut self) -> Result<EventRecord> {
        loop {
            if let Some(record) = self.next_buffered() {
                return Ok(record);
            }

            if self.eof {
                self.drain_partial();
                return Err(FrameError::ConnectionClosed);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.eof = true;
                continue;
            }

            self.buf.extend_from_slice(&chunk[..read]);
            self.enforce_cap();
        }
    }

    /// Decode buffered frames until one is valid or no complete frame is left.
    fn next_buffered(&mut self) -> Option<EventRecord> {
        loop {
            self.skip_to_start();
            if !self.has_complete_frame() {
                return None;
            }

            let decoded = decode_frame(&self.buf);
            let advance = resume_offset(&self.buf, &decoded).max(1);
            self.buf.advance(advance);

            match decoded.result {
                Ok(record) => {
                    self.stats.frames += 1;
                    return Some(record);
                }
                Err(err) => {
                    self.stats.invalid += 1;
                    debug!(error = %err, skipped = advance, "skipping malformed frame");
                }
            }
        }
    }

    /// Drop everything before the first start marker.
    fn skip_to_start(&mut self) {
        let skip = self
            .buf
            .iter()
            .position(|&b| b == START)
            .unwrap_or(self.buf.len());
        if skip > 0 {
            debug!(bytes = skip, "discarding bytes outside any frame");
            self.discard(skip);
        }
    }

    /// Assumes the buffer starts with a start marker.
    fn has_complete_frame(&self) -> bool {
        self.buf.len() > 1 && self.buf[1..].contains(&END)
    }

    fn enforce_cap(&mut self) {
        if self.buf.len() <= self.config.max_buffered || self.has_frame_end() {
            return;
        }
        let keep_from = self
            .buf
            .iter()
            .rposition(|&b| b == START)
            .filter(|&pos| pos > 0)
            .unwrap_or(self.buf.len());
        self.stats.invalid += 1;
        debug!(
            buffered = self.buf.len(),
            dropped = keep_from,
            "no frame end within buffer cap; resynchronising"
        );
        self.discard(keep_from);
    }

    fn has_frame_end(&self) -> bool {
        match self.buf.iter().position(|&b| b == START) {
            Some(start) => self.buf[start + 1..].contains(&END),
            None => false,
        }
    }

    fn drain_partial(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        if self.buf.contains(&START) {
            self.stats.invalid += 1;
        }
        debug!(bytes = self.buf.len(), "discarding trailing partial frame");
        let len = self.buf.len();
        self.discard(len);
    }

    fn discard(&mut self, n: usize) {
        self.buf.advance(n);
        self.stats.discarded_bytes += n as u64;
    }

    /// Counters since the reader was created.
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<EventRecord>;

    /// Yields events until the stream ends; I/O errors are passed through.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_event() {
            Ok(record) => Some(Ok(record)),
            Err(FrameError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
