use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use tracing::{trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::FrameSink;

/// Sends frames to any `Write` stream (a serial device, a capture file, stdout).
///
/// Writes are serialised through a mutex so one sink can be shared between
/// threads. A failed write drops the frame and logs a warning; nothing is
/// retried.
pub struct WriteSink<W> {
    inner: Mutex<W>,
}

impl<W: Write> WriteSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Consume the sink and return the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WriteSink<File> {
    /// Open `path` for appending (creating it if missing) and send frames to it.
    ///
    /// Works for character devices such as `/dev/ttyUSB0` as well as regular
    /// capture files.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| TransportError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> FrameSink for WriteSink<W> {
    fn send_frame(&self, frame: &[u8]) {
        let mut inner = self.lock();
        if let Err(err) = write_frame(&mut *inner, frame) {
            warn!(len = frame.len(), error = %err, "dropping frame: sink write failed");
            return;
        }
        trace!(len = frame.len(), "frame written");
    }
}

fn write_frame<W: Write>(inner: &mut W, frame: &[u8]) -> std::io::Result<()> {
    let mut offset = 0usize;
    while offset < frame.len() {
        match inner.write(&frame[offset..]) {
            Ok(0) => return Err(std::io::Error::from(ErrorKind::WriteZero)),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

impl<W> std::fmt::Debug for WriteSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSink").finish_non_exhaustive()
    }
}

/// Keeps every frame in memory, in send order.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Mutex<Vec<Bytes>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the frames received so far.
    pub fn frames(&self) -> Vec<Bytes> {
        self.lock().clone()
    }

    /// Remove and return all captured frames.
    pub fn take(&self) -> Vec<Bytes> {
        std::mem::take(&mut *self.lock())
    }

    /// All captured frames back to back, as they would appear on the wire.
    pub fn to_wire(&self) -> Vec<u8> {
        self.lock().iter().flat_map(|f| f.iter().copied()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Bytes>> {
        self.frames
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FrameSink for MemorySink {
    fn send_frame(&self, frame: &[u8]) {
        self.lock().push(Bytes::copy_from_slice(frame));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn write_sink_appends_frames() {
        let sink = WriteSink::new(Cursor::new(Vec::<u8>::new()));

        sink.send_frame(b"[one]");
        sink.send_frame(b"[two]");

        let wire = sink.into_inner().into_inner();
        assert_eq!(wire, b"[one][two]");
    }

    #[test]
    fn write_sink_retries_interrupted() {
        let sink = WriteSink::new(InterruptedOnce {
            interrupted: false,
            data: Vec::new(),
        });

        sink.send_frame(b"[x]");

        assert_eq!(sink.into_inner().data, b"[x]");
    }

    #[test]
    fn write_sink_drops_frame_on_error() {
        let sink = WriteSink::new(ZeroWriter);
        // Must not panic or block.
        sink.send_frame(b"[lost]");
    }

    #[test]
    fn open_reports_path_on_failure() {
        let missing = std::env::temp_dir()
            .join(format!("evtlog-missing-{}", std::process::id()))
            .join("nested")
            .join("capture.bin");

        let err = WriteSink::open(&missing).unwrap_err();
        assert!(matches!(err, TransportError::Open { ref path, .. } if path == &missing));
    }

    #[test]
    fn open_appends_to_file() {
        let path =
            std::env::temp_dir().join(format!("evtlog-sink-append-{}.bin", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let sink = WriteSink::open(&path).unwrap();
        sink.send_frame(b"[a]");
        drop(sink);
        let sink = WriteSink::open(&path).unwrap();
        sink.send_frame(b"[b]");
        drop(sink);

        assert_eq!(std::fs::read(&path).unwrap(), b"[a][b]");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.send_frame(b"[1]");
        sink.send_frame(b"[22]");

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.frames()[1].as_ref(), b"[22]");
        assert_eq!(sink.to_wire(), b"[1][22]");

        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn memory_sink_shared_between_threads() {
        let sink = Arc::new(MemorySink::new());

        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for _ in 0..16 {
                        sink.send_frame(&[b'[', i, b']']);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sink.len(), 64);
    }

    struct InterruptedOnce {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedOnce {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
