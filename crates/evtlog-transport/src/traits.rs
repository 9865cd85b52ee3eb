/// Receives complete, already-framed bytes.
///
/// Called exactly once per encoded event, including frames that were
/// truncated by the encoder. Implementations must not block indefinitely and
/// have no way to report failure back to the producer: delivery is
/// fire-and-forget.
pub trait FrameSink {
    /// Transmit one frame.
    fn send_frame(&self, frame: &[u8]);
}

/// Supplies the current time in codec ticks.
///
/// Timestamps are cyclic; the codec keeps only as many low bits as the wire
/// layout has room for.
pub trait TimeSource {
    /// Current time in ticks.
    fn now(&self) -> u32;
}

impl<F> FrameSink for F
where
    F: Fn(&[u8]),
{
    fn send_frame(&self, frame: &[u8]) {
        self(frame)
    }
}

impl<F> TimeSource for F
where
    F: Fn() -> u32,
{
    fn now(&self) -> u32 {
        self()
    }
}
