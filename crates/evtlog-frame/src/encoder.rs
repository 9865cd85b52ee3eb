use std::sync::Arc;

use bytes::BytesMut;
use evtlog_transport::{FrameSink, TimeSource};
use tracing::trace;

use crate::codec::{encode_packet, FRAME_SIZE_MAX};
use crate::event::Event;
use crate::packet::Packet;
use crate::payload::Payload;

type SharedSink = Arc<dyn FrameSink + Send + Sync>;
type SharedClock = Arc<dyn TimeSource + Send + Sync>;

/// Turns events into frames and hands them to a sink.
///
/// The sink and time source are given at construction; both are optional.
/// Without a sink every emit is a no-op, and without a time source packets
/// are stamped with 0. The frame buffer lives on the stack of each call, so
/// one encoder may be shared (or cloned) across threads; whether delivery is
/// thread-safe is up to the sink.
#[derive(Clone, Default)]
pub struct EventEncoder {
    sink: Option<SharedSink>,
    clock: Option<SharedClock>,
}

impl EventEncoder {
    /// An encoder with no collaborators attached.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(self, sink: impl FrameSink + Send + Sync + 'static) -> Self {
        self.with_shared_sink(Arc::new(sink))
    }

    /// Attach a sink the caller keeps a handle to.
    pub fn with_shared_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_time_source(self, clock: impl TimeSource + Send + Sync + 'static) -> Self {
        self.with_shared_time_source(Arc::new(clock))
    }

    pub fn with_shared_time_source(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Current tick from the time source, or 0 without one.
    pub fn timestamp(&self) -> u32 {
        self.clock.as_ref().map_or(0, |clock| clock.now())
    }

    /// Assemble the packet `event` would be sent as, stamped with the
    /// current time.
    pub fn packet(&self, event: &Event) -> Packet {
        Packet::assemble(event, self.timestamp())
    }

    /// Encode `event` and pass the frame to the sink exactly once.
    pub fn emit(&self, event: &Event) {
        let Some(sink) = &self.sink else {
            return;
        };

        let packet = self.packet(event);
        let mut frame = BytesMut::with_capacity(FRAME_SIZE_MAX);
        let len = encode_packet(&packet, &mut frame);
        trace!(
            level = packet.level,
            source = packet.source,
            event_type = packet.event_type,
            len,
            "emitting frame"
        );
        sink.send_frame(&frame);
    }

    /// Emit an event without a payload.
    pub fn event(&self, level: u8, source: u8, event_type: u16) {
        self.emit(&Event::new(level, source, event_type));
    }

    /// Emit an event carrying `payload`.
    ///
    /// ```ignore
    /// encoder.event_with(WARN, MOTOR, OVERCURRENT, 1250u16);
    /// encoder.event_with(INFO, MAIN, MODE, Payload::str4("IDLE"));
    /// ```
    pub fn event_with(&self, level: u8, source: u8, event_type: u16, payload: impl Into<Payload>) {
        self.emit(&Event::new(level, source, event_type).with_payload(payload));
    }
}

impl std::fmt::Debug for EventEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEncoder")
            .field("sink", &self.sink.is_some())
            .field("time_source", &self.clock.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    use evtlog_transport::{FixedTime, MemorySink};

    use super::*;
    use crate::codec::{ESC, OFFSET, START};
    use crate::decoder::decode_frame;
    use crate::event::{EVENT_START, SOURCE_MAIN};
    use crate::level::{ERROR, INFO};
    use crate::packet::{PACKET_SIZE, TIMESTAMP_MODULUS};

    fn capture() -> (EventEncoder, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let encoder = EventEncoder::new().with_shared_sink(sink.clone());
        (encoder, sink)
    }

    #[test]
    fn no_sink_is_a_noop() {
        let calls = Arc::new(AtomicU32::new(0));
        let clock_calls = Arc::clone(&calls);
        let encoder = EventEncoder::new().with_time_source(move || {
            clock_calls.fetch_add(1, Ordering::SeqCst);
            5
        });

        encoder.event(INFO, 1, 2);

        assert!(!encoder.has_sink());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_time_source_stamps_zero() {
        let (encoder, sink) = capture();
        encoder.event(INFO, SOURCE_MAIN, EVENT_START);

        let frames = sink.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(decode_frame(&frames[0]).record().unwrap().timestamp, 0);
    }

    #[test]
    fn sink_called_once_per_emit() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let encoder = EventEncoder::new().with_sink(move |frame: &[u8]| {
            assert_eq!(frame.len(), PACKET_SIZE + 2);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        encoder.event(INFO, 1, 1);
        encoder.event_with(INFO, 1, 1, 7u8);
        encoder.emit(&Event::new(ERROR, 2, 3));

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn time_source_consulted_per_event() {
        let ticks = Arc::new(AtomicU32::new(100));
        let clock = Arc::clone(&ticks);
        let (encoder, sink) = capture();
        let encoder = encoder.with_time_source(move || clock.fetch_add(10, Ordering::SeqCst));

        encoder.event(INFO, 1, 1);
        encoder.event(INFO, 1, 2);

        let stamps: Vec<u32> = sink
            .frames()
            .iter()
            .map(|f| decode_frame(f).record().unwrap().timestamp)
            .collect();
        assert_eq!(stamps, vec![100, 110]);
    }

    #[test]
    fn timestamp_wraps() {
        let (encoder, sink) = capture();
        let encoder = encoder.with_time_source(FixedTime(TIMESTAMP_MODULUS + 3));

        encoder.event(INFO, 1, 1);

        let frames = sink.frames();
        assert_eq!(decode_frame(&frames[0]).record().unwrap().timestamp, 3);
    }

    #[test]
    fn scenario_a_frame() {
        let (encoder, sink) = capture();
        encoder.event(INFO, SOURCE_MAIN, EVENT_START);

        let frame = &sink.frames()[0];
        assert_eq!(frame.len(), PACKET_SIZE + 2);
        assert_eq!(
            frame.as_ref(),
            &[START, 0x22, 0x00, 0x01, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, crate::END]
        );
    }

    #[test]
    fn scenario_b_frame() {
        let (encoder, sink) = capture();
        encoder.event_with(INFO, 1, 1, Payload::I16(i16::from(START)));

        let frame = &sink.frames()[0];
        assert_eq!(frame.len(), PACKET_SIZE + 3);
        assert_eq!(&frame[9..11], &[ESC, START + OFFSET]);
        assert_eq!(
            decode_frame(frame).record().unwrap().payload,
            Payload::I16(0x5B)
        );
    }

    #[test]
    fn clones_share_collaborators() {
        let (encoder, sink) = capture();
        let other = encoder.clone();

        encoder.event(INFO, 1, 1);
        other.event(INFO, 2, 2);

        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn concurrent_emits() {
        let (encoder, sink) = capture();

        std::thread::scope(|scope| {
            for source in 0..4u8 {
                let encoder = &encoder;
                scope.spawn(move || {
                    for n in 0..32u16 {
                        encoder.event_with(INFO, source, n, u32::from(n));
                    }
                });
            }
        });

        let frames = sink.frames();
        assert_eq!(frames.len(), 128);
        assert!(frames.iter().all(|f| decode_frame(f).is_valid()));
    }

    #[test]
    fn debug_does_not_expose_collaborators() {
        let encoder = EventEncoder::new().with_time_source(FixedTime(1));
        assert_eq!(
            format!("{encoder:?}"),
            "EventEncoder { sink: false, time_source: true }"
        );
    }
}
