use crate::payload::Payload;

/// Conventional source id of the firmware's main loop.
pub const SOURCE_MAIN: u8 = 0;

/// Conventional event type reported when a module starts.
pub const EVENT_START: u16 = 1;

/// Conventional event type reported when a module stops.
pub const EVENT_STOP: u16 = 2;

/// An event as the producer describes it.
///
/// Level, source and type are not range checked; fields wider than their wire
/// slot are masked when the packet is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Event {
    pub level: u8,
    pub source: u8,
    pub event_type: u16,
    pub payload: Payload,
}

impl Event {
    /// An event without a payload.
    pub fn new(level: u8, source: u8, event_type: u16) -> Self {
        Self {
            level,
            source,
            event_type,
            payload: Payload::None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }
}

/// An event recovered from the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord {
    pub level: u8,
    pub source: u8,
    pub event_type: u16,
    /// Ticks at the time the packet was assembled, modulo
    /// [`crate::TIMESTAMP_MODULUS`].
    pub timestamp: u32,
    pub payload: Payload,
}

impl EventRecord {
    /// The producer-side view of this record, without its timestamp.
    pub fn event(&self) -> Event {
        Event {
            level: self.level,
            source: self.source,
            event_type: self.event_type,
            payload: self.payload,
        }
    }
}
