//! Collaborators for the evtlog codec.
//!
//! The codec never talks to hardware itself. It hands finished frames to a
//! [`FrameSink`] and asks a [`TimeSource`] for the current tick count. This
//! crate defines both seams plus a few stock implementations:
//! - [`WriteSink`] for anything implementing `std::io::Write` (serial devices, files)
//! - [`MemorySink`] for capturing frames in memory
//! - [`TickClock`] and [`FixedTime`] as time sources

pub mod clock;
pub mod error;
pub mod sink;
pub mod traits;

pub use clock::{ClockConfig, FixedTime, TickClock, DEFAULT_TICK};
pub use error::{Result, TransportError};
pub use sink::{MemorySink, WriteSink};
pub use traits::{FrameSink, TimeSource};
