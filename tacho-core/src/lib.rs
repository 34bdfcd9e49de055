#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # Tacho Core
//!
//! Pulse-rate meter with a serially driven 3-digit 7-segment display.
//! Everything runs from two interrupts: an edge counter and a timer tick that
//! multiplexes the rate window and the display refresh.

pub mod config;
pub mod types;
pub mod segment;
pub mod counter;
pub mod window;
pub mod display;
pub mod scheduler;
pub mod hal;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use config::*;
pub use types::*;
pub use counter::{on_edge, PulseCounter};
pub use window::RateWindow;
pub use display::DisplayMultiplexer;
pub use scheduler::{RateDivider, TickScheduler};
pub use hal::{DisplayBus, EmbeddedHalDisplayBus, EmbeddedHalLine, HalError, OutputLine};

/// Tacho library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
