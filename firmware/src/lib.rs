#![no_std]

//! Firmware library for the CH32V003 tachometer board

pub use tacho_core::*;

pub mod ch32v003_hardware;

pub use crate::ch32v003_hardware::{CycleDelay, Ch32v003Output};

/// Display bus as wired on the board
pub type BoardDisplayBus = EmbeddedHalDisplayBus<Ch32v003Output, Ch32v003Output, Ch32v003Output, CycleDelay>;

/// Scheduler as wired on the board
pub type BoardScheduler = TickScheduler<EmbeddedHalLine<Ch32v003Output>, BoardDisplayBus>;

/// Build the scheduler on the board pins. Start and data share `SERIAL_PIN`.
pub fn board_scheduler(config: MeterConfig) -> BoardScheduler {
    use crate::ch32v003_hardware::{CLOCK_PIN, ENABLE_ACTIVE_LOW, ENABLE_PIN, SERIAL_PIN};

    let bus = EmbeddedHalDisplayBus::new(ENABLE_PIN, SERIAL_PIN, SERIAL_PIN, CycleDelay, ENABLE_ACTIVE_LOW);
    TickScheduler::new(EmbeddedHalLine::new(CLOCK_PIN, false), bus, config)
}

/// Status LED line
pub fn board_status_led() -> EmbeddedHalLine<Ch32v003Output> {
    EmbeddedHalLine::new(ch32v003_hardware::STATUS_LED_PIN, false)
}
