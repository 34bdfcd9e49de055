//! Rate window: turns the pulse tally into a speed once per window

use crate::counter::PulseCounter;
use crate::types::SpeedValue;

/// Counts qualifying ticks down to the next capture
#[derive(Debug)]
pub struct RateWindow {
    window_ticks: u16,
    remaining: u16,
    speed: SpeedValue,
}

impl RateWindow {
    /// Window of `window_ticks` qualifying ticks, first capture after a full window.
    ///
    /// A zero length is treated as one tick.
    pub const fn new(window_ticks: u16) -> Self {
        let window_ticks = if window_ticks == 0 { 1 } else { window_ticks };
        Self {
            window_ticks,
            remaining: window_ticks - 1,
            speed: SpeedValue::ZERO,
        }
    }

    /// Advance one qualifying tick; returns the new speed on rollover
    pub fn tick(&mut self, pulses: &PulseCounter) -> Option<SpeedValue> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return None;
        }

        let tally = pulses.take();
        self.speed = SpeedValue::saturating_from(tally);
        self.remaining = self.window_ticks - 1;

        #[cfg(feature = "defmt")]
        defmt::debug!("Window rollover: tally={} speed={}", tally, self.speed.get());

        Some(self.speed)
    }

    /// Last captured speed
    pub fn speed(&self) -> SpeedValue {
        self.speed
    }

    /// Qualifying ticks left before the next rollover
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    pub fn window_ticks(&self) -> u16 {
        self.window_ticks
    }
}
