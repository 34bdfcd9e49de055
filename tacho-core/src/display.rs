//! Display multiplexer: serialises the digits to the display driver chip
//!
//! One refresh cycle of `R` qualifying ticks:
//!
//! ```txt
//! position  0      1 .. 24        25 .. R-2   R-1
//! phase     START  SEGMENT x24    HOLD        END
//! enable    ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾\____
//! start     ‾‾‾‾‾\______________________________
//! data      _____<bit0>..<bit23>________________
//! ```
//!
//! Bits go out hundreds digit first, segments A..DP within each digit.

use crate::config::SEGMENT_PHASE_END;
use crate::hal::{DisplayBus, HalError};
use crate::segment::segment_bit;
use crate::types::{Cursor, DisplayDigits, Phase, SpeedValue};

/// Refresh state machine driving a [`DisplayBus`]
pub struct DisplayMultiplexer<B> {
    bus: B,
    refresh_ticks: u8,
    position: u8,
    cursor: Cursor,
    digits: DisplayDigits,
}

impl<B: DisplayBus> DisplayMultiplexer<B> {
    /// Create a multiplexer whose first tick starts a frame
    pub fn new(bus: B, refresh_ticks: u8) -> Self {
        // Anything shorter cannot carry a whole frame
        let refresh_ticks = refresh_ticks.max(SEGMENT_PHASE_END + 1);
        Self {
            bus,
            refresh_ticks,
            position: refresh_ticks - 1,
            cursor: Cursor::LAST,
            digits: DisplayDigits::ZERO,
        }
    }

    /// Drive every line to its idle level
    pub fn init(&mut self) -> Result<(), HalError> {
        self.bus.set_enable(false)?;
        self.bus.set_start(false)?;
        self.bus.set_data(false)
    }

    /// Advance one qualifying tick
    pub fn tick(&mut self, speed: SpeedValue) -> Result<Phase, HalError> {
        self.position = if self.position + 1 >= self.refresh_ticks {
            0
        } else {
            self.position + 1
        };

        match self.position {
            0 => self.handle_start(speed),
            p if p < SEGMENT_PHASE_END => self.handle_segment(),
            p if p == self.refresh_ticks - 1 => self.handle_end(),
            _ => self.handle_hold(),
        }
    }

    /// Latch the digits and open a frame
    fn handle_start(&mut self, speed: SpeedValue) -> Result<Phase, HalError> {
        self.digits = DisplayDigits::from_speed(speed);
        self.cursor = Cursor::LAST;

        self.bus.set_data(false)?;
        self.bus.set_enable(true)?;
        self.bus.setup_delay();
        self.bus.set_start(true)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("Frame start: {:?}", self.digits);

        Ok(Phase::Start(self.digits))
    }

    /// Shift out the next segment bit
    fn handle_segment(&mut self) -> Result<Phase, HalError> {
        self.bus.set_start(false)?;
        self.cursor = self.cursor.next();
        let lit = segment_bit(self.digits.digit(self.cursor.digit), self.cursor.segment);
        self.bus.set_data(lit)?;
        Ok(Phase::Segment {
            cursor: self.cursor,
            lit,
        })
    }

    /// Padding between the last bit and the latch
    fn handle_hold(&mut self) -> Result<Phase, HalError> {
        self.bus.set_start(false)?;
        self.bus.set_data(false)?;
        Ok(Phase::Hold)
    }

    /// Release enable so the chip latches the frame
    fn handle_end(&mut self) -> Result<Phase, HalError> {
        self.bus.set_enable(false)?;
        Ok(Phase::End)
    }

    /// Digits of the frame in flight
    pub fn digits(&self) -> DisplayDigits {
        self.digits
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Position within the refresh cycle, 0 = frame start
    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn refresh_ticks(&self) -> u8 {
        self.refresh_ticks
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn release(self) -> B {
        self.bus
    }
}
