//! Core data types for the tachometer

use crate::config::{DIGIT_COUNT, SEGMENTS_PER_DIGIT, SPEED_MAX};

/// Last measured rate, clamped to what three digits can show
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Hash))]
pub struct SpeedValue(u16);

impl SpeedValue {
    pub const ZERO: SpeedValue = SpeedValue(0);
    pub const MAX: SpeedValue = SpeedValue(SPEED_MAX);

    /// Clamp a raw pulse tally to the displayable range
    pub const fn saturating_from(tally: u16) -> Self {
        if tally > SPEED_MAX {
            Self::MAX
        } else {
            Self(tally)
        }
    }

    /// Create from an in-range value
    pub const fn new(value: u16) -> Option<Self> {
        if value > SPEED_MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Returns true if the tally was clamped
    pub const fn is_saturated(&self) -> bool {
        self.0 == SPEED_MAX
    }
}

/// Decimal digits of a speed, most significant first
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayDigits(pub [u8; DIGIT_COUNT]);

impl DisplayDigits {
    pub const ZERO: DisplayDigits = DisplayDigits([0; DIGIT_COUNT]);

    /// Split a speed into hundreds, tens and ones
    pub const fn from_speed(speed: SpeedValue) -> Self {
        let mut rest = speed.get();
        let mut digits = [0u8; DIGIT_COUNT];
        while rest >= 100 {
            rest -= 100;
            digits[0] += 1;
        }
        while rest >= 10 {
            rest -= 10;
            digits[1] += 1;
        }
        digits[2] = rest as u8;
        Self(digits)
    }

    /// Reassemble the number
    pub const fn value(&self) -> u16 {
        self.0[0] as u16 * 100 + self.0[1] as u16 * 10 + self.0[2] as u16
    }

    /// Digit at `index`, 0 = hundreds
    pub const fn digit(&self, index: u8) -> u8 {
        self.0[index as usize]
    }
}

/// Position of the bit being shifted out
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Hash))]
pub struct Cursor {
    pub digit: u8,
    pub segment: u8,
}

impl Cursor {
    /// Last position of a frame; one advance lands on the first
    pub const LAST: Cursor = Cursor {
        digit: DIGIT_COUNT as u8 - 1,
        segment: SEGMENTS_PER_DIGIT as u8 - 1,
    };

    pub const FIRST: Cursor = Cursor { digit: 0, segment: 0 };

    /// Next position, segment first, wrapping both indices
    pub const fn next(self) -> Cursor {
        if self.segment + 1 < SEGMENTS_PER_DIGIT as u8 {
            Cursor {
                digit: self.digit,
                segment: self.segment + 1,
            }
        } else if self.digit + 1 < DIGIT_COUNT as u8 {
            Cursor {
                digit: self.digit + 1,
                segment: 0,
            }
        } else {
            Cursor::FIRST
        }
    }

    /// Bit number within the frame, 0..24
    pub const fn frame_index(&self) -> usize {
        self.digit as usize * SEGMENTS_PER_DIGIT + self.segment as usize
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::LAST
    }
}

/// Display multiplexer phases
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Frame begins: digits latched, enable and start bit asserted
    Start(DisplayDigits),
    /// One segment bit shifted out
    Segment { cursor: Cursor, lit: bool },
    /// Padding tick, lines idle while enable stays asserted
    Hold,
    /// Enable released, display latches the frame
    End,
}

impl Phase {
    /// Returns true while the data-enable line is asserted
    pub const fn enable_asserted(&self) -> bool {
        match self {
            Phase::Start(_) | Phase::Segment { .. } | Phase::Hold => true,
            Phase::End => false,
        }
    }

    /// Returns the cursor for segment phases
    pub const fn cursor(&self) -> Option<Cursor> {
        match self {
            Phase::Segment { cursor, .. } => Some(*cursor),
            Phase::Start(_) | Phase::Hold | Phase::End => None,
        }
    }
}

/// What a single timer tick did
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Clock toggled only (divider did not fire)
    Skipped,
    /// Periodic processes ran
    Ran {
        /// Speed captured if the rate window rolled over
        rollover: Option<SpeedValue>,
        /// Multiplexer phase executed
        phase: Phase,
    },
}

impl TickOutcome {
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            TickOutcome::Skipped => None,
            TickOutcome::Ran { phase, .. } => Some(*phase),
        }
    }

    pub const fn rollover(&self) -> Option<SpeedValue> {
        match self {
            TickOutcome::Skipped => None,
            TickOutcome::Ran { rollover, .. } => *rollover,
        }
    }
}
