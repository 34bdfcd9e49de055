//! Build-time timing configuration
//!
//! All cadences are expressed in timer ticks. Nothing here is adjustable at
//! runtime; the firmware picks a [`MeterConfig`] once, as a `const`.

/// Number of digits on the display
pub const DIGIT_COUNT: usize = 3;

/// Segments per digit, A-G plus the decimal point
pub const SEGMENTS_PER_DIGIT: usize = 8;

/// Serial bits shifted out per frame (one per segment)
pub const FRAME_BITS: usize = DIGIT_COUNT * SEGMENTS_PER_DIGIT;

/// First refresh position after the segment phases.
///
/// Position 0 is the frame start, so the 24 segment bits occupy positions
/// `1..SEGMENT_PHASE_END`.
pub const SEGMENT_PHASE_END: u8 = 1 + FRAME_BITS as u8;

/// Refresh cycle length in qualifying ticks.
///
/// 1 start tick + 24 segment ticks + 12 hold ticks + 1 latch tick. The hold
/// ticks pad the cycle to the length the display chip was characterised with.
pub const REFRESH_CYCLE_TICKS: u8 = 38;

/// Rate window length in qualifying ticks.
///
/// Calibration value measured with a logic analyzer on the reference board
/// (prescaler /8 at 9.6 MHz). It approximates one second of real time but the
/// ISR overhead makes the true period board-specific.
pub const WINDOW_TICKS: u16 = 283;

/// Timer ticks per payload invocation.
///
/// The clock output toggles every tick, so a divisor of 2 runs the periodic
/// processes once per full clock period, on the low half.
pub const TICK_DIVISOR: u8 = 2;

/// Largest value the display can show
pub const SPEED_MAX: u16 = 999;

/// Setup time between asserting data-enable and the start bit
pub const SETUP_DELAY_NS: u32 = 100;

/// Configuration validation errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Window length must be at least one tick
    EmptyWindow,
    /// Refresh cycle cannot hold start, segment bits and latch
    RefreshTooShort,
    /// Tick divisor must be at least one
    ZeroDivisor,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::EmptyWindow => write!(f, "Window length must be at least 1 tick"),
            ConfigError::RefreshTooShort => write!(
                f,
                "Refresh cycle must be at least {} ticks",
                SEGMENT_PHASE_END as u16 + 1
            ),
            ConfigError::ZeroDivisor => write!(f, "Tick divisor must be at least 1"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Timing parameters of the meter
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeterConfig {
    /// Qualifying ticks per rate window (W)
    pub window_ticks: u16,
    /// Qualifying ticks per display refresh cycle (R)
    pub refresh_ticks: u8,
    /// Raw timer ticks per qualifying tick
    pub tick_divisor: u8,
}

impl MeterConfig {
    /// Reference board timing
    pub const DEFAULT: MeterConfig = MeterConfig {
        window_ticks: WINDOW_TICKS,
        refresh_ticks: REFRESH_CYCLE_TICKS,
        tick_divisor: TICK_DIVISOR,
    };

    /// Create a new configuration with validation
    pub const fn new(
        window_ticks: u16,
        refresh_ticks: u8,
        tick_divisor: u8,
    ) -> Result<Self, ConfigError> {
        if window_ticks == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        // start + segment bits + at least the latch tick
        if refresh_ticks <= SEGMENT_PHASE_END {
            return Err(ConfigError::RefreshTooShort);
        }
        if tick_divisor == 0 {
            return Err(ConfigError::ZeroDivisor);
        }
        Ok(Self {
            window_ticks,
            refresh_ticks,
            tick_divisor,
        })
    }

    /// Raw timer ticks per rate window
    pub const fn raw_ticks_per_window(&self) -> u32 {
        self.window_ticks as u32 * self.tick_divisor as u32
    }

    /// Raw timer ticks per display frame
    pub const fn raw_ticks_per_frame(&self) -> u32 {
        self.refresh_ticks as u32 * self.tick_divisor as u32
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
