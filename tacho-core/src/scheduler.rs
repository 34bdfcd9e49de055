//! Timer tick scheduler
//!
//! Every timer compare-match toggles the clock output. The rate divider picks
//! out every `tick_divisor`-th tick (the ones where the clock lands low for the
//! default divisor of 2) and runs the rate window and then the display
//! multiplexer on it.

use crate::config::MeterConfig;
use crate::counter::PulseCounter;
use crate::display::DisplayMultiplexer;
use crate::hal::{DisplayBus, HalError, OutputLine};
use crate::types::{SpeedValue, TickOutcome};
use crate::window::RateWindow;

/// Counter-based frequency divider
#[derive(Debug, Clone)]
pub struct RateDivider {
    divisor: u8,
    count: u8,
}

impl RateDivider {
    pub const fn new(divisor: u8) -> Self {
        Self {
            divisor: if divisor == 0 { 1 } else { divisor },
            count: 0,
        }
    }

    /// Count one input tick; true on every `divisor`-th
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.divisor {
            self.count = 0;
            true
        } else {
            false
        }
    }

    pub fn divisor(&self) -> u8 {
        self.divisor
    }
}

/// Timer interrupt body, owns everything driven by time
pub struct TickScheduler<C, B> {
    config: MeterConfig,
    clock: C,
    divider: RateDivider,
    window: RateWindow,
    display: DisplayMultiplexer<B>,
    initialized: bool,
}

impl<C, B> TickScheduler<C, B>
where
    C: OutputLine,
    B: DisplayBus,
{
    pub fn new(clock: C, bus: B, config: MeterConfig) -> Self {
        #[cfg(feature = "defmt")]
        defmt::info!("Scheduler config: {:?}", config);

        Self {
            config,
            clock,
            divider: RateDivider::new(config.tick_divisor),
            window: RateWindow::new(config.window_ticks),
            display: DisplayMultiplexer::new(bus, config.refresh_ticks),
            initialized: false,
        }
    }

    /// Put the clock and display lines in their idle state
    pub fn init(&mut self) -> Result<(), HalError> {
        self.clock.set_state(false)?;
        self.display.init()?;
        self.initialized = true;
        Ok(())
    }

    /// Handle one timer tick. Lines must have been put idle by [`Self::init`].
    pub fn on_tick(&mut self, pulses: &PulseCounter) -> Result<TickOutcome, HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        self.clock.toggle()?;

        if !self.divider.tick() {
            return Ok(TickOutcome::Skipped);
        }

        let rollover = self.window.tick(pulses);
        let phase = self.display.tick(self.window.speed())?;
        Ok(TickOutcome::Ran { rollover, phase })
    }

    /// Last captured speed
    pub fn speed(&self) -> SpeedValue {
        self.window.speed()
    }

    pub fn config(&self) -> MeterConfig {
        self.config
    }

    pub fn window(&self) -> &RateWindow {
        &self.window
    }

    pub fn display(&self) -> &DisplayMultiplexer<B> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayMultiplexer<B> {
        &mut self.display
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
