//! Hardware Abstraction Layer for the meter outputs

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, StatefulOutputPin};

use crate::config::SETUP_DELAY_NS;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Hardware not initialized
    NotInitialized,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// A single logical output line (clock, status LED)
pub trait OutputLine {
    /// Drive the line (true = asserted)
    fn set_state(&mut self, state: bool) -> Result<(), HalError>;

    /// Current driven state
    fn get_state(&mut self) -> Result<bool, HalError>;

    /// Invert the line, returning the new state
    fn toggle(&mut self) -> Result<bool, HalError> {
        let next = !self.get_state()?;
        self.set_state(next)?;
        Ok(next)
    }
}

/// The three lines consumed by the display driver chip
pub trait DisplayBus {
    /// Data-enable, asserted for the whole frame
    fn set_enable(&mut self, asserted: bool) -> Result<(), HalError>;

    /// Start bit, asserted for the first tick of a frame
    fn set_start(&mut self, asserted: bool) -> Result<(), HalError>;

    /// Serial data bit (true = segment lit)
    fn set_data(&mut self, lit: bool) -> Result<(), HalError>;

    /// Wait out the chip's enable-to-start setup time
    fn setup_delay(&mut self);
}

/// Output line backed by an embedded-hal pin
pub struct EmbeddedHalLine<P> {
    pin: P,
    inverted: bool,
}

impl<P> EmbeddedHalLine<P>
where
    P: StatefulOutputPin,
{
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> OutputLine for EmbeddedHalLine<P>
where
    P: StatefulOutputPin,
{
    fn set_state(&mut self, state: bool) -> Result<(), HalError> {
        drive(&mut self.pin, state != self.inverted)
    }

    fn get_state(&mut self) -> Result<bool, HalError> {
        let high = self.pin.is_set_high().map_err(|_| HalError::GpioError)?;
        Ok(high != self.inverted)
    }

    fn toggle(&mut self) -> Result<bool, HalError> {
        self.pin.toggle().map_err(|_| HalError::GpioError)?;
        self.get_state()
    }
}

/// Display bus backed by embedded-hal pins and a delay provider.
///
/// Start and data may share one physical pin; pass two handles to it.
pub struct EmbeddedHalDisplayBus<EN, ST, DA, D> {
    enable: EN,
    start: ST,
    data: DA,
    delay: D,
    enable_active_low: bool,
}

impl<EN, ST, DA, D> EmbeddedHalDisplayBus<EN, ST, DA, D>
where
    EN: OutputPin,
    ST: OutputPin,
    DA: OutputPin,
    D: DelayNs,
{
    pub fn new(enable: EN, start: ST, data: DA, delay: D, enable_active_low: bool) -> Self {
        Self {
            enable,
            start,
            data,
            delay,
            enable_active_low,
        }
    }

    pub fn release(self) -> (EN, ST, DA, D) {
        (self.enable, self.start, self.data, self.delay)
    }
}

impl<EN, ST, DA, D> DisplayBus for EmbeddedHalDisplayBus<EN, ST, DA, D>
where
    EN: OutputPin,
    ST: OutputPin,
    DA: OutputPin,
    D: DelayNs,
{
    fn set_enable(&mut self, asserted: bool) -> Result<(), HalError> {
        drive(&mut self.enable, asserted != self.enable_active_low)
    }

    fn set_start(&mut self, asserted: bool) -> Result<(), HalError> {
        drive(&mut self.start, asserted)
    }

    fn set_data(&mut self, lit: bool) -> Result<(), HalError> {
        drive(&mut self.data, lit)
    }

    fn setup_delay(&mut self) {
        self.delay.delay_ns(SETUP_DELAY_NS);
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), HalError> {
    if high {
        pin.set_high().map_err(|_| HalError::GpioError)
    } else {
        pin.set_low().map_err(|_| HalError::GpioError)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use heapless::Vec;

    /// Output line that remembers its state and counts toggles
    #[derive(Default, Debug)]
    pub struct MockOutputLine {
        state: bool,
        toggles: u32,
        failing: bool,
    }

    impl MockOutputLine {
        pub fn new() -> Self {
            Self::default()
        }

        /// A line whose every operation fails
        pub fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }

        pub fn is_active(&self) -> bool {
            self.state
        }

        pub fn toggle_count(&self) -> u32 {
            self.toggles
        }
    }

    impl OutputLine for MockOutputLine {
        fn set_state(&mut self, state: bool) -> Result<(), HalError> {
            if self.failing {
                return Err(HalError::GpioError);
            }
            if state != self.state {
                self.toggles += 1;
            }
            self.state = state;
            Ok(())
        }

        fn get_state(&mut self) -> Result<bool, HalError> {
            if self.failing {
                return Err(HalError::GpioError);
            }
            Ok(self.state)
        }
    }

    /// Individual operation seen by [`MockDisplayBus`]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum BusEvent {
        Enable(bool),
        Start(bool),
        Data(bool),
        SetupDelay,
    }

    /// Display bus recording line levels and the order of operations
    #[derive(Default, Debug)]
    pub struct MockDisplayBus {
        enable: bool,
        start: bool,
        data: bool,
        setup_delays: u32,
        events: Vec<BusEvent, 16>,
    }

    impl MockDisplayBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn enable(&self) -> bool {
            self.enable
        }

        pub fn start(&self) -> bool {
            self.start
        }

        pub fn data(&self) -> bool {
            self.data
        }

        pub fn setup_delays(&self) -> u32 {
            self.setup_delays
        }

        /// Drain the operations recorded since the last call
        pub fn take_events(&mut self) -> Vec<BusEvent, 16> {
            core::mem::take(&mut self.events)
        }

        fn record(&mut self, event: BusEvent) {
            // Oldest events are kept; tests drain every tick
            let _ = self.events.push(event);
        }
    }

    impl DisplayBus for MockDisplayBus {
        fn set_enable(&mut self, asserted: bool) -> Result<(), HalError> {
            self.enable = asserted;
            self.record(BusEvent::Enable(asserted));
            Ok(())
        }

        fn set_start(&mut self, asserted: bool) -> Result<(), HalError> {
            self.start = asserted;
            self.record(BusEvent::Start(asserted));
            Ok(())
        }

        fn set_data(&mut self, lit: bool) -> Result<(), HalError> {
            self.data = lit;
            self.record(BusEvent::Data(lit));
            Ok(())
        }

        fn setup_delay(&mut self) {
            self.setup_delays += 1;
            self.record(BusEvent::SetupDelay);
        }
    }
}
