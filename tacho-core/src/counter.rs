//! Edge counting shared between the edge and timer interrupts

use core::cell::Cell;
use critical_section::Mutex;

use crate::hal::{HalError, OutputLine};

/// Pulse tally for the current rate window.
///
/// Every access happens inside a critical section, so the edge interrupt can
/// never interleave with the window's read-and-reset.
pub struct PulseCounter {
    tally: Mutex<Cell<u16>>,
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            tally: Mutex::new(Cell::new(0)),
        }
    }

    /// Count one edge, saturating at `u16::MAX`. Returns the new tally.
    pub fn record_edge(&self) -> u16 {
        critical_section::with(|cs| {
            let cell = self.tally.borrow(cs);
            let next = cell.get().saturating_add(1);
            cell.set(next);
            next
        })
    }

    /// Read the tally and reset it to zero in one step
    pub fn take(&self) -> u16 {
        critical_section::with(|cs| self.tally.borrow(cs).replace(0))
    }

    /// Current tally without resetting
    pub fn peek(&self) -> u16 {
        critical_section::with(|cs| self.tally.borrow(cs).get())
    }
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge interrupt body: count the pulse and blink the status indicator
pub fn on_edge<L: OutputLine>(counter: &PulseCounter, indicator: &mut L) -> Result<u16, HalError> {
    let tally = counter.record_edge();
    indicator.toggle()?;
    Ok(tally)
}
