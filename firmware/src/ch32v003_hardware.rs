//! CH32V003 specific hardware implementations
//!
//! Register-level pins, a busy-wait delay and the one-time bring-up of GPIO,
//! EXTI and TIM2. Everything here is called once from `main` before
//! interrupts are enabled, except the pin and delay types which the ISRs use.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};

// ========================================
// Memory map and register offsets
// ========================================

pub const RCC_BASE: u32 = 0x4002_1000;
pub const GPIOC_BASE: u32 = 0x4001_1000;
pub const GPIOD_BASE: u32 = 0x4001_1400;
pub const AFIO_BASE: u32 = 0x4001_0000;
pub const EXTI_BASE: u32 = 0x4001_0400;
pub const PFIC_BASE: u32 = 0xE000_E000;
pub const TIM2_BASE: u32 = 0x4000_0000;

/// RCC register offsets
const RCC_APB2PCENR: u32 = 0x18;
const RCC_APB1PCENR: u32 = 0x1C;

/// GPIO register offsets
const GPIO_CFGLR: u32 = 0x00; // Configuration Register Low
const GPIO_OUTDR: u32 = 0x0C; // Output Data Register
const GPIO_BSHR: u32 = 0x10; // Bit Set/Reset Register

/// AFIO register offsets
const AFIO_EXTICR: u32 = 0x08;

/// EXTI register offsets
const EXTI_INTENR: u32 = 0x00; // Interrupt Enable
const EXTI_RTENR: u32 = 0x08; // Rising Trigger Enable
const EXTI_FTENR: u32 = 0x0C; // Falling Trigger Enable
pub const EXTI_INTFR: u32 = 0x14; // Interrupt Flag

/// TIM2 register offsets
const TIM_CTLR1: u32 = 0x00;
const TIM_DMAINTENR: u32 = 0x0C;
pub const TIM_INTFR: u32 = 0x10;
const TIM_CNT: u32 = 0x24;
const TIM_PSC: u32 = 0x28;
const TIM_ATRLR: u32 = 0x2C;

/// PFIC interrupt enable registers (IRQ 0-31, 32-63)
const PFIC_IENR1: u32 = 0x100;
const PFIC_IENR2: u32 = 0x104;

/// Interrupt numbers
const EXTI7_0_IRQN: u32 = 20;
const TIM2_IRQN: u32 = 38;

// ========================================
// Clock and tick timing
// ========================================

/// System clock after reset (HSI)
pub const SYSCLK_HZ: u32 = 24_000_000;

/// TIM2 prescaler: 24 MHz / 24 = 1 MHz timer clock
const TIM2_PRESCALER: u32 = 24;

/// Timer tick period.
///
/// Matches the reference board's compare-match period (9.6 MHz / 8 / 256),
/// so the calibrated window length carries over.
pub const TICK_PERIOD_US: u32 = 213;

// ========================================
// Pin map
// ========================================

// PC0 = clock output
// PC1 = status LED
// PC2 = display data-enable (active low)
// PC3 = display start bit / serial data (shared line)
// PD2 = pulse input (EXTI2, rising edge, pull-up)

pub const CLOCK_PIN: Ch32v003Output = Ch32v003Output::new(GPIOC_BASE, 0);
pub const STATUS_LED_PIN: Ch32v003Output = Ch32v003Output::new(GPIOC_BASE, 1);
pub const ENABLE_PIN: Ch32v003Output = Ch32v003Output::new(GPIOC_BASE, 2);
pub const SERIAL_PIN: Ch32v003Output = Ch32v003Output::new(GPIOC_BASE, 3);
pub const PULSE_INPUT_PIN: u8 = 2;
pub const PULSE_EXTI_LINE: u32 = 1 << PULSE_INPUT_PIN;

/// Data-enable polarity of the display driver
pub const ENABLE_ACTIVE_LOW: bool = true;

#[inline(always)]
unsafe fn read_reg(addr: u32) -> u32 {
    core::ptr::read_volatile(addr as *const u32)
}

#[inline(always)]
unsafe fn write_reg(addr: u32, value: u32) {
    core::ptr::write_volatile(addr as *mut u32, value)
}

#[inline(always)]
unsafe fn modify_reg(addr: u32, f: impl FnOnce(u32) -> u32) {
    write_reg(addr, f(read_reg(addr)))
}

/// Push-pull output pin with direct register access.
///
/// Cheap to copy; two handles to the same pin drive the same line.
#[derive(Copy, Clone, Debug)]
pub struct Ch32v003Output {
    /// GPIO port base address
    port: u32,
    /// Pin number (0-7)
    pin: u8,
}

impl Ch32v003Output {
    pub const fn new(port: u32, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Configure as 10 MHz push-pull output
    fn configure(&self) {
        let shift = self.pin as u32 * 4;
        unsafe {
            modify_reg(self.port + GPIO_CFGLR, |cfg| (cfg & !(0xF << shift)) | (0x1 << shift));
        }
    }
}

impl ErrorType for Ch32v003Output {
    type Error = Infallible;
}

impl OutputPin for Ch32v003Output {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        // BSHR upper half resets
        unsafe { write_reg(self.port + GPIO_BSHR, 1 << (self.pin as u32 + 16)) };
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        unsafe { write_reg(self.port + GPIO_BSHR, 1 << self.pin as u32) };
        Ok(())
    }
}

impl StatefulOutputPin for Ch32v003Output {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        let odr = unsafe { read_reg(self.port + GPIO_OUTDR) };
        Ok(odr & (1 << self.pin as u32) != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}

/// Busy-wait delay calibrated against the core clock
#[derive(Copy, Clone, Debug, Default)]
pub struct CycleDelay;

/// Approximate core cycles per spin iteration (loop + branch)
const CYCLES_PER_SPIN: u32 = 4;

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns as u64 * SYSCLK_HZ as u64).div_ceil(1_000_000_000) as u32;
        for _ in 0..cycles.div_ceil(CYCLES_PER_SPIN).max(1) {
            core::hint::spin_loop();
        }
    }
}

/// Enable clocks for GPIOC, GPIOD, AFIO and TIM2
pub fn enable_peripheral_clocks() {
    unsafe {
        // Bit 0 = AFIO, Bit 4 = GPIOC, Bit 5 = GPIOD
        modify_reg(RCC_BASE + RCC_APB2PCENR, |v| v | (1 << 0) | (1 << 4) | (1 << 5));
        // Bit 0 = TIM2
        modify_reg(RCC_BASE + RCC_APB1PCENR, |v| v | 1);
    }
}

/// Outputs on PC0-PC3, pulse input with pull-up on PD2
pub fn configure_gpio_pins() {
    for pin in [CLOCK_PIN, STATUS_LED_PIN, ENABLE_PIN, SERIAL_PIN] {
        pin.configure();
    }

    let shift = PULSE_INPUT_PIN as u32 * 4;
    unsafe {
        // CNF=10 (input with pull), MODE=00
        modify_reg(GPIOD_BASE + GPIO_CFGLR, |cfg| (cfg & !(0xF << shift)) | (0x8 << shift));
        // OUTDR bit selects pull-up
        modify_reg(GPIOD_BASE + GPIO_OUTDR, |odr| odr | (1 << PULSE_INPUT_PIN as u32));
    }
}

/// Rising-edge interrupt on the pulse input
pub fn configure_pulse_interrupt() {
    unsafe {
        // EXTICR: 2 bits per line, port D = 0b11
        let shift = PULSE_INPUT_PIN as u32 * 2;
        modify_reg(AFIO_BASE + AFIO_EXTICR, |v| (v & !(0b11 << shift)) | (0b11 << shift));

        modify_reg(EXTI_BASE + EXTI_RTENR, |v| v | PULSE_EXTI_LINE);
        modify_reg(EXTI_BASE + EXTI_FTENR, |v| v & !PULSE_EXTI_LINE);
        modify_reg(EXTI_BASE + EXTI_INTENR, |v| v | PULSE_EXTI_LINE);

        write_reg(PFIC_BASE + PFIC_IENR1, 1 << EXTI7_0_IRQN);
    }
}

/// TIM2 update interrupt every [`TICK_PERIOD_US`]
pub fn configure_tick_timer() {
    unsafe {
        write_reg(TIM2_BASE + TIM_CTLR1, 0);
        write_reg(TIM2_BASE + TIM_PSC, TIM2_PRESCALER - 1);
        write_reg(TIM2_BASE + TIM_ATRLR, TICK_PERIOD_US - 1);
        write_reg(TIM2_BASE + TIM_CNT, 0);
        // UIE
        write_reg(TIM2_BASE + TIM_DMAINTENR, 1);
        write_reg(PFIC_BASE + PFIC_IENR2, 1 << (TIM2_IRQN - 32));
        // ARPE | CEN
        write_reg(TIM2_BASE + TIM_CTLR1, (1 << 7) | 1);
    }
}

/// Acknowledge the TIM2 update interrupt
pub fn clear_tick_flag() {
    unsafe { write_reg(TIM2_BASE + TIM_INTFR, 0) };
}

/// Acknowledge pending EXTI lines, returning which were pending
pub fn take_exti_pending() -> u32 {
    unsafe {
        let pending = read_reg(EXTI_BASE + EXTI_INTFR);
        // Write 1 to clear
        write_reg(EXTI_BASE + EXTI_INTFR, pending);
        pending
    }
}
