//! CH32V003 runtime: interrupt handlers, bring-up and the idle loop

// Logging support
#[cfg(feature = "defmt")]
use defmt::{debug, info};
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

// Define simple logging macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

use core::cell::RefCell;
use critical_section::Mutex;
use portable_atomic::{AtomicBool, AtomicU16, Ordering};
use riscv_rt::entry;

use tacho_firmware::ch32v003_hardware::{
    clear_tick_flag, configure_gpio_pins, configure_pulse_interrupt, configure_tick_timer,
    enable_peripheral_clocks, take_exti_pending, Ch32v003Output, PULSE_EXTI_LINE,
};
use tacho_firmware::{
    board_scheduler, board_status_led, on_edge, BoardScheduler, EmbeddedHalLine, MeterConfig,
    OutputLine, PulseCounter,
};

// Critical section implementation for RISC-V
struct RiscvCriticalSection;
critical_section::set_impl!(RiscvCriticalSection);

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mstatus = riscv::register::mstatus::read();
        riscv::register::mstatus::clear_mie();
        mstatus.mie() as u8
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
        if was_enabled != 0 {
            riscv::register::mstatus::set_mie();
        }
    }
}

/// Board timing, checked at compile time
const CONFIG: MeterConfig = match MeterConfig::new(
    tacho_firmware::WINDOW_TICKS,
    tacho_firmware::REFRESH_CYCLE_TICKS,
    tacho_firmware::TICK_DIVISOR,
) {
    Ok(config) => config,
    Err(_) => panic!("invalid meter configuration"),
};

// ========================================
// Global state
// ========================================

/// Edges counted in the current window
static PULSES: PulseCounter = PulseCounter::new();

static SCHEDULER: Mutex<RefCell<Option<BoardScheduler>>> = Mutex::new(RefCell::new(None));
static STATUS_LED: Mutex<RefCell<Option<EmbeddedHalLine<Ch32v003Output>>>> =
    Mutex::new(RefCell::new(None));

/// Last captured speed, published for the foreground loop
static LATEST_SPEED: AtomicU16 = AtomicU16::new(0);
static WINDOW_DONE: AtomicBool = AtomicBool::new(false);

/// Hardware initialization wrapper
fn hardware_init() {
    enable_peripheral_clocks();
    configure_gpio_pins();

    critical_section::with(|cs| {
        let mut scheduler = board_scheduler(CONFIG);
        scheduler.init().ok();
        *SCHEDULER.borrow(cs).borrow_mut() = Some(scheduler);

        let mut led = board_status_led();
        led.set_state(false).ok();
        *STATUS_LED.borrow(cs).borrow_mut() = Some(led);
    });

    configure_pulse_interrupt();
    configure_tick_timer();

    info!("Hardware initialization complete");
}

#[entry]
fn main() -> ! {
    hardware_init();

    info!(
        "Tachometer: window={} ticks, frame={} ticks",
        CONFIG.raw_ticks_per_window(),
        CONFIG.raw_ticks_per_frame()
    );

    loop {
        if WINDOW_DONE.swap(false, Ordering::Acquire) {
            debug!("Speed: {}", LATEST_SPEED.load(Ordering::Relaxed));
        }

        // Interrupts back on right before sleeping
        unsafe {
            riscv::register::mstatus::set_mie();
            riscv::asm::wfi();
        }
    }
}

// ========================================
// Interrupt Handlers
// ========================================

/// TIM2 update: one scheduler tick
#[no_mangle]
extern "C" fn TIM2_IRQHandler() {
    critical_section::with(|cs| {
        clear_tick_flag();

        if let Some(scheduler) = SCHEDULER.borrow(cs).borrow_mut().as_mut() {
            if let Ok(outcome) = scheduler.on_tick(&PULSES) {
                if let Some(speed) = outcome.rollover() {
                    LATEST_SPEED.store(speed.get(), Ordering::Relaxed);
                    WINDOW_DONE.store(true, Ordering::Release);
                }
            }
        }
    });
}

/// EXTI0-7: pulse input edge
#[no_mangle]
extern "C" fn EXTI7_0_IRQHandler() {
    critical_section::with(|cs| {
        if take_exti_pending() & PULSE_EXTI_LINE == 0 {
            return;
        }

        match STATUS_LED.borrow(cs).borrow_mut().as_mut() {
            Some(led) => {
                on_edge(&PULSES, led).ok();
            }
            None => {
                PULSES.record_edge();
            }
        }
    });
}
