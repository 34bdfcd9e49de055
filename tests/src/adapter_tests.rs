//! embedded-hal adapters driven against pin transaction mocks

use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
use tacho_core::{
    DisplayMultiplexer, EmbeddedHalDisplayBus, EmbeddedHalLine, OutputLine, Phase, SpeedValue,
    REFRESH_CYCLE_TICKS,
};

#[test]
fn start_phase_pin_sequence() {
    let enable = PinMock::new(&[PinTransaction::set(State::High), PinTransaction::set(State::Low)]);
    let start = PinMock::new(&[PinTransaction::set(State::Low), PinTransaction::set(State::High)]);
    let data = PinMock::new(&[PinTransaction::set(State::Low), PinTransaction::set(State::Low)]);

    let bus = EmbeddedHalDisplayBus::new(enable, start, data, NoopDelay::new(), true);
    let mut mux = DisplayMultiplexer::new(bus, REFRESH_CYCLE_TICKS);
    mux.init().unwrap();

    let phase = mux.tick(SpeedValue::saturating_from(250)).unwrap();
    assert!(matches!(phase, Phase::Start(_)));

    let (mut enable, mut start, mut data, _) = mux.release().release();
    enable.done();
    start.done();
    data.done();
}

#[test]
fn segment_phase_shifts_table_bits() {
    // "2" = A, B, G, E, D: first two bits lit, third dark
    let enable = PinMock::new(&[PinTransaction::set(State::Low)]);
    let start = PinMock::new(&[
        PinTransaction::set(State::High),
        PinTransaction::set(State::Low),
        PinTransaction::set(State::Low),
        PinTransaction::set(State::Low),
    ]);
    let data = PinMock::new(&[
        PinTransaction::set(State::Low),
        PinTransaction::set(State::High),
        PinTransaction::set(State::High),
        PinTransaction::set(State::Low),
    ]);

    let bus = EmbeddedHalDisplayBus::new(enable, start, data, NoopDelay::new(), true);
    let mut mux = DisplayMultiplexer::new(bus, REFRESH_CYCLE_TICKS);
    let speed = SpeedValue::saturating_from(200);
    for _ in 0..4 {
        mux.tick(speed).unwrap();
    }

    let (mut enable, mut start, mut data, _) = mux.release().release();
    enable.done();
    start.done();
    data.done();
}

#[test]
fn active_high_enable_releases_low() {
    let enable = PinMock::new(&[PinTransaction::set(State::Low)]);
    let start = PinMock::new(&[]);
    let data = PinMock::new(&[]);

    let mut bus = EmbeddedHalDisplayBus::new(enable, start, data, NoopDelay::new(), false);
    tacho_core::DisplayBus::set_enable(&mut bus, false).unwrap();

    let (mut enable, mut start, mut data, _) = bus.release();
    enable.done();
    start.done();
    data.done();
}

#[test]
fn output_line_drives_pin() {
    let pin = PinMock::new(&[PinTransaction::set(State::High), PinTransaction::set(State::Low)]);
    let mut line = EmbeddedHalLine::new(pin, false);
    line.set_state(true).unwrap();
    line.set_state(false).unwrap();
    line.release().done();
}

#[test]
fn inverted_output_line_drives_pin_low() {
    let pin = PinMock::new(&[PinTransaction::set(State::Low)]);
    let mut line = EmbeddedHalLine::new(pin, true);
    line.set_state(true).unwrap();
    line.release().done();
}
