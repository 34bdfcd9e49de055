//! Edge interrupts interleaved with timer ticks

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use proptest::prelude::*;
use tacho_core::test_utils::MeterSim;
use tacho_core::{MeterConfig, PulseCounter, SpeedValue, REFRESH_CYCLE_TICKS};

use crate::{even_rate, run_constant_rate};

const WINDOW: u16 = 16;
const RAW_PER_WINDOW: usize = WINDOW as usize * 2;
const WINDOWS: usize = 3;

proptest! {
    #[test]
    fn every_edge_lands_in_exactly_one_window(
        schedule in prop::collection::vec(0u32..5, RAW_PER_WINDOW * WINDOWS)
    ) {
        let config = MeterConfig::new(WINDOW, REFRESH_CYCLE_TICKS, 2).unwrap();
        let mut sim = MeterSim::new(config);

        let rollovers: Vec<u16> = sim
            .run_interleaved(schedule.len() as u64, |tick| schedule[tick as usize])
            .into_iter()
            .filter_map(|o| o.rollover())
            .map(|s| s.get())
            .collect();

        let expected: Vec<u16> = schedule
            .chunks(RAW_PER_WINDOW)
            .map(|window| window.iter().sum::<u32>() as u16)
            .collect();
        prop_assert_eq!(rollovers, expected);
        prop_assert_eq!(sim.pulses.peek(), 0);
    }
}

#[test]
fn status_led_toggles_per_edge() {
    let mut sim = MeterSim::new(MeterConfig::DEFAULT);
    sim.edges(7);
    assert_eq!(sim.indicator.toggle_count(), 7);
    assert!(sim.indicator.is_active());
}

#[test]
fn constant_rate_reads_back_each_window() {
    let mut sim = MeterSim::new(MeterConfig::DEFAULT);
    let captured = run_constant_rate(&mut sim, 420, 3);

    assert_eq!(captured, vec![SpeedValue::saturating_from(420); 3]);
    assert_eq!(sim.ticks(), 3 * MeterConfig::DEFAULT.raw_ticks_per_window() as u64);
    // The last full frame shows the rate
    assert_eq!(sim.frames.last().and_then(|f| f.value()), Some(420));
}

#[test]
fn edge_storm_saturates_without_wrapping() {
    let config = MeterConfig::new(4, REFRESH_CYCLE_TICKS, 2).unwrap();
    let mut sim = MeterSim::new(config);
    sim.edges(70_000);
    assert_eq!(sim.pulses.peek(), u16::MAX);

    let rollover = sim.run_ticks(8).into_iter().find_map(|o| o.rollover());
    assert_eq!(rollover, Some(SpeedValue::MAX));
}

#[test]
fn overrange_rate_pins_display_at_999() {
    let mut sim = MeterSim::new(MeterConfig::DEFAULT);
    let raw = MeterConfig::DEFAULT.raw_ticks_per_window();
    sim.run_interleaved(raw as u64 * 2, even_rate(2500, raw));

    assert_eq!(sim.scheduler.speed(), SpeedValue::MAX);
    assert_eq!(sim.frames.last().and_then(|f| f.value()), Some(999));
}

#[test]
fn read_and_reset_is_atomic_against_concurrent_edges() {
    // A second thread stands in for the edge interrupt; the std
    // critical-section implementation serialises the two.
    let pulses = PulseCounter::new();
    let stop = AtomicBool::new(false);
    // Below u16::MAX so a slow reader can never hit saturation
    const EDGES: u32 = 60_000;

    let captured: u32 = thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..EDGES {
                pulses.record_edge();
            }
            stop.store(true, Ordering::Release);
        });

        let mut total = 0u32;
        while !stop.load(Ordering::Acquire) {
            total += pulses.take() as u32;
            thread::yield_now();
        }
        total
    });

    assert_eq!(captured + pulses.take() as u32, EDGES);
}
