//! Display frame protocol as seen by the driver chip

use rstest::rstest;
use tacho_core::test_utils::MeterSim;
use tacho_core::{Cursor, MeterConfig, Phase, REFRESH_CYCLE_TICKS};

/// Window longer than one frame so the second frame shows the first capture
fn frame_sim() -> MeterSim {
    MeterSim::new(MeterConfig::new(30, REFRESH_CYCLE_TICKS, 2).unwrap())
}

#[rstest]
#[case(0, [0, 0, 0])]
#[case(7, [0, 0, 7])]
#[case(42, [0, 4, 2])]
#[case(610, [6, 1, 0])]
#[case(999, [9, 9, 9])]
#[case(1500, [9, 9, 9])]
fn decoded_frame_shows_measured_speed(#[case] edges: u32, #[case] expected: [u8; 3]) {
    let mut sim = frame_sim();
    sim.edges(edges);
    sim.run_ticks(2 * 2 * REFRESH_CYCLE_TICKS as u64);

    assert_eq!(sim.frames.len(), 2);
    // First frame started before any window closed
    assert_eq!(sim.frames[0].value(), Some(0));
    assert_eq!(sim.frames[1].digits.map(|d| d.0), Some(expected));
    assert_eq!(sim.protocol_errors(), 0);
}

#[test]
fn enable_and_start_bit_duty() {
    let mut sim = MeterSim::new(MeterConfig::DEFAULT);
    let cycles = 5;
    sim.run_ticks(2 * REFRESH_CYCLE_TICKS as u64 * cycles);

    let samples: Vec<_> = sim.qualifying_samples().copied().collect();
    assert_eq!(samples.len(), REFRESH_CYCLE_TICKS as usize * cycles as usize);

    for frame in samples.chunks(REFRESH_CYCLE_TICKS as usize) {
        let enabled = frame.iter().filter(|s| s.enable).count();
        let started = frame.iter().filter(|s| s.start).count();
        assert_eq!(enabled, REFRESH_CYCLE_TICKS as usize - 1);
        assert_eq!(started, 1);

        // Start bit on the first enabled tick, enable released on the last
        assert!(frame[0].start && frame[0].enable);
        assert!(frame[1..].iter().all(|s| !s.start));
        assert!(frame[..frame.len() - 1].iter().all(|s| s.enable));
        assert!(!frame[frame.len() - 1].enable);

        // Data idles low outside the segment ticks
        assert!(frame[25..].iter().all(|s| !s.data));
    }
}

#[test]
fn clock_toggles_every_tick() {
    let mut sim = MeterSim::new(MeterConfig::DEFAULT);
    sim.run_ticks(200);

    for pair in sim.samples.windows(2) {
        assert_ne!(pair[0].clock, pair[1].clock);
    }
    // Payload only on the low half
    assert!(sim.samples.iter().all(|s| s.qualifying == !s.clock));
}

#[test]
fn cursor_visits_every_segment_once_in_order() {
    let mut sim = MeterSim::new(MeterConfig::DEFAULT);
    let cursors: Vec<Cursor> = sim
        .run_ticks(2 * REFRESH_CYCLE_TICKS as u64)
        .into_iter()
        .filter_map(|o| o.phase())
        .filter_map(|p| p.cursor())
        .collect();

    let expected: Vec<Cursor> = (0..3u8)
        .flat_map(|digit| (0..8u8).map(move |segment| Cursor { digit, segment }))
        .collect();
    assert_eq!(cursors, expected);
}

#[test]
fn phase_sequence_of_one_cycle() {
    let mut sim = MeterSim::new(MeterConfig::DEFAULT);
    let phases: Vec<Phase> = sim
        .run_ticks(2 * REFRESH_CYCLE_TICKS as u64)
        .into_iter()
        .filter_map(|o| o.phase())
        .collect();

    assert!(matches!(phases[0], Phase::Start(_)));
    assert!(phases[1..25].iter().all(|p| matches!(p, Phase::Segment { .. })));
    assert!(phases[25..37].iter().all(|p| *p == Phase::Hold));
    assert_eq!(phases[37], Phase::End);
}

#[test]
fn frame_is_stable_while_speed_changes() {
    // One-tick window: speed changes every qualifying tick
    let mut sim = MeterSim::new(MeterConfig::new(1, REFRESH_CYCLE_TICKS, 2).unwrap());
    let mut rate = 0;
    let mut shown_at_start = Vec::new();
    for _ in 0..(2 * 3 * REFRESH_CYCLE_TICKS as u64) {
        rate += 1;
        sim.edges(rate % 50);
        if let Some(Phase::Start(digits)) = sim.tick().phase() {
            shown_at_start.push(digits);
        }
    }

    // Each latched frame is the number captured when its frame started
    assert_eq!(sim.frames.len(), 3);
    assert_eq!(shown_at_start.len(), 3);
    let distinct: Vec<u16> = shown_at_start.iter().map(|d| d.value()).collect();
    assert!(distinct.windows(2).all(|w| w[0] != w[1]), "{:?}", distinct);
    for (frame, digits) in sim.frames.iter().zip(&shown_at_start) {
        assert_eq!(frame.digits, Some(*digits));
    }
    assert_eq!(sim.protocol_errors(), 0);
}
