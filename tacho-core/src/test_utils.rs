//! Test utilities for the tachometer core

use crate::config::{MeterConfig, FRAME_BITS, SEGMENTS_PER_DIGIT};
use crate::counter::{on_edge, PulseCounter};
use crate::hal::mock::{MockDisplayBus, MockOutputLine};
use crate::scheduler::TickScheduler;
use crate::segment::SEGMENT_TABLE;
use crate::types::{DisplayDigits, TickOutcome};

/// Line levels after one timer tick
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineSample {
    pub tick: u64,
    pub clock: bool,
    pub enable: bool,
    pub start: bool,
    pub data: bool,
    /// Whether the periodic processes ran on this tick
    pub qualifying: bool,
}

/// Reverse segment lookup
pub fn decode_pattern(pattern: u8) -> Option<u8> {
    SEGMENT_TABLE
        .iter()
        .position(|&p| p == pattern)
        .map(|digit| digit as u8)
}

/// Frame as seen by the display driver when it latches
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    pub bits: [bool; FRAME_BITS],
    /// `None` if some digit's pattern is not in the segment table
    pub digits: Option<DisplayDigits>,
}

impl DecodedFrame {
    pub fn value(&self) -> Option<u16> {
        self.digits.map(|d| d.value())
    }
}

/// Receiver model of the display driver chip.
///
/// Sampled once per qualifying tick: a start bit opens a frame, the next 24
/// data samples are shifted in, and releasing enable latches the frame.
#[derive(Default, Debug)]
pub struct FrameDecoder {
    receiving: bool,
    bits: Vec<bool>,
    /// Samples taken with enable asserted but no frame open
    pub protocol_errors: u32,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, enable: bool, start: bool, data: bool) -> Option<DecodedFrame> {
        if !enable {
            if !self.receiving {
                return None;
            }
            self.receiving = false;
            return Some(self.latch());
        }

        if start {
            self.receiving = true;
            self.bits.clear();
        } else if !self.receiving {
            self.protocol_errors += 1;
        } else if self.bits.len() < FRAME_BITS {
            self.bits.push(data);
        }
        None
    }

    fn latch(&mut self) -> DecodedFrame {
        let mut bits = [false; FRAME_BITS];
        for (slot, bit) in bits.iter_mut().zip(self.bits.iter()) {
            *slot = *bit;
        }

        let mut digits = [0u8; 3];
        let mut valid = self.bits.len() == FRAME_BITS;
        for (index, chunk) in bits.chunks(SEGMENTS_PER_DIGIT).enumerate() {
            let pattern = chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (segment, &lit)| acc | ((lit as u8) << segment));
            match decode_pattern(pattern) {
                Some(digit) => digits[index] = digit,
                None => valid = false,
            }
        }

        DecodedFrame {
            bits,
            digits: valid.then_some(DisplayDigits(digits)),
        }
    }
}

/// Host-side meter: scheduler, edge counter and status LED on mock hardware.
///
/// Edges and ticks are applied in the order the test calls them, which is how
/// interrupt interleavings are simulated.
pub struct MeterSim {
    pub pulses: PulseCounter,
    pub scheduler: TickScheduler<MockOutputLine, MockDisplayBus>,
    pub indicator: MockOutputLine,
    pub samples: Vec<LineSample>,
    pub frames: Vec<DecodedFrame>,
    decoder: FrameDecoder,
    ticks: u64,
}

impl MeterSim {
    pub fn new(config: MeterConfig) -> Self {
        let mut scheduler = TickScheduler::new(MockOutputLine::new(), MockDisplayBus::new(), config);
        scheduler.init().expect("mock lines never fail");
        Self {
            pulses: PulseCounter::new(),
            scheduler,
            indicator: MockOutputLine::new(),
            samples: Vec::new(),
            frames: Vec::new(),
            decoder: FrameDecoder::new(),
            ticks: 0,
        }
    }

    /// Deliver one edge interrupt
    pub fn edge(&mut self) -> u16 {
        on_edge(&self.pulses, &mut self.indicator).expect("mock lines never fail")
    }

    pub fn edges(&mut self, count: u32) {
        for _ in 0..count {
            self.edge();
        }
    }

    /// Deliver one timer interrupt and sample the lines
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self
            .scheduler
            .on_tick(&self.pulses)
            .expect("mock lines never fail");
        self.ticks += 1;

        let bus = self.scheduler.display().bus();
        let sample = LineSample {
            tick: self.ticks,
            clock: self.scheduler.clock().is_active(),
            enable: bus.enable(),
            start: bus.start(),
            data: bus.data(),
            qualifying: outcome != TickOutcome::Skipped,
        };
        self.samples.push(sample);

        if sample.qualifying {
            if let Some(frame) = self.decoder.feed(sample.enable, sample.start, sample.data) {
                self.frames.push(frame);
            }
        }
        outcome
    }

    pub fn run_ticks(&mut self, count: u64) -> Vec<TickOutcome> {
        (0..count).map(|_| self.tick()).collect()
    }

    /// Run `count` ticks, delivering `edges(tick_index)` edges before each
    pub fn run_interleaved<F>(&mut self, count: u64, mut edges: F) -> Vec<TickOutcome>
    where
        F: FnMut(u64) -> u32,
    {
        (0..count)
            .map(|i| {
                let n = edges(i);
                self.edges(n);
                self.tick()
            })
            .collect()
    }

    /// Qualifying-tick samples only
    pub fn qualifying_samples(&self) -> impl Iterator<Item = &LineSample> {
        self.samples.iter().filter(|s| s.qualifying)
    }

    pub fn protocol_errors(&self) -> u32 {
        self.decoder.protocol_errors
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
