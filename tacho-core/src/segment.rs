//! Digit to 7-segment pattern encoding
//!
//! ```txt
//!  -A-
//! F   B
//!  -G-
//! E   C
//!  -D-  .DP
//! ```
//!
//! Bit `n` of a pattern drives segment `n` in the order A, B, C, D, E, F, G,
//! DP, which is also the order the multiplexer shifts them out.

use crate::config::SEGMENTS_PER_DIGIT;

/// Segment patterns for the digits 0-9, decimal point off
pub const SEGMENT_TABLE: [u8; 10] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0000_0111, // 7
    0b0111_1111, // 8
    0b0110_0111, // 9
];

/// Decimal point bit
pub const DECIMAL_POINT: u8 = 1 << 7;

/// Pattern for `digit`, or `None` outside 0-9
pub const fn encode(digit: u8) -> Option<u8> {
    if digit < 10 {
        Some(SEGMENT_TABLE[digit as usize])
    } else {
        None
    }
}

/// Whether `segment` is lit for `digit`.
///
/// Out-of-range inputs read as unlit.
pub const fn segment_bit(digit: u8, segment: u8) -> bool {
    if segment as usize >= SEGMENTS_PER_DIGIT {
        return false;
    }
    match encode(digit) {
        Some(pattern) => pattern & (1 << segment) != 0,
        None => false,
    }
}
