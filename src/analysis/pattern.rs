//! Repeating and cyclic digit pattern detection
//!
//! Both detectors are brute force over `(period, start)`: the smallest period
//! wins, then the smallest start offset. A unit must occur at least three
//! times back to back to count.

use log::trace;

/// Contiguous repetitions required before a unit counts as a pattern
pub const MIN_REPETITIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingPattern {
    pub start: usize,
    pub period: usize,
    pub repetitions: usize,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicPattern {
    pub offset: usize,
    pub cycle: String,
    pub repetitions: usize,
}

impl CyclicPattern {
    pub fn length(&self) -> usize {
        self.cycle.len()
    }
}

/// First `(start, period, repetitions)` in scan order
fn scan(digits: &[u8], min_repetitions: usize) -> Option<(usize, usize, usize)> {
    let len = digits.len();
    for period in 1..=len / 2 {
        let mut start = 0;
        while start + period * min_repetitions <= len {
            let unit = &digits[start..start + period];
            let mut repetitions = 1;
            while start + (repetitions + 1) * period <= len
                && &digits[start + repetitions * period..start + (repetitions + 1) * period] == unit
            {
                repetitions += 1;
            }
            if repetitions >= min_repetitions {
                return Some((start, period, repetitions));
            }
            start += 1;
        }
    }
    None
}

/// Smallest-period, then smallest-offset repeating block
pub fn find_repeating_pattern(digits: &str) -> Option<RepeatingPattern> {
    let bytes = digits.as_bytes();
    let (start, period, repetitions) = scan(bytes, MIN_REPETITIONS)?;
    trace!("repeating pattern period {} at {} in {}", period, start, digits);
    Some(RepeatingPattern {
        start,
        period,
        repetitions,
        unit: String::from_utf8_lossy(&bytes[start..start + period]).into_owned(),
    })
}

/// Cycle detector used when classifying digit strings
pub fn find_cyclic_pattern(digits: &str) -> Option<CyclicPattern> {
    let bytes = digits.as_bytes();
    let (offset, length, repetitions) = scan(bytes, MIN_REPETITIONS)?;
    trace!("cycle of length {} at {} in {}", length, offset, digits);
    Some(CyclicPattern {
        offset,
        cycle: String::from_utf8_lossy(&bytes[offset..offset + length]).into_owned(),
        repetitions,
    })
}
