//! Heuristic digit-string classification
//!
//! Classifiers run in a fixed priority order and the first one that fires
//! wins:
//!
//! 1. dominant single digit (≥ 80 %) → `Repeating`
//! 2. cyclic pattern → `Cyclic`
//! 3. Fibonacci mod 10 rule on more than half the positions → `Fibonacci`
//! 4. more than two consecutive primes at the head of the digits → `Prime`
//! 5. `v²` or `v³` near an integer, or a root of `x² − x − 1` → `Algebraic`
//! 6. self-similar at the `len/4` and `len/8` scales → `Fractal`
//! 7. high entropy with uniform digits → `Chaotic`
//! 8. moderate entropy → `Transcendental`, otherwise `Unknown`

use std::fmt;

use log::trace;

use super::pattern::find_cyclic_pattern;

/// Chi-squared critical value at 9 degrees of freedom, p = 0.05
pub const CHI_SQUARED_CRITICAL_9DOF: f64 = 16.919;

const PRIME_TABLE: [u32; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternClass {
    Repeating,
    Cyclic,
    Fibonacci,
    Prime,
    Algebraic,
    Fractal,
    Chaotic,
    Transcendental,
    Unknown,
}

impl PatternClass {
    pub fn name(self) -> &'static str {
        match self {
            PatternClass::Repeating => "repeating",
            PatternClass::Cyclic => "cyclic",
            PatternClass::Fibonacci => "fibonacci",
            PatternClass::Prime => "prime",
            PatternClass::Algebraic => "algebraic",
            PatternClass::Fractal => "fractal",
            PatternClass::Chaotic => "chaotic",
            PatternClass::Transcendental => "transcendental",
            PatternClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PatternClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn digit_values(digits: &str) -> Vec<u8> {
    digits
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect()
}

fn histogram(values: &[u8]) -> [usize; 10] {
    let mut counts = [0usize; 10];
    for &v in values {
        counts[usize::from(v)] += 1;
    }
    counts
}

/// Shannon entropy of the digit distribution, in bits (0 ..= log2 10)
pub fn shannon_entropy(digits: &str) -> f64 {
    let values = digit_values(digits);
    if values.is_empty() {
        return 0.0;
    }
    let total = values.len() as f64;
    histogram(&values)
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Chi-squared statistic of the digit counts against a uniform distribution
pub fn chi_squared_uniformity(digits: &str) -> f64 {
    let values = digit_values(digits);
    if values.is_empty() {
        return f64::INFINITY;
    }
    let expected = values.len() as f64 / 10.0;
    histogram(&values)
        .iter()
        .map(|&count| {
            let delta = count as f64 - expected;
            delta * delta / expected
        })
        .sum()
}

fn dominant_digit_ratio(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let max = histogram(values).into_iter().max().unwrap_or(0);
    max as f64 / values.len() as f64
}

fn fibonacci_ratio(values: &[u8]) -> f64 {
    if values.len() < 3 {
        return 0.0;
    }
    let matches = values
        .windows(3)
        .filter(|w| w[2] == (w[0] + w[1]) % 10)
        .count();
    matches as f64 / (values.len() - 2) as f64
}

/// Consecutive primes from the table found back to back at the head of `digits`
fn prime_prefix_hits(digits: &str) -> usize {
    let mut rest = digits;
    let mut hits = 0;
    for prime in PRIME_TABLE {
        let text = prime.to_string();
        match rest.strip_prefix(text.as_str()) {
            Some(tail) => {
                hits += 1;
                rest = tail;
            }
            None => break,
        }
    }
    hits
}

fn near_integer(x: f64) -> bool {
    x.is_finite() && (x - x.round()).abs() < 0.01
}

fn looks_algebraic(value: f64) -> bool {
    if !value.is_finite() {
        return false;
    }
    near_integer(value * value)
        || near_integer(value * value * value)
        || (value * value - value - 1.0).abs() < 0.01
}

/// Fraction of positions where the string agrees with itself shifted by `shift`
fn self_similarity(values: &[u8], shift: usize) -> f64 {
    if shift == 0 || shift >= values.len() {
        return 0.0;
    }
    let span = values.len() - shift;
    let matches = (0..span).filter(|&i| values[i] == values[i + shift]).count();
    matches as f64 / span as f64
}

fn looks_fractal(values: &[u8]) -> bool {
    let len = values.len();
    len >= 16 && self_similarity(values, len / 4) >= 0.5 && self_similarity(values, len / 8) >= 0.5
}

/// Classify a digit string sampled from `value`
pub fn classify(digits: &str, value: f64) -> PatternClass {
    let values = digit_values(digits);
    let class = if dominant_digit_ratio(&values) >= 0.8 {
        PatternClass::Repeating
    } else if find_cyclic_pattern(digits).is_some() {
        PatternClass::Cyclic
    } else if fibonacci_ratio(&values) > 0.5 {
        PatternClass::Fibonacci
    } else if prime_prefix_hits(digits) > 2 {
        PatternClass::Prime
    } else if looks_algebraic(value) {
        PatternClass::Algebraic
    } else if looks_fractal(&values) {
        PatternClass::Fractal
    } else {
        let entropy = shannon_entropy(digits);
        if entropy > 3.0 && chi_squared_uniformity(digits) < CHI_SQUARED_CRITICAL_9DOF {
            PatternClass::Chaotic
        } else if entropy > 2.5 {
            PatternClass::Transcendental
        } else {
            PatternClass::Unknown
        }
    };
    trace!("classified {} ({}) as {}", digits, value, class);
    class
}
