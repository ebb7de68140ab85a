//! Terminal-digit extraction
//!
//! The terminal of a Solid Number describes digits far beyond the gap. Five
//! strategies produce them, picked by `choose_strategy`:
//!
//! - **ModularArithmetic**: rational-looking values; digit `k` of `p/q` comes
//!   from `p·10^(k-1) mod q` without expanding the digits before it.
//! - **ContinuedFraction**: algebraic-looking values; digits of the best
//!   convergent.
//! - **SeriesExpansion**: π and e, summed in fixed point with `BigInt`.
//! - **IterativeMap**: temporal fractional values; logistic map simulation.
//! - **QuantumSuperposition**: quantum barrier; `*` markers only.
//!
//! Every extraction carries a stability score in `[0, 1]`. It is diagnostic
//! only and never feeds back into confidence.

use std::fmt;

use log::debug;

use super::classify::PatternClass;
use super::constants::NamedConstant;
use super::modular::{best_rational, continued_fraction_terms, convergents, rational_digits};
use crate::config;
use crate::exact::BigInt;
use crate::solid::{Barrier, Terminal};

/// Logistic map parameter, deep in the chaotic regime
pub const LOGISTIC_R: f64 = 3.99;
/// Series digits beyond this position are not computed
pub const MAX_SERIES_DIGITS: usize = 500;
const MAX_MAP_WARMUP: usize = 10_000;
const RATIONAL_MAX_DENOMINATOR: i64 = 10_000;
const RATIONAL_TOLERANCE: f64 = 1e-9;
const CONVERGENT_MAX_DENOMINATOR: i64 = 10_000_000;
const SERIES_GUARD_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalStrategy {
    ModularArithmetic,
    ContinuedFraction,
    SeriesExpansion,
    IterativeMap,
    QuantumSuperposition,
}

impl fmt::Display for TerminalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminalStrategy::ModularArithmetic => "modular arithmetic",
            TerminalStrategy::ContinuedFraction => "continued fraction",
            TerminalStrategy::SeriesExpansion => "series expansion",
            TerminalStrategy::IterativeMap => "iterative map",
            TerminalStrategy::QuantumSuperposition => "quantum superposition",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalExtraction {
    pub strategy: TerminalStrategy,
    pub digits: String,
    pub stability: f64,
}

impl TerminalExtraction {
    pub fn to_terminal(&self) -> Terminal {
        match self.strategy {
            TerminalStrategy::QuantumSuperposition => Terminal::Superposition,
            _ if self.digits.is_empty() => Terminal::EmptySet,
            _ => Terminal::Digits(self.digits.clone()),
        }
    }
}

fn fractional_part(value: f64) -> f64 {
    let abs = value.abs();
    abs - abs.floor()
}

/// `p/q` reproducing `value` closely enough to call it rational
fn rational_form(value: f64) -> Option<(i64, i64)> {
    let (p, q) = best_rational(value.abs(), RATIONAL_MAX_DENOMINATOR);
    ((value.abs() - p as f64 / q as f64).abs() < RATIONAL_TOLERANCE).then_some((p, q))
}

fn series_constant(value: f64) -> Option<NamedConstant> {
    let tolerance = config::current().analysis.constant_tolerance;
    NamedConstant::identify(value.abs(), tolerance)
        .filter(|c| matches!(c, NamedConstant::Pi | NamedConstant::E))
}

pub fn choose_strategy(value: f64, barrier: Barrier, class: PatternClass) -> TerminalStrategy {
    let tolerance = config::current().analysis.constant_tolerance;
    let named = NamedConstant::identify(value.abs(), tolerance);

    if barrier == Barrier::Quantum {
        TerminalStrategy::QuantumSuperposition
    } else if barrier == Barrier::Temporal && fractional_part(value) > 0.0 {
        TerminalStrategy::IterativeMap
    } else if series_constant(value).is_some() {
        TerminalStrategy::SeriesExpansion
    } else if class == PatternClass::Algebraic
        || matches!(named, Some(NamedConstant::Sqrt2 | NamedConstant::GoldenRatio))
    {
        TerminalStrategy::ContinuedFraction
    } else if matches!(class, PatternClass::Repeating | PatternClass::Cyclic)
        || rational_form(value).is_some()
    {
        TerminalStrategy::ModularArithmetic
    } else {
        TerminalStrategy::ContinuedFraction
    }
}

/// Extract `count` terminal digits starting at fractional position `start` (1-based)
pub fn extract_terminal(
    value: f64,
    barrier: Barrier,
    class: PatternClass,
    start: usize,
    count: usize,
) -> TerminalExtraction {
    let start = start.max(1);
    if !value.is_finite() {
        return TerminalExtraction {
            strategy: TerminalStrategy::ModularArithmetic,
            digits: String::new(),
            stability: 0.0,
        };
    }

    let strategy = choose_strategy(value, barrier, class);
    let (digits, stability) = match strategy {
        TerminalStrategy::QuantumSuperposition => ("*".repeat(count), 0.0),
        TerminalStrategy::IterativeMap => iterative_map_digits(value, start, count),
        TerminalStrategy::SeriesExpansion => series_constant(value)
            .and_then(|c| series_digits(c, start, count))
            .map(|d| (d, 0.95))
            .unwrap_or_else(|| continued_fraction_digits(value, start, count)),
        TerminalStrategy::ContinuedFraction => continued_fraction_digits(value, start, count),
        TerminalStrategy::ModularArithmetic => modular_digits(value, start, count),
    };
    debug!(
        "terminal of {} via {}: {} (stability {:.3})",
        value, strategy, digits, stability
    );
    TerminalExtraction {
        strategy,
        digits,
        stability,
    }
}

fn modular_digits(value: f64, start: usize, count: usize) -> (String, f64) {
    if let Some((p, q)) = rational_form(value) {
        return (rational_digits(p, q, start, count), 1.0);
    }
    // Scaled-modulus truncation: the value is only trusted to 15 places
    const SCALE: i64 = 1_000_000_000_000_000;
    let scaled = (fractional_part(value) * SCALE as f64).trunc() as i64;
    (rational_digits(scaled, SCALE, start, count), 0.6)
}

fn continued_fraction_digits(value: f64, start: usize, count: usize) -> (String, f64) {
    let abs = value.abs();
    let (p, q) = convergents(&continued_fraction_terms(abs, 40))
        .into_iter()
        .take_while(|&(_, q)| q <= CONVERGENT_MAX_DENOMINATOR)
        .last()
        .unwrap_or((abs.trunc() as i64, 1));
    let error = (abs - p as f64 / q as f64).abs();
    let stability = (1.0 - error * (q as f64) * (q as f64)).clamp(0.0, 1.0);
    (rational_digits(p, q, start, count), stability)
}

/// Logistic map `x ← r·x·(1 − x)` seeded with the fractional part
fn iterative_map_digits(value: f64, start: usize, count: usize) -> (String, f64) {
    let mut x = fractional_part(value);
    if x <= 0.0 || x >= 1.0 {
        x = 0.5;
    }
    for _ in 1..start.min(MAX_MAP_WARMUP) {
        x = LOGISTIC_R * x * (1.0 - x);
    }

    let mut digits = String::with_capacity(count);
    let mut drift = 0.0;
    for _ in 0..count {
        let next = LOGISTIC_R * x * (1.0 - x);
        drift += (next - x).abs();
        x = next;
        let digit = ((x * 10.0).floor() as u8).min(9);
        digits.push(char::from(b'0' + digit));
    }
    let stability = if count == 0 {
        0.0
    } else {
        (1.0 - drift / count as f64).clamp(0.0, 1.0)
    };
    (digits, stability)
}

/// `scale / divisor`, truncated
fn div_small(value: &BigInt, divisor: u64) -> BigInt {
    value
        .div_rem(&BigInt::from_u64(divisor))
        .map(|(q, _)| q)
        .unwrap_or_else(BigInt::zero)
}

/// `arctan(1/x) · scale` by its alternating series
fn arctan_inverse(x: u64, scale: &BigInt) -> BigInt {
    let x_squared = x * x;
    let mut term = div_small(scale, x);
    let mut sum = term.clone();
    let mut k: u64 = 1;
    loop {
        term = div_small(&term, x_squared);
        if term.is_zero() {
            break;
        }
        let step = div_small(&term, 2 * k + 1);
        sum = if k % 2 == 1 { sum.sub(&step) } else { sum.add(&step) };
        k += 1;
    }
    sum
}

/// Fractional digits `start..start+count` of π (Machin) or e (Σ 1/k!)
pub fn series_digits(constant: NamedConstant, start: usize, count: usize) -> Option<String> {
    let needed = start.checked_add(count)?;
    if needed > MAX_SERIES_DIGITS {
        return None;
    }
    let precision = needed + SERIES_GUARD_DIGITS;
    let scale = BigInt::pow10(u32::try_from(precision).ok()?);

    let fixed = match constant {
        NamedConstant::Pi => {
            let a = arctan_inverse(5, &scale).mul(&BigInt::from_u64(16));
            let b = arctan_inverse(239, &scale).mul(&BigInt::from_u64(4));
            a.sub(&b)
        }
        NamedConstant::E => {
            let mut sum = scale.clone();
            let mut term = scale;
            let mut k = 1;
            loop {
                term = div_small(&term, k);
                if term.is_zero() {
                    break;
                }
                sum = sum.add(&term);
                k += 1;
            }
            sum
        }
        _ => return None,
    };

    let text = fixed.to_string();
    let fraction = text.get(text.len().checked_sub(precision)?..)?;
    fraction.get(start - 1..start - 1 + count).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{E, PI, SQRT_2};

    #[test]
    fn test_series_digits() {
        assert_eq!(series_digits(NamedConstant::Pi, 1, 10).as_deref(), Some("1415926535"));
        assert_eq!(series_digits(NamedConstant::Pi, 41, 10).as_deref(), Some("6939937510"));
        assert_eq!(series_digits(NamedConstant::E, 1, 10).as_deref(), Some("7182818284"));
        assert_eq!(series_digits(NamedConstant::Sqrt2, 1, 10), None);
        assert_eq!(series_digits(NamedConstant::Pi, MAX_SERIES_DIGITS, 10), None);
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(
            choose_strategy(0.5, Barrier::Quantum, PatternClass::Unknown),
            TerminalStrategy::QuantumSuperposition
        );
        assert_eq!(
            choose_strategy(2.25, Barrier::Temporal, PatternClass::Unknown),
            TerminalStrategy::IterativeMap
        );
        assert_eq!(
            choose_strategy(PI, Barrier::Computational, PatternClass::Algebraic),
            TerminalStrategy::SeriesExpansion
        );
        assert_eq!(
            choose_strategy(SQRT_2, Barrier::Computational, PatternClass::Unknown),
            TerminalStrategy::ContinuedFraction
        );
        assert_eq!(
            choose_strategy(1.0 / 7.0, Barrier::Computational, PatternClass::Unknown),
            TerminalStrategy::ModularArithmetic
        );
    }

    #[test]
    fn test_rational_terminal_far_out() {
        let extraction = extract_terminal(1.0 / 7.0, Barrier::Computational, PatternClass::Cyclic, 31, 6);
        assert_eq!(extraction.strategy, TerminalStrategy::ModularArithmetic);
        // digit 31 of 1/7 is the first digit of the sixth period
        assert_eq!(extraction.digits, "142857");
        assert_eq!(extraction.stability, 1.0);
    }

    #[test]
    fn test_series_terminal() {
        let extraction = extract_terminal(E, Barrier::Computational, PatternClass::Chaotic, 1, 5);
        assert_eq!(extraction.strategy, TerminalStrategy::SeriesExpansion);
        assert_eq!(extraction.digits, "71828");
        assert_eq!(extraction.to_terminal(), Terminal::Digits("71828".into()));
    }

    #[test]
    fn test_continued_fraction_terminal() {
        let extraction = extract_terminal(SQRT_2, Barrier::Computational, PatternClass::Algebraic, 1, 6);
        assert_eq!(extraction.strategy, TerminalStrategy::ContinuedFraction);
        assert_eq!(extraction.digits, "414213");
        assert!((0.0..=1.0).contains(&extraction.stability));
    }

    #[test]
    fn test_quantum_and_chaotic_terminals() {
        let quantum = extract_terminal(0.3, Barrier::Quantum, PatternClass::Unknown, 1, 4);
        assert_eq!(quantum.digits, "****");
        assert_eq!(quantum.to_terminal(), Terminal::Superposition);

        let chaotic = extract_terminal(0.123, Barrier::Temporal, PatternClass::Unknown, 50, 8);
        assert_eq!(chaotic.strategy, TerminalStrategy::IterativeMap);
        assert_eq!(chaotic.digits.len(), 8);
        assert!(chaotic.digits.bytes().all(|b| b.is_ascii_digit()));
        assert!((0.0..=1.0).contains(&chaotic.stability));
    }

    #[test]
    fn test_non_finite_value_has_no_terminal() {
        let extraction = extract_terminal(f64::NAN, Barrier::Computational, PatternClass::Unknown, 1, 4);
        assert_eq!(extraction.to_terminal(), Terminal::EmptySet);
    }
}
