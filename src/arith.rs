//! Core arithmetic engine
//!
//! `add`, `subtract`, `multiply` and `divide` borrow both operands and return
//! a freshly constructed result. Undefined operands make the result undefined.
//! Exact operands go through `exact::Decimal` so that no digit is guessed;
//! everything else propagates barrier, gap and confidence:
//!
//! | op  | barrier                 | gap                  | confidence              |
//! |-----|-------------------------|----------------------|-------------------------|
//! | `+` | `combine_barriers(a,b)` | `max(a,b)`           | `min(a,b)`              |
//! | `-` | `combine_barriers(a,b)` | `max(a,b)`           | `min(a,b)`              |
//! | `*` | `combine_barriers(a,b)` | `a·b` (saturating)   | `floor(a·b/1000)`       |
//! | `/` | `combine_barriers(a,b)` | `max(a,b,10^6)`      | `max(100, a·b/1200)`    |

use std::fmt;
use std::ops;

use log::debug;

use crate::algebra;
use crate::analysis::modular;
use crate::exact::Decimal;
use crate::solid::{Barrier, Confidence, GapMagnitude, SolidNumber, Terminal, NATURALS_DIGITS};

/// Fractional digits produced when a quotient cannot be certified exact
pub const QUOTIENT_DIGITS: u32 = 15;
/// Gap exponent attached to inexact quotients
pub const QUOTIENT_GAP_EXPONENT: u32 = 6;
/// Confidence attached to inexact quotients of exact operands
pub const QUOTIENT_CONFIDENCE: u64 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operation {
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '*',
            Operation::Divide => '/',
            Operation::Power => '^',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Operation::Add),
            '-' => Some(Operation::Subtract),
            '*' => Some(Operation::Multiply),
            '/' => Some(Operation::Divide),
            '^' => Some(Operation::Power),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Priority combination:
/// `Undefined > Infinity > (Exact only if both Exact) > Quantum > Energy > Temporal > Computational > Storage`
pub fn combine_barriers(a: Barrier, b: Barrier) -> Barrier {
    if a.rank() >= b.rank() {
        a
    } else {
        b
    }
}

pub fn combine_confidence(a: Confidence, b: Confidence, op: Operation) -> Confidence {
    let product = u64::from(a.per_mille()) * u64::from(b.per_mille());
    match op {
        Operation::Add | Operation::Subtract => a.min(b),
        Operation::Multiply | Operation::Power => Confidence::new(product / 1000),
        Operation::Divide => Confidence::new((product / 1200).max(100)),
    }
}

pub(crate) fn is_negative_infinity(value: &SolidNumber) -> bool {
    value.is_infinity() && algebra::is_negative(value)
}

/// Render an approximate value for a known-digit prefix
pub(crate) fn format_approx(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let text = format!("{}", value);
    if text.contains('e') {
        format!("{:.15}", value)
    } else {
        text
    }
}

/// Terminal kept by a gapped result: the operand with the wider gap dominates
fn dominant_terminal(a: &SolidNumber, b: &SolidNumber) -> Terminal {
    if a.is_exact() {
        return b.terminal().clone();
    }
    if b.is_exact() || a.gap_magnitude() >= b.gap_magnitude() {
        a.terminal().clone()
    } else {
        b.terminal().clone()
    }
}

fn undefined_from(a: &SolidNumber, b: &SolidNumber, op: Operation) -> SolidNumber {
    debug!("{} {} {} is undefined", a, op, b);
    SolidNumber::undefined(Confidence::NONE)
}

fn known_pair(a: &SolidNumber, b: &SolidNumber) -> Option<(Decimal, Decimal)> {
    Some((a.known_decimal()?, b.known_decimal()?))
}

pub fn add(a: &SolidNumber, b: &SolidNumber) -> SolidNumber {
    if a.is_undefined() || b.is_undefined() {
        return undefined_from(a, b, Operation::Add);
    }

    let confidence = combine_confidence(a.confidence(), b.confidence(), Operation::Add);
    match (a.is_infinity(), b.is_infinity()) {
        (true, true) => {
            if is_negative_infinity(a) != is_negative_infinity(b) {
                // ∞ + (−∞) is the same indeterminate form as ∞ − ∞
                return natural_numbers(a, b);
            }
            return SolidNumber::infinity(is_negative_infinity(a), confidence, a.terminal().clone());
        }
        (true, false) => {
            return SolidNumber::infinity(is_negative_infinity(a), confidence, a.terminal().clone())
        }
        (false, true) => {
            return SolidNumber::infinity(is_negative_infinity(b), confidence, b.terminal().clone())
        }
        (false, false) => {}
    }

    let pair = known_pair(a, b);
    if a.is_exact() && b.is_exact() {
        if let Some((x, y)) = &pair {
            debug!("exact add {} + {}", a, b);
            return SolidNumber::from_decimal(&x.add(y));
        }
    }

    let known = match pair {
        Some((x, y)) => x.add(&y).to_string(),
        None => format_approx(a.to_double() + b.to_double()),
    };
    SolidNumber::with_gap(
        known,
        combine_gapped_barrier(a.barrier(), b.barrier()),
        a.gap_magnitude().max(b.gap_magnitude()),
        confidence,
        dominant_terminal(a, b),
    )
}

pub fn subtract(a: &SolidNumber, b: &SolidNumber) -> SolidNumber {
    if a.is_undefined() || b.is_undefined() {
        return undefined_from(a, b, Operation::Subtract);
    }

    let confidence = combine_confidence(a.confidence(), b.confidence(), Operation::Subtract);
    match (a.is_infinity(), b.is_infinity()) {
        (true, true) => {
            if is_negative_infinity(a) == is_negative_infinity(b) {
                return natural_numbers(a, b);
            }
            return SolidNumber::infinity(is_negative_infinity(a), confidence, a.terminal().clone());
        }
        (true, false) => {
            return SolidNumber::infinity(is_negative_infinity(a), confidence, a.terminal().clone())
        }
        (false, true) => {
            return SolidNumber::infinity(!is_negative_infinity(b), confidence, b.terminal().clone())
        }
        (false, false) => {}
    }

    let pair = known_pair(a, b);
    if a.is_exact() && b.is_exact() {
        if let Some((x, y)) = &pair {
            debug!("exact subtract {} - {}", a, b);
            return SolidNumber::from_decimal(&x.sub(y));
        }
    }

    let known = match pair {
        Some((x, y)) => x.sub(&y).to_string(),
        None => format_approx(a.to_double() - b.to_double()),
    };
    SolidNumber::with_gap(
        known,
        combine_gapped_barrier(a.barrier(), b.barrier()),
        a.gap_magnitude().max(b.gap_magnitude()),
        confidence,
        dominant_terminal(a, b),
    )
}

/// ∞ − ∞ is not undefined: it spans all naturals with an indeterminate tail
fn natural_numbers(a: &SolidNumber, b: &SolidNumber) -> SolidNumber {
    debug!("{} - {} resolves to the naturals", a, b);
    SolidNumber::with_gap(
        NATURALS_DIGITS,
        combine_barriers(a.barrier(), b.barrier()),
        GapMagnitude::UNBOUNDED,
        combine_confidence(a.confidence(), b.confidence(), Operation::Subtract),
        Terminal::Superposition,
    )
}

pub fn multiply(a: &SolidNumber, b: &SolidNumber) -> SolidNumber {
    if a.is_undefined() || b.is_undefined() {
        return undefined_from(a, b, Operation::Multiply);
    }
    if (algebra::is_zero(a) && b.is_infinity()) || (a.is_infinity() && algebra::is_zero(b)) {
        return undefined_from(a, b, Operation::Multiply);
    }

    let confidence = combine_confidence(a.confidence(), b.confidence(), Operation::Multiply);
    if a.is_infinity() || b.is_infinity() {
        let terminal = if a.is_infinity() { a.terminal() } else { b.terminal() };
        let negative = algebra::is_negative(a) != algebra::is_negative(b);
        return SolidNumber::infinity(negative, confidence, terminal.clone());
    }

    let pair = known_pair(a, b);
    if a.is_exact() && b.is_exact() {
        if let Some((x, y)) = &pair {
            debug!("exact multiply {} * {}", a, b);
            return SolidNumber::from_decimal(&x.mul(y));
        }
    }

    let known = match pair {
        Some((x, y)) => x.mul(&y).truncated(x.scale().max(y.scale())).to_string(),
        None => format_approx(a.to_double() * b.to_double()),
    };
    // An exact side contributes a unit factor rather than annihilating the gap
    let gap = a
        .gap_magnitude()
        .max(GapMagnitude::new(1))
        .saturating_mul(b.gap_magnitude().max(GapMagnitude::new(1)));
    SolidNumber::with_gap(
        known,
        combine_gapped_barrier(a.barrier(), b.barrier()),
        gap,
        confidence,
        dominant_terminal(a, b),
    )
}

pub fn divide(a: &SolidNumber, b: &SolidNumber) -> SolidNumber {
    if a.is_undefined() || b.is_undefined() {
        return undefined_from(a, b, Operation::Divide);
    }
    if algebra::is_zero(b) {
        return undefined_from(a, b, Operation::Divide);
    }

    let confidence = combine_confidence(a.confidence(), b.confidence(), Operation::Divide);
    if possibly_zero(b) {
        debug!("{} / {} divides by a possibly-zero value", a, b);
        return SolidNumber::undefined(confidence.scaled(0.5));
    }

    match (a.is_infinity(), b.is_infinity()) {
        (true, true) => return algebra::infinity_divide(a, b),
        (true, false) => {
            let negative = algebra::is_negative(a) != algebra::is_negative(b);
            return SolidNumber::infinity(negative, confidence, a.terminal().clone());
        }
        (false, true) => {
            // Approaches zero; not a true exact zero
            return SolidNumber::with_gap(
                "0",
                Barrier::Computational,
                GapMagnitude::new(1),
                confidence,
                Terminal::Digits("0".into()),
            );
        }
        (false, false) => {}
    }

    let pair = known_pair(a, b);
    if a.is_exact() && b.is_exact() {
        if let Some((x, y)) = &pair {
            match x.div_exact(y) {
                Ok(quotient) => {
                    debug!("exact divide {} / {}", a, b);
                    return SolidNumber::from_decimal(&quotient);
                }
                Err(err) => debug!("{}", err),
            }
            let terminal = modular::decimal_repetend(x, y)
                .map(Terminal::Digits)
                .unwrap_or(Terminal::Superposition);
            return SolidNumber::with_gap(
                truncated_quotient(x, y),
                Barrier::Computational,
                GapMagnitude::from_exponent(QUOTIENT_GAP_EXPONENT),
                Confidence::new(QUOTIENT_CONFIDENCE),
                terminal,
            );
        }
    }

    let known = match pair {
        Some((x, y)) => truncated_quotient(&x, &y),
        None => format_approx(a.to_double() / b.to_double()),
    };
    SolidNumber::with_gap(
        known,
        combine_gapped_barrier(a.barrier(), b.barrier()),
        a.gap_magnitude()
            .max(b.gap_magnitude())
            .max(GapMagnitude::from_exponent(QUOTIENT_GAP_EXPONENT)),
        confidence,
        dominant_terminal(a, b),
    )
}

/// Non-exact finite divisor whose known digits are all zero
fn possibly_zero(value: &SolidNumber) -> bool {
    !value.is_exact()
        && !value.is_infinity()
        && value.known_decimal().map_or(false, |d| d.is_zero())
}

fn truncated_quotient(x: &Decimal, y: &Decimal) -> String {
    x.div_truncated(y, QUOTIENT_DIGITS)
        .map(|q| q.to_string())
        .unwrap_or_else(|| format_approx(x.to_f64() / y.to_f64()))
}

/// Barrier for a result that is known to carry a gap
fn combine_gapped_barrier(a: Barrier, b: Barrier) -> Barrier {
    match combine_barriers(a, b) {
        // Exact operands whose digits could not be parsed end up approximated
        Barrier::Exact => Barrier::Computational,
        other => other,
    }
}

impl ops::Add for &SolidNumber {
    type Output = SolidNumber;

    fn add(self, rhs: Self) -> SolidNumber {
        add(self, rhs)
    }
}

impl ops::Sub for &SolidNumber {
    type Output = SolidNumber;

    fn sub(self, rhs: Self) -> SolidNumber {
        subtract(self, rhs)
    }
}

impl ops::Mul for &SolidNumber {
    type Output = SolidNumber;

    fn mul(self, rhs: Self) -> SolidNumber {
        multiply(self, rhs)
    }
}

impl ops::Div for &SolidNumber {
    type Output = SolidNumber;

    fn div(self, rhs: Self) -> SolidNumber {
        divide(self, rhs)
    }
}
