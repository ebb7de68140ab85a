//! Undefined and infinity algebra
//!
//! Predicates over Solid Numbers, indeterminate-form detection, the
//! dedicated ∞÷∞, ∞^∞ and n^∞ algorithms, `sqrt`/`log`/`power`, recovery
//! from undefined values and infinity comparison.

use std::cmp::Ordering;

use log::debug;

use crate::analysis::modular::modular_inverse;
use crate::analysis::{extract_terminal, PatternClass};
use crate::arith::{self, combine_barriers, combine_confidence, format_approx, Operation};
use crate::config;
use crate::exact::{BigInt, Decimal};
use crate::solid::{Barrier, Confidence, GapMagnitude, SolidNumber, Terminal, NAN_DIGITS};

/// Newton-Raphson iterations used by `sqrt`
pub const SQRT_ITERATIONS: usize = 10;
/// Gap exponent of floating approximations
pub const APPROX_GAP_EXPONENT: u32 = 15;
/// Terminal attached to ∞^∞
pub const INFINITY_POWER_TERMINAL: &str = "2468101214161820";
/// Largest integer exponent evaluated exactly
pub const MAX_EXACT_EXPONENT: u64 = 1024;

const APPROX_TERMINAL_START: usize = 16;
const APPROX_TERMINAL_COUNT: usize = 8;

/// Exact and numerically zero
pub fn is_zero(value: &SolidNumber) -> bool {
    value.is_exact() && value.known_decimal().map_or(false, |d| d.is_zero())
}

pub fn is_negative(value: &SolidNumber) -> bool {
    value.known_digits().starts_with('-')
}

/// Exact with no non-zero digit after the point
pub fn is_integer(value: &SolidNumber) -> bool {
    value.is_exact() && value.known_decimal().map_or(false, |d| d.is_integer())
}

/// Indeterminate-form detection. Subtraction never reports undefined here:
/// ∞ − ∞ resolves to the naturals in `arith::subtract`.
pub fn would_be_undefined(a: &SolidNumber, b: &SolidNumber, op: Operation) -> bool {
    if a.is_undefined() || b.is_undefined() {
        return true;
    }
    let indeterminate = match op {
        Operation::Divide => is_zero(b),
        Operation::Power => (is_zero(a) && is_zero(b)) || (is_negative(a) && !is_integer(b)),
        Operation::Multiply => {
            (is_zero(a) && b.is_infinity()) || (a.is_infinity() && is_zero(b))
        }
        Operation::Add | Operation::Subtract => false,
    };
    indeterminate || a.confidence() == Confidence::NONE || b.confidence() == Confidence::NONE
}

fn approximation_terminal(value: f64, barrier: Barrier, class: PatternClass) -> Terminal {
    extract_terminal(
        value,
        barrier,
        class,
        APPROX_TERMINAL_START,
        APPROX_TERMINAL_COUNT,
    )
    .to_terminal()
}

/// Square root by Newton-Raphson
pub fn sqrt(value: &SolidNumber) -> SolidNumber {
    if value.is_undefined() || is_negative(value) {
        debug!("sqrt({}) is undefined", value);
        return SolidNumber::undefined(Confidence::NONE);
    }
    if value.is_infinity() {
        return SolidNumber::infinity(false, value.confidence(), value.terminal().clone());
    }
    if is_zero(value) {
        return SolidNumber::exact("0");
    }

    let v = value.to_double();
    if !v.is_finite() || v <= 0.0 {
        return SolidNumber::undefined(Confidence::NONE);
    }
    // Start from the nearest power of two so ten iterations converge
    let mut x = 2f64.powi((v.log2() / 2.0).ceil() as i32);
    for _ in 0..SQRT_ITERATIONS {
        x = 0.5 * (x + v / x);
    }

    SolidNumber::with_gap(
        format_approx(x),
        Barrier::Computational,
        value
            .gap_magnitude()
            .max(GapMagnitude::from_exponent(APPROX_GAP_EXPONENT)),
        value.confidence().scaled(0.9),
        approximation_terminal(x, Barrier::Computational, PatternClass::Algebraic),
    )
}

/// Natural logarithm. Not implemented: every input yields `Undefined`,
/// including valid positive values.
pub fn log(value: &SolidNumber) -> SolidNumber {
    debug!("log({}) is not implemented", value);
    SolidNumber::undefined(Confidence::NONE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryStrategy {
    UseZero,
    UseOne,
    UseInfinity,
    UseNaN,
    Propagate,
}

/// Outcome of `recover`. `Shared` means the caller keeps the value it passed
/// in; the pool turns this into an extra reference instead of a new slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    Fresh(SolidNumber),
    Shared,
}

/// Confidence carried by an infinity substituted for an undefined value
pub const RECOVERED_INFINITY_CONFIDENCE: u64 = 500;

pub fn recover(value: &SolidNumber, strategy: RecoveryStrategy) -> Recovery {
    if !value.is_undefined() {
        return Recovery::Shared;
    }
    debug!("recovering {} with {:?}", value, strategy);
    match strategy {
        RecoveryStrategy::UseZero => Recovery::Fresh(SolidNumber::exact("0")),
        RecoveryStrategy::UseOne => Recovery::Fresh(SolidNumber::exact("1")),
        RecoveryStrategy::UseInfinity => Recovery::Fresh(SolidNumber::infinity(
            false,
            Confidence::new(RECOVERED_INFINITY_CONFIDENCE),
            Terminal::Superposition,
        )),
        RecoveryStrategy::UseNaN => Recovery::Fresh(SolidNumber::with_gap(
            NAN_DIGITS,
            Barrier::Undefined,
            GapMagnitude::UNBOUNDED,
            Confidence::NONE,
            Terminal::EmptySet,
        )),
        RecoveryStrategy::Propagate => Recovery::Shared,
    }
}

/// Anchor and terminal value standing in for one infinite operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfinityExpression {
    pub anchor: u64,
    pub terminal_value: u64,
}

impl InfinityExpression {
    /// The configured anchor, rounded down to a multiple of the terminal value.
    /// Missing or zero terminals count as 1.
    pub fn of(value: &SolidNumber) -> Self {
        let base = config::current().analysis.infinity_anchor;
        let digits = value.terminal_digits();
        let tail = digits.get(digits.len().saturating_sub(18)..).unwrap_or("");
        let terminal_value = tail.parse::<u64>().ok().filter(|&t| t > 0).unwrap_or(1);
        let anchor = match base - base % terminal_value {
            0 => base,
            reduced => reduced,
        };
        Self {
            anchor,
            terminal_value,
        }
    }
}

/// ∞ ÷ ∞ through infinity expressions
pub fn infinity_divide(a: &SolidNumber, b: &SolidNumber) -> SolidNumber {
    let settings = config::current();
    let modulus = settings.analysis.terminal_modulus;
    let width = settings.terminal_width();

    let ea = InfinityExpression::of(a);
    let eb = InfinityExpression::of(b);
    let quotient = ea.anchor / eb.anchor;
    let remainder = ea.anchor % eb.anchor;
    let fraction = u128::from(remainder) * 1000 / u128::from(eb.anchor);

    let m = modulus as i64;
    let ta = (ea.terminal_value % modulus) as i64;
    let tb = (eb.terminal_value % modulus) as i64;
    let product = match modular_inverse(tb, m) {
        Some(inverse) => (ta as i128 * inverse as i128 % m as i128) as i64,
        None => (ta as i128 * tb as i128 % m as i128) as i64,
    };

    let sign = if is_negative(a) != is_negative(b) { "-" } else { "" };
    let barrier = if *a.terminal() == Terminal::Superposition || *b.terminal() == Terminal::Superposition {
        Barrier::Quantum
    } else {
        Barrier::Computational
    };
    debug!(
        "∞/∞: anchors {} / {} -> {}.{:03}, terminal product {}",
        ea.anchor, eb.anchor, quotient, fraction, product
    );

    SolidNumber::with_gap(
        format!("{}{}.{:03}", sign, quotient, fraction),
        barrier,
        GapMagnitude::UNBOUNDED,
        combine_confidence(a.confidence(), b.confidence(), Operation::Divide).scaled(0.7),
        Terminal::Digits(format!("{:0width$}", product, width = width)),
    )
}

/// ∞ ^ ∞
pub fn infinity_power(a: &SolidNumber, b: &SolidNumber) -> SolidNumber {
    SolidNumber::infinity(
        false,
        combine_confidence(a.confidence(), b.confidence(), Operation::Power).scaled(0.5),
        Terminal::Digits(INFINITY_POWER_TERMINAL.to_string()),
    )
}

fn approaching_zero(confidence: Confidence) -> SolidNumber {
    SolidNumber::with_gap(
        "0",
        Barrier::Computational,
        GapMagnitude::new(1),
        confidence,
        Terminal::Digits("0".into()),
    )
}

/// n ^ ∞ for finite `base`; a negative infinite exponent inverts the growth
pub fn power_infinity(base: &SolidNumber, exponent: &SolidNumber) -> SolidNumber {
    let confidence = combine_confidence(base.confidence(), exponent.confidence(), Operation::Power);
    let n = base.to_double();
    let inverted = is_negative(exponent);

    if n.is_nan() || n <= -1.0 {
        debug!("{}^∞ oscillates without bound", base);
        return SolidNumber::undefined(Confidence::NONE);
    }
    if n == 1.0 {
        return SolidNumber::exact("1");
    }
    if n == 0.0 {
        return if inverted {
            SolidNumber::undefined(Confidence::NONE)
        } else {
            SolidNumber::exact("0")
        };
    }
    let grows = (n.abs() > 1.0) != inverted;
    if n < 0.0 {
        // -1 < n < 0: the magnitude shrinks while the sign alternates
        return if grows {
            SolidNumber::undefined(Confidence::NONE)
        } else {
            approaching_zero(confidence)
        };
    }
    if grows {
        SolidNumber::infinity(false, confidence, exponent.terminal().clone())
    } else {
        approaching_zero(confidence)
    }
}

/// ∞ ^ finite
fn infinity_to_finite(base: &SolidNumber, exponent: &SolidNumber) -> SolidNumber {
    let confidence = combine_confidence(base.confidence(), exponent.confidence(), Operation::Power);
    let e = exponent.to_double();
    if e == 0.0 || e.is_nan() {
        return SolidNumber::undefined(Confidence::NONE);
    }
    if e < 0.0 {
        return approaching_zero(confidence);
    }
    // Odd integer powers keep the sign of -∞
    let negative = is_negative(base) && is_integer(exponent) && e % 2.0 == 1.0;
    SolidNumber::infinity(negative, confidence, base.terminal().clone())
}

/// `base^exponent` for an exact base and an exact integer exponent
fn exact_integer_power(base: &Decimal, exponent: u64) -> Decimal {
    let mut result = Decimal::from_bigint(BigInt::from_u64(1));
    let mut square = base.clone();
    let mut rest = exponent;
    while rest > 0 {
        if rest & 1 == 1 {
            result = result.mul(&square);
        }
        rest >>= 1;
        if rest > 0 {
            square = square.mul(&square);
        }
    }
    result.normalized()
}

/// Exponent of an exact integer power when evaluating it stays within capacity
fn exact_exponent(base: &Decimal, exponent: &SolidNumber) -> Option<(u64, bool)> {
    if !is_integer(exponent) {
        return None;
    }
    let e = exponent.known_decimal()?.normalized();
    let magnitude = e.mantissa().abs().to_u64()?;
    let base = base.normalized();
    // Fractional bases render their leading zeros too
    let digits = base.mantissa().abs().to_string().len() as u64;
    let width = digits.max(u64::from(base.scale()) + 1);
    let capacity = config::max_known_digits() as u64;
    (magnitude <= MAX_EXACT_EXPONENT && width.saturating_mul(magnitude) <= capacity)
        .then_some((magnitude, e.is_negative()))
}

/// General power dispatch
pub fn power(base: &SolidNumber, exponent: &SolidNumber) -> SolidNumber {
    if would_be_undefined(base, exponent, Operation::Power) {
        debug!("{} ^ {} is undefined", base, exponent);
        return SolidNumber::undefined(Confidence::NONE);
    }
    match (base.is_infinity(), exponent.is_infinity()) {
        (true, true) => return infinity_power(base, exponent),
        (false, true) => return power_infinity(base, exponent),
        (true, false) => return infinity_to_finite(base, exponent),
        (false, false) => {}
    }

    if base.is_exact() {
        if let Some(decimal) = base.known_decimal() {
            if let Some((magnitude, negative)) = exact_exponent(&decimal, exponent) {
                let rendered = exact_integer_power(&decimal, magnitude).to_string();
                if rendered.len() <= config::max_known_digits() {
                    debug!("exact power {} ^ {}", base, exponent);
                    let result = SolidNumber::exact(rendered);
                    return if negative {
                        arith::divide(&SolidNumber::exact("1"), &result)
                    } else {
                        result
                    };
                }
                debug!("exact power {} ^ {} exceeds capacity", base, exponent);
            }
        }
    }

    let x = base.to_double().powf(exponent.to_double());
    if x.is_nan() {
        return SolidNumber::undefined(Confidence::NONE);
    }
    let confidence = combine_confidence(base.confidence(), exponent.confidence(), Operation::Power);
    if x.is_infinite() {
        return SolidNumber::infinity(x < 0.0, confidence, Terminal::Superposition);
    }
    let barrier = match combine_barriers(base.barrier(), exponent.barrier()) {
        Barrier::Exact => Barrier::Computational,
        other => other,
    };
    SolidNumber::with_gap(
        format_approx(x),
        barrier,
        base.gap_magnitude()
            .max(exponent.gap_magnitude())
            .max(GapMagnitude::from_exponent(APPROX_GAP_EXPONENT)),
        confidence,
        approximation_terminal(x, barrier, PatternClass::Unknown),
    )
}

/// Order two values where at least one may be infinite.
///
/// Infinities of the same sign compare by terminal digits (lexicographic,
/// shorter first on a shared prefix); any infinity dominates any finite
/// value; finite values compare as `f64`. Undefined values are unordered.
pub fn compare_infinities(a: &SolidNumber, b: &SolidNumber) -> Option<Ordering> {
    if a.is_undefined() || b.is_undefined() {
        return None;
    }
    let sign = |v: &SolidNumber| if is_negative(v) { Ordering::Less } else { Ordering::Greater };
    match (a.is_infinity(), b.is_infinity()) {
        (true, true) => {
            let (na, nb) = (is_negative(a), is_negative(b));
            if na != nb {
                return Some(if na { Ordering::Less } else { Ordering::Greater });
            }
            Some(a.terminal_digits().cmp(b.terminal_digits()))
        }
        (true, false) => Some(sign(a)),
        (false, true) => Some(sign(b).reverse()),
        (false, false) => a.to_double().partial_cmp(&b.to_double()),
    }
}
