//! # Solid Numbers
//!
//! A Solid Number is a decimal value whose full expansion may not be known.
//! It carries:
//!
//! - a **known** digit prefix (`-12.375`),
//! - a **certainty**: exact, gapped behind a named barrier, infinite or undefined,
//! - a **terminal** describing the tail beyond the gap.
//!
//! ```text
//!   known        gap (barrier, magnitude, confidence)        terminal
//! ┌────────┐   ┌──────────────────────────────────────┐   ┌──────────┐
//! │ 3.1415 │...│ (q:10^12 | 870/1000)                 │...│ 2653     │
//! └────────┘   └──────────────────────────────────────┘   └──────────┘
//! ```
//!
//! Values are immutable. Every arithmetic operation produces a fresh value.

pub mod literal;

use std::fmt;

use log::warn;

use crate::config;
use crate::error::{Result, SolidError};
use crate::exact::Decimal;

pub use literal::{AstSolidLiteral, TerminalKind};

/// Reason the digits beyond the known prefix are not exactly known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Barrier {
    Exact,
    Quantum,
    Energy,
    Storage,
    Temporal,
    Computational,
    Infinity,
    Undefined,
}

impl Barrier {
    pub const ALL: [Barrier; 8] = [
        Barrier::Exact,
        Barrier::Quantum,
        Barrier::Energy,
        Barrier::Storage,
        Barrier::Temporal,
        Barrier::Computational,
        Barrier::Infinity,
        Barrier::Undefined,
    ];

    /// Single letter used in debug renderings and literal descriptors
    pub fn letter(self) -> char {
        match self {
            Barrier::Exact => 'x',
            Barrier::Quantum => 'q',
            Barrier::Energy => 'e',
            Barrier::Storage => 's',
            Barrier::Temporal => 't',
            Barrier::Computational => 'c',
            Barrier::Infinity => 'i',
            Barrier::Undefined => 'u',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Barrier::ALL
            .into_iter()
            .find(|b| b.letter() == letter.to_ascii_lowercase())
            .or(match letter {
                '∞' => Some(Barrier::Infinity),
                _ => None,
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Barrier::Exact => "exact",
            Barrier::Quantum => "quantum",
            Barrier::Energy => "energy",
            Barrier::Storage => "storage",
            Barrier::Temporal => "temporal",
            Barrier::Computational => "computational",
            Barrier::Infinity => "infinity",
            Barrier::Undefined => "undefined",
        }
    }

    /// Rank used by barrier combination; the higher rank wins.
    /// `Exact` ranks lowest so it only survives when both sides are exact.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Barrier::Exact => 0,
            Barrier::Storage => 1,
            Barrier::Computational => 2,
            Barrier::Temporal => 3,
            Barrier::Energy => 4,
            Barrier::Quantum => 5,
            Barrier::Infinity => 6,
            Barrier::Undefined => 7,
        }
    }
}

impl fmt::Display for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-mille confidence, always within `0..=1000`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Confidence(u16);

impl Confidence {
    pub const NONE: Confidence = Confidence(0);
    pub const FULL: Confidence = Confidence(1000);

    /// Clamp any per-mille value into range
    pub fn new(per_mille: u64) -> Self {
        Confidence(per_mille.min(1000) as u16)
    }

    /// From a fraction in `[0, 1]`, rounded to the nearest per-mille
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction.is_nan() {
            return Confidence::NONE;
        }
        Confidence::new((fraction.clamp(0.0, 1.0) * 1000.0).round() as u64)
    }

    pub fn per_mille(self) -> u32 {
        u32::from(self.0)
    }

    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / 1000.0
    }

    /// `floor(self · factor)` staying in range
    pub fn scaled(self, factor: f64) -> Self {
        Confidence::new((f64::from(self.0) * factor).floor().max(0.0) as u64)
    }
}

/// Order-of-magnitude size of a gap; `u64::MAX` denotes an unbounded gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GapMagnitude(u64);

impl GapMagnitude {
    pub const ZERO: GapMagnitude = GapMagnitude(0);
    pub const UNBOUNDED: GapMagnitude = GapMagnitude(u64::MAX);
    /// Largest power of ten representable without hitting the sentinel
    pub const MAX_FINITE_EXPONENT: u32 = 19;

    pub fn new(magnitude: u64) -> Self {
        GapMagnitude(magnitude)
    }

    /// 10^exponent, saturating at the largest finite power of ten
    pub fn from_exponent(exponent: u32) -> Self {
        GapMagnitude(10u64.pow(exponent.min(Self::MAX_FINITE_EXPONENT)))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn is_unbounded(self) -> bool {
        self.0 == u64::MAX
    }

    /// Decimal exponent of the magnitude (`floor(log10)`), 0 for zero
    pub fn exponent(self) -> u32 {
        let mut exponent = 0;
        let mut rest = self.0;
        while rest >= 10 {
            rest /= 10;
            exponent += 1;
        }
        exponent
    }

    /// Multiply, saturating to the unbounded sentinel on overflow
    pub fn saturating_mul(self, other: GapMagnitude) -> GapMagnitude {
        if self.is_unbounded() || other.is_unbounded() {
            return GapMagnitude::UNBOUNDED;
        }
        self.0
            .checked_mul(other.0)
            .map(GapMagnitude)
            .unwrap_or(GapMagnitude::UNBOUNDED)
    }
}

impl fmt::Display for GapMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "∞")
        } else {
            write!(f, "10^{}", self.exponent())
        }
    }
}

/// What lies beyond the gap
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// Concrete limiting or repeating digits
    Digits(String),
    /// The tail is truly undefined
    EmptySet,
    /// The tail is indeterminate
    Superposition,
}

impl Terminal {
    pub fn empty() -> Self {
        Terminal::Digits(String::new())
    }

    pub fn digits(&self) -> &str {
        match self {
            Terminal::Digits(d) => d,
            _ => "",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Digits(d) => f.write_str(d),
            Terminal::EmptySet => f.write_str("∅"),
            Terminal::Superposition => f.write_str("{*}"),
        }
    }
}

/// How much of the value is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Certainty {
    Exact,
    /// `barrier` is one of the finite barriers (never Exact, Infinity or Undefined)
    Gapped {
        barrier: Barrier,
        gap: GapMagnitude,
        confidence: Confidence,
    },
    Infinite { confidence: Confidence },
    Undefined { confidence: Confidence },
}

impl Certainty {
    pub fn new(barrier: Barrier, gap: GapMagnitude, confidence: Confidence) -> Self {
        match barrier {
            Barrier::Exact => Certainty::Exact,
            Barrier::Infinity => Certainty::Infinite { confidence },
            Barrier::Undefined => Certainty::Undefined { confidence },
            _ => Certainty::Gapped {
                barrier,
                gap,
                confidence,
            },
        }
    }

    pub fn barrier(&self) -> Barrier {
        match self {
            Certainty::Exact => Barrier::Exact,
            Certainty::Gapped { barrier, .. } => *barrier,
            Certainty::Infinite { .. } => Barrier::Infinity,
            Certainty::Undefined { .. } => Barrier::Undefined,
        }
    }

    pub fn gap(&self) -> GapMagnitude {
        match self {
            Certainty::Exact => GapMagnitude::ZERO,
            Certainty::Gapped { gap, .. } => *gap,
            Certainty::Infinite { .. } | Certainty::Undefined { .. } => GapMagnitude::UNBOUNDED,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Certainty::Exact => Confidence::FULL,
            Certainty::Gapped { confidence, .. }
            | Certainty::Infinite { confidence }
            | Certainty::Undefined { confidence } => *confidence,
        }
    }
}

/// Immutable Solid Number value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolidNumber {
    known: String,
    certainty: Certainty,
    terminal: Terminal,
}

pub(crate) const INFINITY_DIGITS: &str = "∞";
pub(crate) const NATURALS_DIGITS: &str = "ℕ";
pub(crate) const NAN_DIGITS: &str = "NaN";

impl SolidNumber {
    /// Exact value from a digit string. The string is stored as given
    /// (bounded by the configured capacity); use `parse_exact` to validate.
    pub fn exact(digits: impl Into<String>) -> Self {
        Self {
            known: bounded(digits.into(), config::max_known_digits(), "known"),
            certainty: Certainty::Exact,
            terminal: Terminal::empty(),
        }
    }

    /// Exact value from a validated decimal string
    pub fn parse_exact(digits: &str) -> Result<Self> {
        let decimal = Decimal::parse(digits)
            .ok_or_else(|| SolidError::invalid_operand(format!("'{}' is not a decimal", digits)))?;
        Ok(Self::from_decimal(&decimal))
    }

    pub(crate) fn from_decimal(decimal: &Decimal) -> Self {
        Self::exact(decimal.to_string())
    }

    /// General constructor. An `Exact` barrier forces a zero gap and an empty
    /// terminal; `Infinity` and `Undefined` always carry an unbounded gap.
    pub fn with_gap(
        known: impl Into<String>,
        barrier: Barrier,
        gap: GapMagnitude,
        confidence: Confidence,
        terminal: Terminal,
    ) -> Self {
        let certainty = Certainty::new(barrier, gap, confidence);
        let terminal = match (certainty, terminal) {
            (Certainty::Exact, _) => Terminal::empty(),
            (_, Terminal::Digits(d)) => {
                Terminal::Digits(bounded(d, config::max_terminal_digits(), "terminal"))
            }
            (_, other) => other,
        };
        Self {
            known: bounded(known.into(), config::max_known_digits(), "known"),
            certainty,
            terminal,
        }
    }

    pub fn infinity(negative: bool, confidence: Confidence, terminal: Terminal) -> Self {
        let known = if negative {
            format!("-{}", INFINITY_DIGITS)
        } else {
            INFINITY_DIGITS.to_string()
        };
        Self::with_gap(known, Barrier::Infinity, GapMagnitude::UNBOUNDED, confidence, terminal)
    }

    pub fn undefined(confidence: Confidence) -> Self {
        Self::with_gap(
            "",
            Barrier::Undefined,
            GapMagnitude::UNBOUNDED,
            confidence,
            Terminal::EmptySet,
        )
    }

    pub fn known_digits(&self) -> &str {
        &self.known
    }

    pub fn certainty(&self) -> Certainty {
        self.certainty
    }

    pub fn barrier(&self) -> Barrier {
        self.certainty.barrier()
    }

    pub fn gap_magnitude(&self) -> GapMagnitude {
        self.certainty.gap()
    }

    pub fn confidence(&self) -> Confidence {
        self.certainty.confidence()
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn terminal_digits(&self) -> &str {
        self.terminal.digits()
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.certainty, Certainty::Exact)
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self.certainty, Certainty::Infinite { .. })
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.certainty, Certainty::Undefined { .. })
    }

    /// Known prefix as a decimal, when it is one
    pub(crate) fn known_decimal(&self) -> Option<Decimal> {
        Decimal::parse(&self.known)
    }

    /// Best-effort conversion to `f64`
    pub fn to_double(&self) -> f64 {
        match self.certainty {
            Certainty::Undefined { .. } => f64::NAN,
            Certainty::Infinite { .. } => {
                if self.known.starts_with('-') {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
            _ => self.known.parse::<f64>().unwrap_or(f64::NAN),
        }
    }

    /// Debug rendering: `<known>` then, unless exact,
    /// `...(<barrier-letter>:<gap>|<confidence>/1000)...<terminal>`
    pub fn to_debug_string(&self) -> String {
        self.to_string()
    }

    /// Fail with `UndefinedResult` when the value is undefined
    pub fn require_defined(&self, operation: &str) -> Result<&Self> {
        if self.is_undefined() {
            Err(SolidError::UndefinedResult {
                operation: operation.to_string(),
            })
        } else {
            Ok(self)
        }
    }
}

impl fmt::Display for SolidNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.known)?;
        if self.is_exact() {
            return Ok(());
        }
        write!(
            f,
            "...({}:{}|{}/1000)...{}",
            self.barrier().letter(),
            self.gap_magnitude(),
            self.confidence().per_mille(),
            self.terminal
        )
    }
}

/// Silent capacity truncation; logged so the loss is at least observable
fn bounded(mut text: String, capacity: usize, field: &str) -> String {
    if text.chars().count() > capacity {
        warn!(
            "{} digits truncated from {} to {} characters",
            field,
            text.chars().count(),
            capacity
        );
        text = text.chars().take(capacity).collect();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digits_truncate_to_capacity() {
        let capacity = config::max_known_digits();
        let long = "7".repeat(capacity + 10);
        let value = SolidNumber::exact(long.as_str());
        assert_eq!(value.known_digits().len(), capacity);
        assert!(value.is_exact());

        let fits = SolidNumber::exact("7".repeat(capacity));
        assert_eq!(fits.known_digits().len(), capacity);
    }

    #[test]
    fn test_terminal_digits_truncate_to_capacity() {
        let capacity = config::max_terminal_digits();
        let value = SolidNumber::with_gap(
            "0.5",
            Barrier::Computational,
            GapMagnitude::from_exponent(3),
            Confidence::FULL,
            Terminal::Digits("9".repeat(capacity * 2)),
        );
        assert_eq!(value.terminal_digits(), "9".repeat(capacity));
        assert_eq!(value.known_digits(), "0.5");
    }

    #[test]
    fn test_exact_debug_string() {
        let value = SolidNumber::exact("3.14159");
        assert!(value.is_exact());
        assert_eq!(value.to_debug_string(), "3.14159");
        assert_eq!(value.gap_magnitude(), GapMagnitude::ZERO);
        assert_eq!(value.terminal(), &Terminal::empty());
        assert_eq!(value.confidence(), Confidence::FULL);
    }

    #[test]
    fn test_gapped_debug_string() {
        let value = SolidNumber::with_gap(
            "3.1415",
            Barrier::Quantum,
            GapMagnitude::from_exponent(12),
            Confidence::new(870),
            Terminal::Digits("2653".into()),
        );
        assert_eq!(value.to_debug_string(), "3.1415...(q:10^12|870/1000)...2653");
    }

    #[test]
    fn test_special_terminals_render() {
        let value = SolidNumber::infinity(false, Confidence::new(500), Terminal::Superposition);
        assert_eq!(value.to_debug_string(), "∞...(i:∞|500/1000)...{*}");

        let value = SolidNumber::undefined(Confidence::NONE);
        assert_eq!(value.to_debug_string(), "...(u:∞|0/1000)...∅");
    }

    #[test]
    fn test_exact_barrier_forces_invariants() {
        let value = SolidNumber::with_gap(
            "7",
            Barrier::Exact,
            GapMagnitude::new(1000),
            Confidence::new(10),
            Terminal::Superposition,
        );
        assert!(value.is_exact());
        assert_eq!(value.gap_magnitude(), GapMagnitude::ZERO);
        assert_eq!(value.terminal_digits(), "");
        assert_eq!(value.confidence(), Confidence::FULL);
    }

    #[test]
    fn test_to_double() {
        assert!((SolidNumber::exact("3.14159").to_double() - 3.14159).abs() < 1e-5);
        assert!(SolidNumber::undefined(Confidence::NONE).to_double().is_nan());
        assert_eq!(
            SolidNumber::infinity(true, Confidence::FULL, Terminal::empty()).to_double(),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_confidence_clamps() {
        assert_eq!(Confidence::new(5000).per_mille(), 1000);
        assert_eq!(Confidence::from_fraction(0.8766).per_mille(), 877);
        assert_eq!(Confidence::new(900).scaled(0.7).per_mille(), 630);
    }

    #[test]
    fn test_gap_magnitude() {
        assert_eq!(GapMagnitude::from_exponent(6).value(), 1_000_000);
        assert_eq!(GapMagnitude::from_exponent(25).exponent(), 19);
        assert!(GapMagnitude::new(u64::MAX / 2)
            .saturating_mul(GapMagnitude::new(3))
            .is_unbounded());
        assert_eq!(GapMagnitude::new(1).to_string(), "10^0");
    }

    #[test]
    fn test_barrier_letters_round_trip() {
        for barrier in Barrier::ALL {
            assert_eq!(Barrier::from_letter(barrier.letter()), Some(barrier));
        }
        assert_eq!(Barrier::from_letter('Q'), Some(Barrier::Quantum));
        assert_eq!(Barrier::from_letter('∞'), Some(Barrier::Infinity));
        assert_eq!(Barrier::from_letter('z'), None);
    }

    #[test]
    fn test_parse_exact_rejects_garbage() {
        assert!(SolidNumber::parse_exact("12.5").is_ok());
        assert!(matches!(
            SolidNumber::parse_exact("12..5"),
            Err(SolidError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_require_defined() {
        let undefined = SolidNumber::undefined(Confidence::NONE);
        assert!(matches!(
            undefined.require_defined("divide"),
            Err(SolidError::UndefinedResult { .. })
        ));
        assert!(SolidNumber::exact("1").require_defined("divide").is_ok());
    }
}
