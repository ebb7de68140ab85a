//! Typed GGGX pipeline
//!
//! Each phase consumes the report of the phase before it, so
//! `go(v, p).get().gap().glimpse().guess()` is the only way to reach a
//! `Guess`. `GggxResult` wraps the same transitions behind a runtime phase
//! record for callers that drive the phases one at a time.

use log::{debug, warn};

use super::signature::{self, AlgorithmSignature, ComplexityClass, ComputationalTrace};
use crate::analysis::{
    classify, extract_terminal, find_repeating_pattern, NamedConstant, PatternClass,
    RepeatingPattern, TerminalStrategy,
};
use crate::config;
use crate::solid::{Barrier, Confidence, GapMagnitude, SolidNumber, Terminal};

/// Precision every analysis starts from, in fractional digits
pub const BASE_PRECISION: u32 = 15;
/// Lowest precision GAP will settle for
pub const MIN_PRECISION: u32 = 5;
/// Patterns shorter than this extend precision and mark a terminal
pub const SHORT_PERIOD: usize = 10;
/// Terminal digits produced by extraction when no pattern is available
pub const TERMINAL_DIGITS: usize = 8;
/// Largest magnitude resolved as an exact integer (2^53)
pub const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Zero,
    NaN,
    Infinite,
    Integer,
    Ordinary,
}

/// Fractional digits of `value` by repeated ×10 truncation
pub fn sample_fraction(value: f64, count: usize) -> String {
    let abs = value.abs();
    let mut rest = abs - abs.floor();
    let mut digits = String::with_capacity(count);
    for _ in 0..count {
        rest *= 10.0;
        let digit = rest.floor();
        digits.push(char::from(b'0' + (digit as u8).min(9)));
        rest -= digit;
    }
    digits
}

fn integer_digits(value: f64) -> u32 {
    let whole = value.abs().floor();
    if whole < 1.0 {
        0
    } else {
        whole.log10().floor() as u32 + 1
    }
}

/// GO: value kind, significant digits, repeating pattern, named constant
#[derive(Debug, Clone, PartialEq)]
pub struct GoReport {
    pub value: f64,
    pub desired_precision: u32,
    pub kind: ValueKind,
    pub sampled_digits: String,
    pub significant_digits: u32,
    pub pattern: Option<RepeatingPattern>,
    pub constant: Option<NamedConstant>,
    pub class: PatternClass,
}

pub fn go(value: f64, desired_precision: u32) -> GoReport {
    let settings = config::current();
    let kind = if value.is_nan() {
        ValueKind::NaN
    } else if value.is_infinite() {
        ValueKind::Infinite
    } else if value == 0.0 {
        ValueKind::Zero
    } else if value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
        ValueKind::Integer
    } else {
        ValueKind::Ordinary
    };

    let sampled_digits = match kind {
        ValueKind::NaN | ValueKind::Infinite => String::new(),
        _ => sample_fraction(value, settings.analysis.fractional_sample_digits),
    };
    let significant_digits = match kind {
        ValueKind::NaN | ValueKind::Infinite => 0,
        ValueKind::Zero => 1,
        _ => integer_digits(value) + sampled_digits.trim_end_matches('0').len() as u32,
    };
    let pattern = find_repeating_pattern(&sampled_digits);
    let constant = match kind {
        ValueKind::Ordinary => {
            NamedConstant::identify(value.abs(), settings.analysis.constant_tolerance)
        }
        _ => None,
    };
    let class = classify(&sampled_digits, value);

    debug!(
        "GO {}: {:?}, {} significant digits, pattern {:?}, constant {:?}, class {}",
        value,
        kind,
        significant_digits,
        pattern.as_ref().map(|p| p.period),
        constant,
        class
    );
    GoReport {
        value,
        desired_precision,
        kind,
        sampled_digits,
        significant_digits,
        pattern,
        constant,
        class,
    }
}

impl GoReport {
    fn short_pattern(&self) -> Option<&RepeatingPattern> {
        self.pattern.as_ref().filter(|p| p.period < SHORT_PERIOD)
    }

    /// Algorithm most likely to have produced this value
    pub fn signature(&self) -> &'static AlgorithmSignature {
        let name = match (self.kind, self.constant) {
            (ValueKind::Ordinary, Some(NamedConstant::Pi)) => "machin_pi",
            (ValueKind::Ordinary, Some(NamedConstant::E)) => "taylor_e",
            (ValueKind::Ordinary, Some(NamedConstant::Sqrt2 | NamedConstant::GoldenRatio)) => {
                "newton_sqrt"
            }
            (ValueKind::Ordinary, Some(NamedConstant::EulerGamma)) => "agm_log",
            (ValueKind::Ordinary, None) if self.pattern.is_some() => "rational",
            (ValueKind::Ordinary, None) => match self.class {
                PatternClass::Repeating | PatternClass::Cyclic | PatternClass::Unknown => {
                    "rational"
                }
                PatternClass::Algebraic | PatternClass::Fibonacci => "newton_sqrt",
                PatternClass::Prime => "prime_sieve",
                PatternClass::Fractal => "mandelbrot",
                PatternClass::Chaotic => "logistic_map",
                PatternClass::Transcendental => "cordic_trig",
            },
            _ => "literal",
        };
        AlgorithmSignature::by_name(name).unwrap_or(&signature::LITERAL)
    }

    /// GET: match an algorithm signature and estimate its cost
    pub fn get(self) -> GetReport {
        let signature = self.signature();
        let trace = signature.trace(self.desired_precision);
        debug!(
            "GET {}: {} {}, trace {:?}",
            self.value,
            signature,
            signature.complexity_class(),
            trace
        );
        GetReport {
            signature,
            trace,
            complexity: signature.complexity(),
            complexity_class: signature.complexity_class(),
            go: self,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetReport {
    pub go: GoReport,
    pub signature: &'static AlgorithmSignature,
    pub trace: ComputationalTrace,
    pub complexity: u64,
    pub complexity_class: ComplexityClass,
}

impl GetReport {
    /// GAP: achievable precision and confidence
    pub fn gap(self) -> GapReport {
        let mut precision = if self.complexity > 100 {
            10
        } else if self.complexity > 50 {
            12
        } else {
            BASE_PRECISION
        };
        precision = precision
            .saturating_sub(self.trace.quantum_ops)
            .max(MIN_PRECISION);
        if self.go.short_pattern().is_some() {
            precision += 5;
        }

        let mut confidence = 0.99
            - self.complexity as f64 / 1000.0
            - f64::from(self.trace.quantum_ops) * 0.05;
        if self.go.pattern.is_some() {
            confidence += 0.02;
        }
        let confidence = confidence.clamp(0.1, 0.99);

        debug!(
            "GAP {}: {} achievable digits at confidence {:.3}",
            self.go.value, precision, confidence
        );
        GapReport {
            get: self,
            achievable_precision: precision,
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapReport {
    pub get: GetReport,
    pub achievable_precision: u32,
    pub confidence: f64,
}

impl GapReport {
    fn infer_barrier(&self) -> Barrier {
        let go = &self.get.go;
        match go.kind {
            ValueKind::NaN => return Barrier::Undefined,
            ValueKind::Infinite => return Barrier::Infinity,
            ValueKind::Zero | ValueKind::Integer => return Barrier::Exact,
            ValueKind::Ordinary => {}
        }
        match go.constant {
            Some(NamedConstant::Pi) => return Barrier::Quantum,
            Some(NamedConstant::E) => return Barrier::Temporal,
            _ => {}
        }
        let trace = &self.get.trace;
        if trace.quantum_ops > 3 {
            Barrier::Quantum
        } else if trace.memory_accesses > 50 {
            Barrier::Storage
        } else if trace.energy_estimate > 0.0005 {
            Barrier::Energy
        } else if self.get.complexity > 1000 {
            Barrier::Temporal
        } else {
            Barrier::Computational
        }
    }

    /// GLIMPSE: barrier, gap magnitude and terminal pattern marking
    pub fn glimpse(self) -> GlimpseReport {
        let barrier = self.infer_barrier();
        let barrier_magnitude = match barrier {
            Barrier::Exact => GapMagnitude::ZERO,
            Barrier::Infinity | Barrier::Undefined => GapMagnitude::UNBOUNDED,
            _ => GapMagnitude::from_exponent(self.achievable_precision),
        };
        let terminal_pattern = self.get.go.short_pattern().is_some();
        debug!(
            "GLIMPSE {}: {} barrier at {}, terminal pattern {}",
            self.get.go.value, barrier, barrier_magnitude, terminal_pattern
        );
        GlimpseReport {
            gap: self,
            barrier,
            barrier_magnitude,
            terminal_pattern,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlimpseReport {
    pub gap: GapReport,
    pub barrier: Barrier,
    pub barrier_magnitude: GapMagnitude,
    pub terminal_pattern: bool,
}

impl GlimpseReport {
    fn go(&self) -> &GoReport {
        &self.gap.get.go
    }

    /// Fractional digits for the known prefix. Past the sampled digits a
    /// pattern that runs to the end of the sample keeps repeating.
    fn fraction_digits(&self, count: usize) -> String {
        let go = self.go();
        if count <= go.sampled_digits.len() {
            return go.sampled_digits[..count].to_string();
        }
        match go.pattern.as_ref().filter(|p| runs_to_end(p, &go.sampled_digits)) {
            Some(pattern) => {
                let unit = pattern.unit.as_bytes();
                let mut digits = go.sampled_digits.clone();
                for i in digits.len()..count {
                    digits.push(char::from(unit[(i - pattern.start) % pattern.period]));
                }
                digits
            }
            None => sample_fraction(go.value, count),
        }
    }

    fn known_digits(&self) -> String {
        let value = self.go().value;
        let sign = if value < 0.0 { "-" } else { "" };
        let whole = format!("{:.0}", value.abs().trunc());
        let precision = self.gap.achievable_precision as usize;
        // Fractional digits give way to the integer part within the known capacity
        let room = config::max_known_digits().saturating_sub(sign.len() + whole.len() + 1);
        let count = precision.min(room);
        if count < precision {
            warn!(
                "GUESS {}: {} integer digits leave room for {} of {} fractional digits",
                value,
                whole.len(),
                count,
                precision
            );
        }
        if count == 0 {
            return format!("{}{}", sign, whole);
        }
        format!("{}{}.{}", sign, whole, self.fraction_digits(count))
    }

    fn terminal(&self) -> (Terminal, Option<TerminalStrategy>, Option<f64>) {
        if self.barrier == Barrier::Quantum {
            return (Terminal::Superposition, None, None);
        }
        if self.terminal_pattern {
            if let Some(pattern) = self.go().pattern.as_ref() {
                return (Terminal::Digits(pattern.unit.clone()), None, None);
            }
        }
        let start = 2 * self.gap.achievable_precision as usize + 1;
        let extraction = extract_terminal(
            self.go().value,
            self.barrier,
            self.go().class,
            start,
            TERMINAL_DIGITS,
        );
        (
            extraction.to_terminal(),
            Some(extraction.strategy),
            Some(extraction.stability),
        )
    }

    /// GUESS: assemble the final Solid Number and its explanation
    pub fn guess(self) -> Guess {
        let value = self.go().value;
        let confidence = Confidence::from_fraction(self.gap.confidence);
        let (result, terminal_strategy, terminal_stability) = match self.go().kind {
            ValueKind::NaN => (SolidNumber::undefined(Confidence::NONE), None, None),
            ValueKind::Infinite => (
                SolidNumber::infinity(value < 0.0, confidence, Terminal::Superposition),
                None,
                None,
            ),
            ValueKind::Zero => (SolidNumber::exact("0"), None, None),
            ValueKind::Integer => (SolidNumber::exact(format!("{:.0}", value)), None, None),
            ValueKind::Ordinary => {
                let (terminal, strategy, stability) = self.terminal();
                let result = SolidNumber::with_gap(
                    self.known_digits(),
                    self.barrier,
                    self.barrier_magnitude,
                    confidence,
                    terminal,
                );
                (result, strategy, stability)
            }
        };

        let explanation = format!(
            "{} via {} ({}): {} significant digits, {} barrier at {}, confidence {:.1}%",
            value,
            self.gap.get.signature,
            self.gap.get.complexity_class,
            self.go().significant_digits,
            result.barrier(),
            result.gap_magnitude(),
            result.confidence().as_fraction() * 100.0
        );
        debug!("GUESS {}: {}", value, result);
        Guess {
            glimpse: self,
            result,
            terminal_strategy,
            terminal_stability,
            explanation,
        }
    }
}

fn runs_to_end(pattern: &RepeatingPattern, digits: &str) -> bool {
    let unit = pattern.unit.as_bytes();
    digits
        .bytes()
        .enumerate()
        .skip(pattern.start)
        .all(|(i, b)| b == unit[(i - pattern.start) % pattern.period])
}

#[derive(Debug, Clone, PartialEq)]
pub struct Guess {
    pub glimpse: GlimpseReport,
    pub result: SolidNumber,
    pub terminal_strategy: Option<TerminalStrategy>,
    pub terminal_stability: Option<f64>,
    pub explanation: String,
}
