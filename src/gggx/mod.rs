//! # GGGX oracle
//!
//! Go, Get, Gap, Glimpse, Guess: turns a raw `f64` into a `SolidNumber` by
//! estimating how expensive the value's digits are to produce and how many
//! of them can be trusted.
//!
//! Two entry points share the same phase logic:
//!
//! - [`phases::go`] starts the typed pipeline, where each phase consumes
//!   the report of the one before it.
//! - [`GggxResult`] runs the phases one at a time behind a completion
//!   record. [`analyze`] runs all five.
//!
//! ```text
//! GO ──▶ GET ──▶ GAP ──▶ GLIMPSE ──▶ GUESS
//! kind   signature precision barrier  SolidNumber
//! digits trace     confidence terminal explanation
//! ```

pub mod phases;
pub mod signature;

use std::fmt;
use std::mem;

use log::{debug, warn};

use crate::analysis::{NamedConstant, PatternClass, TerminalStrategy};
use crate::config;
use crate::error::{Result, SolidError};
use crate::solid::{Barrier, GapMagnitude, SolidNumber, Terminal};

pub use phases::{
    go, GapReport, GetReport, GlimpseReport, GoReport, Guess, ValueKind,
};
pub use signature::{AlgorithmSignature, ComplexityClass, ComputationalTrace, SIGNATURES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Go,
    Get,
    Gap,
    Glimpse,
    Guess,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Go,
        Phase::Get,
        Phase::Gap,
        Phase::Glimpse,
        Phase::Guess,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Go => "go",
            Phase::Get => "get",
            Phase::Gap => "gap",
            Phase::Glimpse => "glimpse",
            Phase::Guess => "guess",
        }
    }

    /// Position in the completion record
    pub fn index(self) -> usize {
        match self {
            Phase::Go => 0,
            Phase::Get => 1,
            Phase::Gap => 2,
            Phase::Glimpse => 3,
            Phase::Guess => 4,
        }
    }

    /// Phase that must have completed first
    pub fn requires(self) -> Option<Phase> {
        match self {
            Phase::Go => None,
            Phase::Get => Some(Phase::Go),
            Phase::Gap => Some(Phase::Get),
            Phase::Glimpse => Some(Phase::Gap),
            Phase::Guess => Some(Phase::Glimpse),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What GLIMPSE and GUESS learned about the digits past the gap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerminalInfo {
    /// A short repeating pattern will be used as the terminal
    pub pattern_marked: bool,
    pub terminal: Option<Terminal>,
    /// Extraction strategy, when the terminal was not taken from a pattern
    pub strategy: Option<TerminalStrategy>,
    pub stability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Fresh,
    Went(GoReport),
    Got(GetReport),
    Gapped(GapReport),
    Glimpsed(GlimpseReport),
    Done,
}

/// Runtime record of one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct GggxResult {
    pub value: f64,
    pub desired_precision: u32,
    pub phases_completed: [bool; 5],

    // GO
    pub significant_digits: u32,
    pub has_pattern: bool,
    pub pattern_period: Option<usize>,
    pub constant: Option<NamedConstant>,
    pub class: Option<PatternClass>,

    // GET
    pub algorithm: Option<&'static str>,
    pub trace: ComputationalTrace,
    pub algorithm_complexity: u64,
    pub complexity_class: Option<ComplexityClass>,

    // GAP
    pub achievable_precision: u32,
    pub confidence: f64,

    // GLIMPSE
    pub barrier: Option<Barrier>,
    pub barrier_magnitude: GapMagnitude,

    // GUESS
    pub terminal_info: TerminalInfo,
    pub result: Option<SolidNumber>,
    pub explanation: String,

    stage: Stage,
}

impl GggxResult {
    pub fn new(value: f64, desired_precision: u32) -> Self {
        Self {
            value,
            desired_precision,
            phases_completed: [false; 5],
            significant_digits: 0,
            has_pattern: false,
            pattern_period: None,
            constant: None,
            class: None,
            algorithm: None,
            trace: ComputationalTrace::default(),
            algorithm_complexity: 0,
            complexity_class: None,
            achievable_precision: 0,
            confidence: 0.0,
            barrier: None,
            barrier_magnitude: GapMagnitude::ZERO,
            terminal_info: TerminalInfo::default(),
            result: None,
            explanation: String::new(),
            stage: Stage::Fresh,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phases_completed.iter().all(|&done| done)
    }

    /// Next phase allowed to run, if any
    pub fn next_phase(&self) -> Option<Phase> {
        Phase::ALL
            .into_iter()
            .find(|phase| !self.phases_completed[phase.index()])
    }

    /// Run one phase. A phase run out of order, or a second time, fails
    /// without touching the record.
    pub fn run_phase(&mut self, phase: Phase) -> Result<()> {
        let stage = mem::replace(&mut self.stage, Stage::Fresh);
        let next = match (phase, stage) {
            (Phase::Go, Stage::Fresh) => {
                let report = phases::go(self.value, self.desired_precision);
                self.record_go(&report);
                Stage::Went(report)
            }
            (Phase::Get, Stage::Went(report)) => {
                let report = report.get();
                self.record_get(&report);
                Stage::Got(report)
            }
            (Phase::Gap, Stage::Got(report)) => {
                let report = report.gap();
                self.achievable_precision = report.achievable_precision;
                self.confidence = report.confidence;
                Stage::Gapped(report)
            }
            (Phase::Glimpse, Stage::Gapped(report)) => {
                let report = report.glimpse();
                self.barrier = Some(report.barrier);
                self.barrier_magnitude = report.barrier_magnitude;
                self.terminal_info.pattern_marked = report.terminal_pattern;
                Stage::Glimpsed(report)
            }
            (Phase::Guess, Stage::Glimpsed(report)) => {
                let guess = report.guess();
                self.record_guess(guess);
                Stage::Done
            }
            (_, stage) => {
                self.stage = stage;
                let requires = match phase.requires() {
                    Some(required) if !self.phases_completed[required.index()] => required.name(),
                    _ => "a fresh analysis",
                };
                warn!(
                    "GGGX phase {} rejected for {}: requires {}",
                    phase, self.value, requires
                );
                return Err(SolidError::PhaseOrderViolation {
                    phase: phase.name(),
                    requires,
                });
            }
        };
        self.stage = next;
        self.phases_completed[phase.index()] = true;
        debug!("GGGX {} completed for {}", phase, self.value);
        Ok(())
    }

    pub fn go_phase(&mut self) -> bool {
        self.run_phase(Phase::Go).is_ok()
    }

    pub fn get_phase(&mut self) -> bool {
        self.run_phase(Phase::Get).is_ok()
    }

    pub fn gap_phase(&mut self) -> bool {
        self.run_phase(Phase::Gap).is_ok()
    }

    pub fn glimpse_phase(&mut self) -> bool {
        self.run_phase(Phase::Glimpse).is_ok()
    }

    pub fn guess_phase(&mut self) -> bool {
        self.run_phase(Phase::Guess).is_ok()
    }

    fn record_go(&mut self, report: &GoReport) {
        self.significant_digits = report.significant_digits;
        self.has_pattern = report.pattern.is_some();
        self.pattern_period = report.pattern.as_ref().map(|p| p.period);
        self.constant = report.constant;
        self.class = Some(report.class);
    }

    fn record_get(&mut self, report: &GetReport) {
        self.algorithm = Some(report.signature.name);
        self.trace = report.trace;
        self.algorithm_complexity = report.complexity;
        self.complexity_class = Some(report.complexity_class);
    }

    fn record_guess(&mut self, guess: Guess) {
        self.terminal_info.terminal = Some(guess.result.terminal().clone());
        self.terminal_info.strategy = guess.terminal_strategy;
        self.terminal_info.stability = guess.terminal_stability;
        self.explanation = guess.explanation;
        self.result = Some(guess.result);
    }
}

/// Run all five phases. A `desired_precision` of 0 uses the configured default.
pub fn analyze(value: f64, desired_precision: u32) -> GggxResult {
    let desired_precision = if desired_precision == 0 {
        config::current().analysis.default_precision
    } else {
        desired_precision
    };
    let mut result = GggxResult::new(value, desired_precision);
    for phase in Phase::ALL {
        if let Err(err) = result.run_phase(phase) {
            warn!("GGGX analysis of {} stopped: {}", value, err);
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{E, PI};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_phase_order_is_enforced() {
        init_logger();
        let mut result = GggxResult::new(0.5, 15);
        assert!(!result.gap_phase());
        assert_eq!(result.phases_completed, [false; 5]);

        assert!(result.go_phase());
        assert!(!result.go_phase());
        assert!(!result.glimpse_phase());
        assert_eq!(result.phases_completed, [true, false, false, false, false]);
        assert_eq!(result.next_phase(), Some(Phase::Get));

        assert!(result.get_phase());
        assert!(result.gap_phase());
        assert!(result.glimpse_phase());
        assert!(result.guess_phase());
        assert!(result.is_complete());
        assert_eq!(result.next_phase(), None);
        assert!(!result.guess_phase());
    }

    #[test]
    fn test_violation_names_missing_phase() {
        let mut result = GggxResult::new(0.5, 15);
        match result.run_phase(Phase::Glimpse) {
            Err(SolidError::PhaseOrderViolation { phase, requires }) => {
                assert_eq!(phase, "glimpse");
                assert_eq!(requires, "gap");
            }
            other => panic!("unexpected {:?}", other),
        }
        // the stage survives a rejected phase
        assert!(result.go_phase());
    }

    #[test]
    fn test_analyze_one_third() {
        let result = analyze(1.0 / 3.0, 15);
        assert!(result.is_complete());
        assert!(result.has_pattern);
        assert_eq!(result.pattern_period, Some(1));
        assert_eq!(result.algorithm, Some("rational"));
        assert_eq!(result.barrier, Some(Barrier::Computational));
        assert!(result.terminal_info.pattern_marked);
        assert_eq!(
            result.result.as_ref().map(|r| r.terminal_digits().to_string()),
            Some("3".to_string())
        );
    }

    #[test]
    fn test_analyze_named_constants() {
        let pi = analyze(PI, 15);
        assert_eq!(pi.barrier, Some(Barrier::Quantum));
        assert_eq!(pi.constant, Some(NamedConstant::Pi));
        assert_eq!(pi.terminal_info.terminal, Some(Terminal::Superposition));

        let e = analyze(E, 15);
        assert_eq!(e.barrier, Some(Barrier::Temporal));
        assert_eq!(e.terminal_info.strategy, Some(TerminalStrategy::IterativeMap));
    }

    #[test]
    fn test_analyze_special_values() {
        let integer = analyze(42.0, 15);
        assert_eq!(integer.barrier, Some(Barrier::Exact));
        assert_eq!(integer.result, Some(SolidNumber::exact("42")));

        let nan = analyze(f64::NAN, 15);
        assert_eq!(nan.barrier, Some(Barrier::Undefined));
        assert!(nan.result.as_ref().is_some_and(|r| r.is_undefined()));

        let inf = analyze(f64::NEG_INFINITY, 15);
        assert_eq!(inf.barrier, Some(Barrier::Infinity));
        assert!(inf.result.as_ref().is_some_and(|r| r.is_infinity()));
        assert_eq!(inf.barrier_magnitude, GapMagnitude::UNBOUNDED);
    }

    #[test]
    fn test_runtime_matches_typed_pipeline() {
        let typed = go(0.1, 15).get().gap().glimpse().guess();
        let runtime = analyze(0.1, 15);
        assert_eq!(runtime.result.as_ref(), Some(&typed.result));
        assert_eq!(runtime.explanation, typed.explanation);
    }

    #[test]
    fn test_zero_precision_uses_default() {
        let result = analyze(0.25, 0);
        assert_eq!(
            result.desired_precision,
            config::current().analysis.default_precision
        );
    }
}
