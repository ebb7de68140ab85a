use blaze_solid::analysis::{NamedConstant, TerminalStrategy};
use blaze_solid::gggx::{self, ComplexityClass, GggxResult, Phase};
use blaze_solid::{analyze, Barrier, SolidError, SolidNumber, Terminal};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::f64::consts::{E, PI, SQRT_2};

#[test]
fn pi_is_quantum_with_a_superposed_tail() {
    let result = analyze(PI, 15);
    assert_eq!(result.constant, Some(NamedConstant::Pi));
    assert_eq!(result.algorithm, Some("machin_pi"));
    assert_eq!(result.complexity_class, Some(ComplexityClass::Linearithmic));
    assert_eq!(result.barrier, Some(Barrier::Quantum));

    let value = result.result.unwrap();
    assert_eq!(value.known_digits(), "3.141592");
    assert_eq!(value.terminal(), &Terminal::Superposition);
    assert!(result.explanation.contains("machin_pi"));
    assert!(result.explanation.contains("quantum"));
}

#[test]
fn e_is_temporal_with_an_iterated_tail() {
    let result = analyze(E, 15);
    assert_eq!(result.barrier, Some(Barrier::Temporal));
    assert_eq!(result.achievable_precision, 10);
    assert_eq!(
        result.terminal_info.strategy,
        Some(TerminalStrategy::IterativeMap)
    );
    let value = result.result.unwrap();
    assert_eq!(value.known_digits(), "2.7182818284");
    assert_eq!(value.terminal_digits().len(), gggx::phases::TERMINAL_DIGITS);
}

#[test]
fn short_patterns_become_the_terminal() {
    let result = analyze(1.0 / 7.0, 15);
    assert_eq!(result.pattern_period, None);

    let result = analyze(0.121_212_121_212_12, 15);
    assert_eq!(result.pattern_period, Some(2));
    assert!(result.terminal_info.pattern_marked);
    assert_eq!(result.achievable_precision, 20);
}

#[test]
fn sqrt_two_uses_continued_fraction_terminal() {
    let result = analyze(SQRT_2, 15);
    assert_eq!(result.algorithm, Some("newton_sqrt"));
    assert_eq!(result.barrier, Some(Barrier::Computational));
    assert_eq!(
        result.terminal_info.strategy,
        Some(TerminalStrategy::ContinuedFraction)
    );
    assert!(result.terminal_info.stability.is_some());
}

#[test]
fn phases_driven_by_hand_match_analyze() {
    let mut result = GggxResult::new(0.75, 15);
    for phase in Phase::ALL {
        result.run_phase(phase).unwrap();
    }
    assert_eq!(result, analyze(0.75, 15));
}

#[test]
fn skipped_phase_is_a_local_failure() {
    let mut result = GggxResult::new(0.75, 15);
    let err = result.run_phase(Phase::Guess).unwrap_err();
    assert!(matches!(err, SolidError::PhaseOrderViolation { phase: "guess", .. }));
    assert!(err.is_local());
    assert_eq!(result.phases_completed, [false; 5]);
    assert_eq!(result.result, None);
}

#[test]
fn integers_resolve_exactly() {
    let result = analyze(-65536.0, 15);
    assert_eq!(result.result, Some(SolidNumber::exact("-65536")));
    assert_eq!(result.significant_digits, 5);
}

proptest! {
    #[test]
    fn finite_values_complete_every_phase(value in -1.0e6f64..1.0e6) {
        let result = analyze(value, 15);
        prop_assert!(result.is_complete());
        prop_assert!(result.confidence >= 0.1 && result.confidence <= 0.99);
        prop_assert!(result.achievable_precision >= gggx::phases::MIN_PRECISION);
        let solid = result.result.unwrap();
        prop_assert!(!solid.is_undefined());
    }
}
