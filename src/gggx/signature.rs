//! Algorithm signatures and computational cost estimates
//!
//! GET matches an analyzed value against the algorithms that would produce
//! its digits and synthesizes a `ComputationalTrace` from the matched
//! signature. The trace drives GAP (precision and confidence) and GLIMPSE
//! (barrier inference).

use std::fmt;

/// Energy per unit of complexity, in joules
const ENERGY_PER_COMPLEXITY: f64 = 1e-7;

/// Cost model of one digit-producing algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgorithmSignature {
    pub name: &'static str,
    pub base_cost: u64,
    /// Polynomial degree of the cost in the number of digits
    pub scaling_factor: u32,
    pub quantum: bool,
    pub energy_multiplier: f64,
    /// The inner loop is dominated by divisions
    pub divides: bool,
    /// Memory accesses per requested digit
    pub memory_factor: f64,
}

pub const LITERAL: AlgorithmSignature = AlgorithmSignature {
    name: "literal",
    base_cost: 1,
    scaling_factor: 0,
    quantum: false,
    energy_multiplier: 0.1,
    divides: false,
    memory_factor: 0.0,
};

pub const RATIONAL: AlgorithmSignature = AlgorithmSignature {
    name: "rational",
    base_cost: 10,
    scaling_factor: 1,
    quantum: false,
    energy_multiplier: 1.0,
    divides: true,
    memory_factor: 0.5,
};

pub const NEWTON_SQRT: AlgorithmSignature = AlgorithmSignature {
    name: "newton_sqrt",
    base_cost: 25,
    scaling_factor: 2,
    quantum: false,
    energy_multiplier: 1.2,
    divides: true,
    memory_factor: 1.0,
};

pub const MACHIN_PI: AlgorithmSignature = AlgorithmSignature {
    name: "machin_pi",
    base_cost: 200,
    scaling_factor: 2,
    quantum: true,
    energy_multiplier: 2.0,
    divides: true,
    memory_factor: 2.0,
};

pub const TAYLOR_E: AlgorithmSignature = AlgorithmSignature {
    name: "taylor_e",
    base_cost: 100,
    scaling_factor: 2,
    quantum: false,
    energy_multiplier: 1.5,
    divides: true,
    memory_factor: 1.5,
};

pub const AGM_LOG: AlgorithmSignature = AlgorithmSignature {
    name: "agm_log",
    base_cost: 300,
    scaling_factor: 2,
    quantum: false,
    energy_multiplier: 2.5,
    divides: true,
    memory_factor: 2.0,
};

pub const CORDIC_TRIG: AlgorithmSignature = AlgorithmSignature {
    name: "cordic_trig",
    base_cost: 150,
    scaling_factor: 1,
    quantum: false,
    energy_multiplier: 1.8,
    divides: false,
    memory_factor: 1.0,
};

pub const PRIME_SIEVE: AlgorithmSignature = AlgorithmSignature {
    name: "prime_sieve",
    base_cost: 500,
    scaling_factor: 3,
    quantum: false,
    energy_multiplier: 3.0,
    divides: false,
    memory_factor: 20.0,
};

pub const LOGISTIC_MAP: AlgorithmSignature = AlgorithmSignature {
    name: "logistic_map",
    base_cost: 1000,
    scaling_factor: 3,
    quantum: false,
    energy_multiplier: 1.0,
    divides: false,
    memory_factor: 0.5,
};

pub const MANDELBROT: AlgorithmSignature = AlgorithmSignature {
    name: "mandelbrot",
    base_cost: 2000,
    scaling_factor: 4,
    quantum: false,
    energy_multiplier: 5.0,
    divides: false,
    memory_factor: 1.0,
};

pub static SIGNATURES: [AlgorithmSignature; 10] = [
    LITERAL,
    RATIONAL,
    NEWTON_SQRT,
    MACHIN_PI,
    TAYLOR_E,
    AGM_LOG,
    CORDIC_TRIG,
    PRIME_SIEVE,
    LOGISTIC_MAP,
    MANDELBROT,
];

impl AlgorithmSignature {
    pub fn by_name(name: &str) -> Option<&'static AlgorithmSignature> {
        SIGNATURES.iter().find(|s| s.name == name)
    }

    /// Single-number complexity score: `base_cost · max(scaling, 1)`
    pub fn complexity(&self) -> u64 {
        self.base_cost * u64::from(self.scaling_factor.max(1))
    }

    pub fn complexity_class(&self) -> ComplexityClass {
        match self.scaling_factor {
            0 => ComplexityClass::Constant,
            1 => ComplexityClass::Linear,
            2 if self.divides => ComplexityClass::Linearithmic,
            s if s >= 3 => ComplexityClass::Quadratic,
            _ => ComplexityClass::Linear,
        }
    }

    /// Synthesize resource estimates for producing `digits` digits
    pub fn trace(&self, digits: u32) -> ComputationalTrace {
        let n = u64::from(digits.max(1));
        let complexity = self.complexity();
        let instructions = complexity.saturating_mul(n);
        let memory_accesses = (self.memory_factor * n as f64) as u64;
        let branches = instructions / 8;
        let quantum_ops = if self.quantum {
            self.scaling_factor * 2
        } else {
            0
        };
        ComputationalTrace {
            instructions,
            memory_accesses,
            branches,
            quantum_ops,
            energy_estimate: complexity as f64 * self.energy_multiplier * ENERGY_PER_COMPLEXITY,
            cycles: instructions
                .saturating_add(memory_accesses.saturating_mul(4))
                .saturating_add(branches),
        }
    }
}

impl fmt::Display for AlgorithmSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexityClass {
    Constant,
    Linear,
    Linearithmic,
    Quadratic,
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ComplexityClass::Constant => "O(1)",
            ComplexityClass::Linear => "O(n)",
            ComplexityClass::Linearithmic => "O(n log n)",
            ComplexityClass::Quadratic => "O(n²)",
        };
        f.write_str(text)
    }
}

/// Estimated resources needed to produce the requested digits
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComputationalTrace {
    pub instructions: u64,
    pub memory_accesses: u64,
    pub branches: u64,
    pub quantum_ops: u32,
    /// Joules
    pub energy_estimate: f64,
    pub cycles: u64,
}
