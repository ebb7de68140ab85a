//! Named mathematical constants recognized by the oracle

use std::f64::consts;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedConstant {
    Pi,
    E,
    Sqrt2,
    GoldenRatio,
    EulerGamma,
}

impl NamedConstant {
    pub const ALL: [NamedConstant; 5] = [
        NamedConstant::Pi,
        NamedConstant::E,
        NamedConstant::Sqrt2,
        NamedConstant::GoldenRatio,
        NamedConstant::EulerGamma,
    ];

    pub fn value(self) -> f64 {
        match self {
            NamedConstant::Pi => consts::PI,
            NamedConstant::E => consts::E,
            NamedConstant::Sqrt2 => consts::SQRT_2,
            NamedConstant::GoldenRatio => 1.618_033_988_749_895,
            NamedConstant::EulerGamma => 0.577_215_664_901_532_9,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            NamedConstant::Pi => "π",
            NamedConstant::E => "e",
            NamedConstant::Sqrt2 => "√2",
            NamedConstant::GoldenRatio => "φ",
            NamedConstant::EulerGamma => "γ",
        }
    }

    /// Constants whose digits are produced by a series rather than a root-finder
    pub fn is_transcendental(self) -> bool {
        matches!(
            self,
            NamedConstant::Pi | NamedConstant::E | NamedConstant::EulerGamma
        )
    }

    /// Match `value` against the table within `tolerance`
    pub fn identify(value: f64, tolerance: f64) -> Option<Self> {
        NamedConstant::ALL
            .into_iter()
            .find(|c| (value - c.value()).abs() < tolerance)
    }
}

impl fmt::Display for NamedConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify() {
        assert_eq!(NamedConstant::identify(consts::PI, 1e-10), Some(NamedConstant::Pi));
        assert_eq!(NamedConstant::identify(2.718281828459045, 1e-10), Some(NamedConstant::E));
        assert_eq!(
            NamedConstant::identify((1.0 + 5f64.sqrt()) / 2.0, 1e-10),
            Some(NamedConstant::GoldenRatio)
        );
        assert_eq!(NamedConstant::identify(3.1416, 1e-10), None);
    }
}
