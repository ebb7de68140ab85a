use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, SolidError>;

/// Failure taxonomy for the Solid Number core.
///
/// Undefined arithmetic is not represented here: an undefined result is an
/// ordinary `SolidNumber` tagged `Barrier::Undefined`. The `UndefinedResult`
/// variant exists for callers that explicitly demand a defined value (see
/// `SolidNumber::require_defined`).
#[derive(Error, Debug)]
pub enum SolidError {
    #[error("Solid number pool exhausted (capacity {capacity})")]
    AllocationExhausted { capacity: usize },

    #[error("Undefined result from {operation}")]
    UndefinedResult { operation: String },

    #[error("Result is not exact: {reason}")]
    NotExact { reason: String },

    #[error("GGGX phase {phase} requires {requires} to complete first")]
    PhaseOrderViolation {
        phase: &'static str,
        requires: &'static str,
    },

    #[error("Invalid operand: {message}")]
    InvalidOperand { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SolidError {
    pub fn not_exact(reason: impl Into<String>) -> Self {
        SolidError::NotExact {
            reason: reason.into(),
        }
    }

    pub fn invalid_operand(message: impl Into<String>) -> Self {
        SolidError::InvalidOperand {
            message: message.into(),
        }
    }

    /// True for failures that are local to a single call and never travel
    /// through arithmetic as data.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SolidError::AllocationExhausted { .. } | SolidError::PhaseOrderViolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SolidError::AllocationExhausted { capacity: 8 };
        assert_eq!(err.to_string(), "Solid number pool exhausted (capacity 8)");

        let err = SolidError::PhaseOrderViolation {
            phase: "GAP",
            requires: "GET",
        };
        assert_eq!(err.to_string(), "GGGX phase GAP requires GET to complete first");
    }

    #[test]
    fn test_local_failures() {
        assert!(SolidError::AllocationExhausted { capacity: 1 }.is_local());
        assert!(!SolidError::not_exact("1/3").is_local());
        assert!(!SolidError::invalid_operand("missing").is_local());
    }
}
