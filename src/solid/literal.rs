//! Solid Number literals as handed over by the parser.
//!
//! The parser does not build `SolidNumber`s itself. It records offsets into
//! the source text together with the barrier letter, gap, confidence and
//! terminal kind, and the value store turns that descriptor into a value.

use crate::error::{Result, SolidError};
use crate::solid::{Barrier, Confidence, GapMagnitude, SolidNumber, Terminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Digits,
    EmptySet,
    Superposition,
}

/// Literal fields captured by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstSolidLiteral {
    pub known_offset: usize,
    pub known_len: usize,
    pub barrier: char,
    pub gap_magnitude: u64,
    pub confidence: u16,
    pub terminal_offset: usize,
    pub terminal_len: usize,
    pub terminal_kind: TerminalKind,
}

impl AstSolidLiteral {
    /// Descriptor for an exact literal spanning `offset..offset+len`
    pub fn exact(offset: usize, len: usize) -> Self {
        Self {
            known_offset: offset,
            known_len: len,
            barrier: Barrier::Exact.letter(),
            gap_magnitude: 0,
            confidence: 1000,
            terminal_offset: 0,
            terminal_len: 0,
            terminal_kind: TerminalKind::Digits,
        }
    }
}

fn slice<'a>(source: &'a str, offset: usize, len: usize, field: &str) -> Result<&'a str> {
    offset
        .checked_add(len)
        .and_then(|end| source.get(offset..end))
        .ok_or_else(|| {
            SolidError::invalid_operand(format!(
                "{} span {}..{} is outside the source text",
                field,
                offset,
                offset.saturating_add(len)
            ))
        })
}

impl SolidNumber {
    /// Build a value from a parser literal descriptor
    pub fn from_ast(literal: &AstSolidLiteral, source: &str) -> Result<Self> {
        let known = slice(source, literal.known_offset, literal.known_len, "known digits")?;
        let barrier = Barrier::from_letter(literal.barrier).ok_or_else(|| {
            SolidError::invalid_operand(format!("unknown barrier letter '{}'", literal.barrier))
        })?;

        if barrier == Barrier::Exact {
            return Ok(SolidNumber::exact(known));
        }

        let terminal = match literal.terminal_kind {
            TerminalKind::Digits => Terminal::Digits(
                slice(source, literal.terminal_offset, literal.terminal_len, "terminal digits")?
                    .to_string(),
            ),
            TerminalKind::EmptySet => Terminal::EmptySet,
            TerminalKind::Superposition => Terminal::Superposition,
        };

        Ok(SolidNumber::with_gap(
            known,
            barrier,
            GapMagnitude::new(literal.gap_magnitude),
            Confidence::new(u64::from(literal.confidence)),
            terminal,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gapped_literal() {
        let source = "let x = 3.14159...(q:10^6|950/1000)...26535;";
        let literal = AstSolidLiteral {
            known_offset: 8,
            known_len: 7,
            barrier: 'q',
            gap_magnitude: 1_000_000,
            confidence: 950,
            terminal_offset: 38,
            terminal_len: 5,
            terminal_kind: TerminalKind::Digits,
        };
        let value = SolidNumber::from_ast(&literal, source).unwrap();
        assert_eq!(value.known_digits(), "3.14159");
        assert_eq!(value.barrier(), Barrier::Quantum);
        assert_eq!(value.terminal_digits(), "26535");
        assert_eq!(value.to_debug_string(), "3.14159...(q:10^6|950/1000)...26535");
    }

    #[test]
    fn test_exact_literal() {
        let value = SolidNumber::from_ast(&AstSolidLiteral::exact(0, 2), "42;").unwrap();
        assert!(value.is_exact());
        assert_eq!(value.known_digits(), "42");
    }

    #[test]
    fn test_invalid_literals() {
        let mut literal = AstSolidLiteral::exact(10, 5);
        assert!(SolidNumber::from_ast(&literal, "short").is_err());

        literal = AstSolidLiteral::exact(0, 1);
        literal.barrier = 'z';
        assert!(matches!(
            SolidNumber::from_ast(&literal, "1"),
            Err(SolidError::InvalidOperand { .. })
        ));
    }
}
