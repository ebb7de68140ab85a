//! Pattern and terminal analysis
//!
//! Digit-string detectors and classifiers used by the GGGX oracle, plus the
//! terminal-digit extraction strategies and the modular arithmetic they rely on.

pub mod classify;
pub mod constants;
pub mod modular;
pub mod pattern;
pub mod terminal;

pub use classify::{chi_squared_uniformity, classify, shannon_entropy, PatternClass};
pub use constants::NamedConstant;
pub use pattern::{find_cyclic_pattern, find_repeating_pattern, CyclicPattern, RepeatingPattern};
pub use terminal::{extract_terminal, TerminalExtraction, TerminalStrategy};
