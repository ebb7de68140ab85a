//! Solid Number Configuration
//!
//! Capacities of the value store and defaults used by the GGGX oracle.
//! Configuration is TOML based with sensible defaults and `BLAZE_*`
//! environment variable overrides. A validated configuration can be
//! installed process-wide; value constructors read their digit capacities
//! from the installed configuration.

use std::env;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Value store capacities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of slots in a pool created with `SolidPool::from_config`
    pub pool_capacity: usize,
    /// Maximum characters kept in a known-digit prefix
    pub max_known_digits: usize,
    /// Maximum characters kept in a terminal digit string
    pub max_terminal_digits: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 4096,
            max_known_digits: 256,
            max_terminal_digits: 64,
        }
    }
}

/// GGGX oracle defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Desired precision used when a caller does not supply one
    pub default_precision: u32,
    /// Fractional digits sampled by GO and GUESS
    pub fractional_sample_digits: usize,
    /// Tolerance for recognizing a named constant
    pub constant_tolerance: f64,
    /// Anchor constant used by the infinity division algorithm
    pub infinity_anchor: u64,
    /// Modulus applied to terminal products; must be a power of ten
    pub terminal_modulus: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_precision: 15,
            fractional_sample_digits: 15,
            constant_tolerance: 1e-10,
            infinity_anchor: 12_345_678_910,
            terminal_modulus: 100_000,
        }
    }
}

/// Complete configuration for the Solid Number core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SolidConfig {
    pub store: StoreConfig,
    pub analysis: AnalysisConfig,
}

impl SolidConfig {
    /// Load configuration from a TOML file. Missing sections fall back to defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: SolidConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply `BLAZE_*` environment variable overrides. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("BLAZE_POOL_CAPACITY") {
            if let Ok(capacity) = val.parse::<usize>() {
                self.store.pool_capacity = capacity;
            }
        }

        if let Ok(val) = env::var("BLAZE_MAX_KNOWN_DIGITS") {
            if let Ok(digits) = val.parse::<usize>() {
                self.store.max_known_digits = digits;
            }
        }

        if let Ok(val) = env::var("BLAZE_MAX_TERMINAL_DIGITS") {
            if let Ok(digits) = val.parse::<usize>() {
                self.store.max_terminal_digits = digits;
            }
        }

        if let Ok(val) = env::var("BLAZE_DEFAULT_PRECISION") {
            if let Ok(precision) = val.parse::<u32>() {
                self.analysis.default_precision = precision;
            }
        }

        if let Ok(val) = env::var("BLAZE_INFINITY_ANCHOR") {
            if let Ok(anchor) = val.parse::<u64>() {
                self.analysis.infinity_anchor = anchor;
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.pool_capacity == 0 {
            return Err(ConfigError::Validation(
                "Pool capacity must be greater than 0".to_string(),
            ));
        }

        if self.store.pool_capacity > u32::MAX as usize {
            return Err(ConfigError::Validation(format!(
                "Pool capacity must not exceed {}",
                u32::MAX
            )));
        }

        // Room for a sign, a point and at least one digit on each side
        if self.store.max_known_digits < 4 {
            return Err(ConfigError::Validation(
                "Known digit capacity must be at least 4".to_string(),
            ));
        }

        if self.store.max_terminal_digits == 0 {
            return Err(ConfigError::Validation(
                "Terminal digit capacity must be greater than 0".to_string(),
            ));
        }

        if self.analysis.fractional_sample_digits == 0 || self.analysis.fractional_sample_digits > 17 {
            return Err(ConfigError::Validation(format!(
                "Fractional sample digits must be in 1..=17, got {}",
                self.analysis.fractional_sample_digits
            )));
        }

        if !(self.analysis.constant_tolerance > 0.0 && self.analysis.constant_tolerance < 1.0) {
            return Err(ConfigError::Validation(
                "Constant tolerance must be in (0, 1)".to_string(),
            ));
        }

        if self.analysis.infinity_anchor == 0 {
            return Err(ConfigError::Validation(
                "Infinity anchor must be greater than 0".to_string(),
            ));
        }

        let mut modulus = self.analysis.terminal_modulus;
        while modulus > 1 && modulus % 10 == 0 {
            modulus /= 10;
        }
        if modulus != 1 || self.analysis.terminal_modulus < 10 {
            return Err(ConfigError::Validation(format!(
                "Terminal modulus must be a power of ten, got {}",
                self.analysis.terminal_modulus
            )));
        }

        Ok(())
    }

    /// Number of decimal digits in the terminal modulus
    pub fn terminal_width(&self) -> usize {
        let mut width = 0;
        let mut modulus = self.analysis.terminal_modulus;
        while modulus > 1 {
            modulus /= 10;
            width += 1;
        }
        width
    }
}

static INSTALLED: Lazy<RwLock<SolidConfig>> = Lazy::new(|| RwLock::new(SolidConfig::default()));

/// Validate and install a configuration for the whole process
pub fn install(config: SolidConfig) -> ConfigResult<()> {
    config.validate()?;
    *INSTALLED.write() = config;
    Ok(())
}

/// Snapshot of the installed configuration
pub fn current() -> SolidConfig {
    INSTALLED.read().clone()
}

pub(crate) fn max_known_digits() -> usize {
    INSTALLED.read().store.max_known_digits
}

pub(crate) fn max_terminal_digits() -> usize {
    INSTALLED.read().store.max_terminal_digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SolidConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.max_known_digits, 256);
        assert_eq!(config.analysis.infinity_anchor, 12_345_678_910);
        assert_eq!(config.terminal_width(), 5);
    }

    #[test]
    fn test_config_serialization() {
        let config = SolidConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: SolidConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_loading() {
        let partial = r#"
            [store]
            pool_capacity = 16
        "#;
        let config: SolidConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.store.pool_capacity, 16);
        assert_eq!(config.store.max_terminal_digits, 64);
        assert_eq!(config.analysis.default_precision, 15);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = SolidConfig::default();
        config.store.pool_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = SolidConfig::default();
        config.analysis.terminal_modulus = 12_345;
        assert!(config.validate().is_err());

        let mut config = SolidConfig::default();
        config.analysis.fractional_sample_digits = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_install_rejects_invalid_config() {
        let before = current();
        let mut config = SolidConfig::default();
        config.store.max_terminal_digits = 0;
        assert!(matches!(install(config), Err(ConfigError::Validation(_))));
        assert_eq!(current(), before);

        // reinstalling the defaults leaves every capacity in place
        assert!(install(SolidConfig::default()).is_ok());
        assert_eq!(max_known_digits(), 256);
        assert_eq!(max_terminal_digits(), 64);
    }

    #[test]
    fn test_file_operations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("solid.toml");

        let mut config = SolidConfig::default();
        config.store.pool_capacity = 128;
        config.save_to_file(&path).unwrap();

        let loaded = SolidConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.store.pool_capacity, 128);
    }

    #[test]
    fn test_env_variable_override() {
        env::set_var("BLAZE_INFINITY_ANCHOR", "987654321");
        env::set_var("BLAZE_DEFAULT_PRECISION", "not-a-number");

        let mut config = SolidConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.analysis.infinity_anchor, 987_654_321);
        assert_eq!(config.analysis.default_precision, 15);

        env::remove_var("BLAZE_INFINITY_ANCHOR");
        env::remove_var("BLAZE_DEFAULT_PRECISION");
    }
}
