//! Tunable divination parameters.
//!
//! The engine accepts any [`DivinationConfig`] value and never fails on it:
//! all-zero weights fall back to a divisor of 1. [`DivinationConfig::validate`]
//! exists for the parse boundary, where bad values should be reported rather
//! than silently absorbed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValueError {
    #[error("weight `{name}` must be a finite non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("threshold `{name}` must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("thresholds must decrease: great_good ({great_good}) >= good ({good}) >= flat ({flat})")]
    ThresholdsNotDecreasing {
        great_good: f64,
        good: f64,
        flat: f64,
    },
}

/// Relative influence of each domain sub-score. Normalized internally, so the
/// values need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub time: f64,
    pub text: f64,
    pub iching: f64,
    pub numerology: f64,
    pub entropy: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            time: 0.28,
            text: 0.22,
            iching: 0.24,
            numerology: 0.16,
            entropy: 0.1,
        }
    }
}

impl Weights {
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            time: 0.0,
            text: 0.0,
            iching: 0.0,
            numerology: 0.0,
            entropy: 0.0,
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.time + self.text + self.iching + self.numerology + self.entropy
    }

    /// Weights scaled to sum to 1. A zero (or NaN) total is treated as 1.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        let divisor = if total == 0.0 || total.is_nan() {
            1.0
        } else {
            total
        };
        Self {
            time: self.time / divisor,
            text: self.text / divisor,
            iching: self.iching / divisor,
            numerology: self.numerology / divisor,
            entropy: self.entropy / divisor,
        }
    }

    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("time", self.time),
            ("text", self.text),
            ("iching", self.iching),
            ("numerology", self.numerology),
            ("entropy", self.entropy),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigValueError> {
        for (name, value) in self.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigValueError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Score cut points, as fractions of 100, for the four verdict bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictThresholds {
    pub great_good: f64,
    pub good: f64,
    pub flat: f64,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            great_good: 0.78,
            good: 0.62,
            flat: 0.46,
        }
    }
}

impl VerdictThresholds {
    pub fn validate(&self) -> Result<(), ConfigValueError> {
        for (name, value) in [
            ("great_good", self.great_good),
            ("good", self.good),
            ("flat", self.flat),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValueError::ThresholdOutOfRange { name, value });
            }
        }
        if self.great_good < self.good || self.good < self.flat {
            return Err(ConfigValueError::ThresholdsNotDecreasing {
                great_good: self.great_good,
                good: self.good,
                flat: self.flat,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivinationConfig {
    pub weights: Weights,
    pub verdict_thresholds: VerdictThresholds,
}

impl DivinationConfig {
    pub fn validate(&self) -> Result<(), ConfigValueError> {
        self.weights.validate()?;
        self.verdict_thresholds.validate()
    }
}
