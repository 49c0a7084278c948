//! Loading of `~/.gua/config.toml`.
//!
//! The file is optional and every key in it is optional. Missing keys keep the
//! engine defaults; unknown keys are rejected so typos surface as parse errors.
//!
//! ```toml
//! [weights]
//! time = 0.28
//! iching = 0.3
//!
//! [thresholds]
//! great_good = 0.8
//!
//! [playback]
//! total_ms = 12000
//! ```

use std::path::{Path, PathBuf};

use gua_types::{ConfigValueError, DivinationConfig, VerdictThresholds, Weights};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config at {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: ConfigValueError,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path,
        }
    }
}

/// Resolved settings: everything the engine and the front end need.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GuaConfig {
    pub divination: DivinationConfig,
    /// Replay length from `[playback] total_ms`; `None` leaves the choice to
    /// the player.
    pub playback_total_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    weights: Option<RawWeights>,
    thresholds: Option<RawThresholds>,
    playback: Option<RawPlayback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWeights {
    time: Option<f64>,
    text: Option<f64>,
    iching: Option<f64>,
    numerology: Option<f64>,
    entropy: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawThresholds {
    great_good: Option<f64>,
    good: Option<f64>,
    flat: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlayback {
    total_ms: Option<u64>,
}

impl RawWeights {
    fn resolve(self) -> Weights {
        let d = Weights::default();
        Weights {
            time: self.time.unwrap_or(d.time),
            text: self.text.unwrap_or(d.text),
            iching: self.iching.unwrap_or(d.iching),
            numerology: self.numerology.unwrap_or(d.numerology),
            entropy: self.entropy.unwrap_or(d.entropy),
        }
    }
}

impl RawThresholds {
    fn resolve(self) -> VerdictThresholds {
        let d = VerdictThresholds::default();
        VerdictThresholds {
            great_good: self.great_good.unwrap_or(d.great_good),
            good: self.good.unwrap_or(d.good),
            flat: self.flat.unwrap_or(d.flat),
        }
    }
}

impl RawConfig {
    fn resolve(self) -> GuaConfig {
        GuaConfig {
            divination: DivinationConfig {
                weights: self.weights.map(RawWeights::resolve).unwrap_or_default(),
                verdict_thresholds: self
                    .thresholds
                    .map(RawThresholds::resolve)
                    .unwrap_or_default(),
            },
            playback_total_ms: self.playback.and_then(|p| p.total_ms),
        }
    }
}

impl GuaConfig {
    /// Load from the default location. No home directory or no file means
    /// defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };
        Self::parse(&content).map_err(|err| {
            let err = err.at(path);
            tracing::warn!("{err}");
            err
        })
    }

    /// Parse TOML text and validate the resolved values.
    pub fn parse(content: &str) -> Result<Self, ParseFailure> {
        let raw: RawConfig = toml::from_str(content).map_err(ParseFailure::Syntax)?;
        let config = raw.resolve();
        config
            .divination
            .validate()
            .map_err(ParseFailure::Value)?;
        Ok(config)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

/// Failure of [`GuaConfig::parse`], before a file path is attached.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error(transparent)]
    Syntax(toml::de::Error),
    #[error(transparent)]
    Value(ConfigValueError),
}

impl ParseFailure {
    fn at(self, path: &Path) -> ConfigError {
        let path = path.to_path_buf();
        match self {
            ParseFailure::Syntax(source) => ConfigError::Parse { path, source },
            ParseFailure::Value(source) => ConfigError::Invalid { path, source },
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gua").join("config.toml"))
}
