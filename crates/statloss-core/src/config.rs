//! Configuration for the ECFD estimator.
//!
//! [`EcfdConfig`] holds the per-call knobs (frequency count, weighting
//! distribution, integer truncation). [`LossConfig`] adds the run-level
//! defaults a training script needs (bandwidth set, seed) and resolves them
//! from several sources:
//!
//! 1. CLI arguments / environment variables ([`EcfdArgs`], highest priority)
//! 2. Config file (explicit `--config-file`, or `<config_dir>/statloss/config.toml`)
//! 3. Built-in defaults
//!
//! # Example
//!
//! ```
//! use statloss_core::config::{EcfdConfig, Weighting};
//!
//! let config = EcfdConfig::uniform(64);
//! assert_eq!(config.weighting, Weighting::Uniform);
//! assert!(config.validate().is_ok());
//! ```
//!
//! A config file looks like:
//!
//! ```toml
//! num_freqs = 16
//! weighting = "uniform"
//! sigmas = [0.5, 1.0, 2.0]
//! seed = 42
//! ```

use crate::error::{LossError, Result};
use crate::rng::RngKey;
use clap::Args;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Frequency count used when nothing else is configured.
pub const DEFAULT_NUM_FREQS: usize = 8;

/// Distribution the ECFD frequencies are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Entries ~ N(0, sigma^2).
    #[default]
    Gaussian,
    /// Entries ~ Uniform(-sigma, sigma).
    Uniform,
}

impl FromStr for Weighting {
    type Err = LossError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gaussian" | "normal" | "gauss" => Ok(Self::Gaussian),
            "uniform" | "unif" => Ok(Self::Uniform),
            other => Err(LossError::Config(format!(
                "unknown weighting '{other}', expected 'gaussian' or 'uniform'"
            ))),
        }
    }
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gaussian => write!(f, "gaussian"),
            Self::Uniform => write!(f, "uniform"),
        }
    }
}

/// Per-call ECFD settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcfdConfig {
    /// Number of random frequencies drawn per bandwidth.
    pub num_freqs: usize,
    /// Frequency distribution.
    pub weighting: Weighting,
    /// Truncate unit frequency draws toward zero before scaling by sigma.
    ///
    /// Off by default: truncation discards all sub-unit frequency content.
    pub truncate_frequencies: bool,
}

impl Default for EcfdConfig {
    fn default() -> Self {
        Self::gaussian(DEFAULT_NUM_FREQS)
    }
}

impl EcfdConfig {
    pub const fn gaussian(num_freqs: usize) -> Self {
        Self {
            num_freqs,
            weighting: Weighting::Gaussian,
            truncate_frequencies: false,
        }
    }

    pub const fn uniform(num_freqs: usize) -> Self {
        Self {
            num_freqs,
            weighting: Weighting::Uniform,
            truncate_frequencies: false,
        }
    }

    /// Set the number of frequencies.
    pub const fn with_num_freqs(mut self, num_freqs: usize) -> Self {
        self.num_freqs = num_freqs;
        self
    }

    /// Set the weighting distribution.
    pub const fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Enable or disable integer truncation of frequency draws.
    pub const fn with_truncated_frequencies(mut self, enabled: bool) -> Self {
        self.truncate_frequencies = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_freqs == 0 {
            return Err(LossError::invalid("num_freqs", "must be at least 1"));
        }
        Ok(())
    }
}

/// Check a fixed bandwidth set: non-empty, every sigma finite and positive.
pub fn validate_sigmas(sigmas: &[f64]) -> Result<()> {
    if sigmas.is_empty() {
        return Err(LossError::invalid("sigmas", "bandwidth set is empty"));
    }
    if let Some(bad) = sigmas.iter().find(|s| !s.is_finite() || **s <= 0.0) {
        return Err(LossError::invalid(
            "sigmas",
            format!("every sigma must be finite and positive, got {bad}"),
        ));
    }
    Ok(())
}

/// CLI arguments for ECFD configuration.
///
/// Flatten into a binary's own parser with `#[command(flatten)]`.
#[derive(Args, Debug, Clone, Default)]
pub struct EcfdArgs {
    /// Number of random frequencies per bandwidth
    #[arg(long, env = "STATLOSS_NUM_FREQS")]
    pub num_freqs: Option<usize>,

    /// Frequency weighting distribution: gaussian or uniform
    #[arg(long, env = "STATLOSS_WEIGHTING")]
    pub weighting: Option<Weighting>,

    /// Comma-separated bandwidth set, e.g. 0.5,1,2
    #[arg(long, env = "STATLOSS_SIGMAS", value_delimiter = ',')]
    pub sigmas: Option<Vec<f64>>,

    /// Truncate unit frequency draws to integers before scaling
    #[arg(long)]
    pub truncate_frequencies: bool,

    /// Seed for frequency draws (fresh entropy when unset)
    #[arg(long, env = "STATLOSS_SEED")]
    pub seed: Option<u64>,

    /// Path to config file
    #[arg(long, env = "STATLOSS_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
}

/// On-disk config file layout. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossConfigFile {
    pub num_freqs: Option<usize>,
    pub weighting: Option<Weighting>,
    pub truncate_frequencies: Option<bool>,
    pub sigmas: Option<Vec<f64>>,
    pub seed: Option<u64>,
}

/// Resolved run-level configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LossConfig {
    pub ecfd: EcfdConfig,
    /// Default fixed bandwidth set.
    pub sigmas: Vec<f64>,
    pub seed: Option<u64>,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            ecfd: EcfdConfig::default(),
            sigmas: vec![1.0],
            seed: None,
        }
    }
}

impl LossConfig {
    /// Resolve configuration from parsed CLI arguments.
    ///
    /// Priority: CLI/env > config file > defaults. An explicitly named
    /// config file must exist and parse; the default location is optional.
    pub fn from_args(args: EcfdArgs) -> Result<Self> {
        let file = Self::load_config_file(args.config_file.as_deref())?;
        let defaults = Self::default();

        let ecfd = EcfdConfig {
            num_freqs: args
                .num_freqs
                .or(file.num_freqs)
                .unwrap_or(defaults.ecfd.num_freqs),
            weighting: args
                .weighting
                .or(file.weighting)
                .unwrap_or(defaults.ecfd.weighting),
            truncate_frequencies: args.truncate_frequencies
                || file.truncate_frequencies.unwrap_or(false),
        };

        let config = LossConfig {
            ecfd,
            sigmas: args.sigmas.or(file.sigmas).unwrap_or(defaults.sigmas),
            seed: args.seed.or(file.seed),
        };
        config.validate()?;

        log::debug!(
            "resolved loss config: num_freqs={} weighting={} sigmas={:?} seed={:?}",
            config.ecfd.num_freqs,
            config.ecfd.weighting,
            config.sigmas,
            config.seed
        );
        Ok(config)
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: LossConfigFile =
            toml::from_str(contents).map_err(|e| LossError::Config(e.to_string()))?;
        let defaults = Self::default();
        let config = LossConfig {
            ecfd: EcfdConfig {
                num_freqs: file.num_freqs.unwrap_or(defaults.ecfd.num_freqs),
                weighting: file.weighting.unwrap_or(defaults.ecfd.weighting),
                truncate_frequencies: file.truncate_frequencies.unwrap_or(false),
            },
            sigmas: file.sigmas.unwrap_or(defaults.sigmas),
            seed: file.seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.ecfd.validate()?;
        validate_sigmas(&self.sigmas)
    }

    /// Key for the next draw: seeded if a seed is configured, fresh otherwise.
    pub fn key(&self) -> RngKey {
        self.seed.map_or_else(RngKey::from_entropy, RngKey::new)
    }

    /// Default config file location (`<config_dir>/statloss/config.toml`).
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "statloss").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn load_config_file(path: Option<&Path>) -> Result<LossConfigFile> {
        if let Some(path) = path {
            let contents = fs::read_to_string(path)
                .map_err(|e| LossError::Config(format!("{}: {e}", path.display())))?;
            return toml::from_str(&contents)
                .map_err(|e| LossError::Config(format!("{}: {e}", path.display())));
        }

        let Some(path) = Self::default_config_path() else {
            return Ok(LossConfigFile::default());
        };
        if !path.exists() {
            return Ok(LossConfigFile::default());
        }
        match fs::read_to_string(&path).map(|s| toml::from_str::<LossConfigFile>(&s)) {
            Ok(Ok(file)) => Ok(file),
            Ok(Err(e)) => {
                log::warn!("ignoring malformed config {}: {e}", path.display());
                Ok(LossConfigFile::default())
            }
            Err(e) => {
                log::warn!("ignoring unreadable config {}: {e}", path.display());
                Ok(LossConfigFile::default())
            }
        }
    }

    /// Save current configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = LossConfigFile {
            num_freqs: Some(self.ecfd.num_freqs),
            weighting: Some(self.ecfd.weighting),
            truncate_frequencies: Some(self.ecfd.truncate_frequencies),
            sigmas: Some(self.sigmas.clone()),
            seed: self.seed,
        };
        let toml_str =
            toml::to_string_pretty(&file).map_err(|e| LossError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| LossError::Config(e.to_string()))?;
        }
        fs::write(path, toml_str).map_err(|e| LossError::Config(e.to_string()))
    }
}
