//! Interpreter configuration stored in `sbf.toml` under the XDG config home.
//!
//! Values are layered: file, then `SBF_*` environment variables, then
//! command-line flags (applied by the caller).

use std::fs;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::{Arithmetic, Engine, Render};

pub const FILE_NAME: &str = "sbf.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub arithmetic: ArithmeticConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Abort after this many executed steps. Unlimited when absent.
    pub max_steps: Option<u64>,

    /// Wall-clock budget for `sbf run`, in milliseconds.
    pub timeout_ms: u64,

    /// Report unmatched `]` and unclosed `[` as errors.
    pub strict_loops: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            timeout_ms: 2_000,
            strict_loops: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArithmeticConfig {
    pub increment: u8,
    pub decrement: u8,
}

impl Default for ArithmeticConfig {
    fn default() -> Self {
        Self {
            increment: 1,
            decrement: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: Render,
}

impl Config {
    /// `$XDG_CONFIG_HOME/sbf.toml`, if a config home can be resolved.
    pub fn default_path() -> Option<PathBuf> {
        // On Linux: resolves to /home/<user>/.config
        // On Windows: resolves to C:\Users\<user>\.config
        // On macOS: resolves to /Users/<user>/.config
        let base_dirs = BaseDirs::new().ok()?;
        let mut path = PathBuf::from(base_dirs.config_home());
        path.push(FILE_NAME);
        Some(path)
    }

    /// Load the config file (defaults when absent) and apply environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from `SBF_MAX_STEPS`, `SBF_TIMEOUT_MS`, `SBF_FORMAT`
    /// and `SBF_STRICT`, looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("SBF_MAX_STEPS") {
            self.engine.max_steps = Some(parse_number("SBF_MAX_STEPS", &v)?);
        }
        if let Some(v) = var("SBF_TIMEOUT_MS") {
            self.engine.timeout_ms = parse_number("SBF_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = var("SBF_FORMAT") {
            self.output.format = v.parse().map_err(ConfigError::Invalid)?;
        }
        if let Some(v) = var("SBF_STRICT") {
            self.engine.strict_loops = matches!(v.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "engine.timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.arithmetic.increment == 0 || self.arithmetic.decrement == 0 {
            return Err(ConfigError::Invalid(
                "arithmetic.increment and arithmetic.decrement must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// A fresh engine with this configuration's arithmetic, output format and
    /// loop strictness. Step limits are installed by the caller, which owns
    /// the cancellation flag.
    pub fn build_engine(&self) -> Engine {
        let mut engine = Engine::new();
        engine.set_operator(Arithmetic {
            increment: self.arithmetic.increment,
            decrement: self.arithmetic.decrement,
        });
        engine.set_render(self.output.format);
        engine.set_strict_loops(self.engine.strict_loops);
        engine
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key} must be a number, got '{value}'")))
}
