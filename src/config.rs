use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration loaded from sigturn.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SigturnConfig {
    pub display: DisplayConfig,
    pub gate: GateConfig,
}

/// Character range walked by each process's display cursor.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub initial_char: char,
    pub final_char: char,
}

/// Operator-facing pacing of the parent loop.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub prompt: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            initial_char: 'A',
            final_char: 'Z',
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            prompt: "Press enter...".to_string(),
        }
    }
}

/// Errors while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// initial_char/final_char do not form an ascending printable ASCII
    /// range. The cursor is a byte-wide atomic, so the range must be too.
    CharRange { initial: char, last: char },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {}", path.display(), source)
            }
            ConfigError::CharRange { initial, last } => {
                write!(
                    f,
                    "display range {:?}..{:?} is not an ascending printable ASCII range",
                    initial, last
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::CharRange { .. } => None,
        }
    }
}

/// Load configuration, falling back to defaults when the file is absent.
pub fn load(path: &Path) -> Result<SigturnConfig, ConfigError> {
    let config = if path.exists() {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        SigturnConfig::default()
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &SigturnConfig) -> Result<(), ConfigError> {
    let display = &config.display;
    if !display.initial_char.is_ascii_graphic()
        || !display.final_char.is_ascii_graphic()
        || display.initial_char > display.final_char
    {
        return Err(ConfigError::CharRange {
            initial: display.initial_char,
            last: display.final_char,
        });
    }
    Ok(())
}
