use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use diamond_util::errors::{DiamondError, DiamondResult};

/// Outer iterations the conflict resolver runs before giving up.
///
/// All of them may run: a tree needing exactly 1000 iterations resolves.
/// NuGet's `--patience != 0` loop stops one iteration earlier.
pub const DEFAULT_PATIENCE: u32 = 1000;

/// Combinations the exhaustive search evaluates before giving up.
pub const DEFAULT_MAX_COMBINATIONS: u64 = 1_000_000;

/// Resolver configuration loaded from `~/.diamond/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Conflict resolution settings from `[resolve]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_patience")]
    pub patience: u32,
    #[serde(default = "default_detect_conflicts", rename = "detect-conflicts")]
    pub detect_conflicts: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            patience: default_patience(),
            detect_conflicts: default_detect_conflicts(),
        }
    }
}

fn default_patience() -> u32 {
    DEFAULT_PATIENCE
}

fn default_detect_conflicts() -> bool {
    true
}

/// Exhaustive search settings from `[search]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_combinations", rename = "max-combinations")]
    pub max_combinations: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_combinations: default_max_combinations(),
        }
    }
}

fn default_max_combinations() -> u64 {
    DEFAULT_MAX_COMBINATIONS
}

impl ResolverConfig {
    /// Load the configuration from `~/.diamond/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> DiamondResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load the configuration from `path`, or return defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> DiamondResult<Self> {
        if !path.is_file() {
            tracing::debug!("No resolver config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| DiamondError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Ok(Self::parse_toml(&content)?)
    }

    /// Parse and validate configuration text.
    pub fn parse_toml(content: &str) -> Result<Self, DiamondError> {
        let config: Self = toml::from_str(content).map_err(|e| DiamondError::Config {
            message: format!("Failed to parse resolver config: {e}"),
        })?;
        if config.resolve.patience == 0 {
            return Err(DiamondError::Config {
                message: "resolve.patience must be at least 1".to_string(),
            });
        }
        Ok(config)
    }

    /// Returns the default path to the config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the diamond data directory (`~/.diamond/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".diamond")
}
