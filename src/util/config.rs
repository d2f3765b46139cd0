//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.pnpm-stage/config.toml` - User-wide defaults
//! - Project: `<target>/.pnpm-stage.toml` - Per-package overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! and environment variables take precedence over both.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{StageError, StageResult};
use crate::core::staging::DEFAULT_STAGING_DIR;
use crate::query::DEFAULT_PACKAGE_MANAGER;

/// File name of the project config, inside the target directory.
pub const PROJECT_CONFIG_NAME: &str = ".pnpm-stage.toml";

/// pnpm-stage configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Staging settings
    pub stage: StageConfig,
}

/// Staging-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Staging directory name, relative to the target package
    pub dir: Option<String>,

    /// Package manager program (name looked up in PATH, or a path)
    pub package_manager: Option<PathBuf>,

    /// File name patterns left out of staged copies (e.g. "node_modules")
    pub exclude: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> StageResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StageError::fs("read config file", path, e))?;

        toml::from_str(&contents).map_err(|e| {
            StageError::config(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.stage.dir.is_some() {
            self.stage.dir = other.stage.dir;
        }
        if other.stage.package_manager.is_some() {
            self.stage.package_manager = other.stage.package_manager;
        }
        if !other.stage.exclude.is_empty() {
            self.stage.exclude = other.stage.exclude;
        }
    }

    /// Staging directory name, falling back to the default.
    pub fn staging_dir(&self) -> &str {
        self.stage.dir.as_deref().unwrap_or(DEFAULT_STAGING_DIR)
    }

    /// Package manager program, falling back to `pnpm`.
    pub fn package_manager(&self) -> &Path {
        self.stage
            .package_manager
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_PACKAGE_MANAGER))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (<target>/.pnpm-stage.toml)
/// 2. Global config (~/.pnpm-stage/config.toml)
/// 3. Defaults
///
/// Missing files are skipped; a file that exists but does not parse is a
/// configuration error.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> StageResult<Config> {
    let mut config = Config::default();

    for path in global_path.into_iter().chain(Some(project_path)) {
        if path.exists() {
            tracing::debug!("loading config from {}", path.display());
            config.merge(Config::load(path)?);
        }
    }

    Ok(config)
}

/// Get the global config directory (~/.pnpm-stage).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".pnpm-stage"))
}

/// Get the global config path (~/.pnpm-stage/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<target>/.pnpm-stage.toml).
pub fn project_config_path(target_dir: &Path) -> PathBuf {
    target_dir.join(PROJECT_CONFIG_NAME)
}
