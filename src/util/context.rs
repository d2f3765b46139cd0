//! Global context for staging operations.
//!
//! Provides centralized access to the target directory and merged
//! configuration.

use std::path::{Path, PathBuf};

use crate::core::error::{StageError, StageResult};
use crate::util::config::{self, Config};
use crate::util::fs::normalize_path;

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Absolute directory the package manager is run from
    target_dir: PathBuf,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context for `dir` (relative to the current directory),
    /// or for the current directory itself.
    pub fn new(dir: Option<&Path>) -> StageResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| StageError::fs("read current directory", ".", e))?;
        Self::with_cwd(cwd, dir)
    }

    /// Create a context with an explicit working directory.
    pub fn with_cwd(cwd: PathBuf, dir: Option<&Path>) -> StageResult<Self> {
        let target_dir = match dir {
            Some(dir) => normalize_path(&cwd, dir),
            None => cwd.clone(),
        };

        let config = config::load_config(
            config::global_config_path().as_deref(),
            &config::project_config_path(&target_dir),
        )?;

        Ok(GlobalContext {
            cwd,
            target_dir,
            config,
        })
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the target directory.
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Get the merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
