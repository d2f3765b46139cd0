//! Command implementations

pub mod plan;
pub mod stage;

use std::path::Path;

use pnpm_stage::core::error::NO_FILTER;
use pnpm_stage::util::GlobalContext;
use pnpm_stage::{PnpmQuery, StageError, StageOptions};

use crate::cli::Cli;

/// The filter is the one option without a default.
pub fn require_filter(cli: &Cli) -> Result<&str, StageError> {
    match cli.filter.as_deref() {
        Some(filter) if !filter.trim().is_empty() => Ok(filter),
        _ => Err(StageError::config(NO_FILTER)),
    }
}

/// Merge flags over configuration. Flags win; `--exclude` patterns are
/// added to the configured ones.
pub fn stage_options(cli: &Cli, ctx: &GlobalContext, filter: &str) -> StageOptions {
    let config = ctx.config();

    let mut opts = StageOptions::new(filter)
        .with_staging_dir(cli.tmp_dir.as_deref().unwrap_or(config.staging_dir()));
    opts.exclude = config.stage.exclude.clone();
    opts.exclude.extend(cli.exclude.iter().cloned());
    opts.clean = cli.clean;
    opts
}

pub fn pnpm_query(cli: &Cli, ctx: &GlobalContext) -> PnpmQuery {
    let program: &Path = cli
        .package_manager
        .as_deref()
        .unwrap_or(ctx.config().package_manager());
    PnpmQuery::new(program, ctx.target_dir())
}
