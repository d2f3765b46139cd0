//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use pnpm_stage::util::shell::ColorChoice;

/// Stage a pnpm workspace package and its internal dependencies for
/// deployment outside the monorepo
#[derive(Parser)]
#[command(name = "pnpm-stage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to run the package manager from (defaults to the current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Package manager filter selecting the package to stage
    #[arg(short = 'F', long, env = "PNPM_STAGE_FILTER")]
    pub filter: Option<String>,

    /// Staging directory name, relative to the target package
    #[arg(short = 't', long = "tmp-dir", alias = "tmpDir", env = "PNPM_STAGE_DIR")]
    pub tmp_dir: Option<String>,

    /// Package manager program or path
    #[arg(long, env = "PNPM_STAGE_PACKAGE_MANAGER")]
    pub package_manager: Option<PathBuf>,

    /// Leave files matching this pattern out of staged copies (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Remove the staging directory before copying
    #[arg(long)]
    pub clean: bool,

    /// Show what would be staged without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,
}
