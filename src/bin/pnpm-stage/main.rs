//! pnpm-stage CLI - stage a pnpm workspace package for deployment

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use pnpm_stage::util::diagnostic;
use pnpm_stage::util::shell::Shell;
use pnpm_stage::StageError;

fn main() {
    let cli = Cli::parse();
    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color));

    if let Err(e) = run(&cli, &shell) {
        match e.downcast_ref::<StageError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli, shell: &Arc<Shell>) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("pnpm_stage=debug")
    } else if cli.quiet {
        EnvFilter::new("pnpm_stage=error")
    } else {
        EnvFilter::new("pnpm_stage=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if cli.dry_run {
        commands::plan::execute(cli)
    } else {
        commands::stage::execute(cli, shell)
    }
}
