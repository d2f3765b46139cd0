//! Default command: stage the target package

use std::sync::{Arc, OnceLock};

use anyhow::Result;

use pnpm_stage::core::ClosureMember;
use pnpm_stage::ops::{stage, RewriteSummary, StageListener};
use pnpm_stage::util::shell::{Progress, Shell, Status};
use pnpm_stage::util::GlobalContext;
use pnpm_stage::{Resolution, StagingDirectory};

use super::{pnpm_query, require_filter, stage_options};
use crate::cli::Cli;

pub fn execute(cli: &Cli, shell: &Arc<Shell>) -> Result<()> {
    let filter = require_filter(cli)?;
    let ctx = GlobalContext::new(cli.dir.as_deref())?;
    let opts = stage_options(cli, &ctx, filter);
    let query = pnpm_query(cli, &ctx);

    let span = shell.span(format!("staging `{}`", filter));
    shell.status(Status::Resolving, format!("workspace links of `{}`", filter));

    let listener = ShellListener {
        shell: Arc::clone(shell),
        progress: OnceLock::new(),
    };
    let report = stage(&query, &opts, &listener)?;

    shell.status(
        Status::Staged,
        format!(
            "{} packages into {} ({} manifest entries rewritten)",
            report.resolution.closure.len(),
            report.staging.path().display(),
            report.rewritten_entries()
        ),
    );
    span.finish();

    Ok(())
}

struct ShellListener {
    shell: Arc<Shell>,
    progress: OnceLock<Progress>,
}

impl StageListener for ShellListener {
    fn resolved(&self, resolution: &Resolution) {
        if resolution.closure.is_empty() {
            self.shell.note(format!(
                "`{}` has no internal dependencies",
                resolution.root.name
            ));
            return;
        }
        let names: Vec<&str> = resolution.closure.names().collect();
        self.shell.note(format!(
            "`{}` depends on {} ({} queries)",
            resolution.root.name,
            names.join(", "),
            resolution.queries
        ));
    }

    fn staging(&self, staging: &StagingDirectory, members: usize) {
        self.shell.status(
            Status::Staging,
            format!("{} packages into {}", members, staging.path().display()),
        );
        let _ = self
            .progress
            .set(self.shell.progress(members as u64, "copying"));
    }

    fn copied(&self, member: &ClosureMember) {
        if let Some(progress) = self.progress.get() {
            progress.inc(&member.name);
        }
    }

    fn rewriting(&self, manifests: usize) {
        if let Some(progress) = self.progress.get() {
            progress.finish();
        }
        self.shell
            .status(Status::Rewriting, format!("{} manifests", manifests));
    }

    fn rewritten(&self, summary: &RewriteSummary) {
        if summary.entries.is_empty() || !self.shell.is_verbose() {
            return;
        }
        for entry in &summary.entries {
            self.shell.status(
                Status::Updated,
                format!(
                    "{} {}.{} = \"{}\"",
                    summary.manifest.display(),
                    entry.field,
                    entry.name,
                    entry.specifier
                ),
            );
        }
    }
}
