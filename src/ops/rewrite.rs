//! Redirecting manifests at staged copies.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::core::closure::DependencyClosure;
use crate::core::error::StageResult;
use crate::core::manifest::{Manifest, RewrittenEntry};
use crate::core::staging::StagingDirectory;

/// Result of rewriting one manifest.
#[derive(Debug, Clone)]
pub struct RewriteSummary {
    pub manifest: PathBuf,
    pub entries: Vec<RewrittenEntry>,
}

/// Rewrite the manifest in `package_dir` so closure members resolve to
/// their staged copies. The file is read and written exactly once.
pub fn rewrite_manifest(
    package_dir: &Path,
    staging: &StagingDirectory,
    closure: &DependencyClosure,
) -> StageResult<RewriteSummary> {
    let mut manifest = Manifest::load(package_dir)?;
    let entries = manifest.redirect_to_staging(staging, closure);
    manifest.save()?;

    for entry in &entries {
        tracing::debug!(
            "{}: {}.{} {} -> {}",
            manifest.path().display(),
            entry.field,
            entry.name,
            entry.previous,
            entry.specifier
        );
    }

    Ok(RewriteSummary {
        manifest: manifest.path().to_path_buf(),
        entries,
    })
}

/// Rewrite the target's manifest and every staged copy's manifest.
///
/// Rewrites run in parallel; manifests already written when another fails
/// are not restored. Summaries come back target first, then members in
/// name order.
pub fn rewrite_all<F>(
    target_dir: &Path,
    staging: &StagingDirectory,
    closure: &DependencyClosure,
    on_rewritten: F,
) -> StageResult<Vec<RewriteSummary>>
where
    F: Fn(&RewriteSummary) + Sync,
{
    let mut dirs = vec![target_dir.to_path_buf()];
    dirs.extend(closure.names().map(|name| staging.member_path(name)));

    dirs.par_iter()
        .map(|dir| -> StageResult<RewriteSummary> {
            let summary = rewrite_manifest(dir, staging, closure)?;
            on_rewritten(&summary);
            Ok(summary)
        })
        .collect()
}
