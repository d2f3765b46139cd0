//! `pnpm ls` backed workspace query.

use std::path::{Path, PathBuf};

use crate::core::error::{StageError, StageResult};
use crate::core::package::WorkspacePackage;
use crate::query::WorkspaceQuery;
use crate::util::process::{find_executable, ProcessBuilder};

/// Program used when none is configured.
pub const DEFAULT_PACKAGE_MANAGER: &str = "pnpm";

/// Queries a pnpm workspace by running `pnpm ls`.
#[derive(Debug, Clone)]
pub struct PnpmQuery {
    program: PathBuf,
    cwd: PathBuf,
}

impl PnpmQuery {
    /// Query through `program`, run from `cwd`.
    ///
    /// Bare program names are looked up in `PATH` so that wrapper scripts
    /// such as `pnpm.cmd` are found; anything else is used as given.
    pub fn new(program: impl AsRef<Path>, cwd: impl Into<PathBuf>) -> Self {
        let program = program.as_ref();
        let resolved = program
            .to_str()
            .filter(|name| !name.contains(['/', '\\']))
            .and_then(find_executable)
            .unwrap_or_else(|| program.to_path_buf());

        PnpmQuery {
            program: resolved,
            cwd: cwd.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, filter: &str) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .arg("ls")
            .arg(format!("--filter={}", filter))
            .args(["--depth", "0", "--json"])
            .env("FORCE_COLOR", "0")
            .cwd(&self.cwd)
    }
}

impl WorkspaceQuery for PnpmQuery {
    fn query(&self, filter: &str) -> StageResult<WorkspacePackage> {
        let cmd = self.command(filter);
        let output = cmd.exec_and_check()?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let pkg = parse_listing(&stdout).map_err(|message| StageError::MetadataFormat {
            command: cmd.display_command(),
            message,
        })?;

        tracing::debug!(
            "queried `{}`: {} at {} ({} dependencies, {} dev dependencies)",
            filter,
            pkg.name,
            pkg.path.display(),
            pkg.dependencies.len(),
            pkg.dev_dependencies.len()
        );

        Ok(pkg)
    }
}

/// Parse `pnpm ls --json` output and return its first package.
pub fn parse_listing(stdout: &str) -> Result<WorkspacePackage, String> {
    let mut packages: Vec<WorkspacePackage> =
        serde_json::from_str(stdout.trim()).map_err(|e| e.to_string())?;

    if packages.is_empty() {
        return Err("no workspace package matches the filter".to_string());
    }
    if packages.len() > 1 {
        tracing::debug!(
            "filter matched {} packages, using the first ({})",
            packages.len(),
            packages[0].name
        );
    }

    Ok(packages.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"[
  {
    "name": "app",
    "version": "0.1.0",
    "path": "/ws/apps/app",
    "private": true,
    "dependencies": {
      "lib-a": { "from": "lib-a", "version": "link:../../packages/lib-a", "path": "/ws/packages/lib-a" },
      "express": { "from": "express", "version": "4.19.2", "resolved": "https://registry.npmjs.org/express/-/express-4.19.2.tgz", "path": "/ws/node_modules/.pnpm/express@4.19.2/node_modules/express" }
    },
    "devDependencies": {
      "tooling": { "from": "tooling", "version": "link:../../packages/tooling", "path": "/ws/packages/tooling" }
    }
  }
]
"#;

    #[test]
    fn test_parse_listing() {
        let pkg = parse_listing(LISTING).unwrap();
        assert_eq!(pkg.name, "app");
        assert_eq!(pkg.path, PathBuf::from("/ws/apps/app"));

        let links: Vec<_> = pkg.internal_links().iter().map(|l| l.name.to_string()).collect();
        assert_eq!(links, vec!["lib-a", "tooling"]);
    }

    #[test]
    fn test_parse_listing_takes_first_match() {
        let listing = r#"[{ "name": "a", "path": "/ws/a" }, { "name": "b", "path": "/ws/b" }]"#;
        assert_eq!(parse_listing(listing).unwrap().name, "a");
    }

    #[test]
    fn test_parse_listing_errors() {
        assert!(parse_listing("[]").unwrap_err().contains("no workspace package"));
        assert!(parse_listing("not json").is_err());
        assert!(parse_listing(r#"[{ "name": "a" }]"#).is_err());
    }

    #[test]
    fn test_command_line() {
        let query = PnpmQuery::new("/opt/pnpm/bin/pnpm", "/ws/apps/app");
        assert_eq!(
            query.command("@acme/app").display_command(),
            "/opt/pnpm/bin/pnpm ls --filter=@acme/app --depth 0 --json"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_is_tool_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let query = PnpmQuery::new("false", tmp.path());
        let err = query.query("app").unwrap_err();
        assert!(matches!(err, StageError::ToolInvocation { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_garbage_output_is_metadata_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        // `echo ls --filter=...` prints its arguments, which is not JSON.
        let query = PnpmQuery::new("echo", tmp.path());
        let err = query.query("app").unwrap_err();
        assert!(matches!(err, StageError::MetadataFormat { .. }));
    }
}
