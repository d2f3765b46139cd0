//! The staging pipeline: resolve, materialize, rewrite.

use std::path::PathBuf;

use crate::core::closure::ClosureMember;
use crate::core::error::{StageError, StageResult, NO_FILTER};
use crate::core::staging::{StagingDirectory, DEFAULT_STAGING_DIR};
use crate::ops::materialize::materialize;
use crate::ops::rewrite::{rewrite_all, RewriteSummary};
use crate::query::WorkspaceQuery;
use crate::resolver::{resolve, Resolution};
use crate::util::fs::compile_patterns;

/// Options for staging a package.
#[derive(Debug, Clone)]
pub struct StageOptions {
    /// Package manager filter selecting the target package.
    pub filter: String,

    /// Staging directory name, relative to the target package.
    pub staging_dir: String,

    /// Glob patterns of file names left out of copies.
    pub exclude: Vec<String>,

    /// Remove the staging directory before copying.
    pub clean: bool,
}

impl StageOptions {
    pub fn new(filter: impl Into<String>) -> Self {
        StageOptions {
            filter: filter.into(),
            staging_dir: DEFAULT_STAGING_DIR.to_string(),
            exclude: Vec::new(),
            clean: false,
        }
    }

    pub fn with_staging_dir(mut self, name: impl Into<String>) -> Self {
        self.staging_dir = name.into();
        self
    }

    fn validate(&self) -> StageResult<()> {
        if self.filter.trim().is_empty() {
            return Err(StageError::config(NO_FILTER));
        }
        StagingDirectory::check_name(&self.staging_dir)
    }
}

/// Receives progress events from [`stage`].
///
/// `copied` and `rewritten` are called from worker threads.
pub trait StageListener: Sync {
    fn resolved(&self, _resolution: &Resolution) {}
    fn staging(&self, _staging: &StagingDirectory, _members: usize) {}
    fn copied(&self, _member: &ClosureMember) {}
    fn rewriting(&self, _manifests: usize) {}
    fn rewritten(&self, _summary: &RewriteSummary) {}
}

impl StageListener for () {}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub resolution: Resolution,
    pub staging: StagingDirectory,
    /// Target manifest first, then staged copies in name order.
    pub rewrites: Vec<RewriteSummary>,
}

impl StageReport {
    /// Total number of dependency entries redirected.
    pub fn rewritten_entries(&self) -> usize {
        self.rewrites.iter().map(|r| r.entries.len()).sum()
    }
}

/// Resolve the target's closure, copy it into the staging directory and
/// redirect every affected manifest at the staged copies.
///
/// Any failure aborts the run. Nothing already written is rolled back.
pub fn stage<Q, L>(query: &Q, opts: &StageOptions, listener: &L) -> StageResult<StageReport>
where
    Q: WorkspaceQuery + ?Sized,
    L: StageListener + ?Sized,
{
    opts.validate()?;
    let exclude = compile_patterns(&opts.exclude)?;

    let resolution = resolve(query, &opts.filter)?;
    listener.resolved(&resolution);

    let staging = StagingDirectory::for_target(&resolution.root.path, &opts.staging_dir)?;
    if opts.clean {
        tracing::debug!("clearing {}", staging.path().display());
        staging.clear()?;
    }

    listener.staging(&staging, resolution.closure.len());
    materialize(&staging, &resolution.closure, &exclude, |member| {
        listener.copied(member)
    })?;

    listener.rewriting(resolution.closure.len() + 1);
    let rewrites = rewrite_all(&resolution.root.path, &staging, &resolution.closure, |summary| {
        listener.rewritten(summary)
    })?;

    Ok(StageReport {
        resolution,
        staging,
        rewrites,
    })
}

/// One copy the pipeline would perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// What [`stage`] would do, computed without touching the filesystem.
#[derive(Debug, Clone)]
pub struct StagePlan {
    pub resolution: Resolution,
    pub staging: StagingDirectory,
    pub copies: Vec<PlannedCopy>,
}

/// Resolve the closure and compute the staging layout only.
pub fn plan<Q>(query: &Q, opts: &StageOptions) -> StageResult<StagePlan>
where
    Q: WorkspaceQuery + ?Sized,
{
    opts.validate()?;
    compile_patterns(&opts.exclude)?;

    let resolution = resolve(query, &opts.filter)?;
    let staging = StagingDirectory::for_target(&resolution.root.path, &opts.staging_dir)?;
    let copies = resolution
        .closure
        .iter()
        .map(|member| PlannedCopy {
            name: member.name.clone(),
            source: member.source.clone(),
            destination: staging.member_path(&member.name),
        })
        .collect();

    Ok(StagePlan {
        resolution,
        staging,
        copies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::package::{DependencyKind, WorkspacePackage};
    use crate::test_support::{MockQuery, WorkspaceFixture};
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;

    fn chain() -> (WorkspaceFixture, PathBuf) {
        let mut ws = WorkspaceFixture::new();
        let app = ws.add_package("app", &["lib-a"], &[]);
        ws.add_package("lib-a", &["lib-b"], &[]);
        ws.add_package("lib-b", &[], &[]);
        (ws, app)
    }

    fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_stage_chain() {
        let (ws, app) = chain();
        let opts = StageOptions::new("app").with_staging_dir(".staging");

        let report = stage(ws.query(), &opts, &()).unwrap();

        let names: Vec<_> = report.resolution.closure.names().collect();
        assert_eq!(names, vec!["lib-a", "lib-b"]);
        assert_eq!(report.staging.path(), app.join(".staging"));
        assert!(app.join(".staging/lib-a/src/index.js").exists());
        assert!(app.join(".staging/lib-b/src/index.js").exists());
        assert_eq!(report.rewritten_entries(), 2);

        let target = WorkspaceFixture::read_manifest(&app);
        assert_eq!(target["dependencies"]["lib-a"], "file:.staging/lib-a");
        let lib_a = WorkspaceFixture::read_manifest(&app.join(".staging/lib-a"));
        assert_eq!(lib_a["dependencies"]["lib-b"], "file:../lib-b");
    }

    #[test]
    fn test_stage_twice_converges() {
        let (ws, app) = chain();
        let opts = StageOptions::new("app").with_staging_dir(".staging");

        stage(ws.query(), &opts, &()).unwrap();
        let first = snapshot(&app);
        stage(ws.query(), &opts, &()).unwrap();
        let second = snapshot(&app);

        assert_eq!(first, second);
    }

    #[test]
    fn test_stage_without_internal_dependencies() {
        let mut ws = WorkspaceFixture::new();
        let app = ws.add_package("app", &[], &[]);
        let before = fs::read_to_string(app.join("package.json")).unwrap();

        let report = stage(ws.query(), &StageOptions::new("app"), &()).unwrap();

        assert!(report.resolution.closure.is_empty());
        let staging = app.join(DEFAULT_STAGING_DIR);
        assert!(staging.is_dir());
        assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
        assert_eq!(fs::read_to_string(app.join("package.json")).unwrap(), before);
    }

    #[test]
    fn test_dev_and_peer_entries_are_redirected() {
        let mut ws = WorkspaceFixture::new();
        let app = ws.add_package("app", &[], &["tooling"]);
        ws.add_package("tooling", &[], &[]);
        let mut manifest = WorkspaceFixture::read_manifest(&app);
        manifest["peerDependencies"] = serde_json::json!({ "tooling": "workspace:^" });
        ws.write_manifest("app", &manifest);

        stage(ws.query(), &StageOptions::new("app").with_staging_dir(".staging"), &()).unwrap();

        let target = WorkspaceFixture::read_manifest(&app);
        assert_eq!(target["devDependencies"]["tooling"], "file:.staging/tooling");
        assert_eq!(target["peerDependencies"]["tooling"], "file:.staging/tooling");
    }

    #[test]
    fn test_clean_removes_stale_files() {
        let (ws, app) = chain();
        let mut opts = StageOptions::new("app").with_staging_dir(".staging");
        stage(ws.query(), &opts, &()).unwrap();

        let stale = app.join(".staging/lib-a/stale.txt");
        fs::write(&stale, "old").unwrap();

        opts.clean = true;
        stage(ws.query(), &opts, &()).unwrap();

        assert!(!stale.exists());
        assert!(app.join(".staging/lib-a/package.json").exists());
    }

    #[test]
    fn test_clean_refuses_directory_with_unstaged_files() {
        let (ws, app) = chain();
        let before = fs::read_to_string(app.join("package.json")).unwrap();

        let mut opts = StageOptions::new("app").with_staging_dir("src");
        opts.clean = true;
        let err = stage(ws.query(), &opts, &()).unwrap_err();

        assert!(matches!(err, StageError::Configuration(_)));
        assert!(app.join("src/index.js").exists());
        assert!(!app.join("src/lib-a").exists());
        assert_eq!(fs::read_to_string(app.join("package.json")).unwrap(), before);
    }

    #[test]
    fn test_member_containing_the_target_is_copied_whole() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path().join("ws");
        let app = root.join("apps/app");
        fs::create_dir_all(app.join("src")).unwrap();
        fs::write(root.join("package.json"), r#"{ "name": "root" }"#).unwrap();
        fs::write(root.join("apps/README.md"), "apps").unwrap();
        fs::write(
            app.join("package.json"),
            r#"{ "name": "app", "dependencies": { "root": "workspace:*" } }"#,
        )
        .unwrap();
        fs::write(app.join("src/index.js"), "").unwrap();

        let query = MockQuery::new()
            .with_package(
                WorkspacePackage::new("app", &app)
                    .with_dependency(DependencyKind::Normal, "root", "link:../.."),
            )
            .with_package(WorkspacePackage::new("root", &root));

        stage(&query, &StageOptions::new("app").with_staging_dir(".staging"), &()).unwrap();

        let staged = app.join(".staging/root");
        assert_eq!(fs::read_to_string(staged.join("apps/README.md")).unwrap(), "apps");
        assert!(staged.join("apps/app/src/index.js").exists());
        assert!(!staged.join("apps/app/.staging").exists());
        assert_eq!(
            WorkspaceFixture::read_manifest(&app)["dependencies"]["root"],
            "file:.staging/root"
        );
    }

    #[test]
    fn test_exclude_patterns() {
        let (ws, app) = chain();
        fs::create_dir_all(ws.package_dir("lib-a").join("node_modules/left-pad")).unwrap();
        fs::write(ws.package_dir("lib-a").join("node_modules/left-pad/index.js"), "").unwrap();

        let mut opts = StageOptions::new("app").with_staging_dir(".staging");
        opts.exclude = vec!["node_modules".to_string()];
        stage(ws.query(), &opts, &()).unwrap();

        assert!(app.join(".staging/lib-a/src").exists());
        assert!(!app.join(".staging/lib-a/node_modules").exists());
    }

    #[test]
    fn test_empty_filter_is_configuration_error() {
        let query = MockQuery::new();
        let err = stage(&query, &StageOptions::new(""), &()).unwrap_err();

        assert!(matches!(err, StageError::Configuration(_)));
        assert!(query.calls().is_empty());
    }

    #[test]
    fn test_query_failure_has_no_side_effects() {
        let mut ws = WorkspaceFixture::new();
        let app = ws.add_package("app", &["lib-a"], &[]);
        let before = fs::read_to_string(app.join("package.json")).unwrap();

        // lib-a was never registered, so resolving it fails.
        let err = stage(ws.query(), &StageOptions::new("app"), &()).unwrap_err();

        assert!(matches!(err, StageError::MetadataFormat { .. }));
        assert!(!app.join(DEFAULT_STAGING_DIR).exists());
        assert_eq!(fs::read_to_string(app.join("package.json")).unwrap(), before);
    }

    #[test]
    fn test_listener_events() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<String>>);

        impl StageListener for Recorder {
            fn resolved(&self, resolution: &Resolution) {
                self.0.lock().unwrap().push(format!("resolved {}", resolution.closure.len()));
            }
            fn copied(&self, member: &ClosureMember) {
                self.0.lock().unwrap().push(format!("copied {}", member.name));
            }
            fn rewritten(&self, _summary: &RewriteSummary) {
                self.0.lock().unwrap().push("rewritten".to_string());
            }
        }

        let (ws, _app) = chain();
        let recorder = Recorder::default();
        stage(ws.query(), &StageOptions::new("app"), &recorder).unwrap();

        let mut events = recorder.0.into_inner().unwrap();
        assert_eq!(events[0], "resolved 2");
        events.sort();
        assert_eq!(
            events,
            vec![
                "copied lib-a",
                "copied lib-b",
                "resolved 2",
                "rewritten",
                "rewritten",
                "rewritten"
            ]
        );
    }

    #[test]
    fn test_plan_has_no_side_effects() {
        let (ws, app) = chain();

        let plan = plan(ws.query(), &StageOptions::new("app").with_staging_dir(".staging")).unwrap();

        assert_eq!(plan.copies.len(), 2);
        assert_eq!(plan.copies[0].name, "lib-a");
        assert_eq!(plan.copies[0].source, ws.package_dir("lib-a"));
        assert_eq!(plan.copies[0].destination, app.join(".staging/lib-a"));
        assert!(!app.join(".staging").exists());
    }
}
