//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::core::error::{StageError, StageResult};

/// Recursively copy a directory.
///
/// Existing files in `dst` are overwritten and symbolic links are recreated
/// as links. Entries whose file name matches one of `exclude` are skipped.
/// So are `dst` and `skip` when they lie inside `src`; their ancestors are
/// still copied, minus that one subtree.
pub fn copy_dir_all(
    src: &Path,
    dst: &Path,
    skip: Option<&Path>,
    exclude: &[Pattern],
) -> StageResult<()> {
    let meta = fs::metadata(src).map_err(|e| StageError::fs("read", src, e))?;
    if !meta.is_dir() {
        return Err(StageError::fs(
            "copy",
            src,
            io::Error::new(io::ErrorKind::NotFound, "source is not a directory"),
        ));
    }

    ensure_dir(dst)?;

    let walker = WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            let path = entry.path();
            path != dst
                && Some(path) != skip
                && !is_excluded(&entry.file_name().to_string_lossy(), exclude)
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            StageError::fs("read", path, io::Error::from(e))
        })?;

        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dst.join(rel);
        let ty = entry.file_type();

        if ty.is_symlink() {
            let link = fs::read_link(entry.path()).map_err(|e| StageError::fs("read", entry.path(), e))?;
            remove_existing(&target)?;
            symlink(&link, &target).map_err(|e| StageError::fs("create link", &target, e))?;
        } else if ty.is_dir() {
            ensure_dir(&target)?;
        } else {
            if fs::symlink_metadata(&target).map(|m| m.file_type().is_symlink()).unwrap_or(false) {
                remove_existing(&target)?;
            }
            fs::copy(entry.path(), &target).map_err(|e| StageError::fs("copy", entry.path(), e))?;
        }
    }

    Ok(())
}

fn is_excluded(file_name: &str, exclude: &[Pattern]) -> bool {
    exclude.iter().any(|p| p.matches(file_name))
}

/// Remove whatever sits at `path` (file, link or directory), if anything.
fn remove_existing(path: &Path) -> StageResult<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StageError::fs("inspect", path, e)),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    // Directory symlinks on Windows need remove_dir.
    #[cfg(windows)]
    let result = result.or_else(|_| fs::remove_dir(path));

    result.map_err(|e| StageError::fs("remove", path, e))
}

/// Compile glob patterns used to exclude entries from copies.
pub fn compile_patterns(patterns: &[String]) -> StageResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                StageError::config(format!("invalid exclude pattern `{}`: {}", p, e))
            })
        })
        .collect()
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> StageResult<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| StageError::fs("remove", path, e))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> StageResult<()> {
    fs::create_dir_all(path).map_err(|e| StageError::fs("create directory", path, e))
}

/// Read a file to string.
pub fn read_to_string(path: &Path) -> StageResult<String> {
    fs::read_to_string(path).map_err(|e| StageError::fs("read", path, e))
}

/// Write a string to a file.
pub fn write_string(path: &Path, contents: &str) -> StageResult<()> {
    fs::write(path, contents).map_err(|e| StageError::fs("write", path, e))
}

/// Make `path` absolute against `base` and fold `.` and `..` components.
///
/// Purely lexical; the path does not need to exist.
pub fn normalize_path(base: &Path, path: &Path) -> PathBuf {
    let joined = base.join(path);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Create a symlink (platform-aware).
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let resolved = dst.parent().map(|p| p.join(src)).unwrap_or_else(|| src.to_path_buf());
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}
