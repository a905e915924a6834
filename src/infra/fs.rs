//! # File System Operations Module / 文件系统操作模块
//!
//! Path helpers for resolving targets and writing report files.
//!
//! 用于解析目标路径和写入报告文件的路径工具。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Expands `~` and `$VAR` / `${VAR}` in a configured path.
///
/// # Arguments
/// * `raw` - The path as written in the run list
///
/// # Returns
/// The expanded path, or an error naming the undefined variable
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand path: {raw}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Resolves a target path: relative paths are joined onto `base` when one
/// is given, and the result is made absolute against the current directory.
/// Symlinks are not resolved.
pub fn resolve_target_path(path: &Path, base: Option<&Path>) -> PathBuf {
    let joined = match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    };
    std::path::absolute(&joined).unwrap_or(joined)
}

/// Checks if a path exists and is a regular file (symlinks are followed).
///
/// # Arguments
/// * `path` - Path to check
///
/// # Returns
/// `true` if the path exists and is a file, `false` otherwise
pub fn target_exists(path: &Path) -> bool {
    path.is_file()
}

/// Writes a report, creating missing parent directories first.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_is_joined_onto_base() {
        let resolved = resolve_target_path(Path::new("demo.py"), Some(Path::new("/srv/scripts")));
        assert_eq!(resolved, PathBuf::from("/srv/scripts/demo.py"));
    }

    #[test]
    fn absolute_path_ignores_base() {
        let resolved = resolve_target_path(Path::new("/opt/demo.py"), Some(Path::new("/srv")));
        assert_eq!(resolved, PathBuf::from("/opt/demo.py"));
    }

    #[test]
    fn relative_path_without_base_becomes_absolute() {
        let resolved = resolve_target_path(Path::new("demo.py"), None);
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("demo.py"));
    }

    #[test]
    fn expand_path_substitutes_variables() {
        let home = std::env::var("HOME").unwrap_or_default();
        let expanded = expand_path("$HOME/x.py").unwrap();
        assert_eq!(expanded, PathBuf::from(format!("{home}/x.py")));
    }

    #[test]
    fn expand_path_rejects_undefined_variables() {
        assert!(expand_path("$SCRIPT_RUNNER_SURELY_UNDEFINED_VAR/x.py").is_err());
    }

    #[test]
    fn directories_are_not_targets() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!target_exists(dir.path()));
        let file = dir.path().join("a.sh");
        fs::write(&file, "exit 0\n").unwrap();
        assert!(target_exists(&file));
        assert!(!target_exists(&dir.path().join("missing.x")));
    }

    #[test]
    fn write_report_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/nested/run.json");
        write_report(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }
}
