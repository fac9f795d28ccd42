//! Path resolution for directory runs.
//!
//! Provides the ignore set used to prune a directory walk, best-effort
//! resolution of `./`-relative ignore entries, and the rules that turn a
//! requested output location into a concrete file or directory path.
//!
//! All functions that compute an output location create the missing
//! directories they return.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::tracer::Tracer;

// ============================================================================
// Normalization
// ============================================================================

/// Normalize a path for comparison.
///
/// Existing paths are canonicalized (resolving symlinks such as `/tmp` on
/// macOS); paths that do not exist are made absolute against the current
/// directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    match fs::canonicalize(path) {
        Ok(canonical) => canonical,
        Err(_) => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

// ============================================================================
// IgnoreSet
// ============================================================================

/// Absolute paths excluded from a directory walk.
///
/// A directory entry excludes its whole subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    paths: BTreeSet<PathBuf>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary paths, normalizing each one.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = Self::new();
        for path in paths {
            set.insert(path.as_ref());
        }
        set
    }

    pub fn insert(&mut self, path: &Path) {
        self.paths.insert(normalize_path(path));
    }

    /// Whether `path` is an ignored entry or lies beneath one.
    pub fn contains(&self, path: &Path) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        let path = normalize_path(path);
        self.paths.iter().any(|ignored| path.starts_with(ignored))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

// ============================================================================
// Relative Path Resolution
// ============================================================================

const CURRENT_DIR_PREFIXES: [&str; 2] = ["./", ".\\"];

/// Resolve `./`-relative entries against the target root.
///
/// Each entry starting with `./` (or `.\`) is joined onto `root` when `root`
/// is a directory, or onto its parent otherwise. The rewrite only happens when
/// the joined path exists; every other entry passes through untouched.
pub fn resolve_relative_paths<P: AsRef<Path>>(paths: &[P], root: &Path) -> Vec<PathBuf> {
    let base = if root.is_dir() {
        root.to_path_buf()
    } else {
        root.parent().map(Path::to_path_buf).unwrap_or_default()
    };

    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let Some(raw) = path.to_str() else {
                return path.to_path_buf();
            };
            let Some(rest) = CURRENT_DIR_PREFIXES
                .iter()
                .find_map(|prefix| raw.strip_prefix(*prefix))
            else {
                return path.to_path_buf();
            };
            let candidate = base.join(rest);
            if candidate.exists() {
                let resolved = normalize_path(&candidate);
                debug!(from = %path.display(), to = %resolved.display(), "resolved ignore path");
                resolved
            } else {
                path.to_path_buf()
            }
        })
        .collect()
}

// ============================================================================
// Output Locations
// ============================================================================

/// Compute the concrete output file for `input`.
///
/// - `None` means in place: the normalized input path.
/// - An existing directory, or a path without an extension, receives the
///   input's file name inside it.
/// - Anything else is taken as the output file itself.
///
/// Missing parent directories are created.
pub fn resolve_output_file(input: &Path, output: Option<&Path>) -> io::Result<PathBuf> {
    let Some(output) = output else {
        return Ok(normalize_path(input));
    };

    let target = if output.is_dir() || output.extension().is_none() {
        let file_name = input.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("input has no file name: {}", input.display()),
            )
        })?;
        fs::create_dir_all(output)?;
        output.join(file_name)
    } else {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        output.to_path_buf()
    };

    Ok(normalize_path(&target))
}

/// Compute and create the output directory for a directory run.
///
/// `None` means in place. When the requested directory name is already taken
/// by a regular file, the first free `<name>-N` sibling is used instead and a
/// warning is reported.
pub fn resolve_output_dir(
    input: &Path,
    output: Option<&Path>,
    tracer: &dyn Tracer,
) -> io::Result<PathBuf> {
    let Some(output) = output else {
        return Ok(normalize_path(input));
    };

    let mut target = output.to_path_buf();
    if target.is_file() {
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let mut suffix = 1u32;
        loop {
            let candidate = output.with_file_name(format!("{name}-{suffix}"));
            if !candidate.is_file() {
                target = candidate;
                break;
            }
            suffix += 1;
        }
        tracer.warn(&format!(
            "output directory {} collides with an existing file, using {}",
            output.display(),
            target.display()
        ));
    }

    fs::create_dir_all(&target)?;
    Ok(normalize_path(&target))
}

/// Whether `path` carries one of `extensions` (compared case-insensitively).
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::MemoryTracer;
    use tempfile::TempDir;

    #[test]
    fn relative_ignore_resolves_when_present() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        fs::create_dir_all(root.join("vendor")).unwrap();

        let resolved = resolve_relative_paths(&["./vendor", "./missing", "abs/other"], &root);
        assert_eq!(resolved[0], normalize_path(&root.join("vendor")));
        assert_eq!(resolved[1], PathBuf::from("./missing"));
        assert_eq!(resolved[2], PathBuf::from("abs/other"));
    }

    #[test]
    fn relative_ignore_uses_parent_of_file_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("lib")).unwrap();
        let file_root = temp.path().join("index.php");
        fs::write(&file_root, "<?php\n").unwrap();

        let resolved = resolve_relative_paths(&["./lib"], &file_root);
        assert_eq!(resolved, vec![normalize_path(&temp.path().join("lib"))]);
    }

    #[test]
    fn ignore_set_prunes_subtrees() {
        let temp = TempDir::new().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir_all(vendor.join("pkg")).unwrap();

        let set = IgnoreSet::from_paths([&vendor]);
        assert!(set.contains(&vendor));
        assert!(set.contains(&vendor.join("pkg")));
        assert!(set.contains(&vendor.join("pkg/file.php")));
        assert!(!set.contains(&temp.path().join("vendor2")));
        assert!(!IgnoreSet::new().contains(&vendor));
    }

    #[test]
    fn output_file_in_place_by_default() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.php");
        fs::write(&input, "<?php\n").unwrap();

        assert_eq!(
            resolve_output_file(&input, None).unwrap(),
            normalize_path(&input)
        );
    }

    #[test]
    fn output_file_mirrors_name_into_extensionless_dir() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.php");
        fs::write(&input, "<?php\n").unwrap();
        let out_dir = temp.path().join("out/nested");

        let resolved = resolve_output_file(&input, Some(&out_dir)).unwrap();
        assert!(out_dir.is_dir());
        assert_eq!(resolved, normalize_path(&out_dir).join("a.php"));
    }

    #[test]
    fn output_file_with_extension_creates_parent() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.php");
        fs::write(&input, "<?php\n").unwrap();
        let target = temp.path().join("deep/dir/b.php");

        let resolved = resolve_output_file(&input, Some(&target)).unwrap();
        assert!(temp.path().join("deep/dir").is_dir());
        assert!(resolved.ends_with("deep/dir/b.php"));
    }

    #[test]
    fn output_dir_colliding_with_file_is_suffixed() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("src");
        fs::create_dir_all(&input).unwrap();
        let taken = temp.path().join("out");
        fs::write(&taken, "not a dir").unwrap();
        fs::write(temp.path().join("out-1"), "also not a dir").unwrap();

        let tracer = MemoryTracer::new();
        let resolved = resolve_output_dir(&input, Some(&taken), &tracer).unwrap();
        assert_eq!(resolved, normalize_path(&temp.path().join("out-2")));
        assert!(resolved.is_dir());
        assert_eq!(tracer.error_lines().len(), 1);
        assert!(tracer.error_lines()[0].starts_with("warning: output directory"));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let exts = ["php", "phtml"];
        assert!(has_extension(Path::new("a.PHP"), &exts));
        assert!(has_extension(Path::new("dir/b.phtml"), &exts));
        assert!(!has_extension(Path::new("b.txt"), &exts));
        assert!(!has_extension(Path::new("Makefile"), &exts));
    }
}
