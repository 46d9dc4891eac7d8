// src/watch/path_utils.rs

//! Utility functions for path handling in the watchers.

use std::path::{Component, Path, PathBuf};

/// Directory names whose contents never hold ignore files worth loading.
pub const SKIP_DIRS: &[&str] = &[crate::filter::VCS_DIR, crate::filter::BUILD_DIR];

/// Express `path` relative to `base`.
///
/// - First we try a direct `strip_prefix(base)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
///
/// Returns `None` if `path` is outside `base`, i.e. reaching it from `base`
/// would need a `..` traversal.
pub fn relative_to(base: &Path, path: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(base) {
        return Some(rel.to_path_buf());
    }

    // Removed files cannot be canonicalized; those only ever match through
    // the fast path above.
    if let (Ok(base_canon), Ok(path_canon)) = (base.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&base_canon) {
            return Some(rel.to_path_buf());
        }
    }

    None
}

/// Whether the final component of `path` is one of `names`.
pub fn has_file_name(path: &Path, names: &[String]) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| names.iter().any(|n| n == name))
}

/// Whether `path` sits inside one of [`SKIP_DIRS`] below `root`.
///
/// Only components under `root` count, so a project that itself lives in a
/// directory named `target` is still watched.
pub fn in_skipped_dir(root: &Path, path: &Path) -> bool {
    let Some(rel) = relative_to(root, path) else {
        return false;
    };
    let Some(parent) = rel.parent() else {
        return false;
    };
    parent.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| SKIP_DIRS.contains(&n)),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_path_is_relative() {
        assert_eq!(
            relative_to(Path::new("/p"), Path::new("/p/src/main.rs")),
            Some(PathBuf::from("src/main.rs"))
        );
    }

    #[test]
    fn sibling_and_parent_paths_escape() {
        assert_eq!(relative_to(Path::new("/p/a"), Path::new("/p/b/x.rs")), None);
        assert_eq!(relative_to(Path::new("/p/a"), Path::new("/p/x.rs")), None);
        // A shared string prefix is not a shared directory.
        assert_eq!(relative_to(Path::new("/p/a"), Path::new("/p/ab/x.rs")), None);
    }

    #[test]
    fn file_name_matching() {
        let names = vec![".gitignore".to_string(), ".ignore".to_string()];
        assert!(has_file_name(Path::new("/p/sub/.ignore"), &names));
        assert!(!has_file_name(Path::new("/p/sub/.gitignore.bak"), &names));
        assert!(!has_file_name(Path::new("/"), &names));
    }

    #[test]
    fn skipped_dirs_count_only_below_the_root() {
        let root = Path::new("/home/u/target/proj");
        assert!(in_skipped_dir(root, Path::new("/home/u/target/proj/target/x/.gitignore")));
        assert!(in_skipped_dir(root, Path::new("/home/u/target/proj/.git/.gitignore")));
        assert!(!in_skipped_dir(root, Path::new("/home/u/target/proj/.gitignore")));
        assert!(!in_skipped_dir(root, Path::new("/home/u/target/proj/src/.ignore")));
        assert!(!in_skipped_dir(root, Path::new("/elsewhere/target/.gitignore")));
    }
}
