//! Name and path validation shared by every module that touches the filesystem
//!
//! All user-controlled names and relative paths pass through these validators
//! before any filesystem access. Rejection happens on the raw string, before
//! normalization, so a traversal sequence is refused even when it would
//! normalize to something harmless.

use std::path::{Component, Path, PathBuf};

use tracing::trace;

use crate::error::{InputError, Result, SecurityError};

/// npm's documented maximum package name length
const PACKAGE_NAME_MAX: usize = 214;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn is_path_char(c: char) -> bool {
    is_name_char(c) || c == '/'
}

/// Validate a single directory or file name
///
/// Accepts `[A-Za-z0-9._-]+` with no separators. Returns the input unchanged
/// so call sites can validate and use in one expression.
pub fn validate_directory_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(InputError::Empty { what: "name" }.into());
    }
    if name.contains('\\') {
        return Err(InputError::Backslash {
            what: "name",
            value: name.to_string(),
        }
        .into());
    }
    if name.contains("..") {
        return Err(InputError::Traversal {
            what: "name",
            value: name.to_string(),
        }
        .into());
    }
    if !name.chars().all(is_name_char) {
        return Err(InputError::IllegalCharacters {
            what: "name",
            value: name.to_string(),
        }
        .into());
    }
    Ok(name)
}

/// Validate a slash-separated relative path
///
/// Accepts `[A-Za-z0-9._/-]+`, rejecting absolute paths, backslashes, and any
/// occurrence of `..` anywhere in the string. Every separator must delimit a
/// non-empty segment, so `a//b` and `a/b/` are rejected rather than carried
/// into layouts and include lists in a non-canonical form.
pub fn validate_relative_path(path: &str) -> Result<&str> {
    if path.is_empty() {
        return Err(InputError::Empty { what: "path" }.into());
    }
    if path.contains('\\') {
        return Err(InputError::Backslash {
            what: "path",
            value: path.to_string(),
        }
        .into());
    }
    if path.contains("..") {
        return Err(InputError::Traversal {
            what: "path",
            value: path.to_string(),
        }
        .into());
    }
    if path.starts_with('/') {
        return Err(InputError::AbsolutePath(path.to_string()).into());
    }
    if path.split('/').any(str::is_empty) {
        return Err(InputError::EmptySegment(path.to_string()).into());
    }
    if !path.chars().all(is_path_char) {
        return Err(InputError::IllegalCharacters {
            what: "path",
            value: path.to_string(),
        }
        .into());
    }
    Ok(path)
}

/// Validate an npm package name, plain or scoped
///
/// Scoped names must be `@scope/name` with exactly one slash and two
/// non-empty segments, each validated independently.
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(InputError::Empty {
            what: "package name",
        }
        .into());
    }
    if name.len() > PACKAGE_NAME_MAX {
        return Err(InputError::NameTooLong {
            name: name.to_string(),
            limit: PACKAGE_NAME_MAX,
        }
        .into());
    }
    if name.contains('\\') {
        return Err(InputError::Backslash {
            what: "package name",
            value: name.to_string(),
        }
        .into());
    }
    if name.contains("..") {
        return Err(InputError::Traversal {
            what: "package name",
            value: name.to_string(),
        }
        .into());
    }

    if let Some(scoped) = name.strip_prefix('@') {
        let (scope, pkg) = scoped
            .split_once('/')
            .ok_or_else(|| InputError::BadScopedName(name.to_string()))?;
        if scope.is_empty() || pkg.is_empty() || pkg.contains('/') {
            return Err(InputError::BadScopedName(name.to_string()).into());
        }
        validate_name_segment(scope, name)?;
        validate_name_segment(pkg, name)?;
    } else {
        validate_name_segment(name, name)?;
    }
    Ok(())
}

fn validate_name_segment(segment: &str, full: &str) -> Result<()> {
    if segment.starts_with('.') || segment.starts_with('_') {
        return Err(InputError::BadLeadingCharacter(full.to_string()).into());
    }
    if !segment.chars().all(is_name_char) {
        return Err(InputError::IllegalCharacters {
            what: "package name",
            value: full.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Resolve `candidate` against `root` and require the result to stay inside it
///
/// Resolution is purely lexical: `.` segments drop out and `..` segments pop,
/// without consulting the filesystem. The normalized path must re-derive a
/// suffix under the normalized root or the candidate is rejected.
pub fn confine_to_root(candidate: &Path, root: &Path) -> Result<PathBuf> {
    let escape = || -> crate::error::GantryError {
        SecurityError::PathEscapesRoot {
            candidate: candidate.to_path_buf(),
            root: root.to_path_buf(),
        }
        .into()
    };

    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let root_norm = normalize_lexically(root).ok_or_else(escape)?;
    let norm = normalize_lexically(&joined).ok_or_else(escape)?;

    if norm.strip_prefix(&root_norm).is_err() {
        return Err(escape());
    }
    trace!(path = %norm.display(), "path confined to root");
    Ok(norm)
}

/// Collapse `.` and `..` segments without touching the filesystem
///
/// Returns `None` when a `..` would pop past the start of the path.
pub(crate) fn normalize_lexically(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            other => out.push(other),
        }
    }
    Some(out)
}

/// Parent directory of a slash-separated relative path
///
/// A bare file name has parent `"."`.
pub fn parent_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir.to_string(),
        _ => ".".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GantryError;

    #[test]
    fn test_accepts_plain_names() {
        assert!(validate_directory_name("build").is_ok());
        assert!(validate_directory_name("index.js").is_ok());
        assert!(validate_directory_name("my-app_v2").is_ok());
    }

    fn is_traversal(err: GantryError) -> bool {
        matches!(err, GantryError::Input(InputError::Traversal { .. }))
    }

    #[test]
    fn test_rejects_traversal_in_names() {
        // The substring is enough; no normalization happens first.
        assert!(is_traversal(validate_directory_name("..").unwrap_err()));
        assert!(is_traversal(validate_directory_name("a..b").unwrap_err()));
        assert!(is_traversal(validate_directory_name("..build").unwrap_err()));
    }

    #[test]
    fn test_rejects_separator_in_names() {
        assert!(validate_directory_name("build/client").is_err());
        assert!(validate_directory_name("build\\client").is_err());
    }

    #[test]
    fn test_rejects_empty_name() {
        assert!(validate_directory_name("").is_err());
    }

    #[test]
    fn test_accepts_relative_paths() {
        assert!(validate_relative_path("build/server/index.js").is_ok());
        assert!(validate_relative_path("dist").is_ok());
        assert!(validate_relative_path("out/v2.1/app").is_ok());
    }

    #[test]
    fn test_rejects_traversal_in_paths() {
        assert!(is_traversal(validate_relative_path("../outside").unwrap_err()));
        assert!(is_traversal(validate_relative_path("build/../../etc").unwrap_err()));
        assert!(is_traversal(validate_relative_path("build/a..b/out").unwrap_err()));
    }

    #[test]
    fn test_rejects_absolute_path() {
        let err = validate_relative_path("/etc/passwd").unwrap_err();
        assert!(matches!(
            err,
            GantryError::Input(InputError::AbsolutePath(_))
        ));
    }

    #[test]
    fn test_rejects_backslash_path() {
        assert!(validate_relative_path("build\\server").is_err());
    }

    #[test]
    fn test_rejects_illegal_path_characters() {
        assert!(validate_relative_path("build;rm -rf").is_err());
        assert!(validate_relative_path("build dir").is_err());
    }

    #[test]
    fn test_rejects_empty_path_segments() {
        let err = validate_relative_path("build//client").unwrap_err();
        assert!(matches!(
            err,
            GantryError::Input(InputError::EmptySegment(_))
        ));
        assert!(validate_relative_path("build/client/").is_err());
        assert!(validate_relative_path("build/server/").is_err());
    }

    #[test]
    fn test_accepts_package_names() {
        assert!(validate_package_name("react-router").is_ok());
        assert!(validate_package_name("@react-router/dev").is_ok());
        assert!(validate_package_name("lodash.merge").is_ok());
    }

    #[test]
    fn test_rejects_bad_package_names() {
        assert!(validate_package_name("").is_err());
        assert!(validate_package_name(".hidden").is_err());
        assert!(validate_package_name("_private").is_err());
        assert!(validate_package_name("@scope").is_err());
        assert!(validate_package_name("@/name").is_err());
        assert!(validate_package_name("@scope/").is_err());
        assert!(validate_package_name("@scope/a/b").is_err());
        assert!(validate_package_name("UPPER CASE").is_err());
        assert!(is_traversal(
            validate_package_name("../../../etc/passwd").unwrap_err()
        ));
        assert!(is_traversal(validate_package_name("a..b").unwrap_err()));
    }

    #[test]
    fn test_rejects_overlong_package_name() {
        let name = "a".repeat(215);
        assert!(validate_package_name(&name).is_err());
        let name = "a".repeat(214);
        assert!(validate_package_name(&name).is_ok());
    }

    #[test]
    fn test_confine_keeps_inner_paths() {
        let root = Path::new("/project");
        let out = confine_to_root(Path::new("build/client"), root).unwrap();
        assert_eq!(out, PathBuf::from("/project/build/client"));
    }

    #[test]
    fn test_confine_normalizes_dot_segments() {
        let root = Path::new("/project");
        let out = confine_to_root(Path::new("./build/./server"), root).unwrap();
        assert_eq!(out, PathBuf::from("/project/build/server"));
    }

    #[test]
    fn test_confine_rejects_escape() {
        let root = Path::new("/project");
        let err = confine_to_root(Path::new("../elsewhere"), root).unwrap_err();
        assert!(matches!(
            err,
            GantryError::Security(SecurityError::PathEscapesRoot { .. })
        ));
        assert!(confine_to_root(Path::new("build/../../other"), root).is_err());
    }

    #[test]
    fn test_confine_rejects_foreign_absolute() {
        let root = Path::new("/project");
        assert!(confine_to_root(Path::new("/etc/passwd"), root).is_err());
        // An absolute path already under the root is fine.
        assert!(confine_to_root(Path::new("/project/build"), root).is_ok());
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("build/server/index.js"), "build/server");
        assert_eq!(parent_dir("index.js"), ".");
        assert_eq!(parent_dir("build/index.js"), "build");
    }
}
