//! Resolution of symbolic repository references to local paths
//!
//! A reference takes one of three forms:
//! - `auto:<name>`: search the start directory and its ancestors for a child
//!   directory called `<name>` that is a git working copy
//! - `remote...`: no local clone is wanted; resolves to an empty path
//! - an absolute path, used verbatim
//!
//! Anything else does not resolve.

use std::path::{Path, PathBuf};

use crate::fs;

const AUTO_PREFIX: &str = "auto:";
const REMOTE_PREFIX: &str = "remote";

/// A parsed repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryReference {
    /// Search ancestor directories for a working copy with this name
    Auto(String),
    /// Fetch from the remote, no local path
    Remote,
    /// A local path given explicitly
    Absolute(PathBuf),
    /// Relative paths and anything else we cannot interpret
    Unsupported(String),
}

impl RepositoryReference {
    /// Parse a reference string
    ///
    /// `auto:` takes precedence over `remote`, so `auto:remote-tools`
    /// searches for a directory named `remote-tools`.
    pub fn parse(input: &str) -> Self {
        if let Some(name) = input.strip_prefix(AUTO_PREFIX) {
            return Self::Auto(name.to_string());
        }

        if input.starts_with(REMOTE_PREFIX) {
            return Self::Remote;
        }

        let path = Path::new(input);
        if path.is_absolute() {
            return Self::Absolute(path.to_path_buf());
        }

        Self::Unsupported(input.to_string())
    }
}

/// Outcome of resolving a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A local path (found by search, or given explicitly)
    Found(PathBuf),
    /// Resolved on purpose to no path at all
    Remote,
    /// No path could be determined
    Unresolved,
}

impl Resolution {
    /// The resolved path, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path.as_path()),
            Self::Remote | Self::Unresolved => None,
        }
    }

    /// Flatten into the string form used by build scripts
    ///
    /// `Remote` becomes an empty string and `Unresolved` becomes `None`, so
    /// the two stay distinguishable.
    pub fn as_path_string(&self) -> Option<String> {
        match self {
            Self::Found(path) => Some(path.to_string_lossy().into_owned()),
            Self::Remote => Some(String::new()),
            Self::Unresolved => None,
        }
    }

    /// Whether the reference resolved (to a path or to `Remote`)
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// Resolves repository references against the local filesystem
#[derive(Debug, Clone, Default)]
pub struct RepositoryLocator {
    max_levels: Option<usize>,
}

impl RepositoryLocator {
    /// Create a locator that bounds the ancestor walk by the number of
    /// components in the start directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of directories visited during an `auto:` search
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = Some(levels);
        self
    }

    /// Resolve a reference string starting from `start`
    pub fn resolve(&self, start: impl AsRef<Path>, reference: &str) -> Resolution {
        match RepositoryReference::parse(reference) {
            RepositoryReference::Auto(name) => self.search(start.as_ref(), &name),
            RepositoryReference::Remote => Resolution::Remote,
            RepositoryReference::Absolute(path) => Resolution::Found(path),
            RepositoryReference::Unsupported(input) => {
                tracing::debug!(reference = %input, "Unsupported repository reference");
                Resolution::Unresolved
            }
        }
    }

    /// Walk upward from `start` looking for a working copy called `name`
    fn search(&self, start: &Path, name: &str) -> Resolution {
        // A trailing separator can never match a directory entry's path
        if name.is_empty() || name.ends_with(std::path::is_separator) {
            return Resolution::Unresolved;
        }

        let levels = self
            .max_levels
            .unwrap_or_else(|| start.components().count());
        let mut search_path = start.to_path_buf();

        for _ in 0..levels {
            if let Some(found) = find_in_directory(&search_path, name) {
                tracing::debug!(name, path = %found.display(), "Located repository");
                return Resolution::Found(found);
            }

            match search_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    search_path = parent.to_path_buf();
                }
                _ => break,
            }
        }

        tracing::debug!(name, start = %start.display(), "Repository not found in any ancestor");
        Resolution::Unresolved
    }
}

/// Resolve `reference` from `start` with the default search bound
pub fn resolve_path(start: impl AsRef<Path>, reference: &str) -> Resolution {
    RepositoryLocator::new().resolve(start, reference)
}

/// Look at the immediate children of `dir` for a working copy named `name`
///
/// Several matches are only possible when `name` is itself a multi-component
/// path; the lexicographically smallest wins.
fn find_in_directory(dir: &Path, name: &str) -> Option<PathBuf> {
    let children = match fs::list_children(dir) {
        Ok(children) => children,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Cannot list directory, moving up");
            return None;
        }
    };

    let mut matches: Vec<PathBuf> = children
        .into_iter()
        .filter(|child| child.ends_with(name))
        .filter(|child| fs::is_directory(child))
        .filter(|child| fs::is_git_working_copy(child))
        .collect();

    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_repo(path: &Path) {
        std::fs::create_dir_all(path.join(".git")).unwrap();
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            RepositoryReference::parse("auto:tools"),
            RepositoryReference::Auto("tools".to_string())
        );
        assert_eq!(RepositoryReference::parse("remote"), RepositoryReference::Remote);
        assert_eq!(
            RepositoryReference::parse("remote:origin"),
            RepositoryReference::Remote
        );
        assert_eq!(
            RepositoryReference::parse("relative/path"),
            RepositoryReference::Unsupported("relative/path".to_string())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_absolute() {
        assert_eq!(
            RepositoryReference::parse("/opt/repos/tools"),
            RepositoryReference::Absolute(PathBuf::from("/opt/repos/tools"))
        );
    }

    #[test]
    fn test_auto_prefix_wins_over_remote() {
        assert_eq!(
            RepositoryReference::parse("auto:remote-tools"),
            RepositoryReference::Auto("remote-tools".to_string())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_is_returned_verbatim() {
        let resolution = resolve_path("/does/not/matter", "/no/such/dir");
        assert_eq!(resolution, Resolution::Found(PathBuf::from("/no/such/dir")));
        assert_eq!(resolution.as_path_string(), Some("/no/such/dir".to_string()));
    }

    #[test]
    fn test_remote_is_empty_sentinel() {
        for reference in ["remote", "remote-only", "remotes/origin"] {
            let resolution = resolve_path("/", reference);
            assert_eq!(resolution, Resolution::Remote);
            assert_eq!(resolution.as_path_string(), Some(String::new()));
            assert!(resolution.is_resolved());
        }
    }

    #[test]
    fn test_unsupported_is_unresolved() {
        let resolution = resolve_path("/", "some/relative");
        assert_eq!(resolution, Resolution::Unresolved);
        assert_eq!(resolution.as_path_string(), None);
        assert!(!resolution.is_resolved());
    }

    #[test]
    fn test_auto_finds_ancestor_sibling() {
        let root = TempDir::new().unwrap();
        let start = root.path().join("a").join("b").join("c");
        std::fs::create_dir_all(&start).unwrap();
        let target = root.path().join("a").join("target");
        make_repo(&target);

        let resolution = resolve_path(&start, "auto:target");
        assert_eq!(resolution, Resolution::Found(target));
    }

    #[test]
    fn test_auto_finds_child_of_start() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("target");
        make_repo(&target);

        let resolution = resolve_path(root.path(), "auto:target");
        assert_eq!(resolution, Resolution::Found(target));
    }

    #[test]
    fn test_auto_prefers_nearest_ancestor() {
        let root = TempDir::new().unwrap();
        let start = root.path().join("a").join("b");
        std::fs::create_dir_all(&start).unwrap();
        make_repo(&root.path().join("target"));
        let near = root.path().join("a").join("target");
        make_repo(&near);

        assert_eq!(resolve_path(&start, "auto:target"), Resolution::Found(near));
    }

    #[test]
    fn test_auto_skips_non_repositories() {
        let root = TempDir::new().unwrap();
        let start = root.path().join("a").join("b");
        std::fs::create_dir_all(&start).unwrap();
        // Same name, but not a working copy
        std::fs::create_dir_all(root.path().join("a").join("target").join("src")).unwrap();
        let real = root.path().join("target");
        make_repo(&real);

        assert_eq!(resolve_path(&start, "auto:target"), Resolution::Found(real));
    }

    #[test]
    fn test_auto_requires_exact_name() {
        let root = TempDir::new().unwrap();
        make_repo(&root.path().join("my-target"));
        make_repo(&root.path().join("target-old"));

        let locator = RepositoryLocator::new().with_max_levels(1);
        assert_eq!(locator.resolve(root.path(), "auto:target"), Resolution::Unresolved);
    }

    #[test]
    fn test_auto_not_found() {
        let root = TempDir::new().unwrap();
        let start = root.path().join("a").join("b").join("c");
        std::fs::create_dir_all(&start).unwrap();

        let resolution = resolve_path(&start, "auto:reposcout-no-such-repository");
        assert_eq!(resolution, Resolution::Unresolved);
        assert_eq!(resolution.as_path_string(), None);
    }

    #[test]
    fn test_auto_missing_start_keeps_walking() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("target");
        make_repo(&target);
        let start = root.path().join("gone").join("deeper");

        assert_eq!(resolve_path(&start, "auto:target"), Resolution::Found(target));
    }

    #[test]
    fn test_max_levels_bounds_search() {
        let root = TempDir::new().unwrap();
        let start = root.path().join("a").join("b");
        std::fs::create_dir_all(&start).unwrap();
        make_repo(&root.path().join("target"));

        // start, a: two levels never reach the temp root
        let locator = RepositoryLocator::new().with_max_levels(2);
        assert_eq!(locator.resolve(&start, "auto:target"), Resolution::Unresolved);

        let locator = RepositoryLocator::new().with_max_levels(3);
        assert!(locator.resolve(&start, "auto:target").path().is_some());
    }

    #[test]
    fn test_auto_trailing_separator_does_not_match() {
        let root = TempDir::new().unwrap();
        make_repo(&root.path().join("target"));

        let locator = RepositoryLocator::new().with_max_levels(1);
        assert_eq!(locator.resolve(root.path(), "auto:target/"), Resolution::Unresolved);
        assert!(locator.resolve(root.path(), "auto:target").path().is_some());
    }

    #[test]
    fn test_auto_empty_name() {
        let root = TempDir::new().unwrap();
        assert_eq!(resolve_path(root.path(), "auto:"), Resolution::Unresolved);
    }
}
