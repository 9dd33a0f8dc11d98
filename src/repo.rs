//! Repository identity and tree snapshot types.

use std::fmt;

/// Branch used when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Identifies the single remote repository content is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    owner: String,
    name: String,
    branch: String,
}

impl RepositoryRef {
    /// Creates repository reference, falling back to `main` for an empty branch.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        branch: Option<impl Into<String>>,
    ) -> Self {
        let branch: Option<String> = branch.map(Into::into);
        let branch = branch
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        Self {
            owner: owner.into(),
            name: name.into(),
            branch,
        }
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Branch documents are read from.
    pub fn branch(&self) -> &str {
        &self.branch
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
}

/// Entry from a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    path: String,
    kind: EntryKind,
}

impl TreeEntry {
    /// Creates entry. `path` is repository-root relative with `/` separators.
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Shorthand for a blob entry.
    pub fn blob(path: impl Into<String>) -> Self {
        Self::new(path, EntryKind::Blob)
    }

    /// Shorthand for a tree entry.
    pub fn tree(path: impl Into<String>) -> Self {
        Self::new(path, EntryKind::Tree)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

/// Repository subdirectory treated as the document and asset namespace root.
///
/// Stored without leading or trailing slashes. An empty root means the
/// repository root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRoot(String);

impl ContentRoot {
    /// Creates content root from a configured directory such as `docs/`.
    pub fn new(dir: &str) -> Self {
        Self(dir.trim().trim_matches('/').to_string())
    }

    /// Content root at repository root.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prefixes a content relative path with the root.
    ///
    /// ```
    /// use gitdocs::ContentRoot;
    ///
    /// assert_eq!(ContentRoot::new("docs/").join("intro.md"), "docs/intro.md");
    /// assert_eq!(ContentRoot::none().join("intro.md"), "intro.md");
    /// ```
    pub fn join(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches('/');
        if self.0.is_empty() {
            relative.to_string()
        } else if relative.is_empty() {
            self.0.clone()
        } else {
            format!("{}/{}", self.0, relative)
        }
    }

    /// Strips the root from a repository path.
    ///
    /// Returns None when the path lies outside the content root.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.0.is_empty() {
            return Some(path);
        }

        path.strip_prefix(self.0.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    }

    /// True when path lies under the content root.
    pub fn contains(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_ref_defaults_branch() {
        // Arrange & Act
        let unset = RepositoryRef::new("acme", "handbook", None::<String>);
        let blank = RepositoryRef::new("acme", "handbook", Some("  "));
        let explicit = RepositoryRef::new("acme", "handbook", Some("develop"));

        // Assert
        assert_eq!(unset.branch(), "main");
        assert_eq!(blank.branch(), "main");
        assert_eq!(explicit.branch(), "develop");
        assert_eq!(explicit.to_string(), "acme/handbook");
    }

    #[test]
    fn test_content_root_normalizes_slashes() {
        assert_eq!(ContentRoot::new("/docs/").as_str(), "docs");
        assert_eq!(ContentRoot::new("docs///").as_str(), "docs");
        assert!(ContentRoot::new("/").is_empty());
    }

    #[test]
    fn test_content_root_strip() {
        // Arrange
        let root = ContentRoot::new("docs");

        // Act & Assert
        assert_eq!(root.strip("docs/guide/intro.md"), Some("guide/intro.md"));
        assert_eq!(root.strip("docsite/intro.md"), None);
        assert_eq!(root.strip("README.md"), None);
        assert_eq!(root.strip("docs"), None);
    }

    #[test]
    fn test_content_root_strip_without_root() {
        let root = ContentRoot::none();

        assert_eq!(root.strip("a/b.md"), Some("a/b.md"));
        assert!(root.contains("anything"));
    }

    #[test]
    fn test_content_root_join_strips_leading_slash() {
        let root = ContentRoot::new("docs");

        assert_eq!(root.join("/images/a.png"), "docs/images/a.png");
        assert_eq!(root.join(""), "docs");
    }

    #[test]
    fn test_tree_entry_accessors() {
        let blob = TreeEntry::blob("docs/a.md");
        let tree = TreeEntry::tree("docs");

        assert!(blob.is_blob());
        assert!(!tree.is_blob());
        assert_eq!(tree.kind(), EntryKind::Tree);
        assert_eq!(blob.path(), "docs/a.md");
    }
}
