//! Remote content access.
//!
//! Defines the [`ContentSource`] seam used by document location and asset
//! inlining, with a GitHub REST implementation. Every call is a single
//! attempt; callers fall back to their next candidate instead of retrying.

mod api;
pub mod error;
mod github;

pub use error::{ForbiddenCause, RemoteError, Result};
pub use github::{DEFAULT_API_URL, GitHubClient};

use crate::repo::{RepositoryRef, TreeEntry};

/// Read-only access to a hosted git repository at its configured branch.
pub trait ContentSource: Send + Sync {
    /// Repository this source reads from.
    fn repository(&self) -> &RepositoryRef;

    /// Resolves the configured branch to its head commit id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the repository or branch is missing, otherwise the
    /// classified API failure.
    fn resolve_branch_head(&self) -> Result<String>;

    /// Lists every entry reachable from `commit`, recursively.
    fn list_tree(&self, commit: &str) -> Result<Vec<TreeEntry>>;

    /// Fetches a file's bytes by repository-relative path.
    ///
    /// # Errors
    ///
    /// `NotFound` when no file exists at `path` on the configured branch.
    fn fetch_blob(&self, path: &str) -> Result<Vec<u8>>;

    /// Resolves the branch head and lists its tree.
    fn list_head_tree(&self) -> Result<Vec<TreeEntry>> {
        let commit = self.resolve_branch_head()?;
        self.list_tree(&commit)
    }
}

impl<T: ContentSource + ?Sized> ContentSource for &T {
    fn repository(&self) -> &RepositoryRef {
        (**self).repository()
    }

    fn resolve_branch_head(&self) -> Result<String> {
        (**self).resolve_branch_head()
    }

    fn list_tree(&self, commit: &str) -> Result<Vec<TreeEntry>> {
        (**self).list_tree(commit)
    }

    fn fetch_blob(&self, path: &str) -> Result<Vec<u8>> {
        (**self).fetch_blob(path)
    }
}
