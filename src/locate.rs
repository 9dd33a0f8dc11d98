//! Document lookup by slug.

use log::debug;
use std::collections::HashSet;
use std::fmt;

use crate::remote::{ContentSource, Result};
use crate::repo::ContentRoot;

/// Recognized document extensions in lookup priority order.
pub const DOCUMENT_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Logical document identifier: content-root relative path without extension.
///
/// Empty, `.`, and `..` segments are discarded so a slug can never point
/// outside the content root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slug(Vec<String>);

impl Slug {
    /// Parses a `/` separated slug.
    ///
    /// ```
    /// use gitdocs::Slug;
    ///
    /// let slug = Slug::parse("/guide//setup/");
    /// assert_eq!(slug.segments(), ["guide", "setup"]);
    /// assert_eq!(slug.to_string(), "guide/setup");
    /// ```
    pub fn parse(slug: &str) -> Self {
        Self::from_segments(slug.split('/'))
    }

    /// Builds slug from already split segments.
    pub fn from_segments<I, T>(segments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self(
            segments
                .into_iter()
                .map(|s| s.as_ref().to_string())
                .filter(|s| !s.is_empty() && s != "." && s != "..")
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First segment for nested documents, None for top-level ones.
    pub fn group(&self) -> Option<&str> {
        match self.0.as_slice() {
            [first, _, ..] => Some(first.as_str()),
            _ => None,
        }
    }

    /// Slug relative to its group.
    pub fn without_group(&self) -> String {
        match self.group() {
            Some(_) => self.0[1..].join("/"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Document found for a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedDocument {
    /// Repository path the document was read from
    pub path: String,
    /// Raw markdown text
    pub text: String,
}

/// Finds documents in the remote repository.
pub struct DocumentLocator<S> {
    source: S,
    content_root: ContentRoot,
}

impl<S: ContentSource> DocumentLocator<S> {
    pub fn new(source: S, content_root: ContentRoot) -> Self {
        Self {
            source,
            content_root,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn content_root(&self) -> &ContentRoot {
        &self.content_root
    }

    /// Repository paths to try for a slug, `.md` before `.mdx`.
    pub fn candidates(&self, slug: &Slug) -> Vec<String> {
        if slug.is_empty() {
            return Vec::new();
        }

        let base = self.content_root.join(&slug.to_string());
        DOCUMENT_EXTENSIONS
            .iter()
            .map(|ext| format!("{}.{}", base, ext))
            .collect()
    }

    /// Fetches the first existing candidate for `slug`.
    ///
    /// Returns `Ok(None)` when no candidate exists, which callers surface
    /// as a 404.
    ///
    /// # Errors
    ///
    /// Authentication, permission, and upstream failures propagate: they
    /// indicate a configuration or connectivity problem, not a missing page.
    pub fn locate(&self, slug: &Slug) -> Result<Option<LocatedDocument>> {
        for candidate in self.candidates(slug) {
            match self.source.fetch_blob(&candidate) {
                Ok(bytes) => {
                    debug!("Located {} at {}", slug, candidate);
                    return Ok(Some(LocatedDocument {
                        path: candidate,
                        text: decode_text(&bytes),
                    }));
                }
                Err(e) if e.is_not_found() => {
                    debug!("Document candidate {} not found", candidate);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }

    /// Lists the slug of every document under the content root.
    ///
    /// A slug present as both `.md` and `.mdx` is listed once.
    ///
    /// # Errors
    ///
    /// Any failure resolving the branch or listing the tree, including a
    /// missing branch, is returned rather than treated as an empty listing.
    pub fn list_all_documents(&self) -> Result<Vec<Slug>> {
        let tree = self.source.list_head_tree()?;

        let mut seen = HashSet::new();
        Ok(tree
            .iter()
            .filter(|entry| entry.is_blob())
            .filter_map(|entry| slug_from_path(entry.path(), &self.content_root))
            .filter(|slug| seen.insert(slug.clone()))
            .collect())
    }
}

/// Derives slug from a repository path.
///
/// Returns None for paths outside the content root, paths without a
/// document extension, and paths that leave an empty slug.
///
/// ```
/// use gitdocs::{ContentRoot, slug_from_path};
///
/// let root = ContentRoot::new("docs");
/// assert_eq!(slug_from_path("docs/guide/setup.mdx", &root).unwrap().to_string(), "guide/setup");
/// assert!(slug_from_path("README.md", &root).is_none());
/// ```
pub fn slug_from_path(path: &str, content_root: &ContentRoot) -> Option<Slug> {
    let relative = content_root.strip(path)?;

    let stem = DOCUMENT_EXTENSIONS.iter().find_map(|ext| {
        relative
            .strip_suffix(ext)
            .and_then(|rest| rest.strip_suffix('.'))
    })?;

    let slug = Slug::parse(stem);
    (!slug.is_empty()).then_some(slug)
}

/// Decodes document bytes as UTF-8, dropping a byte order mark.
fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(text.as_ref()).to_string()
}
