//! Link resolution between rendered documents.

use crate::locate::slug_from_path;
use crate::repo::ContentRoot;
use crate::resolve::{document_dir, is_external, normalize};

/// Rewrites links to other repository documents into site page URLs.
///
/// A link such as `./setup.md#install` in `docs/guide/intro.md` becomes
/// `../../docs/guide/setup.html#install` on the generated page. Links that
/// do not name a document under the content root are left unchanged.
pub struct LinkResolver {
    document_path: String,
    content_root: ContentRoot,
    depth: usize,
}

impl LinkResolver {
    /// Creates link resolver for the document being rendered.
    ///
    /// # Arguments
    ///
    /// * `document_path`: Repository path of the markdown file
    /// * `content_root`: Content root documents are scoped to
    /// * `depth`: Directory depth of the generated page below the site root
    pub fn new(document_path: impl Into<String>, content_root: ContentRoot, depth: usize) -> Self {
        Self {
            document_path: document_path.into(),
            content_root,
            depth,
        }
    }

    /// Resolves an href, returning None when it should stay as written.
    pub fn resolve(&self, href: &str) -> Option<String> {
        if href.is_empty() || href.starts_with('#') || is_external(href) || href.contains(':') {
            return None;
        }

        let (path, fragment) = match href.find('#') {
            Some(i) => (&href[..i], &href[i..]),
            None => (href, ""),
        };

        let joined = match path.strip_prefix('/') {
            Some(rooted) => self.content_root.join(rooted),
            None => {
                let dir = document_dir(&self.document_path);
                if dir.is_empty() {
                    path.to_string()
                } else {
                    format!("{}/{}", dir, path)
                }
            }
        };

        let normalized = normalize(&joined)?;
        let slug = slug_from_path(&normalized, &self.content_root)?;

        Some(format!(
            "{}docs/{}.html{}",
            "../".repeat(self.depth),
            slug,
            fragment
        ))
    }
}
