//! Asset reference resolution.
//!
//! Turns the literal destination of a markdown image into repository paths
//! to try, in precedence order:
//! 1. External (`scheme://`, `//`) and `data:` references are skipped
//! 2. `/rooted` paths resolve against the content root
//! 3. `./relative` and bare paths resolve against the document directory
//!
//! [`fuzzy_match`] is a separate last resort, tried only after every path
//! candidate failed to fetch.

use crate::repo::ContentRoot;
use percent_encoding::percent_decode_str;

/// Why a token produces no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only token
    Empty,
    /// Network reference, never fetched
    External,
    /// Already a data URI
    DataUri,
}

/// Outcome of resolving a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Token is passed through unchanged
    Skip(SkipReason),
    /// Repository paths to try in order; may be empty when the token
    /// escapes the repository root
    Candidates(Vec<String>),
}

/// Resolves asset tokens against document location and content root.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    content_root: ContentRoot,
}

impl PathResolver {
    pub fn new(content_root: ContentRoot) -> Self {
        Self { content_root }
    }

    pub fn content_root(&self) -> &ContentRoot {
        &self.content_root
    }

    /// Produces ordered candidate paths for a token found in a document.
    ///
    /// # Arguments
    ///
    /// * `token`: Literal image destination from markdown
    /// * `document_path`: Repository path of the containing document
    ///
    /// # Examples
    ///
    /// ```
    /// use gitdocs::{ContentRoot, PathResolver, Resolution};
    ///
    /// let resolver = PathResolver::new(ContentRoot::new("docs"));
    /// assert_eq!(
    ///     resolver.resolve_candidates("/images/a.png", "docs/guide.md"),
    ///     Resolution::Candidates(vec!["docs/images/a.png".to_string()])
    /// );
    /// ```
    pub fn resolve_candidates(&self, token: &str, document_path: &str) -> Resolution {
        let token = token.trim();

        if token.is_empty() {
            return Resolution::Skip(SkipReason::Empty);
        }
        if is_external(token) {
            return Resolution::Skip(SkipReason::External);
        }
        if is_data_uri(token) {
            return Resolution::Skip(SkipReason::DataUri);
        }

        let target = strip_query_and_fragment(token);
        let mut forms = vec![target.to_string()];
        if let Ok(decoded) = percent_decode_str(target).decode_utf8()
            && decoded != target
        {
            forms.push(decoded.into_owned());
        }

        let dir = document_dir(document_path);
        let mut candidates = Vec::with_capacity(forms.len());

        for form in forms {
            let joined = if let Some(rooted) = form.strip_prefix('/') {
                self.content_root.join(rooted)
            } else {
                let relative = form.strip_prefix("./").unwrap_or(&form);
                join(dir, relative)
            };

            if let Some(path) = normalize(&joined)
                && !path.is_empty()
                && !candidates.contains(&path)
            {
                candidates.push(path);
            }
        }

        Resolution::Candidates(candidates)
    }
}

/// True for references with a network scheme (`https://`, `//cdn`).
pub fn is_external(token: &str) -> bool {
    if token.starts_with("//") {
        return true;
    }

    let Some(idx) = token.find("://") else {
        return false;
    };
    let scheme = &token[..idx];
    let mut chars = scheme.chars();

    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// True for `data:` URIs.
pub fn is_data_uri(token: &str) -> bool {
    token
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
}

/// Directory of a repository path, empty at the root.
pub fn document_dir(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}

fn join(dir: &str, relative: &str) -> String {
    if dir.is_empty() {
        relative.to_string()
    } else {
        format!("{}/{}", dir, relative)
    }
}

fn strip_query_and_fragment(token: &str) -> &str {
    let end = token.find(['?', '#']).unwrap_or(token.len());
    &token[..end]
}

/// Resolves `.` and `..` segments.
///
/// Returns None when the path climbs above the repository root.
pub(crate) fn normalize(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.join("/"))
}

/// Normalizes a path or token for fuzzy comparison.
///
/// Strips directory and extension, lowercases, and drops everything
/// that is not alphanumeric.
///
/// ```
/// use gitdocs::normalize_stem;
///
/// assert_eq!(normalize_stem("docs/img/Setup_Screen-01.PNG"), "setupscreen01");
/// ```
pub fn normalize_stem(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    };

    stem.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Last-resort match of a token against known asset paths.
///
/// Accepts an asset whose normalized stem contains, or is contained by,
/// the normalized token. Exact stem matches win over containment, then
/// assets in the document's own directory, then listing order. This is a
/// heuristic and can pick the wrong file when stems are similar.
///
/// # Arguments
///
/// * `token`: Literal image destination
/// * `document_path`: Repository path of the containing document
/// * `known_assets`: Repository paths of candidate asset files
pub fn fuzzy_match<'a, I>(token: &str, document_path: &str, known_assets: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let target = strip_query_and_fragment(token.trim());
    let decoded = percent_decode_str(target).decode_utf8_lossy();
    let needle = normalize_stem(&decoded);
    if needle.is_empty() {
        return None;
    }

    let dir = document_dir(document_path);

    known_assets
        .into_iter()
        .filter_map(|path| {
            let stem = normalize_stem(path);
            if stem.is_empty() {
                return None;
            }

            let exact = stem == needle;
            if !exact && !stem.contains(&needle) && !needle.contains(&stem) {
                return None;
            }

            let same_dir = document_dir(path) == dir;
            Some(((!exact, !same_dir), path))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, path)| path)
}
