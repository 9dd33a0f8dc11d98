//! Asset inlining for markdown documents.
//!
//! Image references are resolved against the repository, fetched once per
//! distinct token, and rewritten in place as data URIs so the document no
//! longer depends on the repository for its images. Unresolvable images
//! are left exactly as written.

mod scan;

pub use scan::{ImageRef, scan_images};

use anyhow::{Context, Result};
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::mime::{ImageFormat, data_uri};
use crate::remote::ContentSource;
use crate::resolve::{PathResolver, Resolution, SkipReason, fuzzy_match};

/// Default cap on concurrent asset fetches for one document.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Tuning for [`AssetInliner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineOptions {
    /// Upper bound on asset fetches in flight at once
    pub max_concurrent_fetches: usize,
    /// Whether to fall back to filename similarity when paths fail
    pub fuzzy: bool,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            fuzzy: true,
        }
    }
}

/// Distinct image token found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub token: String,
    pub document_path: String,
}

/// What happened to one asset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Fetched and embedded
    Inlined {
        data_uri: String,
        /// Repository path the bytes were read from
        source_path: String,
        /// Found by the filename similarity fallback
        fuzzy: bool,
    },
    /// Every candidate failed; occurrences are left untouched
    Unresolved,
    /// Never fetched (external, data URI, or empty)
    Skipped(SkipReason),
}

/// Resolution result for one distinct token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub reference: AssetReference,
    pub outcome: AssetOutcome,
}

impl ResolvedAsset {
    /// Data URI replacing the token, if resolution succeeded.
    pub fn data_uri(&self) -> Option<&str> {
        match &self.outcome {
            AssetOutcome::Inlined { data_uri, .. } => Some(data_uri),
            _ => None,
        }
    }

    /// True unless the token was an external reference.
    pub fn was_attempted(&self) -> bool {
        self.outcome != AssetOutcome::Skipped(SkipReason::External)
    }
}

/// Rewritten document plus per-token outcomes in first-occurrence order.
#[derive(Debug, Clone)]
pub struct InlineReport {
    pub text: String,
    pub assets: Vec<ResolvedAsset>,
}

impl InlineReport {
    /// Number of tokens embedded as data URIs.
    pub fn inlined(&self) -> usize {
        self.assets.iter().filter(|a| a.data_uri().is_some()).count()
    }

    /// Number of tokens left unresolved.
    pub fn unresolved(&self) -> usize {
        self.assets
            .iter()
            .filter(|a| a.outcome == AssetOutcome::Unresolved)
            .count()
    }
}

/// Per-token state between the path pass and the fuzzy pass.
enum Pending {
    Done(AssetOutcome),
    /// Path candidates exhausted; remembers what was already tried
    Exhausted(Vec<String>),
}

/// Resolves and embeds the images referenced by markdown documents.
///
/// Holds no per-document state: each [`inline`](Self::inline) call scans,
/// resolves, and rewrites independently.
pub struct AssetInliner<S> {
    source: S,
    resolver: PathResolver,
    options: InlineOptions,
    pool: rayon::ThreadPool,
}

impl<S: ContentSource> AssetInliner<S> {
    /// Creates inliner fetching through `source`.
    ///
    /// # Errors
    ///
    /// Returns error if the fetch thread pool cannot be created.
    pub fn new(source: S, resolver: PathResolver, options: InlineOptions) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_concurrent_fetches.max(1))
            .thread_name(|i| format!("gitdocs-fetch-{}", i))
            .build()
            .context("Failed to create asset fetch pool")?;

        Ok(Self {
            source,
            resolver,
            options,
            pool,
        })
    }

    /// Returns document text with every resolvable image embedded.
    pub fn inline(&self, text: &str, document_path: &str) -> String {
        self.inline_with_report(text, document_path).text
    }

    /// Inlines images and reports the outcome of every distinct token.
    ///
    /// Asset failures never fail the document: a token that cannot be
    /// resolved keeps its original text at every occurrence.
    ///
    /// # Arguments
    ///
    /// * `text`: Markdown body
    /// * `document_path`: Repository path of the document, used for relative references
    pub fn inline_with_report(&self, text: &str, document_path: &str) -> InlineReport {
        let images = scan_images(text);

        let mut seen = HashSet::new();
        let tokens: Vec<&str> = images
            .iter()
            .map(|image| image.token)
            .filter(|token| seen.insert(*token))
            .collect();

        debug!(
            "{}: {} image references, {} distinct",
            document_path,
            images.len(),
            tokens.len()
        );

        let mut pending: Vec<Pending> = self.pool.install(|| {
            tokens
                .par_iter()
                .map(|token| self.resolve_by_path(token, document_path))
                .collect()
        });

        if self.options.fuzzy {
            self.resolve_by_name(&tokens, &mut pending, document_path);
        }

        let assets: Vec<ResolvedAsset> = tokens
            .iter()
            .zip(pending)
            .map(|(token, state)| {
                let outcome = match state {
                    Pending::Done(outcome) => outcome,
                    Pending::Exhausted(_) => {
                        warn!("{}: could not resolve image `{}`", document_path, token);
                        AssetOutcome::Unresolved
                    }
                };

                ResolvedAsset {
                    reference: AssetReference {
                        token: token.to_string(),
                        document_path: document_path.to_string(),
                    },
                    outcome,
                }
            })
            .collect();

        let replacements: HashMap<&str, &str> = assets
            .iter()
            .filter_map(|asset| Some((asset.reference.token.as_str(), asset.data_uri()?)))
            .collect();

        InlineReport {
            text: rewrite(text, &images, &replacements),
            assets,
        }
    }

    /// Tries each path candidate in order, stopping at the first fetch that succeeds.
    fn resolve_by_path(&self, token: &str, document_path: &str) -> Pending {
        let candidates = match self.resolver.resolve_candidates(token, document_path) {
            Resolution::Skip(reason) => return Pending::Done(AssetOutcome::Skipped(reason)),
            Resolution::Candidates(candidates) => candidates,
        };

        for candidate in &candidates {
            if let Some(outcome) = self.fetch(candidate, false) {
                return Pending::Done(outcome);
            }
        }

        Pending::Exhausted(candidates)
    }

    /// Fuzzy fallback for tokens whose path candidates all failed.
    ///
    /// Lists the repository tree at most once, and only when needed.
    fn resolve_by_name(&self, tokens: &[&str], pending: &mut [Pending], document_path: &str) {
        if !pending.iter().any(|p| matches!(p, Pending::Exhausted(_))) {
            return;
        }

        let tree = match self.source.list_head_tree() {
            Ok(tree) => tree,
            Err(e) => {
                warn!("{}: skipping name-based image lookup: {}", document_path, e);
                return;
            }
        };

        let root = self.resolver.content_root();
        let known: Vec<&str> = tree
            .iter()
            .filter(|entry| entry.is_blob())
            .map(|entry| entry.path())
            .filter(|path| root.contains(path) && ImageFormat::from_path(path).is_some())
            .collect();

        let fallbacks: Vec<(usize, &str)> = pending
            .iter()
            .enumerate()
            .filter_map(|(i, state)| match state {
                Pending::Exhausted(tried) => {
                    let matched = fuzzy_match(tokens[i], document_path, known.iter().copied())?;
                    (!tried.iter().any(|t| t == matched)).then_some((i, matched))
                }
                Pending::Done(_) => None,
            })
            .collect();

        let fetched: Vec<(usize, Option<AssetOutcome>)> = self.pool.install(|| {
            fallbacks
                .par_iter()
                .map(|(i, path)| (*i, self.fetch(path, true)))
                .collect()
        });

        for (i, outcome) in fetched {
            if let Some(outcome) = outcome {
                if let AssetOutcome::Inlined { source_path, .. } = &outcome {
                    warn!(
                        "{}: image `{}` matched `{}` by name only; verify it is the intended file",
                        document_path, tokens[i], source_path
                    );
                }
                pending[i] = Pending::Done(outcome);
            }
        }
    }

    /// Fetches one candidate. Every failure is contained here.
    fn fetch(&self, path: &str, fuzzy: bool) -> Option<AssetOutcome> {
        match self.source.fetch_blob(path) {
            Ok(bytes) => {
                debug!("Inlined {} ({} bytes)", path, bytes.len());
                Some(AssetOutcome::Inlined {
                    data_uri: data_uri(path, &bytes),
                    source_path: path.to_string(),
                    fuzzy,
                })
            }
            Err(e) if e.is_not_found() => {
                debug!("Asset candidate {} not found", path);
                None
            }
            Err(e) => {
                warn!("Failed to fetch asset {}: {}", path, e);
                None
            }
        }
    }
}

/// Replaces resolved image destinations in a single pass over `text`.
///
/// Only destination spans reported by the scanner are touched, so the same
/// substring in prose or alt text stays as written.
fn rewrite(text: &str, images: &[ImageRef<'_>], replacements: &HashMap<&str, &str>) -> String {
    if replacements.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for image in images {
        if let Some(uri) = replacements.get(image.token) {
            result.push_str(&text[last_end..image.span.start]);
            result.push_str(uri);
            last_end = image.span.end;
        }
    }

    result.push_str(&text[last_end..]);
    result
}
