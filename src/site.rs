//! Static site generation from remote documents.

use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use syntect::parsing::SyntaxSet;

use crate::assets::write_css_assets;
use crate::config::Config;
use crate::frontmatter::split_front_matter;
use crate::inline::AssetInliner;
use crate::locate::{DocumentLocator, Slug};
use crate::markdown::{LinkResolver, MarkdownRenderer};
use crate::pages::{doc, index};
use crate::remote::ContentSource;
use crate::resolve::PathResolver;

/// Slug whose page would collide with the document index.
const INDEX_SLUG: &str = "index";

/// Counts reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Document pages written
    pub pages: usize,
    /// Listed documents that could no longer be found
    pub skipped: usize,
    /// Image tokens embedded as data URIs
    pub assets_inlined: usize,
    /// Image tokens left as written
    pub assets_unresolved: usize,
}

/// Result of building one document page.
enum PageOutcome {
    Written { inlined: usize, unresolved: usize },
    Skipped,
}

/// Shared state for rendering document pages.
struct PageBuilder<'a, S> {
    locator: DocumentLocator<&'a S>,
    inliner: AssetInliner<&'a S>,
    syntax_set: SyntaxSet,
    site_title: String,
    docs_dir: &'a Path,
}

/// Lists the slug of every document in the configured repository.
///
/// # Errors
///
/// Returns error if the branch cannot be resolved or the tree cannot be
/// listed.
pub fn list_documents<S: ContentSource>(config: &Config, source: &S) -> Result<Vec<Slug>> {
    let locator = DocumentLocator::new(source, config.content_root());
    locator.list_all_documents().with_context(|| {
        format!(
            "Failed to list documents in {} at branch {}",
            source.repository(),
            source.repository().branch()
        )
    })
}

/// Builds the static site into the configured output directory.
///
/// Writes `index.html`, `docs/index.html`, one `docs/<slug>.html` per
/// document, and the stylesheets under `assets/`. Pages are rendered in
/// parallel. A document that disappears between listing and fetching is
/// skipped with a warning.
///
/// # Errors
///
/// Returns error if listing fails, if any document fetch fails for a
/// reason other than the document being missing, or if output cannot be
/// written.
pub fn build<S: ContentSource>(config: &Config, source: &S) -> Result<BuildSummary> {
    let content_root = config.content_root();
    let repository = source.repository();

    let slugs = list_documents(config, source)?;
    info!(
        "Building {} documents from {} at branch {}",
        slugs.len(),
        repository,
        repository.branch()
    );

    let docs_dir = config.output.join("docs");
    fs::create_dir_all(&docs_dir)
        .with_context(|| format!("Failed to create output directory: {}", docs_dir.display()))?;

    let builder = PageBuilder {
        locator: DocumentLocator::new(source, content_root.clone()),
        inliner: AssetInliner::new(
            source,
            PathResolver::new(content_root),
            config.inline_options(),
        )?,
        syntax_set: SyntaxSet::load_defaults_newlines(),
        site_title: config.site_title(),
        docs_dir: &docs_dir,
    };

    let outcomes = slugs
        .par_iter()
        .map(|slug| builder.build_page(slug))
        .collect::<Result<Vec<_>>>()?;

    let mut summary = BuildSummary::default();
    let mut written = Vec::with_capacity(slugs.len());
    for (slug, outcome) in slugs.into_iter().zip(outcomes) {
        match outcome {
            PageOutcome::Written {
                inlined,
                unresolved,
            } => {
                summary.pages += 1;
                summary.assets_inlined += inlined;
                summary.assets_unresolved += unresolved;
                written.push(slug);
            }
            PageOutcome::Skipped => summary.skipped += 1,
        }
    }

    let mut index_pages = vec![(config.output.join("index.html"), 0)];
    if written.iter().any(|slug| slug.segments() == [INDEX_SLUG]) {
        warn!("Document {} occupies docs/index.html, index listed at site root only", INDEX_SLUG);
    } else {
        index_pages.push((docs_dir.join("index.html"), 1));
    }

    for (path, depth) in index_pages {
        let page = index::generate(index::IndexPageData {
            site_title: &builder.site_title,
            repository,
            slugs: &written,
            depth,
        });
        write_page(&path, &page.into_string())?;
    }

    write_css_assets(&config.output.join("assets"))?;

    info!(
        "Wrote {} pages to {} ({} skipped, {} images inlined, {} unresolved)",
        summary.pages,
        config.output.display(),
        summary.skipped,
        summary.assets_inlined,
        summary.assets_unresolved
    );

    Ok(summary)
}

impl<S: ContentSource> PageBuilder<'_, S> {
    fn build_page(&self, slug: &Slug) -> Result<PageOutcome> {
        let Some(document) = self
            .locator
            .locate(slug)
            .with_context(|| format!("Failed to fetch document: {}", slug))?
        else {
            warn!("Document {} was listed but no longer exists, skipping", slug);
            return Ok(PageOutcome::Skipped);
        };

        let (front_matter, body) = split_front_matter(&document.text);
        let report = self.inliner.inline_with_report(body, &document.path);

        let resolver = LinkResolver::new(
            document.path.as_str(),
            self.locator.content_root().clone(),
            doc::depth(slug),
        );
        let content_html = MarkdownRenderer::with_syntax_set(&self.syntax_set)
            .link_resolver(resolver)
            .render(&report.text)
            .with_context(|| format!("Failed to render document: {}", document.path))?;

        let page = doc::generate(doc::DocPageData {
            site_title: &self.site_title,
            slug,
            title: front_matter.title(),
            content_html: &content_html,
        });

        let path = self.docs_dir.join(format!("{}.html", slug));
        write_page(&path, &page.into_string())?;

        Ok(PageOutcome::Written {
            inlined: report.inlined(),
            unresolved: report.unresolved(),
        })
    }
}

/// Writes a page, creating parent directories as needed.
fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write page: {}", path.display()))
}
