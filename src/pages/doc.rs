//! Document page generation

use maud::{Markup, PreEscaped, html};

use crate::components::layout::{page_wrapper, root_prefix};
use crate::components::nav::breadcrumb;
use crate::locate::Slug;

/// Module script drawing `<pre class="mermaid">` blocks in the browser.
const MERMAID_SCRIPT: &str = r#"import mermaid from "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs";
mermaid.initialize({ startOnLoad: true });"#;

/// Data container for document page generation.
pub struct DocPageData<'a> {
    pub site_title: &'a str,
    pub slug: &'a Slug,
    /// Front matter title, falls back to the last slug segment
    pub title: Option<&'a str>,
    /// Rendered markdown body
    pub content_html: &'a str,
}

/// Generates the page for one document
///
/// Pages live at `docs/<slug>.html`, so relative links back to the site
/// root climb one directory per slug segment.
///
/// # Arguments
///
/// * `data`: Document page data container
///
/// # Returns
///
/// Complete HTML page as Markup
pub fn generate(data: DocPageData<'_>) -> Markup {
    let root = root_prefix(depth(data.slug));
    let doc_css = format!("{}assets/doc.css", root);
    let markdown_css = format!("{}assets/markdown.css", root);

    let title = data
        .title
        .map(str::to_string)
        .or_else(|| data.slug.segments().last().cloned())
        .unwrap_or_default();

    let scripts = data.content_html.contains("<pre class=\"mermaid\">").then(|| {
        html! {
            script type="module" { (PreEscaped(MERMAID_SCRIPT)) }
        }
    });

    page_wrapper(
        &title,
        data.site_title,
        &[&doc_css, &markdown_css],
        scripts,
        html! {
            (breadcrumb(data.site_title, &root, data.slug))

            main.doc-card {
                article.markdown-body {
                    (PreEscaped(data.content_html))
                }
            }
        },
    )
}

/// Directory depth of a document page below the site root.
pub fn depth(slug: &Slug) -> usize {
    slug.segments().len()
}
