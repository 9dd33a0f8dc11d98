//! Markdown rendering with GitHub Flavored Markdown support.

use anyhow::{Context, Result};
use comrak::Options;
use std::borrow::Cow;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::LinkResolver;

/// Code block language rendered client side as a diagram.
const MERMAID: &str = "mermaid";

/// GitHub alert markers and their titles.
const ALERTS: [(&str, &str); 5] = [
    ("NOTE", "Note"),
    ("TIP", "Tip"),
    ("IMPORTANT", "Important"),
    ("WARNING", "Warning"),
    ("CAUTION", "Caution"),
];

/// Renders markdown to HTML with GitHub Flavored Markdown extensions.
///
/// Provides GFM extensions including tables, strikethrough, autolinks,
/// task lists, and footnotes. Single newlines become line breaks. Uses
/// syntect for code block syntax highlighting when language is specified;
/// `mermaid` blocks are emitted as `<pre class="mermaid">` for the page
/// script to draw. Blockquotes opening with `[!NOTE]`, `[!TIP]`,
/// `[!IMPORTANT]`, `[!WARNING]`, or `[!CAUTION]` become alert callouts.
pub struct MarkdownRenderer<'a> {
    options: Options<'a>,
    syntax_set: Cow<'a, SyntaxSet>,
    link_resolver: Option<LinkResolver>,
}

impl<'a> MarkdownRenderer<'a> {
    /// Creates renderer with GitHub Flavored Markdown options.
    pub fn new() -> Self {
        Self::with_options(Cow::Owned(SyntaxSet::load_defaults_newlines()))
    }

    /// Creates renderer highlighting with an already loaded syntax set.
    ///
    /// Loading the default syntaxes is expensive, so renderers built per
    /// page should share one set.
    pub fn with_syntax_set(syntax_set: &'a SyntaxSet) -> Self {
        Self::with_options(Cow::Borrowed(syntax_set))
    }

    fn with_options(syntax_set: Cow<'a, SyntaxSet>) -> Self {
        let mut options = Options::default();

        // Extension options (GFM features)
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;

        // Line breaks inside paragraphs are kept
        options.render.hardbreaks = true;

        // Repository content is trusted: raw HTML passes through
        options.render.unsafe_ = true;

        Self {
            options,
            syntax_set,
            link_resolver: None,
        }
    }

    /// Creates renderer that rewrites links between documents to page URLs.
    pub fn with_link_resolver(resolver: LinkResolver) -> Self {
        Self::new().link_resolver(resolver)
    }

    /// Rewrites links between documents through `resolver`.
    pub fn link_resolver(mut self, resolver: LinkResolver) -> Self {
        self.link_resolver = Some(resolver);
        self
    }

    /// Renders markdown content to HTML string.
    ///
    /// # Errors
    ///
    /// Returns error if syntax highlighting fails
    pub fn render(&self, content: &str) -> Result<String> {
        let mut html = comrak::markdown_to_html(content, &self.options);

        if let Some(resolver) = &self.link_resolver {
            html = rewrite_links(&html, resolver);
        }

        let html = mark_alerts(&mark_diagrams(&html));
        self.highlight_code_blocks(&html)
    }

    /// Post-processes HTML to apply syntax highlighting with CSS classes.
    ///
    /// Finds code blocks with language-* classes from comrak's output and
    /// replaces the plain text content with syntect highlighted HTML using
    /// CSS class names (hljs-* prefix).
    fn highlight_code_blocks(&self, html: &str) -> Result<String> {
        let mut result = String::with_capacity(html.len());
        let mut last_end = 0;
        let mut search_pos = 0;

        while let Some(code_start) = html[search_pos..].find("<code class=\"language-") {
            let code_start = search_pos + code_start;

            let lang_start = code_start + "<code class=\"language-".len();
            let Some(lang_len) = html[lang_start..].find('"') else {
                search_pos = code_start + 1;
                continue;
            };
            let lang_end = lang_start + lang_len;
            let language = &html[lang_start..lang_end];

            let Some(open_len) = html[lang_end..].find('>') else {
                search_pos = code_start + 1;
                continue;
            };
            let content_start = lang_end + open_len + 1;

            let Some(content_len) = html[content_start..].find("</code>") else {
                search_pos = code_start + 1;
                continue;
            };
            let content_end = content_start + content_len;

            let decoded_content = html_decode(&html[content_start..content_end]);

            result.push_str(&html[last_end..code_start]);

            let highlighted = self
                .highlight_code(&decoded_content, language)
                .context("Failed to highlight code block")?;

            result.push_str("<code class=\"language-");
            result.push_str(language);
            result.push_str("\">");
            result.push_str(&highlighted);
            result.push_str("</code>");

            last_end = content_end + "</code>".len();
            search_pos = last_end;
        }

        result.push_str(&html[last_end..]);

        Ok(result)
    }

    /// Highlights code with syntect using `hljs-` prefixed CSS classes.
    fn highlight_code(&self, code: &str, language: &str) -> Result<String> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language));

        let Some(syntax) = syntax else {
            return Ok(html_escape(code));
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &*self.syntax_set,
            ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .context("Failed to parse line for syntax highlighting")?;
        }

        Ok(generator.finalize())
    }
}

impl<'a> Default for MarkdownRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrites `<a href="...">` targets through the link resolver.
fn rewrite_links(html: &str, resolver: &LinkResolver) -> String {
    const HREF: &str = "href=\"";

    let mut result = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(tag) = html[pos..].find("<a ") {
        let tag_start = pos + tag;
        let tag_end = html[tag_start..]
            .find('>')
            .map(|i| tag_start + i)
            .unwrap_or(html.len());

        let Some(attr) = html[tag_start..tag_end].find(HREF) else {
            result.push_str(&html[pos..tag_end]);
            pos = tag_end;
            continue;
        };
        let value_start = tag_start + attr + HREF.len();
        let Some(value_len) = html[value_start..tag_end].find('"') else {
            result.push_str(&html[pos..tag_end]);
            pos = tag_end;
            continue;
        };
        let value_end = value_start + value_len;

        result.push_str(&html[pos..value_start]);
        match resolver.resolve(&html_decode(&html[value_start..value_end])) {
            Some(resolved) => result.push_str(&html_escape(&resolved)),
            None => result.push_str(&html[value_start..value_end]),
        }
        pos = value_end;
    }

    result.push_str(&html[pos..]);
    result
}

/// Turns `mermaid` code blocks into `<pre class="mermaid">` elements.
fn mark_diagrams(html: &str) -> String {
    let open = format!("<pre><code class=\"language-{}\">", MERMAID);
    const CLOSE: &str = "</code></pre>";

    let mut result = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(start) = html[pos..].find(&open) {
        let start = pos + start;
        let body_start = start + open.len();
        let Some(body_len) = html[body_start..].find(CLOSE) else {
            break;
        };
        let body_end = body_start + body_len;

        result.push_str(&html[pos..start]);
        result.push_str("<pre class=\"mermaid\">");
        result.push_str(&html[body_start..body_end]);
        result.push_str("</pre>");
        pos = body_end + CLOSE.len();
    }

    result.push_str(&html[pos..]);
    result
}

/// Turns blockquotes opening with an alert marker into alert callouts.
///
/// The marker must stand alone on the first line of the quote.
fn mark_alerts(html: &str) -> String {
    const OPEN: &str = "<blockquote>\n<p>[!";

    let mut result = String::with_capacity(html.len());
    let mut pos = 0;
    let mut search = 0;

    while let Some(found) = html[search..].find(OPEN) {
        let start = search + found;
        let marker_start = start + OPEN.len();
        search = marker_start;

        let Some(marker_len) = html[marker_start..].find(']') else {
            break;
        };
        let marker = &html[marker_start..marker_start + marker_len];
        let Some((kind, title)) = ALERTS
            .iter()
            .find(|(kind, _)| kind.eq_ignore_ascii_case(marker))
        else {
            continue;
        };

        // A line break keeps the paragraph open, a closed one is dropped
        let marker_end = marker_start + marker_len + 1;
        let (body_start, reopen) = if html[marker_end..].starts_with("<br />\n") {
            (marker_end + "<br />\n".len(), true)
        } else if html[marker_end..].starts_with("</p>\n") {
            (marker_end + "</p>\n".len(), false)
        } else {
            continue;
        };

        let Some(body_end) = closing_blockquote(html, body_start) else {
            break;
        };

        result.push_str(&html[pos..start]);
        result.push_str(&format!(
            "<div class=\"markdown-alert markdown-alert-{}\">\n<p class=\"markdown-alert-title\">{}</p>\n",
            kind.to_ascii_lowercase(),
            title
        ));
        if reopen {
            result.push_str("<p>");
        }
        result.push_str(&mark_alerts(&html[body_start..body_end]));
        result.push_str("</div>");

        pos = body_end + "</blockquote>".len();
        search = pos;
    }

    result.push_str(&html[pos..]);
    result
}

/// Finds the `</blockquote>` closing the quote whose body starts at `from`.
fn closing_blockquote(html: &str, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = from;

    loop {
        let open = html[pos..].find("<blockquote>").map(|i| pos + i);
        let close = pos + html[pos..].find("</blockquote>")?;

        match open {
            Some(open) if open < close => {
                depth += 1;
                pos = open + "<blockquote>".len();
            }
            _ if depth == 0 => return Some(close),
            _ => {
                depth -= 1;
                pos = close + "</blockquote>".len();
            }
        }
    }
}

/// Decodes the HTML entities comrak emits in code and attributes.
fn html_decode(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escapes HTML special characters.
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
