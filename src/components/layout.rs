//! Page layout wrapper component

use maud::{DOCTYPE, Markup, html};

use super::footer::footer;

/// Wraps page content with standard HTML structure
///
/// Provides consistent DOCTYPE, html, head, and container structure across
/// all page types. The wrapper handles viewport configuration, charset, and
/// stylesheet loading while the caller provides page-specific body content.
///
/// # Arguments
///
/// * `title`: Page title text (without suffix)
/// * `site_title`: Site name appended to the title
/// * `stylesheets`: Array of CSS file paths to include
/// * `scripts`: Extra markup placed at the end of the body
/// * `body`: Page-specific body markup
///
/// # Returns
///
/// Complete HTML document with wrapped content
pub fn page_wrapper(
    title: &str,
    site_title: &str,
    stylesheets: &[&str],
    scripts: Option<Markup>,
    body: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if title == site_title {
                    title { (title) }
                } @else {
                    title { (title) " - " (site_title) }
                }
                @for stylesheet in stylesheets {
                    link rel="stylesheet" href=(stylesheet);
                }
            }
            body {
                div class="container" {
                    (body)
                }
                (footer())
                @if let Some(scripts) = scripts {
                    (scripts)
                }
            }
        }
    }
}

/// Relative prefix from a page `depth` directories deep back to the site root.
pub fn root_prefix(depth: usize) -> String {
    "../".repeat(depth)
}
