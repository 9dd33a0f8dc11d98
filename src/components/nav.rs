//! Navigation breadcrumb component

use maud::{Markup, html};

use crate::locate::Slug;

/// Renders breadcrumb navigation for a document page
///
/// Displays the site title as root link, a link to the document index,
/// and the slug segments as the trail. Only the index is linkable: group
/// directories have no page of their own.
///
/// # Arguments
///
/// * `site_title`: Site name for root breadcrumb link
/// * `root`: Relative path prefix back to the site root
/// * `slug`: Slug of the current document
///
/// # Returns
///
/// Breadcrumb navigation markup with links and separators
pub fn breadcrumb(site_title: &str, root: &str, slug: &Slug) -> Markup {
    let segments = slug.segments();

    html! {
        header {
            div class="breadcrumb" {
                a href=(format!("{}index.html", root)) class="breadcrumb-link" { (site_title) }
                span class="breadcrumb-separator" { "/" }
                a href=(format!("{}docs/index.html", root)) class="breadcrumb-link" { "docs" }
                @for (i, segment) in segments.iter().enumerate() {
                    span class="breadcrumb-separator" { "/" }
                    @if i + 1 == segments.len() {
                        span class="breadcrumb-current" { (segment) }
                    } @else {
                        span class="breadcrumb-dir" { (segment) }
                    }
                }
            }
        }
    }
}
