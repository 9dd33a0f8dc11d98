//! Page footer component

use maud::{Markup, html};

/// Renders the footer shown on every page.
pub fn footer() -> Markup {
    html! {
        footer class="site-footer" {
            "Generated by gitdocs " (env!("CARGO_PKG_VERSION"))
        }
    }
}
