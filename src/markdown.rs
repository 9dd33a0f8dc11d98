//! Markdown rendering with GitHub Flavored Markdown support.
//!
//! This module provides markdown rendering using comrak with GFM extensions
//! (tables, strikethrough, autolinks, task lists) and link resolution
//! between documents of the generated site.

mod links;
mod renderer;

pub use links::LinkResolver;
pub use renderer::MarkdownRenderer;
