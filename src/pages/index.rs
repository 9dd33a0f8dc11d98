//! Document index page generation

use maud::{Markup, html};
use std::collections::BTreeMap;

use crate::components::layout::{page_wrapper, root_prefix};
use crate::locate::Slug;
use crate::repo::RepositoryRef;

/// Group heading for documents at the top of the content root.
pub const UNGROUPED: &str = "Other";

/// Documents sharing a first path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentGroup<'a> {
    pub name: &'a str,
    pub slugs: Vec<&'a Slug>,
}

/// Groups slugs by first segment, sorted by group name then slug.
///
/// Top-level documents are collected under [`UNGROUPED`], which is listed
/// last regardless of name.
pub fn group_documents(slugs: &[Slug]) -> Vec<DocumentGroup<'_>> {
    let mut grouped: BTreeMap<&str, Vec<&Slug>> = BTreeMap::new();
    let mut ungrouped = Vec::new();

    for slug in slugs {
        match slug.group() {
            Some(group) => grouped.entry(group).or_default().push(slug),
            None => ungrouped.push(slug),
        }
    }

    let mut groups: Vec<DocumentGroup<'_>> = grouped
        .into_iter()
        .map(|(name, slugs)| DocumentGroup { name, slugs })
        .collect();

    if !ungrouped.is_empty() {
        groups.push(DocumentGroup {
            name: UNGROUPED,
            slugs: ungrouped,
        });
    }

    for group in &mut groups {
        group.slugs.sort();
    }

    groups
}

/// Data container for index page generation
pub struct IndexPageData<'a> {
    pub site_title: &'a str,
    pub repository: &'a RepositoryRef,
    pub slugs: &'a [Slug],
    /// Directory depth of the page below the site root
    pub depth: usize,
}

/// Generates the document index page
///
/// Lists every document grouped by its first directory. The same page is
/// written at the site root and at `docs/index.html`; `depth` keeps the
/// relative links valid in both places.
///
/// # Arguments
///
/// * `data`: Index page data container with all required fields
///
/// # Returns
///
/// Complete HTML markup for index page
pub fn generate(data: IndexPageData<'_>) -> Markup {
    let root = root_prefix(data.depth);
    let css_path = format!("{}assets/index.css", root);
    let groups = group_documents(data.slugs);

    page_wrapper(
        data.site_title,
        data.site_title,
        &[&css_path],
        None,
        html! {
            header.site-header {
                h1.site-title { (data.site_title) }
                span.repo-ref {
                    (data.repository) " @ " (data.repository.branch())
                }
            }

            main.index-card {
                div.index-controls {
                    h2.page-title { "Documents" }
                    span.badge { (data.slugs.len()) " documents" }
                }

                @if groups.is_empty() {
                    div.empty-state {
                        p { "No documents found in this repository." }
                    }
                } @else {
                    @for group in &groups {
                        section.doc-group {
                            h3.group-name { (group.name) }
                            ul.doc-list {
                                @for slug in &group.slugs {
                                    li {
                                        a.doc-link href=(format!("{}docs/{}.html", root, slug)) {
                                            (slug.without_group())
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
