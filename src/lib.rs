//! Static documentation site generator for markdown stored in GitHub repositories.

mod assets;
pub mod components;
mod config;
mod frontmatter;
mod inline;
mod locate;
mod markdown;
mod mime;
pub mod pages;
pub mod remote;
mod repo;
mod resolve;
pub mod site;

pub use assets::write_css_assets;
pub use config::Config;
pub use frontmatter::{FrontMatter, split_front_matter};
pub use inline::{
    AssetInliner, AssetOutcome, AssetReference, DEFAULT_MAX_CONCURRENT_FETCHES, ImageRef,
    InlineOptions, InlineReport, ResolvedAsset, scan_images,
};
pub use locate::{DOCUMENT_EXTENSIONS, DocumentLocator, LocatedDocument, Slug, slug_from_path};
pub use markdown::{LinkResolver, MarkdownRenderer};
pub use mime::{DEFAULT_MIME, ImageFormat, data_uri, mime_for_path};
pub use remote::{ContentSource, ForbiddenCause, GitHubClient, RemoteError};
pub use repo::{ContentRoot, DEFAULT_BRANCH, EntryKind, RepositoryRef, TreeEntry};
pub use resolve::{
    PathResolver, Resolution, SkipReason, fuzzy_match, is_data_uri, is_external, normalize_stem,
};
pub use site::BuildSummary;
