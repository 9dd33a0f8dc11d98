//! Command line configuration.

use anyhow::{Result, bail};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::inline::{DEFAULT_MAX_CONCURRENT_FETCHES, InlineOptions};
use crate::remote::DEFAULT_API_URL;
use crate::repo::{ContentRoot, DEFAULT_BRANCH, RepositoryRef};

/// Command line configuration for gitdocs.
///
/// Every repository setting can also come from the environment, so the
/// same variables drive local builds and CI.
#[derive(Clone, Parser)]
#[command(name = "gitdocs", version, about, long_about = None)]
pub struct Config {
    /// Owner of the content repository
    #[arg(long, env = "CONTENT_REPO_OWNER")]
    pub owner: String,

    /// Name of the content repository
    #[arg(long, env = "CONTENT_REPO_NAME")]
    pub repo: String,

    /// Branch to read documents from
    #[arg(long, env = "CONTENT_BRANCH", default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Directory holding the documents, relative to the repository root
    #[arg(long, env = "CONTENT_DIR")]
    pub content_dir: Option<String>,

    /// API access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Output directory
    #[arg(short, long, default_value = "dist")]
    pub output: PathBuf,

    /// Site title (defaults to the repository name)
    #[arg(long)]
    pub title: Option<String>,

    /// Maximum concurrent asset fetches per document
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_FETCHES)]
    pub max_concurrent_fetches: usize,

    /// Disable filename similarity matching for unresolved images
    #[arg(long)]
    pub no_fuzzy: bool,

    /// Print document slugs and exit
    #[arg(long)]
    pub list: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("content_dir", &self.content_dir)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("output", &self.output)
            .field("title", &self.title)
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .field("no_fuzzy", &self.no_fuzzy)
            .field("list", &self.list)
            .finish()
    }
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error naming the variable when owner, repository, or token
    /// is blank, or when the fetch cap is zero.
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            bail!("Repository owner is empty (set --owner or CONTENT_REPO_OWNER)");
        }
        if self.repo.trim().is_empty() {
            bail!("Repository name is empty (set --repo or CONTENT_REPO_NAME)");
        }
        if self.token.trim().is_empty() {
            bail!("Access token is empty (set --token or GITHUB_TOKEN)");
        }
        if self.max_concurrent_fetches == 0 {
            bail!("--max-concurrent-fetches must be at least 1");
        }

        Ok(())
    }

    /// Returns the repository and branch documents are read from.
    pub fn repository(&self) -> RepositoryRef {
        RepositoryRef::new(self.owner.trim(), self.repo.trim(), Some(&self.branch))
    }

    /// Returns the normalized content root.
    pub fn content_root(&self) -> ContentRoot {
        self.content_dir
            .as_deref()
            .map(ContentRoot::new)
            .unwrap_or_else(ContentRoot::none)
    }

    /// Returns asset inlining options.
    pub fn inline_options(&self) -> InlineOptions {
        InlineOptions {
            max_concurrent_fetches: self.max_concurrent_fetches,
            fuzzy: !self.no_fuzzy,
        }
    }

    /// Returns site title from configuration or repository name.
    pub fn site_title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.repo.trim())
            .to_string()
    }
}
