//! GitHub REST API content source.

use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::api::{self, Contents, GitBlob, GitRef, GitTree, Payload};
use super::error::{RemoteError, Result, classify};
use super::ContentSource;
use crate::repo::{EntryKind, RepositoryRef, TreeEntry};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Pinned REST API version.
const API_VERSION: &str = "2022-11-28";

/// Request timeout. Large blobs go through `download_url`, so this also
/// bounds the biggest asset that can be inlined on a slow link.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters left unescaped in a single path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Content source backed by the GitHub REST API.
///
/// Every request carries the configured bearer token, including requests
/// to the `download_url` of files too large for inline content.
pub struct GitHubClient {
    repository: RepositoryRef,
    api_url: String,
    token: String,
    client: Client,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("repository", &self.repository)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Creates client for the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(repository: RepositoryRef, token: impl Into<String>) -> Result<Self> {
        Self::with_api_url(repository, token, DEFAULT_API_URL)
    }

    /// Creates client for a specific API endpoint (GitHub Enterprise, test servers).
    ///
    /// # Arguments
    ///
    /// * `repository`: Repository and branch to read from
    /// * `token`: Bearer credential
    /// * `api_url`: API base URL without trailing slash
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed.
    pub fn with_api_url(
        repository: RepositoryRef,
        token: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("gitdocs/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            repository,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        })
    }

    /// Builds `{api}/repos/{owner}/{name}/{tail}`.
    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url,
            utf8_percent_encode(self.repository.owner(), SEGMENT),
            utf8_percent_encode(self.repository.name(), SEGMENT),
            tail
        )
    }

    /// Issues an authenticated GET and classifies non-success responses.
    ///
    /// # Arguments
    ///
    /// * `url`: Absolute request URL
    /// * `what`: Description of the requested object for not-found errors
    fn get(&self, url: &str, what: &str) -> Result<Response> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, HeaderValue::from_static("application/vnd.github+json"))
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .map_err(|e| RemoteError::upstream(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().unwrap_or_default();

        Err(classify(
            status,
            &headers,
            &api::error_message(&body),
            &self.repository.to_string(),
            what,
        ))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        self.get(url, what)?
            .json::<T>()
            .map_err(|e| RemoteError::upstream(format!("Malformed response for {}: {}", what, e)))
    }

    fn get_bytes(&self, url: &str, what: &str) -> Result<Vec<u8>> {
        self.get(url, what)?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| RemoteError::upstream(format!("Failed to read body for {}: {}", what, e)))
    }

    fn decode(content: &str, what: &str) -> Result<Vec<u8>> {
        api::decode_base64(content)
            .map_err(|e| RemoteError::upstream(format!("Invalid base64 content for {}: {}", what, e)))
    }
}

/// Percent-encodes each `/` separated segment of a path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

impl ContentSource for GitHubClient {
    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    fn resolve_branch_head(&self) -> Result<String> {
        let branch = self.repository.branch();
        let url = self.repo_url(&format!("git/ref/heads/{}", encode_path(branch)));
        let what = format!(
            "branch `{}` in {} (or the repository itself)",
            branch, self.repository
        );

        let reference: GitRef = self.get_json(&url, &what)?;
        Ok(reference.object.sha)
    }

    fn list_tree(&self, commit: &str) -> Result<Vec<TreeEntry>> {
        let url = self.repo_url(&format!("git/trees/{}?recursive=1", encode_path(commit)));
        let what = format!("tree for commit {} in {}", commit, self.repository);

        let tree: GitTree = self.get_json(&url, &what)?;
        if tree.truncated {
            log::warn!(
                "Tree listing for {} was truncated by the API; some documents may be missing",
                self.repository
            );
        }

        Ok(tree
            .tree
            .into_iter()
            .filter_map(|node| {
                let kind = match node.kind.as_str() {
                    "blob" => EntryKind::Blob,
                    "tree" => EntryKind::Tree,
                    _ => return None,
                };
                Some(TreeEntry::new(node.path, kind))
            })
            .collect())
    }

    fn fetch_blob(&self, path: &str) -> Result<Vec<u8>> {
        let path = path.trim_matches('/');
        let what = format!(
            "`{}` at branch `{}` in {}",
            path,
            self.repository.branch(),
            self.repository
        );

        if path.is_empty() {
            return Err(RemoteError::not_found(what));
        }

        let url = self.repo_url(&format!(
            "contents/{}?ref={}",
            encode_path(path),
            utf8_percent_encode(self.repository.branch(), SEGMENT)
        ));

        let file = match self.get_json::<Contents>(&url, &what)? {
            Contents::File(file) if file.kind == "file" => file,
            _ => return Err(RemoteError::not_found(format!("{} (not a file)", what))),
        };

        match file.payload() {
            Payload::Inline(content) => Self::decode(content, &what),
            Payload::Download(download_url) => {
                debug!(
                    "{} exceeds inline content limit ({} bytes), following download_url",
                    path, file.size
                );
                self.get_bytes(download_url, &what)
            }
            Payload::Blob(sha) => {
                debug!("{} has no download_url, reading blob {}", path, sha);
                let url = self.repo_url(&format!("git/blobs/{}", encode_path(sha)));
                let blob: GitBlob = self.get_json(&url, &what)?;
                if blob.encoding != "base64" {
                    return Ok(blob.content.into_bytes());
                }
                Self::decode(&blob.content, &what)
            }
        }
    }
}
