//! GitHub REST response payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// `GET /repos/{owner}/{repo}/git/ref/heads/{branch}`
#[derive(Debug, Deserialize)]
pub struct GitRef {
    pub object: GitObject,
}

#[derive(Debug, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/git/trees/{sha}?recursive=1`
#[derive(Debug, Deserialize)]
pub struct GitTree {
    pub tree: Vec<GitTreeNode>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct GitTreeNode {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Single file entry from `GET /repos/{owner}/{repo}/contents/{path}`.
///
/// Files above the inline threshold (1MB) arrive with empty `content`;
/// the bytes must then be read from `download_url` or the blob API.
#[derive(Debug, Deserialize)]
pub struct ContentFile {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Body of a contents request: a file object, or an array for directories.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    File(ContentFile),
    Listing(Vec<serde_json::Value>),
}

/// `GET /repos/{owner}/{repo}/git/blobs/{sha}`
#[derive(Debug, Deserialize)]
pub struct GitBlob {
    pub content: String,
    pub encoding: String,
}

/// Error body returned by the API on failure.
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

/// Extracts the `message` field from an error body, falling back to raw text.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.trim().chars().take(200).collect())
}

/// Decodes API base64, which wraps lines at 60 columns.
pub fn decode_base64(content: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}

/// How a contents response delivers its bytes.
#[derive(Debug, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Base64 content embedded in the response
    Inline(&'a str),
    /// Content must be downloaded from this URL
    Download(&'a str),
    /// Content must be read from the git blob API by sha
    Blob(&'a str),
}

impl ContentFile {
    /// Decides where the file bytes come from.
    ///
    /// An empty inline payload on a non-empty file means the inline size
    /// limit was exceeded.
    pub fn payload(&self) -> Payload<'_> {
        let inline = self
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .filter(|_| self.encoding.as_deref().is_none_or(|e| e == "base64"));

        match inline {
            Some(content) => Payload::Inline(content),
            None if self.size == 0 => Payload::Inline(""),
            None => match self.download_url.as_deref() {
                Some(url) => Payload::Download(url),
                None => Payload::Blob(&self.sha),
            },
        }
    }
}
