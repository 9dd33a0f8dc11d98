//! Shared test utilities for integration tests.
//!
//! Provides an in-memory content source and a mock of the GitHub REST API
//! used across multiple test files.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gitdocs::remote::Result as RemoteResult;
use gitdocs::{ContentSource, RemoteError, RepositoryRef, TreeEntry};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server, StatusCode};

/// Commit sha reported by test sources.
pub const HEAD_SHA: &str = "3f4e5d6c7b8a";

/// Smallest valid PNG signature, enough for MIME detection tests.
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// In-memory repository implementing [`ContentSource`].
///
/// Files are listed in insertion order. Every call is recorded so tests
/// can assert how many requests a pipeline issued.
pub struct MemorySource {
    repository: RepositoryRef,
    files: Vec<(String, Vec<u8>)>,
    branch_exists: bool,
    failures: HashMap<String, fn() -> RemoteError>,
    fail_everything: Option<fn() -> RemoteError>,
    fetches: Mutex<Vec<String>>,
    tree_listings: Mutex<usize>,
    fetch_delay: Option<Duration>,
    /// Fetches currently running and the most seen at once
    in_flight: Mutex<(usize, usize)>,
}

impl MemorySource {
    /// Creates source for `acme/handbook` at branch `main`.
    pub fn new(files: &[(&str, &[u8])]) -> Self {
        Self {
            repository: RepositoryRef::new("acme", "handbook", None::<String>),
            files: files
                .iter()
                .map(|(path, bytes)| (path.to_string(), bytes.to_vec()))
                .collect(),
            branch_exists: true,
            failures: HashMap::new(),
            fail_everything: None,
            fetches: Mutex::new(Vec::new()),
            tree_listings: Mutex::new(0),
            fetch_delay: None,
            in_flight: Mutex::new((0, 0)),
        }
    }

    /// Makes every `fetch_blob` call take at least `delay`.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Reads from a different branch.
    pub fn on_branch(mut self, branch: &str) -> Self {
        self.repository = RepositoryRef::new("acme", "handbook", Some(branch));
        self
    }

    /// Makes the configured branch unknown to the remote.
    pub fn without_branch(mut self) -> Self {
        self.branch_exists = false;
        self
    }

    /// Makes fetching `path` fail with the given error.
    pub fn failing(mut self, path: &str, error: fn() -> RemoteError) -> Self {
        self.failures.insert(path.to_string(), error);
        self
    }

    /// Makes every remote call fail with the given error.
    pub fn failing_everything(mut self, error: fn() -> RemoteError) -> Self {
        self.fail_everything = Some(error);
        self
    }

    /// Paths passed to `fetch_blob`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetches.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// Number of `fetch_blob` calls for `path`.
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetched().iter().filter(|p| *p == path).count()
    }

    /// Number of tree listings served.
    pub fn tree_listings(&self) -> usize {
        self.tree_listings.lock().map(|n| *n).unwrap_or_default()
    }

    /// Most `fetch_blob` calls observed running at the same time.
    pub fn peak_concurrent_fetches(&self) -> usize {
        self.in_flight.lock().map(|n| n.1).unwrap_or_default()
    }

    fn read_file(&self, path: &str) -> RemoteResult<Vec<u8>> {
        if let Some(delay) = self.fetch_delay {
            thread::sleep(delay);
        }
        if let Some(error) = self.fail_everything {
            return Err(error());
        }
        if let Some(error) = self.failures.get(path) {
            return Err(error());
        }

        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| RemoteError::not_found(path))
    }
}

impl ContentSource for MemorySource {
    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    fn resolve_branch_head(&self) -> RemoteResult<String> {
        if let Some(error) = self.fail_everything {
            return Err(error());
        }
        if !self.branch_exists {
            return Err(RemoteError::not_found(format!(
                "branch `{}` in {}",
                self.repository.branch(),
                self.repository
            )));
        }
        Ok(HEAD_SHA.to_string())
    }

    fn list_tree(&self, commit: &str) -> RemoteResult<Vec<TreeEntry>> {
        if let Some(error) = self.fail_everything {
            return Err(error());
        }
        if commit != HEAD_SHA {
            return Err(RemoteError::not_found(format!("tree {}", commit)));
        }
        if let Ok(mut n) = self.tree_listings.lock() {
            *n += 1;
        }

        let mut dirs = BTreeSet::new();
        for (path, _) in &self.files {
            let mut dir = path.as_str();
            while let Some(i) = dir.rfind('/') {
                dir = &dir[..i];
                dirs.insert(dir.to_string());
            }
        }

        let mut entries: Vec<TreeEntry> = dirs.into_iter().map(TreeEntry::tree).collect();
        entries.extend(self.files.iter().map(|(path, _)| TreeEntry::blob(path.as_str())));
        Ok(entries)
    }

    fn fetch_blob(&self, path: &str) -> RemoteResult<Vec<u8>> {
        if let Ok(mut fetches) = self.fetches.lock() {
            fetches.push(path.to_string());
        }
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.0 += 1;
            in_flight.1 = in_flight.1.max(in_flight.0);
        }

        let result = self.read_file(path);

        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.0 -= 1;
        }
        result
    }
}

/// Canned response served by [`MockGitHub`].
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl MockResponse {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: value.to_string().into_bytes(),
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self {
            status: 200,
            headers: vec![(
                "Content-Type".to_string(),
                "application/octet-stream".to_string(),
            )],
            body: body.to_vec(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Request observed by [`MockGitHub`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub authorization: Option<String>,
}

/// Minimal GitHub REST API served from a background thread.
///
/// Routes match the request path including its query string and can be
/// added after start, once the server URL is known. Unknown routes answer
/// 404 like the real API.
pub struct MockGitHub {
    url: String,
    routes: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockGitHub {
    /// Starts server on an ephemeral local port.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound
    pub fn start() -> Result<Self> {
        let server = Server::http("127.0.0.1:0").map_err(|e| anyhow!("{}", e))?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| anyhow!("Mock server has no IP address"))?;

        let routes: Arc<Mutex<HashMap<String, MockResponse>>> = Arc::default();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();
        let served = Arc::clone(&routes);
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            for request in server.incoming_requests() {
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());
                let url = request.url().to_string();

                if let Ok(mut log) = recorded.lock() {
                    log.push(RecordedRequest {
                        url: url.clone(),
                        authorization,
                    });
                }

                let canned = served
                    .lock()
                    .ok()
                    .and_then(|routes| routes.get(&url).cloned())
                    .unwrap_or_else(|| {
                        MockResponse::json(404, serde_json::json!({ "message": "Not Found" }))
                    });

                let mut response =
                    Response::from_data(canned.body).with_status_code(StatusCode(canned.status));
                for (name, value) in &canned.headers {
                    if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                        response = response.with_header(header);
                    }
                }
                let _ = request.respond(response);
            }
        });

        Ok(Self {
            url: format!("http://{}", addr),
            routes,
            requests,
        })
    }

    /// Serves `response` for requests to `route`.
    pub fn route(&self, (route, response): (String, MockResponse)) -> &Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert(route, response);
        }
        self
    }

    /// Base URL to pass as the API endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Route for the branch head of `acme/handbook`.
pub fn ref_route(branch: &str) -> (String, MockResponse) {
    (
        format!("/repos/acme/handbook/git/ref/heads/{}", branch),
        MockResponse::json(
            200,
            serde_json::json!({ "ref": format!("refs/heads/{}", branch), "object": { "sha": HEAD_SHA, "type": "commit" } }),
        ),
    )
}

/// Route for the recursive tree of the head commit.
pub fn tree_route(paths: &[&str]) -> (String, MockResponse) {
    let tree: Vec<serde_json::Value> = paths
        .iter()
        .map(|path| serde_json::json!({ "path": path, "mode": "100644", "type": "blob", "sha": "0" }))
        .collect();

    (
        format!("/repos/acme/handbook/git/trees/{}?recursive=1", HEAD_SHA),
        MockResponse::json(
            200,
            serde_json::json!({ "sha": HEAD_SHA, "tree": tree, "truncated": false }),
        ),
    )
}

/// Route for a file delivered inline as wrapped base64.
pub fn contents_route(path: &str, bytes: &[u8]) -> (String, MockResponse) {
    let encoded = STANDARD.encode(bytes);
    let wrapped = encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n");

    (
        format!("/repos/acme/handbook/contents/{}?ref=main", path),
        MockResponse::json(
            200,
            serde_json::json!({
                "type": "file",
                "path": path,
                "size": bytes.len(),
                "sha": "0",
                "encoding": "base64",
                "content": wrapped,
            }),
        ),
    )
}

/// Route for a file above the inline limit, pointing at `download_url`.
pub fn large_contents_route(path: &str, size: usize, download_url: &str) -> (String, MockResponse) {
    (
        format!("/repos/acme/handbook/contents/{}?ref=main", path),
        MockResponse::json(
            200,
            serde_json::json!({
                "type": "file",
                "path": path,
                "size": size,
                "sha": "0",
                "encoding": "none",
                "content": "",
                "download_url": download_url,
            }),
        ),
    )
}
