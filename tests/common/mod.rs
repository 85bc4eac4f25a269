#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use repo_etl::remote::codec::encode_content;
use repo_etl::remote::{ContentStore, PutContentRequest, RemoteFileHandle, RemoteResponse};
use repo_etl::EtlError;
use serde_json::{json, Value};

/// A request the fake store received.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Get {
        path: String,
        git_ref: Option<String>,
    },
    Put {
        path: String,
        payload: Value,
    },
}

/// In-memory contents API. Unknown paths answer 404; writes answer 201
/// unless scripted otherwise. Every call is recorded.
#[derive(Default)]
pub struct FakeStore {
    gets: HashMap<String, (u16, String)>,
    put: Option<(u16, String)>,
    offline: bool,
    unreachable: HashSet<String>,
    calls: RefCell<Vec<Call>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `text` at `path` the way GitHub does: base64 wrapped at 60 columns.
    pub fn with_file(self, path: &str, text: &str, sha: &str) -> Self {
        let body = json!({
            "type": "file",
            "encoding": "base64",
            "size": text.len(),
            "path": path,
            "sha": sha,
            "content": wrap(&encode_content(text), 60),
        });
        self.with_get(path, 200, &body.to_string())
    }

    pub fn with_get(mut self, path: &str, status: u16, body: &str) -> Self {
        self.gets
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    pub fn with_put(mut self, status: u16, body: &str) -> Self {
        self.put = Some((status, body.to_string()));
        self
    }

    /// Every request fails before reaching the server.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Requests for `path` fail before reaching the server.
    pub fn unreachable(mut self, path: &str) -> Self {
        self.unreachable.insert(path.to_string());
        self
    }

    fn is_down(&self, handle: &RemoteFileHandle) -> bool {
        self.offline || self.unreachable.contains(&handle.path)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn puts(&self) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Put { payload, .. } => Some(payload.clone()),
                Call::Get { .. } => None,
            })
            .collect()
    }
}

impl ContentStore for FakeStore {
    fn get_content(
        &self,
        handle: &RemoteFileHandle,
        git_ref: Option<&str>,
    ) -> Result<RemoteResponse, EtlError> {
        self.calls.borrow_mut().push(Call::Get {
            path: handle.path.clone(),
            git_ref: git_ref.map(str::to_string),
        });
        if self.is_down(handle) {
            return Err(transport(handle));
        }

        let (status, body) = self
            .gets
            .get(&handle.path)
            .cloned()
            .unwrap_or_else(|| (404, r#"{"message":"Not Found"}"#.to_string()));
        Ok(RemoteResponse {
            url: url(handle),
            status,
            body,
        })
    }

    fn put_content(
        &self,
        handle: &RemoteFileHandle,
        request: &PutContentRequest,
    ) -> Result<RemoteResponse, EtlError> {
        self.calls.borrow_mut().push(Call::Put {
            path: handle.path.clone(),
            payload: serde_json::to_value(request).expect("serialize put request"),
        });
        if self.is_down(handle) {
            return Err(transport(handle));
        }

        let (status, body) = self.put.clone().unwrap_or_else(|| {
            let body = json!({
                "content": {
                    "path": handle.path,
                    "sha": "newsha",
                    "html_url": format!(
                        "https://github.com/{}/{}/blob/{}/{}",
                        handle.owner, handle.repo, request.branch, handle.path
                    ),
                },
                "commit": {"sha": "commit1"},
            });
            (201, body.to_string())
        });
        Ok(RemoteResponse {
            url: url(handle),
            status,
            body,
        })
    }
}

pub fn handle(spec: &str) -> RemoteFileHandle {
    RemoteFileHandle::parse(spec).expect("valid handle")
}

fn url(handle: &RemoteFileHandle) -> String {
    format!(
        "https://api.test/repos/{}/{}/contents/{}",
        handle.owner, handle.repo, handle.path
    )
}

fn transport(handle: &RemoteFileHandle) -> EtlError {
    EtlError::Transport {
        url: url(handle),
        message: "connection refused".to_string(),
    }
}

fn wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / width + 1);
    for (idx, ch) in text.chars().enumerate() {
        if idx > 0 && idx % width == 0 {
            out.push('\n');
        }
        out.push(ch);
    }
    out.push('\n');
    out
}
