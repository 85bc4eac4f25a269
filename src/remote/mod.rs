//! Remote content store access.
//!
//! This module owns everything that talks to (or describes) a repository
//! hosted behind a contents API: file handles, the wire types of the GET and
//! PUT endpoints, the [`ContentStore`] seam and its GitHub implementation.
//! The pipeline stages only ever see a `&dyn ContentStore`.

pub mod codec;
pub mod github;
mod token;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EtlError;

pub use token::Token;

/// Identifies a single file in a remote repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFileHandle {
    pub owner: String,
    pub repo: String,
    pub path: String,
}

impl RemoteFileHandle {
    /// Builds a handle, normalizing stray slashes around the path.
    ///
    /// Whitespace is trimmed from owner and repository only; it is a valid
    /// part of a file name.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Self, EtlError> {
        let owner = owner.into();
        let repo = repo.into();
        let path = path.into();
        let input = format!("{owner}/{repo}/{path}");

        let owner = owner.trim().to_string();
        let repo = repo.trim().to_string();
        let path = path.trim_matches('/').to_string();

        if owner.is_empty() || repo.is_empty() {
            return Err(EtlError::InvalidHandle {
                input,
                message: "owner and repository must be non-empty".to_string(),
            });
        }
        if owner.contains('/') || repo.contains('/') {
            return Err(EtlError::InvalidHandle {
                input,
                message: "owner and repository must not contain '/'".to_string(),
            });
        }
        if path.is_empty() || path.split('/').any(str::is_empty) {
            return Err(EtlError::InvalidHandle {
                input,
                message: "path must name a file".to_string(),
            });
        }

        Ok(Self { owner, repo, path })
    }

    /// Parses an `owner/repo/path/to/file` reference.
    pub fn parse(input: &str) -> Result<Self, EtlError> {
        let mut parts = input.splitn(3, '/');
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        let Some(path) = parts.next() else {
            return Err(EtlError::InvalidHandle {
                input: input.to_string(),
                message: "expected '<owner>/<repo>/<path>'".to_string(),
            });
        };

        Self::new(owner, repo, path).map_err(|err| match err {
            EtlError::InvalidHandle { message, .. } => EtlError::InvalidHandle {
                input: input.to_string(),
                message,
            },
            other => other,
        })
    }

    /// Final path component (the file name).
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Returns a copy of this handle pointing at a different path.
    pub fn with_path(&self, path: impl Into<String>) -> Result<Self, EtlError> {
        Self::new(self.owner.clone(), self.repo.clone(), path)
    }
}

impl fmt::Display for RemoteFileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.repo, self.path)
    }
}

/// File object returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteFileContent {
    /// Encoded payload. Empty when `encoding` is `"none"`.
    #[serde(default)]
    pub content: String,
    /// Content-hash token used for optimistic-concurrency updates.
    pub sha: String,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of a create-or-update `PUT` request.
#[derive(Clone, Debug, Serialize)]
pub struct PutContentRequest {
    pub message: String,
    /// Base64 form of the new file content.
    pub content: String,
    pub branch: String,
    /// Present only when overwriting an existing file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Raw status and body of a contents API call.
///
/// Stores do not interpret statuses; that is the pipeline stages' job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// Successful create-or-update response.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadResult {
    pub content: UploadedFile,
    #[serde(default)]
    pub commit: Option<CommitInfo>,
    /// True for a `201 Created`, false for a `200` update.
    #[serde(skip)]
    pub created: bool,
}

/// The file entry inside an [`UploadResult`].
#[derive(Clone, Debug, Deserialize)]
pub struct UploadedFile {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// The commit entry inside an [`UploadResult`].
#[derive(Clone, Debug, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// A remote repository that can read and write single files.
pub trait ContentStore {
    /// Reads the file at `handle`, optionally pinned to a branch, tag or commit.
    fn get_content(
        &self,
        handle: &RemoteFileHandle,
        git_ref: Option<&str>,
    ) -> Result<RemoteResponse, EtlError>;

    /// Creates or overwrites the file at `handle`.
    fn put_content(
        &self,
        handle: &RemoteFileHandle,
        request: &PutContentRequest,
    ) -> Result<RemoteResponse, EtlError>;
}
