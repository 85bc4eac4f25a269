//! Blocking GitHub contents API client.
//!
//! URL and header construction are plain functions so they can be tested
//! without a network; [`GitHubClient`] only adds the `ureq` agent on top.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::EtlError;

use super::{ContentStore, PutContentRequest, RemoteFileHandle, RemoteResponse, Token};

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github.v3+json";

/// Builds `{api}/repos/{owner}/{repo}/contents/{path}[?ref=..]`.
///
/// Each path component is percent-encoded on its own so `/` keeps its meaning.
pub fn contents_url(
    api_base: &Url,
    handle: &RemoteFileHandle,
    git_ref: Option<&str>,
) -> Result<Url, EtlError> {
    let mut url = api_base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|()| EtlError::Config {
            message: format!("API URL '{}' cannot be used as a base", api_base),
        })?;
        segments
            .pop_if_empty()
            .push("repos")
            .push(&handle.owner)
            .push(&handle.repo)
            .push("contents")
            .extend(handle.path.split('/'));
    }

    url.set_query(None);
    if let Some(git_ref) = git_ref {
        url.query_pairs_mut().append_pair("ref", git_ref);
    }

    Ok(url)
}

/// Headers sent on every contents API request.
pub fn request_headers(token: &Token) -> Vec<(&'static str, String)> {
    vec![
        ("Authorization", format!("Bearer {}", token.expose())),
        ("Accept", ACCEPT.to_string()),
        (
            "User-Agent",
            format!("repo-etl/{}", env!("CARGO_PKG_VERSION")),
        ),
    ]
}

/// [`ContentStore`] backed by the GitHub REST API.
pub struct GitHubClient {
    agent: ureq::Agent,
    api_base: Url,
    token: Token,
}

impl GitHubClient {
    /// Creates a client for `api_url`. `timeout` of `None` keeps ureq's default.
    pub fn new(api_url: &str, token: Token, timeout: Option<Duration>) -> Result<Self, EtlError> {
        let api_base = Url::parse(api_url).map_err(|source| EtlError::Config {
            message: format!("invalid API URL '{api_url}': {source}"),
        })?;

        // Non-2xx statuses are data for the pipeline stages, not transport errors.
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build();
        let agent: ureq::Agent = config.into();

        Ok(Self {
            agent,
            api_base,
            token,
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }
}

impl ContentStore for GitHubClient {
    fn get_content(
        &self,
        handle: &RemoteFileHandle,
        git_ref: Option<&str>,
    ) -> Result<RemoteResponse, EtlError> {
        let url = contents_url(&self.api_base, handle, git_ref)?;
        debug!(%url, "GET contents");

        let mut request = self.agent.get(url.as_str());
        for (name, value) in request_headers(&self.token) {
            request = request.header(name, &value);
        }

        let response = request.call().map_err(|source| EtlError::Transport {
            url: url.to_string(),
            message: source.to_string(),
        })?;
        into_remote_response(url, response)
    }

    fn put_content(
        &self,
        handle: &RemoteFileHandle,
        payload: &PutContentRequest,
    ) -> Result<RemoteResponse, EtlError> {
        let url = contents_url(&self.api_base, handle, None)?;
        debug!(%url, branch = %payload.branch, update = payload.sha.is_some(), "PUT contents");

        let mut request = self.agent.put(url.as_str());
        for (name, value) in request_headers(&self.token) {
            request = request.header(name, &value);
        }

        let response = request
            .send_json(payload)
            .map_err(|source| EtlError::Transport {
                url: url.to_string(),
                message: source.to_string(),
            })?;
        into_remote_response(url, response)
    }
}

fn into_remote_response(
    url: Url,
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<RemoteResponse, EtlError> {
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|source| EtlError::Transport {
            url: url.to_string(),
            message: format!("failed reading response body: {source}"),
        })?;
    debug!(%url, status, bytes = body.len(), "response");

    Ok(RemoteResponse {
        url: url.to_string(),
        status,
        body,
    })
}
