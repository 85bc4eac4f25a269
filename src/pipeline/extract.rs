//! Extract stage: read one file from a content store as UTF-8 text.

use tracing::info;

use crate::error::EtlError;
use crate::remote::codec::decode_content;
use crate::remote::{ContentStore, RemoteFileContent, RemoteFileHandle};

/// Fetches `handle` and decodes its base64 payload.
///
/// Only a `200` counts as success; anything else becomes
/// [`EtlError::RemoteRead`] with the status and response body.
pub fn fetch(
    store: &dyn ContentStore,
    handle: &RemoteFileHandle,
    git_ref: Option<&str>,
) -> Result<String, EtlError> {
    info!(source = %handle, "extracting");
    let response = store.get_content(handle, git_ref)?;

    if response.status != 200 {
        return Err(EtlError::RemoteRead {
            url: response.url,
            status: response.status,
            body: response.body,
        });
    }

    let file: RemoteFileContent =
        serde_json::from_str(&response.body).map_err(|source| EtlError::InvalidResponse {
            url: response.url.clone(),
            message: format!("expected a file object (is the path a directory?): {source}"),
        })?;

    if let Some(kind) = file.kind.as_deref() {
        if kind != "file" {
            return Err(EtlError::InvalidResponse {
                url: response.url,
                message: format!("'{}' is a {}, not a file", handle.path, kind),
            });
        }
    }

    match file.encoding.as_deref() {
        None | Some("base64") => {}
        Some("none") => {
            return Err(EtlError::InvalidResponse {
                url: response.url,
                message: format!(
                    "file is too large ({} bytes) to be returned inline by the contents API",
                    file.size
                ),
            });
        }
        Some(other) => {
            return Err(EtlError::InvalidResponse {
                url: response.url,
                message: format!("unsupported content encoding '{other}'"),
            });
        }
    }

    let text = decode_content(&file.content)?;
    info!(bytes = text.len(), "extraction successful");
    Ok(text)
}
