//! Load stage: create or overwrite one file in a content store.

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::EtlError;
use crate::remote::codec::encode_content;
use crate::remote::{ContentStore, PutContentRequest, RemoteFileHandle, UploadResult};

#[derive(Deserialize)]
struct ExistingFile {
    sha: String,
}

/// Writes `content` to `handle` on `branch`.
///
/// A read of the target comes first: if it answers `200`, its sha is sent
/// with the write so the store performs an update; any other status means
/// create. The store rejects the write if the file changed in between; that
/// rejection is returned as [`EtlError::RemoteWrite`], not retried.
pub fn upload(
    store: &dyn ContentStore,
    handle: &RemoteFileHandle,
    content: &str,
    message: &str,
    branch: &str,
) -> Result<UploadResult, EtlError> {
    info!(destination = %handle, %branch, "loading");

    let existing = store.get_content(handle, Some(branch))?;
    let sha = if existing.status == 200 {
        let file: ExistingFile = serde_json::from_str(&existing.body).map_err(|source| {
            EtlError::InvalidResponse {
                url: existing.url.clone(),
                message: format!("destination is not a single file: {source}"),
            }
        })?;
        info!(sha = %file.sha, "file exists, updating");
        Some(file.sha)
    } else {
        debug!(status = existing.status, "no existing file");
        info!("creating new file");
        None
    };

    let request = PutContentRequest {
        message: message.to_string(),
        content: encode_content(content),
        branch: branch.to_string(),
        sha,
    };
    let response = store.put_content(handle, &request)?;

    match response.status {
        200 | 201 => {
            let mut result: UploadResult =
                serde_json::from_str(&response.body).map_err(|source| {
                    EtlError::InvalidResponse {
                        url: response.url.clone(),
                        message: format!("unexpected create/update body: {source}"),
                    }
                })?;
            result.created = response.status == 201;
            info!(created = result.created, "load successful");
            Ok(result)
        }
        status => Err(EtlError::RemoteWrite {
            url: response.url,
            status,
            body: response.body,
        }),
    }
}
