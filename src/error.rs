use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::PipelineFailure;

/// The main error type for repo-etl operations.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {url}: HTTP {status} - {body}")]
    RemoteRead {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to write {url}: HTTP {status} - {body}")]
    RemoteWrite {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Failed to decode file content: {message}")]
    ContentDecode { message: String },

    #[error("Malformed tabular input: {message}")]
    MalformedInput { message: String },

    #[error("Failed to parse CSV: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("Failed to serialize JSON: {source}")]
    JsonWrite {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid file reference '{input}': {message}")]
    InvalidHandle { input: String, message: String },

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),
}

impl EtlError {
    /// Shorthand for a [`EtlError::MalformedInput`] with the given message.
    pub fn malformed(message: impl Into<String>) -> Self {
        EtlError::MalformedInput {
            message: message.into(),
        }
    }

    /// The HTTP status carried by remote read/write failures, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            EtlError::RemoteRead { status, .. } | EtlError::RemoteWrite { status, .. } => {
                Some(*status)
            }
            EtlError::Pipeline(failure) => failure.source.status(),
            _ => None,
        }
    }
}
