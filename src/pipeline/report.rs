//! Outcome of a successful pipeline run.

use serde::Serialize;
use std::fmt;

use crate::remote::UploadResult;
use crate::tabular::TransformReport;

/// Everything a caller might want to show after a run.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineOutcome {
    /// `owner/repo/path` of the CSV that was read.
    pub source: String,
    /// `owner/repo/path` of the JSON that was (or would be) written.
    pub destination: String,
    pub transform: TransformReport,
    pub load: LoadOutcome,
}

impl PipelineOutcome {
    /// Public URL of the written file, if the store reported one.
    pub fn destination_url(&self) -> Option<&str> {
        self.load.html_url.as_deref()
    }
}

/// What the load stage did.
#[derive(Clone, Debug, Serialize)]
pub struct LoadOutcome {
    pub action: LoadAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    /// The rendered document, kept only for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl LoadOutcome {
    pub fn from_upload(result: UploadResult) -> Self {
        Self {
            action: if result.created {
                LoadAction::Created
            } else {
                LoadAction::Updated
            },
            html_url: result.content.html_url,
            file_sha: Some(result.content.sha),
            commit_sha: result.commit.map(|commit| commit.sha),
            document: None,
        }
    }

    pub fn dry_run(document: String) -> Self {
        Self {
            action: LoadAction::DryRun,
            html_url: None,
            file_sha: None,
            commit_sha: None,
            document: Some(document),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadAction {
    Created,
    Updated,
    DryRun,
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extracted {}", self.source)?;
        write!(f, "{}", self.transform)?;

        let verb = match self.load.action {
            LoadAction::Created => "Created",
            LoadAction::Updated => "Updated",
            LoadAction::DryRun => "Dry run: skipped writing",
        };
        writeln!(f, "{} {}", verb, self.destination)?;

        if let Some(url) = &self.load.html_url {
            writeln!(f, "  {}", url)?;
        }
        if let Some(commit) = &self.load.commit_sha {
            writeln!(f, "  commit {}", commit)?;
        }

        Ok(())
    }
}
