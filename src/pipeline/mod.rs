//! The extract → transform → load pipeline.
//!
//! Stages run strictly in order and each consumes only the previous stage's
//! output. The first failure stops the run and comes back as a
//! [`PipelineFailure`] tagged with the stage that produced it. Nothing is
//! written to the destination unless extract and transform both succeeded.

pub mod extract;
pub mod load;
mod report;

pub use extract::fetch;
pub use load::upload;
pub use report::{LoadAction, LoadOutcome, PipelineOutcome};

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::EtlError;
use crate::remote::github::GitHubClient;
use crate::remote::{ContentStore, RemoteFileHandle};
use crate::tabular::{self, ParseOptions};

/// Branch written to when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Commit message used when none is configured.
pub const DEFAULT_COMMIT_MESSAGE: &str = "ETL: Upload transformed data";

/// Pipeline stage names, used to tag failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Transform,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Transform => "transform",
            Stage::Load => "load",
        };
        f.write_str(name)
    }
}

/// The first error of a run, with the stage it came from.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub source: Box<EtlError>,
}

impl PipelineFailure {
    pub fn new(stage: Stage, source: EtlError) -> Self {
        Self {
            stage,
            source: Box::new(source),
        }
    }
}

/// Per-run settings that are not file handles.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Branch, tag or commit to read the source from. `None` uses the default branch.
    pub source_ref: Option<String>,
    /// Branch the destination is written to.
    pub branch: String,
    pub message: String,
    pub parse: ParseOptions,
    /// Run extract and transform only.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            source_ref: None,
            branch: DEFAULT_BRANCH.to_string(),
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
            parse: ParseOptions::default(),
            dry_run: false,
        }
    }
}

/// Runs the three stages against one content store.
pub struct Pipeline<'a> {
    store: &'a dyn ContentStore,
    options: RunOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a dyn ContentStore, options: RunOptions) -> Self {
        Self { store, options }
    }

    /// Moves `source` (CSV) to `destination` (JSON).
    pub fn run(
        &self,
        source: &RemoteFileHandle,
        destination: &RemoteFileHandle,
    ) -> Result<PipelineOutcome, PipelineFailure> {
        info!(%source, %destination, "starting pipeline");

        let csv_text = fetch(self.store, source, self.options.source_ref.as_deref())
            .map_err(|err| PipelineFailure::new(Stage::Extract, err))?;

        let (records, report) = tabular::parse_tabular(&csv_text, &self.options.parse)
            .map_err(|err| PipelineFailure::new(Stage::Transform, err))?;
        let document = tabular::serialize(&records)
            .map_err(|err| PipelineFailure::new(Stage::Transform, err))?;
        for issue in &report.issues {
            warn!("{}", issue);
        }
        info!(rows = report.rows, "transformation complete");

        let load = if self.options.dry_run {
            info!("dry run, skipping load");
            LoadOutcome::dry_run(document)
        } else {
            let result = upload(
                self.store,
                destination,
                &document,
                &self.options.message,
                &self.options.branch,
            )
            .map_err(|err| PipelineFailure::new(Stage::Load, err))?;
            LoadOutcome::from_upload(result)
        };

        info!("pipeline completed");
        Ok(PipelineOutcome {
            source: source.to_string(),
            destination: destination.to_string(),
            transform: report,
            load,
        })
    }
}

/// Builds a GitHub client from `config` and runs the pipeline with it.
pub fn run_github(config: &PipelineConfig) -> Result<PipelineOutcome, EtlError> {
    if !config.token.has_known_prefix() {
        warn!("token does not look like a GitHub personal access token (ghp_ or github_pat_)");
    }

    let client = GitHubClient::new(&config.api_url, config.token.clone(), config.timeout)?;
    let pipeline = Pipeline::new(&client, config.run_options());
    Ok(pipeline.run(&config.source, &config.destination)?)
}
