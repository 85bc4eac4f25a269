//! Run configuration.
//!
//! A run is described by an optional YAML file, CLI overrides and a token.
//! [`PipelineConfig::resolve`] merges them (CLI wins) into one explicit value
//! that is passed down; nothing here is global.
//!
//! ```yaml
//! source:
//!   owner: Shazizan
//!   repo: data
//!   path: stocks_toy.csv
//! destination:
//!   owner: Shazizan
//!   repo: pipeline-vault
//!   path: stocks_toy.json
//!   branch: main
//! message: "ETL Pipeline: Automated CSV to JSON conversion"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::EtlError;
use crate::pipeline::{RunOptions, DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE};
use crate::remote::github::DEFAULT_API_URL;
use crate::remote::{RemoteFileHandle, Token};
use crate::tabular::{ParseOptions, RowShapePolicy};

/// Contents of a YAML config file. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub source: Option<SourceSection>,
    pub destination: Option<DestinationSection>,
    pub message: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub strict: Option<bool>,
    pub timestamp: Option<bool>,
    pub delimiter: Option<char>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    pub owner: String,
    pub repo: String,
    pub path: String,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationSection {
    pub owner: String,
    pub repo: String,
    pub path: String,
    #[serde(default)]
    pub branch: Option<String>,
}

impl ConfigFile {
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Reads a YAML config file.
    pub fn read(path: &Path) -> Result<Self, EtlError> {
        let data = fs::read_to_string(path).map_err(EtlError::Io)?;
        Self::from_yaml_str(&data).map_err(|source| EtlError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line; `None`/`false` defers to the file.
///
/// A CLI source or destination replaces the file's section whole, including
/// its `ref` or `branch`.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub source: Option<RemoteFileHandle>,
    pub source_ref: Option<String>,
    pub destination: Option<RemoteFileHandle>,
    pub branch: Option<String>,
    pub message: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub strict: Option<bool>,
    pub timestamp: Option<bool>,
    pub delimiter: Option<char>,
    pub dry_run: bool,
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub source: RemoteFileHandle,
    pub source_ref: Option<String>,
    pub destination: RemoteFileHandle,
    pub branch: String,
    pub message: String,
    pub api_url: String,
    pub timeout: Option<Duration>,
    pub parse: ParseOptions,
    pub dry_run: bool,
    pub token: Token,
}

impl PipelineConfig {
    /// Merges file and CLI values.
    ///
    /// `now` is used only when the destination name is timestamped.
    pub fn resolve(
        file: ConfigFile,
        overrides: Overrides,
        token: Option<Token>,
        now: OffsetDateTime,
    ) -> Result<Self, EtlError> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| EtlError::Config {
                message: "no token given; pass --token or set GITHUB_TOKEN".to_string(),
            })?;

        let file_source = file
            .source
            .map(|s| RemoteFileHandle::new(s.owner, s.repo, s.path).map(|h| (h, s.git_ref)))
            .transpose()?;
        let (source, file_ref) = match (overrides.source, file_source) {
            (Some(handle), _) => (handle, None),
            (None, Some((handle, git_ref))) => (handle, git_ref),
            (None, None) => {
                return Err(EtlError::Config {
                    message: "no source given; pass --source or set 'source' in the config file"
                        .to_string(),
                })
            }
        };

        let file_destination = file
            .destination
            .map(|d| RemoteFileHandle::new(d.owner, d.repo, d.path).map(|h| (h, d.branch)))
            .transpose()?;
        let (destination, file_branch) = match (overrides.destination, file_destination) {
            (Some(handle), _) => (handle, None),
            (None, Some((handle, branch))) => (handle, branch),
            (None, None) => {
                return Err(EtlError::Config {
                    message:
                        "no destination given; pass --dest or set 'destination' in the config file"
                            .to_string(),
                })
            }
        };

        let destination = if overrides.timestamp.or(file.timestamp).unwrap_or(false) {
            let stamped = stamped_path(&destination.path, now)?;
            destination.with_path(stamped)?
        } else {
            destination
        };

        let strict = overrides.strict.or(file.strict).unwrap_or(false);
        let delimiter = delimiter_byte(overrides.delimiter.or(file.delimiter).unwrap_or(','))?;

        Ok(Self {
            source,
            source_ref: overrides.source_ref.or(file_ref),
            destination,
            branch: overrides
                .branch
                .or(file_branch)
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            message: overrides
                .message
                .or(file.message)
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
            api_url: overrides
                .api_url
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: overrides
                .timeout_secs
                .or(file.timeout_secs)
                .map(Duration::from_secs),
            parse: ParseOptions {
                policy: if strict {
                    RowShapePolicy::Strict
                } else {
                    RowShapePolicy::Lenient
                },
                delimiter,
            },
            dry_run: overrides.dry_run,
            token,
        })
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            source_ref: self.source_ref.clone(),
            branch: self.branch.clone(),
            message: self.message.clone(),
            parse: self.parse.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Converts a delimiter character to the single byte the CSV reader needs.
pub fn delimiter_byte(delimiter: char) -> Result<u8, EtlError> {
    if delimiter.is_ascii() && delimiter != '"' && delimiter != '\n' && delimiter != '\r' {
        Ok(delimiter as u8)
    } else {
        Err(EtlError::Config {
            message: format!("unsupported delimiter {delimiter:?}; use a single ASCII character"),
        })
    }
}

/// Inserts a `_YYYYmmdd_HHMMSS` stamp before the file extension.
///
/// `data/out.json` becomes `data/out_20261017_093005.json`.
pub fn stamped_path(path: &str, at: OffsetDateTime) -> Result<String, EtlError> {
    let stamp = at
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .map_err(|source| EtlError::Config {
            message: format!("failed to format timestamp: {source}"),
        })?;

    let (dir, file_name) = match path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, path),
    };
    let stamped = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{stamp}.{ext}"),
        _ => format!("{file_name}_{stamp}"),
    };

    Ok(match dir {
        Some(dir) => format!("{dir}/{stamped}"),
        None => stamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const SAMPLE: &str = r#"
source:
  owner: Shazizan
  repo: data
  path: stocks_toy.csv
destination:
  owner: Shazizan
  repo: pipeline-vault
  path: stocks_toy.json
message: "ETL Pipeline: Automated CSV to JSON conversion"
"#;

    fn now() -> OffsetDateTime {
        datetime!(2026-10-17 09:30:05 UTC)
    }

    fn token() -> Option<Token> {
        Some(Token::new("ghp_test"))
    }

    #[test]
    fn resolves_file_with_defaults() {
        let file = ConfigFile::from_yaml_str(SAMPLE).expect("parse");
        let config =
            PipelineConfig::resolve(file, Overrides::default(), token(), now()).expect("resolve");

        assert_eq!(config.source.to_string(), "Shazizan/data/stocks_toy.csv");
        assert_eq!(
            config.destination.to_string(),
            "Shazizan/pipeline-vault/stocks_toy.json"
        );
        assert_eq!(config.branch, DEFAULT_BRANCH);
        assert_eq!(config.message, "ETL Pipeline: Automated CSV to JSON conversion");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, None);
        assert_eq!(config.parse.policy, RowShapePolicy::Lenient);
        assert_eq!(config.source_ref, None);
    }

    #[test]
    fn overrides_win() {
        let file = ConfigFile::from_yaml_str(SAMPLE).expect("parse");
        let overrides = Overrides {
            destination: Some(RemoteFileHandle::parse("me/other/out.json").expect("handle")),
            branch: Some("etl".into()),
            timeout_secs: Some(5),
            strict: Some(true),
            ..Default::default()
        };
        let config = PipelineConfig::resolve(file, overrides, token(), now()).expect("resolve");

        assert_eq!(config.destination.to_string(), "me/other/out.json");
        assert_eq!(config.branch, "etl");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.parse.policy, RowShapePolicy::Strict);
        assert_eq!(config.run_options().branch, "etl");
    }

    #[test]
    fn cli_can_turn_off_file_switches() {
        let file = ConfigFile::from_yaml_str(&format!("{SAMPLE}strict: true\ntimestamp: true\n"))
            .expect("parse");
        let config = PipelineConfig::resolve(file.clone(), Overrides::default(), token(), now())
            .expect("resolve");
        assert_eq!(config.parse.policy, RowShapePolicy::Strict);
        assert_eq!(config.destination.path, "stocks_toy_20261017_093005.json");

        let overrides = Overrides {
            strict: Some(false),
            timestamp: Some(false),
            ..Default::default()
        };
        let config = PipelineConfig::resolve(file, overrides, token(), now()).expect("resolve");
        assert_eq!(config.parse.policy, RowShapePolicy::Lenient);
        assert_eq!(config.destination.path, "stocks_toy.json");
    }

    #[test]
    fn missing_token_is_config_error() {
        let file = ConfigFile::from_yaml_str(SAMPLE).expect("parse");
        for missing in [None, Some(Token::new("  "))] {
            let err = PipelineConfig::resolve(file.clone(), Overrides::default(), missing, now())
                .expect_err("should fail");
            match err {
                EtlError::Config { message } => assert!(message.contains("GITHUB_TOKEN")),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn missing_source_is_config_error() {
        let err = PipelineConfig::resolve(ConfigFile::default(), Overrides::default(), token(), now())
            .expect_err("should fail");
        match err {
            EtlError::Config { message } => assert!(message.contains("--source")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ConfigFile::from_yaml_str("sourse: {}\n").is_err());
    }

    #[test]
    fn source_ref_and_branch_from_file() {
        let text = r#"
source: { owner: o, repo: r, path: in.csv, ref: v1.2 }
destination: { owner: o, repo: r, path: out.json, branch: data }
timeout_secs: 30
delimiter: ";"
"#;
        let file = ConfigFile::from_yaml_str(text).expect("parse");
        let config =
            PipelineConfig::resolve(file, Overrides::default(), token(), now()).expect("resolve");
        assert_eq!(config.source_ref.as_deref(), Some("v1.2"));
        assert_eq!(config.branch, "data");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.parse.delimiter, b';');
    }

    #[test]
    fn timestamp_renames_destination() {
        let file = ConfigFile::from_yaml_str(SAMPLE).expect("parse");
        let overrides = Overrides {
            timestamp: Some(true),
            ..Default::default()
        };
        let config = PipelineConfig::resolve(file, overrides, token(), now()).expect("resolve");
        assert_eq!(config.destination.path, "stocks_toy_20261017_093005.json");
    }

    #[test]
    fn stamped_path_variants() {
        assert_eq!(
            stamped_path("data/out.json", now()).expect("stamp"),
            "data/out_20261017_093005.json"
        );
        assert_eq!(
            stamped_path("README", now()).expect("stamp"),
            "README_20261017_093005"
        );
        assert_eq!(
            stamped_path(".env", now()).expect("stamp"),
            ".env_20261017_093005"
        );
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        assert_eq!(delimiter_byte('\t').expect("tab"), b'\t');
        assert!(delimiter_byte('é').is_err());
        assert!(delimiter_byte('"').is_err());
    }
}
