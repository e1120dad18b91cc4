//! Worker configuration loaded from a TOML file.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! The `DATABASE_URL` environment variable replaces the configured database
//! URL when set.

use crate::dirty_pipeline::domain::{PipelineStage, default_stages};
use crate::enricher::domain::{PollBackoff, StartGatePolicy};
use crate::open_tree::adapters::http::DEFAULT_BASE_URL;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding [`DatabaseConfig::url`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Configuration path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid configuration TOML.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Complete worker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Polling backoff bounds.
    pub backoff: BackoffConfig,
    /// Start-gate limits.
    pub start_gate: StartGateConfig,
    /// Document storage.
    pub documents: DocumentsConfig,
    /// Open Tree of Life enricher settings.
    pub open_tree_of_life: OpenTreeConfig,
    /// Dirty Pipeline enricher settings.
    pub dirty_pipeline: DirtyPipelineConfig,
}

impl WorkerConfig {
    /// Reads the configuration at `path` and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is malformed.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        Ok(config.with_database_url(std::env::var(DATABASE_URL_ENV).ok()))
    }

    /// Parses configuration TOML without consulting the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Replaces the database URL when `url` is set and non-empty.
    #[must_use]
    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        if let Some(value) = url.filter(|candidate| !candidate.trim().is_empty()) {
            self.database.url = value;
        }
        self
    }
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/emikg".to_owned(),
            pool_size: 5,
        }
    }
}

/// Polling backoff bounds in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackoffConfig {
    /// Shortest pause between cycles.
    pub min_secs: u64,
    /// Longest pause between cycles.
    pub max_secs: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_secs: 1,
            max_secs: 60,
        }
    }
}

impl BackoffConfig {
    /// Builds the backoff state for a worker loop.
    #[must_use]
    pub fn poll_backoff(&self) -> PollBackoff {
        PollBackoff::new(
            Duration::from_secs(self.min_secs),
            Duration::from_secs(self.max_secs),
        )
    }
}

/// Start-gate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartGateConfig {
    /// Start checks before a task is failed as stalled.
    pub max_attempts: u32,
    /// Optional wall-clock limit in seconds.
    pub deadline_secs: Option<u64>,
}

impl Default for StartGateConfig {
    fn default() -> Self {
        let policy = StartGatePolicy::default();
        Self {
            max_attempts: policy.max_attempts(),
            deadline_secs: None,
        }
    }
}

impl StartGateConfig {
    /// Builds the start-gate policy.
    #[must_use]
    pub fn policy(&self) -> StartGatePolicy {
        StartGatePolicy::new(self.max_attempts, self.deadline_secs.map(Duration::from_secs))
    }
}

/// Document storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentsConfig {
    /// Directory receiving failure logs and stage outputs.
    pub root: Utf8PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("documents"),
        }
    }
}

/// Open Tree of Life enricher settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenTreeConfig {
    /// API root.
    pub base_url: String,
    /// Whether fuzzy name matching is requested.
    pub approximate_matching: bool,
    /// Seconds between start-condition checks.
    pub start_interval_secs: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for OpenTreeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            approximate_matching: false,
            start_interval_secs: 1,
            request_timeout_secs: 30,
        }
    }
}

/// Dirty Pipeline enricher settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirtyPipelineConfig {
    /// Directory holding uploaded payloads.
    pub payload_root: Utf8PathBuf,
    /// Directory stage processes run from.
    pub working_dir: Option<Utf8PathBuf>,
    /// Seconds between start-condition checks.
    pub start_interval_secs: u64,
    /// Stage list; empty means the built-in chain.
    pub stages: Vec<PipelineStage>,
}

impl Default for DirtyPipelineConfig {
    fn default() -> Self {
        Self {
            payload_root: Utf8PathBuf::from("/unsafe_data_payloads"),
            working_dir: None,
            start_interval_secs: 10,
            stages: Vec::new(),
        }
    }
}

impl DirtyPipelineConfig {
    /// Returns the configured stages, or [`default_stages`] when none are
    /// listed.
    #[must_use]
    pub fn resolved_stages(&self) -> Vec<PipelineStage> {
        if self.stages.is_empty() {
            default_stages()
        } else {
            self.stages.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn empty_document_yields_defaults() {
        let config = WorkerConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, WorkerConfig::default());
        assert_eq!(config.backoff.poll_backoff().current(), Duration::from_secs(1));
        assert_eq!(config.start_gate.policy().max_attempts(), 30);
        assert_eq!(config.dirty_pipeline.resolved_stages().len(), 18);
        assert_eq!(config.open_tree_of_life.base_url, DEFAULT_BASE_URL);
    }

    #[rstest]
    fn sections_override_defaults() {
        let config = WorkerConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://db/emikg"
            pool_size = 2

            [backoff]
            min_secs = 5
            max_secs = 300

            [start_gate]
            max_attempts = 4
            deadline_secs = 120

            [open_tree_of_life]
            approximate_matching = true

            [[dirty_pipeline.stages]]
            name = "echo"
            task_type = "Echo"
            program = "echo"
            args = ["{{ payload_id }}"]
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.database.url, "postgres://db/emikg");
        assert_eq!(config.database.pool_size, 2);
        assert_eq!(config.backoff.poll_backoff().max(), Duration::from_secs(300));
        assert_eq!(
            config.start_gate.policy().deadline(),
            Some(Duration::from_secs(120))
        );
        assert!(config.open_tree_of_life.approximate_matching);
        let stages = config.dirty_pipeline.resolved_stages();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages.first().map(|stage| stage.program.as_str()), Some("echo"));
    }

    #[rstest]
    fn unknown_keys_are_rejected() {
        let result = WorkerConfig::from_toml_str("[backoff]\nminimum = 3\n");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[rstest]
    #[case(Some("postgres://override/emikg".to_owned()), "postgres://override/emikg")]
    #[case(Some("  ".to_owned()), "postgres://localhost/emikg")]
    #[case(None, "postgres://localhost/emikg")]
    fn database_url_override(#[case] url: Option<String>, #[case] expected: &str) {
        let config = WorkerConfig::default().with_database_url(url);

        assert_eq!(config.database.url, expected);
    }

    #[rstest]
    fn load_reads_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[documents]\nroot = \"/var/lib/emikg/documents\"").expect("write config");
        let path = Utf8Path::from_path(file.path()).expect("utf-8 temp path");

        let config = WorkerConfig::load(path).expect("config should load");

        assert_eq!(config.documents.root, Utf8PathBuf::from("/var/lib/emikg/documents"));
    }

    #[rstest]
    fn missing_file_is_a_read_error() {
        let result = WorkerConfig::load(Utf8Path::new("/nonexistent/emikg-worker.toml"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
