// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! One YAML file; every key optional except `paths.root`. Relative
//! subpaths resolve against the root, so a config can describe a whole
//! deployment with a single absolute path.

use seqproc_tasks::TaskSettings;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config is missing required key {0}")]
    MissingKey(&'static str),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    /// Worker thread count.
    pub nthreads: usize,
    /// Subprocess parallelism hint handed to each task.
    pub nthreads_per_project: usize,
    /// Disable all writes; projects are classified but never processed.
    pub readonly: bool,
    /// Ignore run directories younger than this many seconds.
    pub min_age: Option<u64>,
    /// Ignore run directories older than this many seconds.
    pub max_age: Option<u64>,
    /// Seconds to wait for fastq files lagging a completion marker.
    pub fastq_grace: Option<u64>,
    pub save_report: Option<SaveReportConfig>,
    pub process: ProcessConfig,
    #[serde(rename = "box")]
    pub uploader: UploaderConfig,
    pub mailer: MailerConfig,
    /// Per-task config blocks, passed through untouched.
    pub tasks: BTreeMap<String, TaskSettings>,
    /// Subdirectory for outputs of tasks pulled in by dependency only.
    pub implicit_tasks_path: Option<String>,
    /// Directory of user task definitions (`*.toml`).
    pub custom_tasks_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory; required.
    pub root: Option<PathBuf>,
    pub runs: PathBuf,
    pub experiments: PathBuf,
    pub status: PathBuf,
    pub processed: PathBuf,
    pub packaged: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SaveReportConfig {
    pub path: PathBuf,
    pub max_width: usize,
}

impl Default for SaveReportConfig {
    fn default() -> Self {
        Self { path: PathBuf::new(), max_width: 60 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Seconds between refresh cycles.
    pub poll: u64,
    /// Block each cycle until the job queue drains.
    pub wait: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self { poll: 5, wait: false }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    pub credentials_path: Option<PathBuf>,
    pub folder_id: Option<String>,
    /// Silence the "no uploader configured" warning.
    pub skip: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    pub credentials_path: Option<PathBuf>,
    /// Recipients for task-failure alerts.
    pub to_addrs_on_error: Vec<String>,
    /// Silence the "no mailer configured" warning.
    pub skip: bool,
}

/// The five working directories, resolved to absolute paths.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub runs: PathBuf,
    pub experiments: PathBuf,
    pub status: PathBuf,
    pub processed: PathBuf,
    pub packaged: PathBuf,
}

impl Config {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Config = serde_yaml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        Ok(config)
    }

    /// Resolve the working directories against `paths.root`.
    pub fn resolve_paths(&self) -> Result<ResolvedPaths, ConfigError> {
        let root = self
            .paths
            .root
            .clone()
            .ok_or(ConfigError::MissingKey("paths.root"))?;
        let join = |sub: &PathBuf, default: &str| -> PathBuf {
            let sub = if sub.as_os_str().is_empty() { Path::new(default) } else { sub.as_path() };
            if sub.is_absolute() {
                sub.to_path_buf()
            } else {
                root.join(sub)
            }
        };
        Ok(ResolvedPaths {
            runs: join(&self.paths.runs, "runs"),
            experiments: join(&self.paths.experiments, "experiments"),
            status: join(&self.paths.status, "status"),
            processed: join(&self.paths.processed, "processed"),
            packaged: join(&self.paths.packaged, "packaged"),
            root,
        })
    }

    /// Worker count, defaulting to one.
    pub fn worker_count(&self) -> usize {
        self.nthreads.max(1)
    }

    /// Per-project subprocess hint, defaulting to one.
    pub fn project_threads(&self) -> usize {
        self.nthreads_per_project.max(1)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
