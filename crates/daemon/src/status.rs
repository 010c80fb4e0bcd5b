// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable per-project status document.
//!
//! One YAML file per project under
//! `<status-root>/<run id>/<analysis index>/<project slug>.yml`. This file
//! is the only surface where schema stability matters for restart
//! correctness: a restarted daemon classifies projects purely from what it
//! reads back here. Writes go through a sibling file and an atomic rename
//! so readers never see a torn document.

use indexmap::IndexMap;
use seqproc_tasks::TaskOutput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("io error on status file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse status file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot serialize status record: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Overall processing state of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    None,
    Processing,
    PackageReady,
    Complete,
    Failed,
}

seqproc_core::simple_display! {
    ProjectStatus {
        None => "none",
        Processing => "processing",
        PackageReady => "package-ready",
        Complete => "complete",
        Failed => "failed",
    }
}

/// Task progress: the three disjoint sets whose union is the resolved list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusBlock {
    pub pending: Vec<String>,
    #[serde(default)]
    pub current: String,
    pub completed: Vec<String>,
}

/// Experiment metadata scoped to one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentInfo {
    pub name: String,
    pub path: PathBuf,
    pub sample_names: Vec<String>,
    /// Tasks as requested in the spreadsheet, before resolution.
    pub tasks: Vec<String>,
    pub contacts: IndexMap<String, String>,
}

/// Stable reference to a directory this record was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfo {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: ProjectStatus,
    pub task_status: TaskStatusBlock,
    pub task_output: BTreeMap<String, TaskOutput>,
    pub experiment_info: ExperimentInfo,
    pub sample_paths: IndexMap<String, Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_exception: Option<String>,
    pub run_info: PathInfo,
    pub analysis_info: PathInfo,
}

/// Top-level keys the schema knows about; anything else gets a warning.
const KNOWN_FIELDS: [&str; 8] = [
    "status",
    "task_status",
    "task_output",
    "experiment_info",
    "sample_paths",
    "failure_exception",
    "run_info",
    "analysis_info",
];

/// Load a status record; `Ok(None)` when the file does not exist.
pub fn load(path: &Path) -> Result<Option<StatusRecord>, StatusError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(StatusError::Io { path: path.to_path_buf(), source }),
    };
    let value: serde_yaml::Value = serde_yaml::from_str(&text)
        .map_err(|source| StatusError::Parse { path: path.to_path_buf(), source })?;
    if let serde_yaml::Value::Mapping(mapping) = &value {
        for key in mapping.keys() {
            if let Some(key) = key.as_str() {
                if !KNOWN_FIELDS.contains(&key) {
                    warn!(path = %path.display(), key, "unknown field in status file");
                }
            }
        }
    }
    let record = serde_yaml::from_value(value)
        .map_err(|source| StatusError::Parse { path: path.to_path_buf(), source })?;
    Ok(Some(record))
}

/// Persist a status record atomically (write sibling, rename over).
pub fn save(path: &Path, record: &StatusRecord) -> Result<(), StatusError> {
    let io_err = |source| StatusError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let text = serde_yaml::to_string(record)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("status.yml");
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&tmp, text).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
