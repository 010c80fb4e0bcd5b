// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution context handed to each task body.
//!
//! The context is the whole surface a task sees: project paths and
//! metadata, prior task outputs, its own config block, a dedicated log
//! file, and the collaborator handles. Tasks never touch the project's
//! status record directly.

use crate::error::TaskError;
use crate::fsutil::mkparent;
use crate::task::TaskOutput;
use indexmap::IndexMap;
use regex::Regex;
use seqproc_core::{Clock, Mailer, Uploader};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Per-task configuration passed through verbatim from the daemon config
/// (`tasks.<name>.*`).
pub type TaskSettings = BTreeMap<String, serde_yaml::Value>;

fn read_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::unwrap_used)] // literal pattern
    RE.get_or_init(|| Regex::new(r"^(.*_L[0-9]+_)R([12])(_001)\.fastq\.gz$").unwrap())
}

pub struct TaskContext<'a> {
    /// Project name as given in the metadata spreadsheet.
    pub project: &'a str,
    /// Human-readable work-directory name.
    pub work_dir: &'a str,
    pub run_id: &'a str,
    pub run_path: &'a Path,
    /// Per-project scratch directory.
    pub proc_dir: &'a Path,
    /// Destination of the final archive.
    pub package_path: &'a Path,
    /// The project's durable status file.
    pub status_path: &'a Path,
    pub sample_sheet_path: &'a Path,
    /// The experiment metadata spreadsheet this project came from.
    pub experiment_csv_path: &'a Path,
    pub contacts: &'a IndexMap<String, String>,
    /// Sample name → read-file paths, in sample-sheet order.
    pub sample_paths: &'a IndexMap<String, Vec<PathBuf>>,
    /// Tasks the user asked for (implicitly-added tasks are not in here).
    pub requested_tasks: &'a [String],
    /// Outputs of tasks that already ran.
    pub outputs: &'a BTreeMap<String, TaskOutput>,
    /// This task's config block, if any.
    pub settings: Option<&'a TaskSettings>,
    /// Subdirectory for outputs of tasks pulled in by dependency only.
    pub implicit_tasks_path: Option<&'a str>,
    /// Parallelism hint for subprocesses.
    pub nthreads: usize,
    pub uploader: &'a dyn Uploader,
    pub mailer: &'a dyn Mailer,
    pub clock: &'a dyn Clock,
}

impl TaskContext<'_> {
    /// Path of the task's log file under `logs/`.
    pub fn log_path(&self, task: &str) -> PathBuf {
        self.proc_dir.join("logs").join(format!("log_{task}.txt"))
    }

    /// Create (truncating) the task's log file.
    pub fn log_file(&self, task: &str) -> Result<File, TaskError> {
        let path = self.log_path(task);
        mkparent(&path)?;
        Ok(File::create(path)?)
    }

    /// Parent directory for a task's outputs.
    ///
    /// Outputs of tasks the user did not explicitly request land under the
    /// configured implicit subdirectory, keeping intermediate files out of
    /// the way of the deliverables.
    pub fn task_dir_parent(&self, task: &str) -> PathBuf {
        let implicit = match self.implicit_tasks_path {
            Some(sub) if !self.requested_tasks.iter().any(|t| t == task) => sub,
            _ => return self.proc_dir.to_path_buf(),
        };
        self.proc_dir.join(implicit)
    }

    /// Derive an output path from a read file's name.
    ///
    /// `..._L001_R1_001.fastq.gz` becomes `<parent>/<subdir>/..._L001_R_001<suffix>`
    /// (or keeps the read number with `r1only = false`). Names that do not
    /// look like read files pass through unchanged.
    pub fn read_path(
        &self,
        readfile: &Path,
        task: &str,
        subdir: &str,
        suffix: &str,
        r1only: bool,
    ) -> Result<PathBuf, TaskError> {
        let filename = readfile
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let name = match read_file_re().captures(filename) {
            Some(caps) if r1only => format!("{}R{}{suffix}", &caps[1], &caps[3]),
            Some(caps) => format!("{}R{}{}{suffix}", &caps[1], &caps[2], &caps[3]),
            None => filename.to_string(),
        };
        let out = self.task_dir_parent(task).join(subdir).join(name);
        mkparent(&out)?;
        Ok(out)
    }

    /// Integer setting from this task's config block.
    pub fn setting_u64(&self, key: &str, default: u64) -> u64 {
        self.settings
            .and_then(|s| s.get(key))
            .and_then(serde_yaml::Value::as_u64)
            .unwrap_or(default)
    }

    /// String setting from this task's config block.
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings
            .and_then(|s| s.get(key))
            .and_then(serde_yaml::Value::as_str)
    }

    /// Boolean setting from this task's config block.
    pub fn setting_bool(&self, key: &str, default: bool) -> bool {
        self.settings
            .and_then(|s| s.get(key))
            .and_then(serde_yaml::Value::as_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
