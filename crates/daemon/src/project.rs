// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The project work unit.
//!
//! A `Project` is the slice of one analysis owned by one project name from
//! the experiment spreadsheet. It owns its durable status record and the
//! run method that drives the resolved task list; everything else reaches
//! it through the scheduler's buckets.

use crate::status::{self, ExperimentInfo, PathInfo, ProjectStatus, StatusError, StatusRecord};
use indexmap::IndexMap;
use parking_lot::Mutex;
use seqproc_core::{datestamp, first_names, load_metadata, slugify, Clock, ExperimentRow, Mailer, Uploader};
use seqproc_illumina::{Analysis, IlluminaError, Run};
use seqproc_tasks::{resolve, TaskContext, TaskError, TaskRegistry, TaskSettings};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project {0} is read-only")]
    ReadOnly(String),

    #[error("project {0} has already failed")]
    AlreadyFailed(String),

    #[error("a task is already running ({task}) for {project}")]
    ConcurrentTask { project: String, task: String },

    #[error("dependency {dep:?} of task {task:?} has not completed")]
    MissingDependency { task: String, dep: String },

    #[error("task {task:?} is not registered")]
    UnregisteredTask { task: String },

    #[error("task {task:?} failed: {source}")]
    Task {
        task: String,
        #[source]
        source: TaskError,
    },

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a project needs from its surroundings.
pub struct ProjectEnv {
    pub experiments_root: PathBuf,
    pub status_root: PathBuf,
    pub processed_root: PathBuf,
    pub packaged_root: PathBuf,
    pub readonly: bool,
    pub nthreads_per_project: usize,
    pub implicit_tasks_path: Option<String>,
    pub tasks_settings: BTreeMap<String, TaskSettings>,
    pub registry: Arc<TaskRegistry>,
    pub uploader: Arc<dyn Uploader>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

/// Shared handle to a project; workers lock it for the duration of
/// `process`, the coordinator locks it briefly for classification and
/// reporting.
pub type ProjectHandle = Arc<Mutex<Project>>;

pub struct Project {
    name: String,
    work_dir: String,
    run_id: String,
    analysis_index: usize,
    run_path: PathBuf,
    sample_sheet_path: PathBuf,
    status_path: PathBuf,
    proc_dir: PathBuf,
    package_path: PathBuf,
    readonly: bool,
    record: StatusRecord,
    env: Arc<ProjectEnv>,
}

/// Build the projects for one newly complete analysis.
///
/// Returns an empty set when the experiment has no metadata spreadsheet.
/// Individual projects that cannot be processed come back FAILED rather
/// than poisoning their siblings.
pub fn projects_from_analysis(
    run: &Run,
    analysis_index: usize,
    env: &Arc<ProjectEnv>,
) -> Vec<ProjectHandle> {
    let Some(analysis) = run.analyses().get(analysis_index) else {
        return Vec::new();
    };
    let Some(experiment) = analysis.experiment().map(str::to_string) else {
        warn!(analysis = %analysis.path().display(), "analysis has no experiment name");
        return Vec::new();
    };
    let csv_path = env.experiments_root.join(&experiment).join("metadata.csv");
    if !csv_path.is_file() {
        return Vec::new();
    }
    let rows = match load_metadata(&csv_path) {
        Ok(rows) => rows,
        Err(err) => {
            error!(path = %csv_path.display(), "cannot load experiment metadata: {err}");
            return Vec::new();
        }
    };

    let sheet_names = analysis.sample_sheet().sample_names();
    // Non-strict resolution cannot fail; the strict pass records whether
    // any expected fastq file is actually missing.
    let sample_paths = analysis.sample_paths_by_name(false).unwrap_or_default();
    let missing_fastq = analysis.sample_paths_by_name(true).err();

    let mut groups: IndexMap<String, Vec<&ExperimentRow>> = IndexMap::new();
    for row in &rows {
        groups.entry(row.project.clone()).or_default().push(row);
    }

    let mut projects = Vec::new();
    for (name, group) in groups {
        if name.is_empty() {
            warn!(path = %csv_path.display(), "skipping rows with an empty Project field");
            continue;
        }
        let project = build_project(
            run,
            analysis_index,
            env,
            &experiment,
            &csv_path,
            &name,
            &group,
            &sheet_names,
            &sample_paths,
            missing_fastq.as_ref(),
        );
        projects.push(Arc::new(Mutex::new(project)));
    }
    projects
}

#[allow(clippy::too_many_arguments)]
fn build_project(
    run: &Run,
    analysis_index: usize,
    env: &Arc<ProjectEnv>,
    experiment: &str,
    csv_path: &std::path::Path,
    name: &str,
    rows: &[&ExperimentRow],
    sheet_names: &[String],
    all_sample_paths: &IndexMap<String, Vec<PathBuf>>,
    missing_fastq: Option<&IlluminaError>,
) -> Project {
    let analysis = &run.analyses()[analysis_index];

    // Aggregate the group's rows: ordered-unique samples and tasks,
    // unioned contacts.
    let mut sample_names: Vec<String> = Vec::new();
    let mut tasks: Vec<String> = Vec::new();
    let mut contacts: IndexMap<String, String> = IndexMap::new();
    for row in rows {
        let sample = row.sample_name.trim().to_string();
        if !sample.is_empty() && !sample_names.contains(&sample) {
            sample_names.push(sample);
        }
        for task in &row.tasks {
            if !tasks.contains(task) {
                tasks.push(task.clone());
            }
        }
        for (who, addr) in &row.contacts {
            contacts.insert(who.clone(), addr.clone());
        }
    }

    let date = run
        .rta_complete()
        .map(|rta| datestamp(rta.date.date()))
        .unwrap_or_default();
    let work_dir = [date, slugify(name), slugify(&first_names(&contacts)), slugify(run.flowcell())]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let status_path = env
        .status_root
        .join(run.run_id())
        .join(analysis_index.to_string())
        .join(format!("{}.yml", slugify(name)));
    let proc_dir = env.processed_root.join(&work_dir);
    let package_path = env.packaged_root.join(format!("{work_dir}.zip"));

    let mut record = StatusRecord {
        experiment_info: ExperimentInfo {
            name: experiment.to_string(),
            path: csv_path.to_path_buf(),
            sample_names: sample_names.clone(),
            tasks: tasks.clone(),
            contacts,
        },
        run_info: PathInfo { path: run.path().to_path_buf() },
        analysis_info: PathInfo { path: analysis.path().to_path_buf() },
        ..StatusRecord::default()
    };

    // Samples listed in the spreadsheet but absent from the sample sheet
    // are warned about; a project with none of its samples present fails.
    let present: Vec<&String> =
        sample_names.iter().filter(|s| sheet_names.contains(*s)).collect();
    for absent in sample_names.iter().filter(|s| !sheet_names.contains(*s)) {
        warn!(project = name, sample = %absent, "sample not in sample sheet");
    }
    for sample in &present {
        if let Some(paths) = all_sample_paths.get(sample.as_str()) {
            record.sample_paths.insert((*sample).clone(), paths.clone());
        }
    }

    let fail = |record: &mut StatusRecord, reason: String| {
        error!(project = name, work_dir = %work_dir, "{reason}");
        record.failure_exception = Some(reason);
        record.status = ProjectStatus::Failed;
    };

    if present.is_empty() {
        fail(&mut record, "none of the project's samples are in the sample sheet".to_string());
    } else if let Some(err) = missing_fastq {
        fail(&mut record, format!("fastq file not found: {err}"));
    } else {
        match resolve(&env.registry, &tasks) {
            Ok(resolved) => record.task_status.pending = resolved,
            Err(err) => fail(&mut record, format!("cannot resolve task list: {err}")),
        }
    }

    // Read-only when the unit has been seen before (status file), when the
    // scratch dir already has content, or when the whole daemon is.
    let existing = match status::load(&status_path) {
        Ok(existing) => existing,
        Err(err) => {
            warn!(path = %status_path.display(), "unreadable status file, treating as read-only: {err}");
            None
        }
    };
    let seen_before = existing.is_some() || status_path.is_file();
    let has_scratch = proc_dir
        .read_dir()
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    let readonly = seen_before || env.readonly || has_scratch;
    if let Some(existing) = existing {
        record = existing;
    }

    let mut project = Project {
        name: name.to_string(),
        work_dir,
        run_id: run.run_id().to_string(),
        analysis_index,
        run_path: run.path().to_path_buf(),
        sample_sheet_path: analysis.sample_sheet_path().to_path_buf(),
        status_path,
        proc_dir,
        package_path,
        readonly,
        record,
        env: Arc::clone(env),
    };
    if !project.readonly {
        if let Err(err) = project.save() {
            error!(project = name, "cannot write initial status file: {err}");
            project.record.failure_exception = Some(err.to_string());
            project.record.status = ProjectStatus::Failed;
        }
    }
    info!(work_dir = %project.work_dir, "project initialized");
    project
}

impl Project {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn work_dir(&self) -> &str {
        &self.work_dir
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn analysis_index(&self) -> usize {
        self.analysis_index
    }

    pub fn status(&self) -> ProjectStatus {
        self.record.status
    }

    pub fn readonly(&self) -> bool {
        self.readonly
    }

    pub fn status_path(&self) -> &std::path::Path {
        &self.status_path
    }

    pub fn proc_dir(&self) -> &std::path::Path {
        &self.proc_dir
    }

    pub fn record(&self) -> &StatusRecord {
        &self.record
    }

    pub fn n_samples(&self) -> usize {
        self.record.experiment_info.sample_names.len()
    }

    pub fn n_files(&self) -> usize {
        self.record.sample_paths.values().map(Vec::len).sum()
    }

    /// Run the resolved task list to completion.
    ///
    /// Blocks until every pending task has run. Any failure marks the
    /// project FAILED with the error recorded, persists, and propagates.
    pub fn process(&mut self) -> Result<(), ProjectError> {
        info!(work_dir = %self.work_dir, "project processing");
        if self.readonly {
            return Err(ProjectError::ReadOnly(self.work_dir.clone()));
        }
        if self.record.status == ProjectStatus::Failed {
            return Err(ProjectError::AlreadyFailed(self.work_dir.clone()));
        }
        self.set_status(ProjectStatus::Processing)?;
        match self.run_tasks() {
            Ok(()) => {
                self.set_status(ProjectStatus::Complete)?;
                Ok(())
            }
            Err(err) => {
                self.record.failure_exception = Some(err.to_string());
                if let Err(save_err) = self.set_status(ProjectStatus::Failed) {
                    error!(work_dir = %self.work_dir, "cannot persist failure: {save_err}");
                }
                Err(err)
            }
        }
    }

    fn run_tasks(&mut self) -> Result<(), ProjectError> {
        fs::create_dir_all(&self.proc_dir)?;
        while !self.record.task_status.pending.is_empty() {
            if !self.record.task_status.current.is_empty() {
                return Err(ProjectError::ConcurrentTask {
                    project: self.work_dir.clone(),
                    task: self.record.task_status.current.clone(),
                });
            }
            let task = self.record.task_status.pending.remove(0);
            self.record.task_status.current = task.clone();

            let entry = self
                .env
                .registry
                .get(&task)
                .ok_or_else(|| ProjectError::UnregisteredTask { task: task.clone() })?;
            for dep in &entry.deps {
                if !self.record.task_status.completed.contains(dep) {
                    return Err(ProjectError::MissingDependency {
                        task: task.clone(),
                        dep: dep.clone(),
                    });
                }
            }
            let runner = entry.runner();
            self.save()?;

            let output = {
                let ctx = self.context(&task);
                // Every task gets its own (possibly empty) log file.
                ctx.log_file(&task).and_then(|_| runner.run(&ctx))
            }
            .map_err(|source| ProjectError::Task { task: task.clone(), source })?;

            self.record.task_output.insert(task.clone(), output);
            self.record.task_status.completed.push(task);
            self.record.task_status.current.clear();
            self.save()?;
        }
        Ok(())
    }

    fn context<'a>(&'a self, task: &str) -> TaskContext<'a> {
        TaskContext {
            project: &self.name,
            work_dir: &self.work_dir,
            run_id: &self.run_id,
            run_path: &self.run_path,
            proc_dir: &self.proc_dir,
            package_path: &self.package_path,
            status_path: &self.status_path,
            sample_sheet_path: &self.sample_sheet_path,
            experiment_csv_path: &self.record.experiment_info.path,
            contacts: &self.record.experiment_info.contacts,
            sample_paths: &self.record.sample_paths,
            requested_tasks: &self.record.experiment_info.tasks,
            outputs: &self.record.task_output,
            settings: self.env.tasks_settings.get(task),
            implicit_tasks_path: self.env.implicit_tasks_path.as_deref(),
            nthreads: self.env.nthreads_per_project,
            uploader: self.env.uploader.as_ref(),
            mailer: self.env.mailer.as_ref(),
            clock: self.env.clock.as_ref(),
        }
    }

    fn set_status(&mut self, status: ProjectStatus) -> Result<(), ProjectError> {
        self.record.status = status;
        self.save()
    }

    fn save(&self) -> Result<(), ProjectError> {
        if self.readonly {
            return Err(ProjectError::ReadOnly(self.work_dir.clone()));
        }
        status::save(&self.status_path, &self.record)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
