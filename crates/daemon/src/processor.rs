// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level daemon loop.
//!
//! One coordinator (the thread calling `refresh` / `watch_and_process`)
//! owns the run set and the three project buckets; it never executes task
//! code. Workers pop project handles from the job queue and run them to
//! completion; finished projects come back through the completion queue
//! and are filed by the coordinator. The queues are the only channels
//! between threads.

use crate::collab;
use crate::config::{Config, ConfigError, ResolvedPaths};
use crate::logging::LogHandle;
use crate::project::{self, ProjectEnv, ProjectHandle};
use crate::queue::JobTracker;
use crate::report::{self, ReportEntry};
use crate::signal::{self, SignalEvent, SignalFlags};
use crate::status::ProjectStatus;
use crossbeam_channel::{unbounded, Receiver, Sender};
use seqproc_core::{Clock, MailMessage, Mailer, SystemClock};
use seqproc_illumina::run::ctime_age;
use seqproc_illumina::{Analysis, IlluminaError, Run, RunOptions};
use seqproc_tasks::{plugin, RegistryError, TaskRegistry};
use std::collections::HashMap;
use std::fs::{self, File};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Control commands handled between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drop all state and rebuild from disk.
    Reload,
    /// Leave the watch loop after the current cycle.
    FinishUp,
}

/// The three project buckets.
#[derive(Default)]
struct ProjectSets {
    active: Vec<ProjectHandle>,
    inactive: Vec<ProjectHandle>,
    completed: Vec<ProjectHandle>,
}

impl ProjectSets {
    fn clear(&mut self) {
        self.active.clear();
        self.inactive.clear();
        self.completed.clear();
    }
}

pub struct Processor {
    config: Config,
    paths: ResolvedPaths,
    env: Arc<ProjectEnv>,
    clock: Arc<dyn Clock>,
    runs: Vec<Run>,
    projects: ProjectSets,
    jobs_tx: Sender<ProjectHandle>,
    jobs_rx: Receiver<ProjectHandle>,
    done_tx: Sender<ProjectHandle>,
    done_rx: Receiver<ProjectHandle>,
    cmd_tx: Sender<Command>,
    cmd_rx: Receiver<Command>,
    tracker: Arc<JobTracker>,
    running: bool,
    log: Option<LogHandle>,
}

impl Processor {
    /// Build a processor from configuration.
    ///
    /// Registry problems (bad plugin definition, unknown dependency,
    /// cycle) are fatal here, before any worker starts.
    pub fn new(config: Config) -> Result<Self, ProcessorError> {
        debug!("processor initializing");
        let paths = config.resolve_paths()?;
        let mut registry = TaskRegistry::builtin();
        if let Some(dir) = &config.custom_tasks_path {
            let added = plugin::load_plugins(&mut registry, dir)?;
            info!(count = added, dir = %dir.display(), "loaded user task definitions");
        }
        registry.verify()?;

        let uploader = collab::uploader_from_config(&config);
        let mailer = collab::mailer_from_config(&config);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let env = Arc::new(ProjectEnv {
            experiments_root: paths.experiments.clone(),
            status_root: paths.status.clone(),
            processed_root: paths.processed.clone(),
            packaged_root: paths.packaged.clone(),
            readonly: config.readonly,
            nthreads_per_project: config.project_threads(),
            implicit_tasks_path: config.implicit_tasks_path.clone(),
            tasks_settings: config.tasks.clone(),
            registry: Arc::new(registry),
            uploader,
            mailer,
            clock: Arc::clone(&clock),
        });

        let (jobs_tx, jobs_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        let (cmd_tx, cmd_rx) = unbounded();
        debug!("processor initialized");
        Ok(Self {
            config,
            paths,
            env,
            clock,
            runs: Vec::new(),
            projects: ProjectSets::default(),
            jobs_tx,
            jobs_rx,
            done_tx,
            done_rx,
            cmd_tx,
            cmd_rx,
            tracker: Arc::new(JobTracker::new()),
            running: false,
            log: None,
        })
    }

    /// Attach the log handle so SIGUSR1/SIGUSR2 can shift verbosity.
    pub fn set_log_handle(&mut self, log: LogHandle) {
        self.log = Some(log);
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn active(&self) -> &[ProjectHandle] {
        &self.projects.active
    }

    pub fn inactive(&self) -> &[ProjectHandle] {
        &self.projects.inactive
    }

    pub fn completed(&self) -> &[ProjectHandle] {
        &self.projects.completed
    }

    /// Start the worker pool. A read-only daemon runs no workers.
    pub fn start(&mut self) {
        if self.running || self.config.readonly {
            return;
        }
        self.running = true;
        for i in 0..self.config.worker_count() {
            let rx = self.jobs_rx.clone();
            let done = self.done_tx.clone();
            let tracker = Arc::clone(&self.tracker);
            let mailer = Arc::clone(&self.env.mailer);
            let alert_to = self.config.mailer.to_addrs_on_error.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("worker-{i}"))
                .spawn(move || worker_loop(rx, done, tracker, mailer, alert_to));
            if let Err(err) = spawned {
                error!("cannot spawn worker thread: {err}");
            }
        }
    }

    /// Request a clean exit from `watch_and_process`.
    pub fn finish_up(&self) {
        let _ = self.cmd_tx.send(Command::FinishUp);
    }

    /// Wait for everything queued so far, then file the finished projects.
    pub fn wait_for_jobs(&mut self) {
        debug!("wait_for_jobs started");
        if self.running && !self.config.readonly {
            self.tracker.wait_idle();
        }
        self.drain_completed();
        debug!("wait_for_jobs completed");
    }

    /// Drop all state and rebuild from disk.
    pub fn load(&mut self, wait: bool) {
        if self.running {
            self.wait_for_jobs();
        }
        self.runs.clear();
        self.projects.clear();
        self.refresh(wait);
    }

    /// One discovery pass: refresh known runs, find new ones, file
    /// finished projects, and optionally wait for the queue to drain.
    pub fn refresh(&mut self, wait: bool) {
        debug!("refresh started");
        let mut newly: Vec<(usize, usize)> = Vec::new();
        let mut dropped: Vec<usize> = Vec::new();
        for (i, run) in self.runs.iter_mut().enumerate() {
            debug!(run_id = run.run_id(), "refreshing run");
            match run.refresh(self.clock.as_ref()) {
                Ok(indices) => newly.extend(indices.into_iter().map(|a| (i, a))),
                Err(err) => {
                    error!(run_id = run.run_id(), "error refreshing run, dropping it: {err}");
                    dropped.push(i);
                }
            }
        }
        for (run_idx, analysis_idx) in newly {
            self.handle_new_analysis(run_idx, analysis_idx);
        }
        for i in dropped.into_iter().rev() {
            self.runs.remove(i);
        }
        self.discover_new_runs();
        self.drain_completed();
        if wait {
            self.wait_for_jobs();
        }
        debug!("refresh completed");
    }

    /// Refresh continually until told to finish up.
    ///
    /// Each cycle refreshes (unless the previous cycle already reloaded),
    /// rewrites the report if one is configured, sleeps, then handles
    /// signals and queued commands.
    pub fn watch_and_process(&mut self, poll: Duration, wait: bool) {
        self.start();
        let signals = match signal::install() {
            Ok(flags) => Some(flags),
            Err(err) => {
                warn!("cannot install signal handlers: {err}");
                None
            }
        };
        debug!("starting processing loop");
        let mut reloaded = false;
        loop {
            debug!("starting process cycle");
            if !reloaded {
                self.refresh(wait);
            }
            reloaded = false;
            if let Some(report) = self.config.save_report.clone() {
                if let Err(err) = self.save_report(&report.path, report.max_width) {
                    error!(path = %report.path.display(), "cannot write report: {err}");
                }
            }
            std::thread::sleep(poll);
            if let Some(flags) = &signals {
                self.drain_signals(flags);
            }
            let mut finish = false;
            while let Ok(cmd) = self.cmd_rx.try_recv() {
                match cmd {
                    Command::Reload => {
                        debug!("cmd found: reloading");
                        self.load(wait);
                        reloaded = true;
                    }
                    Command::FinishUp => {
                        debug!("cmd found: finishing up");
                        finish = true;
                    }
                }
            }
            if finish {
                break;
            }
        }
        debug!("exited processing loop");
    }

    fn drain_signals(&mut self, flags: &SignalFlags) {
        for event in flags.drain() {
            match event {
                SignalEvent::FinishUp => {
                    warn!("signal caught, finishing up");
                    let _ = self.cmd_tx.send(Command::FinishUp);
                }
                SignalEvent::Reload => {
                    warn!("signal caught, re-loading all data after current tasks finish");
                    let _ = self.cmd_tx.send(Command::Reload);
                }
                SignalEvent::MoreVerbose => {
                    if let Some(log) = &self.log {
                        log.shift(1);
                    }
                }
                SignalEvent::LessVerbose => {
                    if let Some(log) = &self.log {
                        log.shift(-1);
                    }
                }
            }
        }
    }

    /// Route one newly complete analysis: build its projects and classify
    /// each as active (enqueued) or inactive.
    fn handle_new_analysis(&mut self, run_idx: usize, analysis_idx: usize) {
        let run = &self.runs[run_idx];
        debug!(analysis = %run.analyses()[analysis_idx].path().display(), "processing new analysis");
        let projects = project::projects_from_analysis(run, analysis_idx, &self.env);
        for handle in projects {
            let (readonly, status, work_dir) = {
                let p = handle.lock();
                (p.readonly(), p.status(), p.work_dir().to_string())
            };
            if readonly || status == ProjectStatus::Failed {
                let suffix = if status == ProjectStatus::Complete {
                    String::new()
                } else {
                    format!(" (incomplete: {status})")
                };
                info!("found new project [inactive]: {work_dir}{suffix}");
                self.projects.inactive.push(handle);
            } else {
                info!("found new project [active]: {work_dir}");
                self.tracker.add();
                let _ = self.jobs_tx.send(Arc::clone(&handle));
                self.projects.active.push(handle);
            }
        }
    }

    fn discover_new_runs(&mut self) {
        let entries = match fs::read_dir(&self.paths.runs) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %self.paths.runs.display(), "cannot list runs directory: {err}");
                return;
            }
        };
        let mut dirs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            if self.runs.iter().any(|r| r.path() == dir) {
                continue;
            }
            if !self.age_window_admits(&dir) {
                continue;
            }
            debug!(dir = %dir.display(), "loading new run");
            let options = RunOptions::default()
                .strict(true)
                .min_dir_age(self.config.min_age.map(Duration::from_secs))
                .fastq_grace(self.fastq_grace());
            match Run::open(&dir, options) {
                Ok(mut run) => match run.refresh(self.clock.as_ref()) {
                    Ok(indices) => {
                        self.runs.push(run);
                        let run_idx = self.runs.len() - 1;
                        for analysis_idx in indices {
                            self.handle_new_analysis(run_idx, analysis_idx);
                        }
                    }
                    Err(err) => {
                        error!(dir = %dir.display(), "error refreshing new run, dropping it: {err}");
                    }
                },
                Err(IlluminaError::NotARun(_)) => {
                    debug!(dir = %dir.display(), "skipped unrecognized run");
                }
                Err(err) => {
                    error!(dir = %dir.display(), "error while loading run: {err}");
                }
            }
        }
    }

    fn age_window_admits(&self, dir: &Path) -> bool {
        let age = match ctime_age(dir) {
            Ok(age) => age,
            Err(err) => {
                warn!(dir = %dir.display(), "cannot stat run directory: {err}");
                return false;
            }
        };
        if let Some(min_age) = self.config.min_age {
            if age < Duration::from_secs(min_age) {
                debug!(dir = %dir.display(), "skipping run; timestamp too new");
                return false;
            }
        }
        if let Some(max_age) = self.config.max_age {
            if age > Duration::from_secs(max_age) {
                debug!(dir = %dir.display(), "skipping run; timestamp too old");
                return false;
            }
        }
        true
    }

    fn fastq_grace(&self) -> Duration {
        self.config
            .fastq_grace
            .map(Duration::from_secs)
            .unwrap_or(seqproc_illumina::analysis::DEFAULT_FASTQ_GRACE)
    }

    /// File finished projects from the completion queue.
    ///
    /// Bucket moves happen only here, on the coordinator, so workers never
    /// touch the project sets.
    fn drain_completed(&mut self) {
        while let Ok(handle) = self.done_rx.try_recv() {
            debug!(work_dir = %handle.lock().work_dir(), "filing project in completed set");
            self.projects.active.retain(|p| !Arc::ptr_eq(p, &handle));
            self.projects.completed.push(handle);
        }
    }

    /// Build the report rows for everything currently known.
    pub fn create_report(&self) -> Vec<ReportEntry> {
        let mut by_analysis: HashMap<(String, usize), Vec<(ProjectHandle, &'static str)>> =
            HashMap::new();
        let buckets: [(&'static str, &Vec<ProjectHandle>); 3] = [
            ("active", &self.projects.active),
            ("inactive", &self.projects.inactive),
            ("completed", &self.projects.completed),
        ];
        for (group, bucket) in buckets {
            for handle in bucket {
                let p = handle.lock();
                by_analysis
                    .entry((p.run_id().to_string(), p.analysis_index()))
                    .or_default()
                    .push((Arc::clone(handle), group));
            }
        }

        let mut entries = Vec::new();
        for run in &self.runs {
            let base = ReportEntry {
                run_id: run.run_id().to_string(),
                run_path: run.path().display().to_string(),
                ..ReportEntry::default()
            };
            if run.analyses().is_empty() {
                entries.push(base);
                continue;
            }
            for (idx, analysis) in run.analyses().iter().enumerate() {
                let base = ReportEntry {
                    alignment: Some(idx),
                    experiment: analysis.experiment().unwrap_or_default().to_string(),
                    align_complete: Some(analysis.complete()),
                    ..base.clone()
                };
                match by_analysis.get(&(base.run_id.clone(), idx)) {
                    Some(projects) => {
                        for (handle, group) in projects {
                            let p = handle.lock();
                            entries.push(ReportEntry {
                                project: p.name().to_string(),
                                work_dir: p.work_dir().to_string(),
                                status: p.status().to_string(),
                                n_samples: Some(p.n_samples()),
                                n_files: Some(p.n_files()),
                                group: group.to_string(),
                                ..base.clone()
                            });
                        }
                    }
                    None => entries.push(base),
                }
            }
        }
        report::sort_entries(&mut entries);
        entries
    }

    /// Render the report as CSV.
    pub fn report<W: std::io::Write>(&self, writer: W, max_width: usize) -> std::io::Result<()> {
        report::write_report(writer, &self.create_report(), max_width)
    }

    /// Render the report to a file, rewriting it in place.
    pub fn save_report(&self, path: &Path, max_width: usize) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.report(File::create(path)?, max_width)
    }
}

/// Worker loop: run one project at a time to completion.
///
/// Failures are logged (and alert-mailed when configured) but never
/// propagate; the worker stays alive for the next job. The completion
/// send happens before the tracker decrement so a waiting coordinator
/// sees the finished project when `wait_for_jobs` drains.
fn worker_loop(
    rx: Receiver<ProjectHandle>,
    done: Sender<ProjectHandle>,
    tracker: Arc<JobTracker>,
    mailer: Arc<dyn Mailer>,
    alert_to: Vec<String>,
) {
    for handle in rx.iter() {
        let result = catch_unwind(AssertUnwindSafe(|| handle.lock().process()));
        let (name, work_dir) = {
            let p = handle.lock();
            (p.name().to_string(), p.work_dir().to_string())
        };
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!("Failed project: {name}");
                error!("{err}");
                alert_failure(mailer.as_ref(), &alert_to, &name, &work_dir, &err.to_string());
            }
            Err(_) => {
                error!("Failed project: {name}");
                error!(work_dir = %work_dir, "task body panicked");
                alert_failure(mailer.as_ref(), &alert_to, &name, &work_dir, "task body panicked");
            }
        }
        debug!(work_dir = %work_dir, "declaring project done");
        let _ = done.send(Arc::clone(&handle));
        tracker.done();
    }
}

fn alert_failure(mailer: &dyn Mailer, to: &[String], name: &str, work_dir: &str, detail: &str) {
    if to.is_empty() {
        return;
    }
    let body = format!(
        "Project processing failed for \"{work_dir}\" with the following message:\n\n\n{detail}\n"
    );
    let message = MailMessage::new(to.to_vec(), format!("Failed project: {name}"), body);
    if let Err(err) = mailer.send(&message) {
        error!("cannot send failure alert: {err}");
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
