// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One sequencer output directory.
//!
//! A `Run` owns its analyses and re-reads completion state from disk on
//! `refresh`. Run completion is monotonic: once `RTAComplete.txt` has been
//! parsed, later refreshes never re-read it.

use crate::analysis::{self, Analysis, DEFAULT_FASTQ_GRACE};
use crate::error::IlluminaError;
use crate::runinfo::{InstrumentType, RtaComplete, RunInfo};
use seqproc_core::Clock;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Options for opening a run directory.
#[derive(Debug, Clone)]
pub struct RunOptions {
    strict: bool,
    min_dir_age: Option<Duration>,
    fastq_grace: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { strict: false, min_dir_age: None, fastq_grace: DEFAULT_FASTQ_GRACE }
    }
}

impl RunOptions {
    seqproc_core::setters! {
        set {
            strict: bool,
            min_dir_age: Option<Duration>,
            fastq_grace: Duration,
        }
    }
}

#[derive(Debug)]
pub struct Run {
    path: PathBuf,
    /// Directory name; the run's identity even when the info file disagrees.
    run_id: String,
    info: RunInfo,
    rta: Option<RtaComplete>,
    analyses: Vec<Box<dyn Analysis>>,
    options: RunOptions,
}

impl Run {
    /// Open a run directory.
    ///
    /// Fails with [`IlluminaError::NotARun`] when `RunInfo.xml` is absent.
    /// A declared run id that disagrees with the directory name is warned
    /// about under `strict` and accepted either way; the directory name
    /// wins as the identity.
    pub fn open(path: &Path, options: RunOptions) -> Result<Self, IlluminaError> {
        let info = RunInfo::load(&path.join("RunInfo.xml"))?;
        let run_id = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if info.run_id != run_id && options.strict {
            warn!(
                declared = %info.run_id,
                directory = %run_id,
                "run directory name does not match declared run id"
            );
        }
        Ok(Self { path: path.to_path_buf(), run_id, info, rta: None, analyses: Vec::new(), options })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn flowcell(&self) -> &str {
        &self.info.flowcell
    }

    pub fn instrument_type(&self) -> InstrumentType {
        self.info.instrument_type
    }

    pub fn complete(&self) -> bool {
        self.rta.is_some()
    }

    /// Completion timestamp, once the run is complete.
    pub fn rta_complete(&self) -> Option<&RtaComplete> {
        self.rta.as_ref()
    }

    pub fn analyses(&self) -> &[Box<dyn Analysis>] {
        &self.analyses
    }

    /// Re-read completion state and discover analyses.
    ///
    /// Returns the indices of analyses that completed during this call, in
    /// discovery order, so the caller can route each newly-finished
    /// analysis exactly once.
    pub fn refresh(&mut self, clock: &dyn Clock) -> Result<Vec<usize>, IlluminaError> {
        if self.rta.is_none() {
            self.rta = RtaComplete::load(&self.path.join("RTAComplete.txt"))?;
        }
        let run_complete = self.complete();

        let mut newly = Vec::new();
        for (idx, analysis) in self.analyses.iter_mut().enumerate() {
            if analysis.refresh(run_complete, clock)? {
                newly.push(idx);
            }
        }

        for dir in self.analysis_dirs()? {
            if self.analyses.iter().any(|a| a.path() == dir) {
                continue;
            }
            if self.too_new(&dir)? {
                debug!(dir = %dir.display(), "skipping analysis directory; timestamp too new");
                continue;
            }
            match analysis::open(&dir, self.info.instrument_type, self.options.fastq_grace) {
                Ok(mut analysis) => {
                    let observed = analysis.refresh(run_complete, clock)?;
                    self.analyses.push(analysis);
                    if observed {
                        newly.push(self.analyses.len() - 1);
                    }
                }
                Err(
                    err @ (IlluminaError::UnrecognizedAnalysis(_)
                    | IlluminaError::UnsupportedAnalysis { .. }),
                ) => {
                    warn!(dir = %dir.display(), "{err}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(newly)
    }

    /// Candidate analysis directories for this run's instrument layout.
    fn analysis_dirs(&self) -> Result<Vec<PathBuf>, IlluminaError> {
        let mut dirs = match self.info.instrument_type {
            InstrumentType::MiSeq | InstrumentType::MiniSeq => {
                let mut found = prefixed_dirs(&self.path, "Alignment")?;
                found.extend(prefixed_dirs(
                    &self.path.join("Data/Intensities/BaseCalls"),
                    "Alignment",
                )?);
                found
            }
            InstrumentType::NextSeq2000 => subdirs(&self.path.join("Analysis"))?,
            InstrumentType::MiSeqI100Plus => subdirs(&self.path.join("Analyses"))?,
        };
        dirs.sort();
        Ok(dirs)
    }

    fn too_new(&self, dir: &Path) -> Result<bool, IlluminaError> {
        let Some(min_age) = self.options.min_dir_age else {
            return Ok(false);
        };
        Ok(ctime_age(dir)? < min_age)
    }
}

/// Age of a path based on its inode change time.
pub fn ctime_age(path: &Path) -> Result<Duration, IlluminaError> {
    let meta = fs::metadata(path).map_err(|e| IlluminaError::io(path, e))?;
    let changed = UNIX_EPOCH + Duration::from_secs(meta.ctime().max(0) as u64);
    Ok(SystemTime::now().duration_since(changed).unwrap_or_default())
}

fn prefixed_dirs(parent: &Path, prefix: &str) -> Result<Vec<PathBuf>, IlluminaError> {
    let entries = match fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(IlluminaError::io(parent, e)),
    };
    Ok(entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix))
        })
        .collect())
}

fn subdirs(parent: &Path) -> Result<Vec<PathBuf>, IlluminaError> {
    let entries = match fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(IlluminaError::io(parent, e)),
    };
    Ok(entries.filter_map(Result::ok).map(|e| e.path()).filter(|p| p.is_dir()).collect())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
