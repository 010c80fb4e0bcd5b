// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One demultiplexing output ("analysis") within a run.
//!
//! The three instrument generations lay their analysis directories out
//! differently and signal completion with different markers, but expose
//! the same contract: a sample sheet, a fastq directory, and a monotonic
//! completion flag. `refresh` re-reads the marker and reports whether this
//! call observed the transition to complete, so the caller can route
//! newly-finished analyses exactly once.

mod classic;
mod miseq_i100;
mod nextseq2000;

pub use classic::ClassicAnalysis;
pub use miseq_i100::MiSeqI100Analysis;
pub use nextseq2000::NextSeq2000Analysis;

use crate::error::IlluminaError;
use crate::fastq;
use crate::runinfo::InstrumentType;
use crate::samplesheet::SampleSheet;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use seqproc_core::Clock;

/// Default grace window for fastq files that lag the completion marker.
pub const DEFAULT_FASTQ_GRACE: Duration = Duration::from_secs(30 * 60);

/// An analysis directory, polymorphic over the instrument layout.
pub trait Analysis: Send + std::fmt::Debug {
    /// Absolute path of the analysis directory.
    fn path(&self) -> &Path;

    fn sample_sheet(&self) -> &SampleSheet;

    fn sample_sheet_path(&self) -> &Path;

    /// Directory holding the demultiplexed fastq files.
    fn fastq_dir(&self) -> &Path;

    /// Monotonic completion flag.
    fn complete(&self) -> bool;

    /// Re-read completion state from disk.
    ///
    /// Does nothing substantive while the parent run is incomplete or this
    /// analysis is already complete. Returns `true` only on the call that
    /// first observes completion.
    fn refresh(&mut self, run_complete: bool, clock: &dyn Clock) -> Result<bool, IlluminaError>;

    /// Experiment name declared in the sample sheet header.
    fn experiment(&self) -> Option<&str> {
        self.sample_sheet().run_name()
    }

    /// Expected read-file paths, one entry per sample in sheet order.
    ///
    /// When `strict`, the first missing file raises
    /// [`IlluminaError::MissingFile`]; otherwise missing files are included
    /// as unresolved paths.
    fn sample_paths(&self, strict: bool) -> Result<Vec<Vec<PathBuf>>, IlluminaError> {
        let sheet = self.sample_sheet();
        let read_count = sheet.read_count();
        let mut all = Vec::new();
        for (idx, name) in sheet.sample_names().iter().enumerate() {
            let mut paths = Vec::with_capacity(read_count);
            for filename in fastq::sample_filenames(name, idx + 1, read_count) {
                let path = self.fastq_dir().join(filename);
                if strict && !path.is_file() {
                    return Err(IlluminaError::MissingFile(path));
                }
                paths.push(path);
            }
            all.push(paths);
        }
        Ok(all)
    }

    /// Sample name → read-file paths, in sheet order.
    ///
    /// Sample names are not guaranteed unique; a duplicated name keeps the
    /// last sample's paths.
    fn sample_paths_by_name(
        &self,
        strict: bool,
    ) -> Result<IndexMap<String, Vec<PathBuf>>, IlluminaError> {
        let names = self.sample_sheet().sample_names();
        let paths = self.sample_paths(strict)?;
        Ok(names.into_iter().zip(paths).collect())
    }
}

/// Open the analysis directory at `path` using the layout for `instrument`.
pub fn open(
    path: &Path,
    instrument: InstrumentType,
    fastq_grace: Duration,
) -> Result<Box<dyn Analysis>, IlluminaError> {
    let gate = CompletionGate::new(fastq_grace);
    match instrument {
        InstrumentType::MiSeq | InstrumentType::MiniSeq => {
            Ok(Box::new(ClassicAnalysis::open(path, gate)?))
        }
        InstrumentType::NextSeq2000 => Ok(Box::new(NextSeq2000Analysis::open(path, gate)?)),
        InstrumentType::MiSeqI100Plus => Ok(Box::new(MiSeqI100Analysis::open(path, gate)?)),
    }
}

/// Defers completion while expected fastq files are missing.
///
/// The completion marker can appear minutes before the last fastq file
/// lands (file transfer lag). The gate holds completion back from the
/// first observation of the marker until either the outputs are all
/// present or the window elapses; after the window the analysis is
/// considered complete regardless.
#[derive(Debug)]
pub(crate) struct CompletionGate {
    first_seen: Option<Instant>,
    window: Duration,
}

impl CompletionGate {
    pub(crate) fn new(window: Duration) -> Self {
        Self { first_seen: None, window }
    }

    /// Marker observed; may completion be declared?
    pub(crate) fn admit(&mut self, outputs_ok: bool, clock: &dyn Clock) -> bool {
        if outputs_ok {
            return true;
        }
        let first = *self.first_seen.get_or_insert_with(|| clock.now());
        clock.now().duration_since(first) >= self.window
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
