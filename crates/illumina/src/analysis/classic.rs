// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MiSeq / MiniSeq "Alignment" directories.

use super::{Analysis, CompletionGate};
use crate::error::IlluminaError;
use crate::samplesheet::SampleSheet;
use regex::Regex;
use seqproc_core::Clock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Checkpoint stage that marks a finished alignment.
const CHECKPOINT_DONE: u32 = 3;

fn stamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::unwrap_used)] // literal pattern
    RE.get_or_init(|| Regex::new(r"^[0-9]{8}_[0-9]{6}$").unwrap())
}

/// The classic layout shared by MiSeq and MiniSeq.
///
/// MiSeq keeps the sample sheet and checkpoint directly in the Alignment
/// directory, with fastq files one level up in `BaseCalls`. MiniSeq nests
/// everything inside a timestamped subfolder with its own `Fastq` dir.
#[derive(Debug)]
pub struct ClassicAnalysis {
    path: PathBuf,
    sheet_path: PathBuf,
    fastq_dir: PathBuf,
    checkpoint_path: PathBuf,
    sample_sheet: SampleSheet,
    complete: bool,
    gate: CompletionGate,
}

impl ClassicAnalysis {
    pub(crate) fn open(path: &Path, gate: CompletionGate) -> Result<Self, IlluminaError> {
        let miseq_sheet = path.join("SampleSheetUsed.csv");
        let (sheet_path, fastq_dir, checkpoint_path) = if miseq_sheet.is_file() {
            let fastq = path.parent().unwrap_or(path).to_path_buf();
            (miseq_sheet, fastq, path.join("Checkpoint.txt"))
        } else {
            let sub = timestamped_subdir(path)?
                .ok_or_else(|| IlluminaError::UnrecognizedAnalysis(path.to_path_buf()))?;
            let sheet = sub.join("SampleSheetUsed.csv");
            if !sheet.is_file() {
                return Err(IlluminaError::UnrecognizedAnalysis(path.to_path_buf()));
            }
            (sheet, sub.join("Fastq"), sub.join("Checkpoint.txt"))
        };
        let sample_sheet = SampleSheet::load(&sheet_path)?;
        Ok(Self {
            path: path.to_path_buf(),
            sheet_path,
            fastq_dir,
            checkpoint_path,
            sample_sheet,
            complete: false,
            gate,
        })
    }

    fn checkpoint_stage(&self) -> Result<Option<u32>, IlluminaError> {
        let text = match fs::read_to_string(&self.checkpoint_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IlluminaError::io(&self.checkpoint_path, e)),
        };
        let token = text.split_whitespace().next().unwrap_or_default();
        token
            .parse::<u32>()
            .map(Some)
            .map_err(|_| IlluminaError::parse(&self.checkpoint_path, format!("bad stage {token:?}")))
    }
}

/// First `YYYYMMDD_HHMMSS` subdirectory, if any.
fn timestamped_subdir(path: &Path) -> Result<Option<PathBuf>, IlluminaError> {
    let entries = fs::read_dir(path).map_err(|e| IlluminaError::io(path, e))?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| stamp_re().is_match(n))
        })
        .collect();
    dirs.sort();
    Ok(dirs.into_iter().next())
}

impl Analysis for ClassicAnalysis {
    fn path(&self) -> &Path {
        &self.path
    }

    fn sample_sheet(&self) -> &SampleSheet {
        &self.sample_sheet
    }

    fn sample_sheet_path(&self) -> &Path {
        &self.sheet_path
    }

    fn fastq_dir(&self) -> &Path {
        &self.fastq_dir
    }

    fn complete(&self) -> bool {
        self.complete
    }

    fn refresh(&mut self, run_complete: bool, clock: &dyn Clock) -> Result<bool, IlluminaError> {
        if !run_complete || self.complete {
            return Ok(false);
        }
        match self.checkpoint_stage()? {
            Some(stage) if stage == CHECKPOINT_DONE => {}
            _ => return Ok(false),
        }
        let outputs_ok = self.sample_paths(true).is_ok();
        if self.gate.admit(outputs_ok, clock) {
            self.complete = true;
            return Ok(true);
        }
        Ok(false)
    }
}
