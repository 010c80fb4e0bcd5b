// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NextSeq 2000 analysis directories.

use super::{Analysis, CompletionGate};
use crate::error::IlluminaError;
use crate::samplesheet::SampleSheet;
use seqproc_core::Clock;
use std::fs;
use std::path::{Path, PathBuf};

/// Phrase the instrument writes into its fastq completion log.
const DONE_PHRASE: &str = "Fastq generation complete";

#[derive(Debug)]
pub struct NextSeq2000Analysis {
    path: PathBuf,
    sheet_path: PathBuf,
    fastq_dir: PathBuf,
    marker_path: PathBuf,
    sample_sheet: SampleSheet,
    complete: bool,
    gate: CompletionGate,
}

impl NextSeq2000Analysis {
    pub(crate) fn open(path: &Path, gate: CompletionGate) -> Result<Self, IlluminaError> {
        let sheet_path = path.join("Data/Reports/SampleSheet.csv");
        if !sheet_path.is_file() {
            return Err(IlluminaError::UnrecognizedAnalysis(path.to_path_buf()));
        }
        let sample_sheet = SampleSheet::load(&sheet_path)?;
        Ok(Self {
            path: path.to_path_buf(),
            sheet_path,
            fastq_dir: path.join("Data/fastq"),
            marker_path: path.join("Data/fastq/Logs/FastqComplete.txt"),
            sample_sheet,
            complete: false,
            gate,
        })
    }

    fn marker_done(&self) -> Result<bool, IlluminaError> {
        match fs::read_to_string(&self.marker_path) {
            Ok(text) => Ok(text.contains(DONE_PHRASE)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(IlluminaError::io(&self.marker_path, e)),
        }
    }
}

impl Analysis for NextSeq2000Analysis {
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
        if !self.marker_done()? {
            return Ok(false);
        }
        let outputs_ok = self.sample_paths(true).is_ok();
        if self.gate.admit(outputs_ok, clock) {
            self.complete = true;
            return Ok(true);
        }
        Ok(false)
    }
}
