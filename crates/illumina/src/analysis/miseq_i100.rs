// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MiSeq i100 Plus analysis directories.

use super::{Analysis, CompletionGate};
use crate::error::IlluminaError;
use crate::samplesheet::SampleSheet;
use seqproc_core::Clock;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct MiSeqI100Analysis {
    path: PathBuf,
    sheet_path: PathBuf,
    fastq_dir: PathBuf,
    results_path: PathBuf,
    sample_sheet: SampleSheet,
    complete: bool,
    gate: CompletionGate,
}

impl MiSeqI100Analysis {
    pub(crate) fn open(path: &Path, gate: CompletionGate) -> Result<Self, IlluminaError> {
        let sheet_path = path.join("inputs/SampleSheet.csv");
        if !sheet_path.is_file() {
            return Err(IlluminaError::UnrecognizedAnalysis(path.to_path_buf()));
        }
        let sample_sheet = SampleSheet::load(&sheet_path)?;
        // The pipeline reads fastq.gz; DRAGEN ORA output is opaque to it.
        let compression = sample_sheet
            .fields("BCLConvert_Settings")
            .and_then(|s| s.get("FastqCompressionFormat"))
            .map(String::as_str);
        if compression == Some("dragen") {
            return Err(IlluminaError::UnsupportedAnalysis {
                path: path.to_path_buf(),
                reason: "DRAGEN ORA compression not supported".into(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            sheet_path,
            fastq_dir: path.join("Data/BCLConvert/ora_fastq"),
            results_path: path.join("analysisResults.json"),
            sample_sheet,
            complete: false,
            gate,
        })
    }

    fn results_succeeded(&self) -> Result<bool, IlluminaError> {
        let text = match fs::read_to_string(&self.results_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(IlluminaError::io(&self.results_path, e)),
        };
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| IlluminaError::parse(&self.results_path, e.to_string()))?;
        Ok(value.get("AnalysisStatus").and_then(|v| v.as_str()) == Some("Succeeded"))
    }
}

impl Analysis for MiSeqI100Analysis {
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
        if !self.results_succeeded()? {
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
