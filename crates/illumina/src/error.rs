// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sequencer directory parsing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IlluminaError {
    /// The directory has no readable `RunInfo.xml`; it is not a run.
    #[error("not a recognized sequencer run: {0}")]
    NotARun(PathBuf),

    /// The directory does not look like any known analysis layout.
    #[error("not a recognized analysis directory: {0}")]
    UnrecognizedAnalysis(PathBuf),

    /// The analysis exists but the pipeline cannot consume its output.
    #[error("unsupported analysis at {path}: {reason}")]
    UnsupportedAnalysis { path: PathBuf, reason: String },

    /// An expected output file is absent.
    #[error("missing expected file: {0}")]
    MissingFile(PathBuf),

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IlluminaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse { path: path.into(), reason: reason.into() }
    }
}
