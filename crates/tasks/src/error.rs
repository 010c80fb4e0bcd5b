// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task execution errors.

use seqproc_core::{MailError, UploadError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("missing output file {0}")]
    MissingOutput(PathBuf),

    #[error("{program} exited with {status}")]
    Subprocess { program: String, status: std::process::ExitStatus },

    #[error("timed out after {0:?} waiting for {1}")]
    Timeout(Duration, String),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
