// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upload collaborator interface.
//!
//! The daemon hands a finished archive to an [`Uploader`] and records the
//! returned URL in the project's outputs. The concrete transport (Box, a
//! share, anything reachable) lives behind this trait.

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload failed: {0}")]
    Failed(String),

    #[error("io error during upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Upload a local file somewhere publicly reachable and return its URL.
pub trait Uploader: Send + Sync {
    fn upload(&self, path: &Path) -> Result<String, UploadError>;
}
