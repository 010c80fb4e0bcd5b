// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording fakes for the collaborator traits, shared across crates' tests.

use crate::mail::{MailError, MailMessage, Mailer};
use crate::upload::{UploadError, Uploader};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Uploader that records every call and returns `https://<path>`.
#[derive(Default)]
pub struct RecordingUploader {
    pub calls: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

impl RecordingUploader {
    pub fn failing() -> Self {
        Self { calls: Mutex::new(Vec::new()), fail: true }
    }
}

impl Uploader for RecordingUploader {
    fn upload(&self, path: &Path) -> Result<String, UploadError> {
        self.calls.lock().push(path.to_path_buf());
        if self.fail {
            return Err(UploadError::Failed("recording uploader set to fail".into()));
        }
        Ok(format!("https://{}", path.display()))
    }
}

/// Mailer that records every message.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        self.sent.lock().push(message.clone());
        if self.fail {
            return Err(MailError::Delivery("recording mailer set to fail".into()));
        }
        Ok(())
    }
}
