// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborator selection.
//!
//! The upload and mail transports live behind the core traits; this
//! module picks the implementation from config. Without credentials the
//! daemon runs with inert stand-ins, warning unless the section is
//! explicitly skipped (or the whole daemon is read-only, where silence is
//! expected).

use crate::config::Config;
use seqproc_core::{MailError, MailMessage, Mailer, UploadError, Uploader};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Uploader stand-in: logs and fabricates a file URL.
pub struct NullUploader;

impl Uploader for NullUploader {
    fn upload(&self, path: &Path) -> Result<String, UploadError> {
        debug!(path = %path.display(), "null uploader; returning file URL");
        Ok(format!("https://{}", path.display()))
    }
}

/// Mailer stand-in: logs the message instead of delivering it.
pub struct NullMailer;

impl Mailer for NullMailer {
    fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to.join(", "),
            subject = %message.subject,
            "null mailer; not delivering"
        );
        Ok(())
    }
}

/// Pick the uploader for this configuration.
pub fn uploader_from_config(config: &Config) -> Arc<dyn Uploader> {
    if !has_credentials(config.uploader.credentials_path.as_deref()) {
        let msg = "no upload configuration given; skipping uploads";
        if config.readonly || config.uploader.skip {
            debug!("{msg}");
        } else {
            warn!("{msg}");
        }
    }
    Arc::new(NullUploader)
}

/// Pick the mailer for this configuration.
pub fn mailer_from_config(config: &Config) -> Arc<dyn Mailer> {
    if !has_credentials(config.mailer.credentials_path.as_deref()) {
        let msg = "no mailer configuration given; skipping emails";
        if config.readonly || config.mailer.skip {
            debug!("{msg}");
        } else {
            warn!("{msg}");
        }
    }
    Arc::new(NullMailer)
}

fn has_credentials(path: Option<&Path>) -> bool {
    path.is_some_and(Path::exists)
}
