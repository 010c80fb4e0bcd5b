// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mail collaborator interface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// A notification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// RFC822-style recipients (`Name <addr>` is fine).
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub body_html: Option<String>,
}

impl MailMessage {
    pub fn new(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self { to, subject: subject.into(), body: body.into(), body_html: None }
    }

    crate::setters! {
        option {
            body_html: String,
        }
    }
}

/// Fire-and-forget mail delivery.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}
