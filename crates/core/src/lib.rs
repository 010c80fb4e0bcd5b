// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! seqproc-core: shared primitives for the seqproc pipeline
//!
//! Everything here is independent of both the sequencer directory layout
//! and the daemon: clocks, name slugification, contact parsing, the
//! experiment metadata spreadsheet, and the collaborator traits the task
//! layer calls out to.

pub mod macros;

pub mod clock;
pub mod contacts;
pub mod experiment;
pub mod mail;
pub mod slug;
pub mod time_fmt;
pub mod upload;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use contacts::{first_names, parse_contacts};
pub use experiment::{load_metadata, ExperimentError, ExperimentRow};
pub use mail::{MailError, MailMessage, Mailer};
pub use slug::slugify;
pub use time_fmt::datestamp;
pub use upload::{UploadError, Uploader};
