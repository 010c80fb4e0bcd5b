// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task trait.

use crate::context::TaskContext;
use crate::error::TaskError;
use std::collections::BTreeMap;

/// What a task hands back for the project's durable record.
///
/// Kept to flat strings so the status file stays schema-stable.
pub type TaskOutput = BTreeMap<String, String>;

/// One unit of processing.
///
/// A task reads what it needs through the [`TaskContext`] and leaves its
/// results on disk; the returned map is recorded in the project's status
/// file. Any error fails the whole project.
pub trait Task: Send + Sync {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError>;
}
