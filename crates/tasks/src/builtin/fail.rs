// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fail on purpose. A controlled failure case for testing and
//! troubleshooting; see also `noop`.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};

pub struct Fail;

impl Task for Fail {
    fn run(&self, _ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        Err(TaskError::Failed("failing project as requested".into()))
    }
}
