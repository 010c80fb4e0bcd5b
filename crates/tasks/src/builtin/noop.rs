// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Do nothing at all. The minimal working task; see also `fail`.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};

pub struct Noop;

impl Task for Noop {
    fn run(&self, _ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        Ok(TaskOutput::new())
    }
}
