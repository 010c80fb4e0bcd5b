// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copy the run directory into the processing directory.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::fsutil::copy_tree;
use crate::task::{Task, TaskOutput};

pub struct CopyRun;

impl Task for CopyRun {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        let dest = ctx.task_dir_parent("copy").join(ctx.run_id);
        copy_tree(ctx.run_path, &dest)?;
        Ok(TaskOutput::new())
    }
}
