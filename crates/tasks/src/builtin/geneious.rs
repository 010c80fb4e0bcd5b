// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage assembly outputs for interactive Geneious work, then block until
//! a `Geneious` subdirectory appears.

use super::manual::wait_for_subdir;
use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};
use std::fs;

pub struct Geneious;

impl Task for Geneious {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        // The reviewer works in the processing dir itself; pull the
        // relevant outputs out of the implicit-task subdirectory if they
        // were tucked away there.
        let staged = [
            ctx.task_dir_parent("merge").join("PairedReads"),
            ctx.task_dir_parent("assemble").join("ContigsGeneious"),
            ctx.task_dir_parent("assemble").join("CombinedGeneious"),
        ];
        for path in staged {
            if path.parent() != Some(ctx.proc_dir) && path.is_dir() {
                let target = ctx.proc_dir.join(path.file_name().unwrap_or_default());
                fs::rename(&path, &target)?;
            }
        }
        wait_for_subdir(ctx, &ctx.proc_dir.join("Geneious"))?;
        Ok(TaskOutput::new())
    }
}
