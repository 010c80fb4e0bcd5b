// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block until a `Manual` subdirectory appears in the processing
//! directory, signalling that offline handling is finished.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 3600;
const DEFAULT_DELTA_SECS: u64 = 1;

pub struct Manual;

impl Task for Manual {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        wait_for_subdir(ctx, &ctx.proc_dir.join("Manual"))?;
        Ok(TaskOutput::new())
    }
}

/// Poll for `target` until the task's configured timeout elapses.
pub(crate) fn wait_for_subdir(ctx: &TaskContext<'_>, target: &Path) -> Result<(), TaskError> {
    let timeout = Duration::from_secs(ctx.setting_u64("timeout", DEFAULT_TIMEOUT_SECS));
    let delta = Duration::from_secs(ctx.setting_u64("delta", DEFAULT_DELTA_SECS));
    let start = ctx.clock.now();
    while !target.exists() {
        if ctx.clock.now().duration_since(start) >= timeout {
            return Err(TaskError::Timeout(timeout, format!("{}", target.display())));
        }
        std::thread::sleep(delta);
    }
    Ok(())
}
