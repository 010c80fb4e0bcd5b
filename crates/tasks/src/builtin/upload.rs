// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hand the finished archive to the uploader and record its URL.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};

pub struct Upload;

impl Task for Upload {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        let url = ctx.uploader.upload(ctx.package_path)?;
        let mut output = TaskOutput::new();
        output.insert("url".into(), url);
        Ok(output)
    }
}
