// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trim adapters from raw read files with cutadapt.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};
use std::process::{Command, Stdio};

/// Nextera adapter pair, R1 then R2.
pub const NEXTERA_ADAPTERS: [&str; 2] = [
    "CTGTCTCTTATACACATCTCCGAGCCCACGAGAC",
    "CTGTCTCTTATACACATCTGACGCTGCCGACGA",
];

pub struct Trim;

impl Task for Trim {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        let log = ctx.log_file("trim")?;
        let exe = ctx.setting_str("cutadapt").unwrap_or("cutadapt");
        for paths in ctx.sample_paths.values() {
            if paths.len() > 2 {
                return Err(TaskError::Failed("trimming can't handle >2 files per sample".into()));
            }
            for (idx, path) in paths.iter().enumerate() {
                let adapter = NEXTERA_ADAPTERS[idx];
                let out = ctx.read_path(path, "trim", "trimmed", ".trimmed.fastq", false)?;
                let status = Command::new(exe)
                    .arg("-a")
                    .arg(adapter)
                    .arg("-o")
                    .arg(&out)
                    .arg(path)
                    .stdout(Stdio::from(log.try_clone()?))
                    .stderr(Stdio::from(log.try_clone()?))
                    .status()?;
                if !status.success() {
                    return Err(TaskError::Subprocess { program: exe.to_string(), status });
                }
                if !out.is_file() {
                    return Err(TaskError::MissingOutput(out));
                }
            }
        }
        Ok(TaskOutput::new())
    }
}
