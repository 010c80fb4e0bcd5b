// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Package the processing directory as a deflate-compressed zip.
//!
//! Archive entries are rooted at the work-directory name, and a hidden
//! copy of the status file as it currently stands rides along.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::fsutil::mkparent;
use crate::task::{Task, TaskOutput};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub struct Package;

impl Task for Package {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        mkparent(ctx.package_path)?;
        // Exclusive create: a leftover archive from a previous attempt is
        // an error, not something to silently clobber.
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(ctx.package_path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in WalkDir::new(ctx.proc_dir) {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let arcname = arc_name(ctx.work_dir, ctx.proc_dir, entry.path())?;
            zip.start_file(arcname, options)?;
            let mut input = File::open(entry.path())?;
            io::copy(&mut input, &mut zip)?;
        }

        let status_name = ctx
            .status_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("status.yml");
        zip.start_file(format!("{}/.{status_name}", ctx.work_dir), options)?;
        let mut status = File::open(ctx.status_path)?;
        io::copy(&mut status, &mut zip)?;

        zip.finish()?;
        Ok(TaskOutput::new())
    }
}

/// Archive name for `path`, relative to the processing dir's parent.
fn arc_name(work_dir: &str, proc_dir: &Path, path: &Path) -> Result<String, TaskError> {
    let rel = path
        .strip_prefix(proc_dir)
        .map_err(|e| TaskError::Failed(e.to_string()))?;
    Ok(format!("{work_dir}/{}", rel.display()))
}
