// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copy the sample sheet, the current status file, and this project's
//! slice of the experiment spreadsheet into `Metadata/`.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};
use std::fs;

pub struct Metadata;

impl Task for Metadata {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        let dest = ctx.task_dir_parent("metadata").join("Metadata");
        fs::create_dir_all(&dest)?;
        for path in [ctx.sample_sheet_path, ctx.status_path] {
            let name = path.file_name().unwrap_or_default();
            fs::copy(path, dest.join(name))?;
        }

        // The spreadsheet covers the whole experiment; write back only the
        // rows for this project.
        let name = ctx.experiment_csv_path.file_name().unwrap_or_default();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(ctx.experiment_csv_path)?;
        let headers = reader.headers()?.clone();
        let project_col = headers.iter().position(|h| h == "Project");
        let mut writer = csv::Writer::from_path(dest.join(name))?;
        writer.write_record(&headers)?;
        for record in reader.records() {
            let record = record?;
            let ours = project_col
                .and_then(|col| record.get(col))
                .is_some_and(|p| p == ctx.project);
            if ours {
                writer.write_record(&record)?;
            }
        }
        writer.flush()?;
        Ok(TaskOutput::new())
    }
}
