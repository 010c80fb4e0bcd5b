// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The processing-status report.
//!
//! One CSV row per project, with analysis-only rows for analyses that
//! produced no projects and run-only rows for runs with no analyses, so
//! every run the daemon knows about is visible somewhere in the report.

use std::io::{self, Write};

pub const REPORT_FIELDS: [&str; 11] = [
    "RunId",
    "RunPath",
    "Alignment",
    "Experiment",
    "AlignComplete",
    "Project",
    "WorkDir",
    "Status",
    "NSamples",
    "NFiles",
    "Group",
];

#[derive(Debug, Clone, Default)]
pub struct ReportEntry {
    pub run_id: String,
    pub run_path: String,
    /// Analysis index within the run, if the row describes one.
    pub alignment: Option<usize>,
    pub experiment: String,
    pub align_complete: Option<bool>,
    pub project: String,
    pub work_dir: String,
    pub status: String,
    pub n_samples: Option<usize>,
    pub n_files: Option<usize>,
    /// Which scheduler bucket holds the project.
    pub group: String,
}

impl ReportEntry {
    fn fields(&self) -> [String; 11] {
        let opt_num = |v: &Option<usize>| v.map(|n| n.to_string()).unwrap_or_default();
        [
            self.run_id.clone(),
            self.run_path.clone(),
            opt_num(&self.alignment),
            self.experiment.clone(),
            self.align_complete.map(|b| b.to_string()).unwrap_or_default(),
            self.project.clone(),
            self.work_dir.clone(),
            self.status.clone(),
            opt_num(&self.n_samples),
            opt_num(&self.n_files),
            self.group.clone(),
        ]
    }
}

/// Order rows by run, analysis, then project.
pub fn sort_entries(entries: &mut [ReportEntry]) {
    entries.sort_by(|a, b| {
        (&a.run_id, a.alignment, &a.project).cmp(&(&b.run_id, b.alignment, &b.project))
    });
}

/// Render entries as CSV, truncating each field to `max_width` characters
/// (`0` disables truncation).
pub fn write_report<W: Write>(
    writer: W,
    entries: &[ReportEntry],
    max_width: usize,
) -> io::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REPORT_FIELDS).map_err(io::Error::other)?;
    for entry in entries {
        let record = entry.fields().map(|field| truncate(&field, max_width));
        csv_writer.write_record(&record).map_err(io::Error::other)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn truncate(field: &str, max_width: usize) -> String {
    if max_width == 0 || field.chars().count() <= max_width {
        return field.to_string();
    }
    let keep = max_width.saturating_sub(3);
    let mut out: String = field.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
