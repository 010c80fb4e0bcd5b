// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Experiment metadata spreadsheet loader.
//!
//! One CSV per experiment (`<experiments-root>/<name>/metadata.csv`) maps
//! samples to projects, contacts, and requested tasks. The spreadsheet is
//! hand-edited, so the loader is forgiving: empty rows and empty-headed
//! columns are dropped, and non-UTF-8 bytes are stripped with a warning.

use crate::contacts::parse_contacts;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Required columns in every metadata spreadsheet.
const REQUIRED_COLUMNS: [&str; 4] = ["Sample_Name", "Project", "Contacts", "Tasks"];

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Csv {
        path: std::path::PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("metadata spreadsheet {path} is missing column {column:?}")]
    MissingColumn { path: std::path::PathBuf, column: &'static str },
}

/// One parsed row of the metadata spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentRow {
    pub sample_name: String,
    pub project: String,
    /// Ordered name → email map parsed from the `Contacts` column.
    pub contacts: IndexMap<String, String>,
    /// Whitespace-split, lower-cased tokens from the `Tasks` column.
    pub tasks: Vec<String>,
    /// Any further columns, preserved verbatim.
    pub extra: IndexMap<String, String>,
}

/// Load an experiment metadata spreadsheet.
pub fn load_metadata(path: &Path) -> Result<Vec<ExperimentRow>, ExperimentError> {
    let bytes = fs::read(path).map_err(|source| ExperimentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), "stripping non-UTF-8 bytes from metadata spreadsheet");
            let lossy = String::from_utf8_lossy(err.as_bytes()).into_owned();
            lossy.replace('\u{FFFD}', "")
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|source| ExperimentError::Csv { path: path.to_path_buf(), source })?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ExperimentError::MissingColumn { path: path.to_path_buf(), column });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|source| ExperimentError::Csv { path: path.to_path_buf(), source })?;
        // Empty-headed columns are spreadsheet artifacts; skip them.
        let mut fields: IndexMap<&str, &str> = IndexMap::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if !header.is_empty() {
                fields.insert(header, value);
            }
        }
        if fields.values().all(|v| v.is_empty()) {
            continue;
        }
        let take = |key: &str| fields.get(key).copied().unwrap_or_default().to_string();
        let tasks = take("Tasks")
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        let contacts = parse_contacts(&take("Contacts"));
        let extra = fields
            .iter()
            .filter(|(k, _)| !REQUIRED_COLUMNS.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        rows.push(ExperimentRow {
            sample_name: take("Sample_Name"),
            project: take("Project"),
            contacts,
            tasks,
            extra,
        });
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "experiment_tests.rs"]
mod tests;
