// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sample-sheet parser.
//!
//! Sample sheets are CSV files divided into `[Bracketed]` sections.
//! `Header` and `*Settings` sections hold key,value pairs; `Reads` holds
//! read lengths (either one integer per row, or `Read1Cycles,151`-style
//! pairs in v2 sheets); `Data` / `BCLConvert_Data` is a table with its own
//! header row. Unrecognized sections are kept as raw rows.

use crate::error::IlluminaError;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// One parsed section of a sample sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Key → value pairs (`Header`, `Settings`, `BCLConvert_Settings`, ...).
    Fields(IndexMap<String, String>),
    /// Read lengths from the `Reads` section, index reads excluded.
    Reads(Vec<u32>),
    /// A table keyed by its first row (`Data`, `BCLConvert_Data`).
    Table(Table),
    /// Anything else, verbatim.
    Raw(Vec<Vec<String>>),
}

/// A CSV table whose first row named the columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<IndexMap<String, String>>,
}

/// A parsed sample sheet.
#[derive(Debug, Clone)]
pub struct SampleSheet {
    sections: IndexMap<String, Section>,
}

impl SampleSheet {
    /// Load and parse a sample sheet from disk.
    pub fn load(path: &Path) -> Result<Self, IlluminaError> {
        let bytes = fs::read(path).map_err(|e| IlluminaError::io(path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        Self::parse(&text).map_err(|reason| IlluminaError::parse(path, reason))
    }

    /// Parse sample-sheet text.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut sections: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
        let mut current: Option<String> = None;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.iter().all(|f| f.is_empty()) {
                continue;
            }
            if let Some(name) = section_header(&row[0]) {
                sections.insert(name.clone(), Vec::new());
                current = Some(name);
                continue;
            }
            let Some(name) = &current else {
                return Err(format!("data before first section header: {:?}", row[0]));
            };
            if let Some(rows) = sections.get_mut(name) {
                rows.push(row);
            }
        }

        let mut parsed = IndexMap::new();
        for (name, rows) in sections {
            let section = if name == "Reads" {
                Section::Reads(parse_reads(&rows)?)
            } else if name == "Header" || name == "Settings" || name.ends_with("_Settings") {
                Section::Fields(parse_fields(&rows))
            } else if name == "Data" || name.ends_with("_Data") {
                Section::Table(parse_table(rows))
            } else {
                Section::Raw(rows)
            };
            parsed.insert(name, section);
        }
        Ok(Self { sections: parsed })
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Key → value pairs of a fields section, if present.
    pub fn fields(&self, name: &str) -> Option<&IndexMap<String, String>> {
        match self.sections.get(name)? {
            Section::Fields(fields) => Some(fields),
            _ => None,
        }
    }

    /// Read lengths, empty if the sheet has no `Reads` section.
    pub fn reads(&self) -> &[u32] {
        match self.sections.get("Reads") {
            Some(Section::Reads(reads)) => reads,
            _ => &[],
        }
    }

    /// Number of non-index read files expected per sample (1 or 2).
    pub fn read_count(&self) -> usize {
        if self.reads().len() > 1 {
            2
        } else {
            1
        }
    }

    /// The sample table: `BCLConvert_Data` when present, else `Data`.
    pub fn data(&self) -> Option<&Table> {
        for name in ["BCLConvert_Data", "Data"] {
            if let Some(Section::Table(table)) = self.sections.get(name) {
                return Some(table);
            }
        }
        None
    }

    /// The run/experiment name from the header, across sheet versions.
    pub fn run_name(&self) -> Option<&str> {
        let header = self.fields("Header")?;
        for key in ["RunName", "Experiment_Name", "Experiment Name"] {
            if let Some(value) = header.get(key) {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
        None
    }

    /// Sample names in sheet order; `Sample_ID` stands in for a missing
    /// or empty `Sample_Name`.
    pub fn sample_names(&self) -> Vec<String> {
        let Some(table) = self.data() else { return Vec::new() };
        table
            .rows
            .iter()
            .map(|row| {
                row.get("Sample_Name")
                    .filter(|v| !v.is_empty())
                    .or_else(|| row.get("Sample_ID"))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }
}

fn section_header(field: &str) -> Option<String> {
    let inner = field.strip_prefix('[')?.strip_suffix(']')?;
    let ok = !inner.is_empty() && inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    ok.then(|| inner.to_string())
}

fn parse_fields(rows: &[Vec<String>]) -> IndexMap<String, String> {
    let mut fields = IndexMap::new();
    for row in rows {
        let value = row.get(1).cloned().unwrap_or_default();
        fields.insert(row[0].clone(), value);
    }
    fields
}

fn parse_reads(rows: &[Vec<String>]) -> Result<Vec<u32>, String> {
    let mut reads = Vec::new();
    for row in rows {
        // v1: one integer per row. v2: `Read1Cycles,151` pairs, where only
        // the ReadNCycles keys are sequencing reads.
        if let Ok(len) = row[0].parse::<u32>() {
            reads.push(len);
        } else if row[0].starts_with("Read") && row[0].ends_with("Cycles") {
            let value = row.get(1).map(String::as_str).unwrap_or_default();
            let len = value
                .parse::<u32>()
                .map_err(|_| format!("bad read length {value:?} for {:?}", row[0]))?;
            reads.push(len);
        } else if row[0].ends_with("Cycles") {
            // Index1Cycles / Index2Cycles: not read files.
        } else {
            return Err(format!("unrecognized Reads row: {:?}", row[0]));
        }
    }
    Ok(reads)
}

fn parse_table(mut rows: Vec<Vec<String>>) -> Table {
    if rows.is_empty() {
        return Table::default();
    }
    let columns = rows.remove(0);
    let rows = rows
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .cloned()
                .zip(row.into_iter().chain(std::iter::repeat(String::new())))
                .collect()
        })
        .collect();
    Table { columns, rows }
}

#[cfg(test)]
#[path = "samplesheet_tests.rs"]
mod tests;
