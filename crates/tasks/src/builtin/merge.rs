// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interleave trimmed R1/R2 reads into one file per sample.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub struct Merge;

impl Task for Merge {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        ctx.log_file("merge")?;
        for paths in ctx.sample_paths.values() {
            if paths.len() != 2 {
                return Err(TaskError::Failed("merging needs 2 files per sample".into()));
            }
            // Inputs live wherever the trim task put them.
            let r1 = ctx.read_path(&paths[0], "trim", "trimmed", ".trimmed.fastq", false)?;
            let r2 = ctx.read_path(&paths[1], "trim", "trimmed", ".trimmed.fastq", false)?;
            let out = ctx.read_path(&paths[0], "merge", "PairedReads", ".merged.fastq", true)?;
            interleave(&r1, &r2, &out)?;
            if !out.is_file() {
                return Err(TaskError::MissingOutput(out));
            }
        }
        Ok(TaskOutput::new())
    }
}

/// Interleave two fastq files record by record (4 lines per record).
fn interleave(r1: &Path, r2: &Path, out: &Path) -> Result<(), TaskError> {
    let mut reader1 = BufReader::new(File::open(r1)?).lines();
    let mut reader2 = BufReader::new(File::open(r2)?).lines();
    let mut writer = BufWriter::new(File::create(out)?);
    loop {
        let rec1 = next_record(&mut reader1)?;
        let rec2 = next_record(&mut reader2)?;
        match (rec1, rec2) {
            (Some(a), Some(b)) => {
                for line in a.iter().chain(b.iter()) {
                    writeln!(writer, "{line}")?;
                }
            }
            (None, None) => break,
            _ => return Err(TaskError::Failed(format!(
                "uneven record counts between {} and {}",
                r1.display(),
                r2.display()
            ))),
        }
    }
    writer.flush()?;
    Ok(())
}

fn next_record(
    lines: &mut std::io::Lines<BufReader<File>>,
) -> Result<Option<[String; 4]>, TaskError> {
    let Some(first) = lines.next() else { return Ok(None) };
    let mut record = [first?, String::new(), String::new(), String::new()];
    for slot in record.iter_mut().skip(1) {
        *slot = lines
            .next()
            .ok_or_else(|| TaskError::Failed("truncated fastq record".into()))??;
    }
    Ok(Some(record))
}
