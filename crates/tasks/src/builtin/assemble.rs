// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! De-novo assembly with SPAdes, plus contig post-processing.
//!
//! The assembler crashes readily on short or empty inputs, so a failed run
//! leaves a placeholder `contigs.fasta` and processing continues. Contigs
//! above the length floor are rewritten as fastq (constant quality) with
//! `<sample>-contig_<n>` ids and concatenated with the merged reads, ready
//! for interactive review.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::fsutil::mkparent;
use crate::task::{Task, TaskOutput};
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// Contigs at or below this length are dropped from the review file.
const CONTIG_LENGTH_MIN: usize = 255;

/// Fastq quality score assigned to contig bases (Q40).
const CONTIG_QUALITY: char = 'I';

/// Quality-score encoding offset of the fastq files.
const PHRED_OFFSET: u32 = 33;

fn node_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::unwrap_used)] // literal pattern
    RE.get_or_init(|| Regex::new(r"^NODE_([0-9]+)_").unwrap())
}

pub struct Assemble;

impl Task for Assemble {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        let mut log = ctx.log_file("assemble")?;
        let exe = ctx.setting_str("spades").unwrap_or("spades.py");
        for paths in ctx.sample_paths.values() {
            let r1 = &paths[0];
            let merged = ctx.read_path(r1, "merge", "PairedReads", ".merged.fastq", true)?;
            let contigs_fq = ctx.read_path(r1, "assemble", "ContigsGeneious", ".contigs.fastq", true)?;
            let combined = ctx.read_path(r1, "assemble", "CombinedGeneious", ".contigs_reads.fastq", true)?;
            let spades_dir = ctx.read_path(r1, "assemble", "assembled", "", true)?;

            let contigs_fa = assemble_reads(exe, &merged, &spades_dir, ctx.nthreads, &mut log)?;
            let sample_prefix = contig_prefix(&contigs_fq);
            prep_contigs(&contigs_fa, &contigs_fq, &sample_prefix)?;
            combine(&contigs_fq, &merged, &combined)?;
        }
        Ok(TaskOutput::new())
    }
}

/// Run the assembler on one merged read file.
///
/// Empty input is skipped outright and any assembler failure downgraded to
/// a placeholder contig file, with a note in the log either way.
fn assemble_reads(
    exe: &str,
    merged: &Path,
    out_dir: &Path,
    nthreads: usize,
    log: &mut File,
) -> Result<PathBuf, TaskError> {
    let contigs = out_dir.join("contigs.fasta");
    if fs::metadata(merged)?.len() == 0 {
        writeln!(log, "skipping assembly for empty file: {}", merged.display())?;
        writeln!(log, "creating placeholder contig file")?;
        mkparent(&contigs)?;
        fs::write(&contigs, b"")?;
        return Ok(contigs);
    }
    fs::create_dir_all(out_dir)?;
    let status = Command::new(exe)
        .arg("--12")
        .arg(merged)
        .arg("-o")
        .arg(out_dir)
        .arg("-t")
        .arg(nthreads.to_string())
        .arg("--phred-offset")
        .arg(PHRED_OFFSET.to_string())
        .stdout(Stdio::from(log.try_clone()?))
        .stderr(Stdio::from(log.try_clone()?))
        .status()?;
    if !status.success() {
        writeln!(log, "{exe} exited with errors")?;
        writeln!(log, "creating placeholder contig file")?;
        if !contigs.is_file() {
            fs::write(&contigs, b"")?;
        }
    }
    Ok(contigs)
}

/// `<base>.contigs.fastq` → `<base>`; used as the contig id prefix.
fn contig_prefix(contigs_fq: &Path) -> String {
    contigs_fq
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(".contigs.fastq"))
        .unwrap_or("contigs")
        .to_string()
}

/// Filter contigs by length and rewrite as fastq for review.
fn prep_contigs(fa_in: &Path, fq_out: &Path, sample_prefix: &str) -> Result<(), TaskError> {
    let mut writer = BufWriter::new(File::create(fq_out)?);
    for (id, seq) in read_fasta(fa_in)? {
        if seq.len() <= CONTIG_LENGTH_MIN {
            continue;
        }
        let contig_num = node_re()
            .captures(&id)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| id.clone());
        let quality: String = std::iter::repeat(CONTIG_QUALITY).take(seq.len()).collect();
        writeln!(writer, "@{sample_prefix}-contig_{contig_num}")?;
        writeln!(writer, "{seq}")?;
        writeln!(writer, "+")?;
        writeln!(writer, "{quality}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Concatenate formatted contigs and merged reads.
fn combine(contigs: &Path, reads: &Path, out: &Path) -> Result<(), TaskError> {
    let mut writer = File::create(out)?;
    for path in [contigs, reads] {
        let mut reader = File::open(path)?;
        std::io::copy(&mut reader, &mut writer)?;
    }
    Ok(())
}

/// Minimal fasta reader: (id, sequence) pairs.
fn read_fasta(path: &Path) -> Result<Vec<(String, String)>, TaskError> {
    let mut records = Vec::new();
    let mut id: Option<String> = None;
    let mut seq = String::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            if let Some(prev) = id.take() {
                records.push((prev, std::mem::take(&mut seq)));
            }
            id = Some(header.split_whitespace().next().unwrap_or_default().to_string());
        } else {
            seq.push_str(line.trim());
        }
    }
    if let Some(prev) = id {
        records.push((prev, seq));
    }
    Ok(records)
}
