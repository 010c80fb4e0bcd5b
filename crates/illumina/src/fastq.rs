// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fastq output filename prediction.
//!
//! Demultiplexing names its outputs `{name}_S{num}_L001_R{read}_001.fastq.gz`
//! where `{name}` is the sample name with special characters masked and
//! `{num}` is the one-based position in the sample sheet. Predicting the
//! names (rather than globbing) lets callers enumerate files that are
//! expected but not yet on disk.

/// Mask the characters the sequencer rewrites in sample names.
///
/// Runs of `/ + # _ . -` and spaces collapse to a single hyphen, trimmed
/// from both ends.
pub fn sanitize_sample_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_mask = false;
    for ch in name.chars() {
        if matches!(ch, '/' | '+' | '#' | '_' | ' ' | '.' | '-') {
            if !last_was_mask {
                out.push('-');
                last_was_mask = true;
            }
        } else {
            out.push(ch);
            last_was_mask = false;
        }
    }
    out.trim_matches('-').to_string()
}

/// Predict the fastq filenames for one sample.
///
/// `sample_num` is one-based sample-sheet position; `read_count` is the
/// number of non-index reads (1 or 2).
pub fn sample_filenames(name: &str, sample_num: usize, read_count: usize) -> Vec<String> {
    let sname = sanitize_sample_name(name);
    (1..=read_count)
        .map(|rp| format!("{sname}_S{sample_num}_L001_R{rp}_001.fastq.gz"))
        .collect()
}

#[cfg(test)]
#[path = "fastq_tests.rs"]
mod tests;
