// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scenario fixtures: minimal classic-instrument run trees.

use seqproc_daemon::config::PathsConfig;
use seqproc_daemon::{Config, Processor};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub const FLOWCELL: &str = "000000000-ABC12";

pub const SHEET: &str = "\
[Header]
Experiment_Name,Exp1
[Reads]
151
151
[Data]
Sample_ID,Sample_Name
1,S1
";

pub const FASTQS: [&str; 2] = ["S1_S1_L001_R1_001.fastq.gz", "S1_S1_L001_R2_001.fastq.gz"];

/// RTA completion stamp whose date renders as 2017-11-02.
pub const RTA_LINE: &str = "11/2/2017,03:08:24.972,Illumina RTA 1.18.54\n";

pub fn run_info_xml(run_id: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<RunInfo Version="2">
  <Run Id="{run_id}" Number="1">
    <Flowcell>{FLOWCELL}</Flowcell>
    <Instrument>M05588</Instrument>
  </Run>
</RunInfo>
"#
    )
}

/// Lay out `<root>/runs/<dir_name>` as a classic MiSeq run declaring
/// `declared_id`. Completion markers are written only when asked.
pub fn write_run(root: &Path, dir_name: &str, declared_id: &str, complete: bool) -> PathBuf {
    let run_dir = root.join("runs").join(dir_name);
    let basecalls = run_dir.join("Data/Intensities/BaseCalls");
    let alignment = basecalls.join("Alignment1");
    fs::create_dir_all(&alignment).unwrap();
    fs::write(run_dir.join("RunInfo.xml"), run_info_xml(declared_id)).unwrap();
    fs::write(alignment.join("SampleSheetUsed.csv"), SHEET).unwrap();
    for name in FASTQS {
        fs::write(basecalls.join(name), b"").unwrap();
    }
    if complete {
        mark_complete(&run_dir);
    }
    run_dir
}

/// Write the run- and analysis-level completion markers.
pub fn mark_complete(run_dir: &Path) {
    fs::write(run_dir.join("RTAComplete.txt"), RTA_LINE).unwrap();
    fs::write(
        run_dir.join("Data/Intensities/BaseCalls/Alignment1/Checkpoint.txt"),
        "3",
    )
    .unwrap();
}

/// Write `<root>/experiments/Exp1/metadata.csv` with one P1 row.
pub fn write_metadata(root: &Path, tasks: &str) {
    let exp_dir = root.join("experiments/Exp1");
    fs::create_dir_all(&exp_dir).unwrap();
    fs::write(
        exp_dir.join("metadata.csv"),
        format!("Sample_Name,Project,Contacts,Tasks\nS1,P1,Alice <a@x>,{tasks}\n"),
    )
    .unwrap();
}

pub fn config(root: &Path) -> Config {
    Config {
        paths: PathsConfig { root: Some(root.to_path_buf()), ..PathsConfig::default() },
        ..Config::default()
    }
}

pub fn processor(root: &Path) -> Processor {
    Processor::new(config(root)).unwrap()
}

/// Drop an executable shell script and return its path.
pub fn stub_script(root: &Path, name: &str, body: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Recursive sorted listing of a directory tree, for before/after
/// comparisons.
pub fn tree_listing(root: &Path) -> Vec<String> {
    let mut paths = Vec::new();
    if !root.exists() {
        return paths;
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            paths.push(path.display().to_string());
            if path.is_dir() {
                stack.push(path);
            }
        }
    }
    paths.sort();
    paths
}
