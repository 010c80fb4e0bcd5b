// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An analysis is ignored until its checkpoint appears.

use super::fixtures::*;
use seqproc_daemon::ProjectStatus;
use seqproc_illumina::Analysis;
use std::fs;
use tempfile::TempDir;

#[test]
fn incomplete_analysis_waits_for_checkpoint() {
    let dir = TempDir::new().unwrap();
    let run_dir = write_run(dir.path(), "RUN_A", "RUN_A", false);
    // Run-level completion without the analysis checkpoint.
    fs::write(run_dir.join("RTAComplete.txt"), RTA_LINE).unwrap();
    write_metadata(dir.path(), "");

    let mut proc = processor(dir.path());
    proc.start();
    proc.refresh(true);

    assert_eq!(proc.runs().len(), 1);
    assert_eq!(proc.runs()[0].analyses().len(), 1);
    assert!(!proc.runs()[0].analyses()[0].complete());
    assert!(proc.active().is_empty());
    assert!(proc.completed().is_empty());
    assert!(proc.inactive().is_empty());

    // The checkpoint lands; the next refresh routes exactly one project
    // through the queue to completion.
    fs::write(
        run_dir.join("Data/Intensities/BaseCalls/Alignment1/Checkpoint.txt"),
        "3",
    )
    .unwrap();
    proc.refresh(true);

    assert_eq!(proc.completed().len(), 1);
    assert_eq!(proc.completed()[0].lock().status(), ProjectStatus::Complete);

    // And it is not rediscovered on later refreshes.
    proc.refresh(true);
    assert_eq!(proc.completed().len(), 1);
}
