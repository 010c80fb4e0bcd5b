// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A fresh complete run with one default project flows straight through
//! to completion.

use super::fixtures::*;
use seqproc_daemon::ProjectStatus;
use tempfile::TempDir;

#[test]
fn fresh_run_single_default_project() {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "RUN_A", "RUN_A", true);
    write_metadata(dir.path(), "");

    let mut proc = processor(dir.path());
    proc.start();
    proc.refresh(true);

    assert_eq!(proc.runs().len(), 1);
    assert_eq!(proc.runs()[0].run_id(), "RUN_A");
    assert!(proc.active().is_empty());
    assert!(proc.inactive().is_empty());
    assert_eq!(proc.completed().len(), 1);

    let project = proc.completed()[0].lock();
    assert_eq!(project.name(), "P1");
    assert_eq!(project.status(), ProjectStatus::Complete);
    assert_eq!(project.work_dir(), format!("2017-11-02-P1-Alice-{FLOWCELL}"));
    assert_eq!(
        project.record().task_status.completed,
        vec!["copy", "metadata", "package", "upload", "email"]
    );
    assert!(project.record().task_status.pending.is_empty());
    assert!(project.record().task_status.current.is_empty());

    // The deliverables landed in the configured roots.
    assert!(dir
        .path()
        .join(format!("packaged/2017-11-02-P1-Alice-{FLOWCELL}.zip"))
        .is_file());
    assert!(dir.path().join("status/RUN_A/0/P1.yml").is_file());
}
