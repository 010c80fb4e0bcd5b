// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A restarted daemon classifies previously-processed projects instead of
//! redoing them.

use super::fixtures::*;
use seqproc_daemon::ProjectStatus;
use tempfile::TempDir;

#[test]
fn restart_resumes_cleanly() {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "RUN_A", "RUN_A", true);
    write_metadata(dir.path(), "");

    {
        let mut proc = processor(dir.path());
        proc.start();
        proc.refresh(true);
        assert_eq!(proc.completed().len(), 1);
        proc.finish_up();
    }

    let processed_before = tree_listing(&dir.path().join("processed"));
    let packaged_before = tree_listing(&dir.path().join("packaged"));

    // A new daemon against the same roots.
    let mut proc = processor(dir.path());
    proc.start();
    proc.refresh(true);

    assert_eq!(proc.runs().len(), 1);
    assert!(proc.active().is_empty());
    assert!(proc.completed().is_empty());
    assert_eq!(proc.inactive().len(), 1);
    let project = proc.inactive()[0].lock();
    assert!(project.readonly());
    assert_eq!(project.status(), ProjectStatus::Complete);
    drop(project);

    // Nothing new was written under the output roots.
    assert_eq!(tree_listing(&dir.path().join("processed")), processed_before);
    assert_eq!(tree_listing(&dir.path().join("packaged")), packaged_before);
}
