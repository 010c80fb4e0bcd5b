// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A failing task marks its project FAILED without taking the worker (or
//! its queued siblings) down with it.

use super::fixtures::*;
use seqproc_daemon::ProjectStatus;
use std::fs;
use tempfile::TempDir;

#[test]
fn failing_task_marks_project_failed() {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "RUN_A", "RUN_A", true);
    write_metadata(dir.path(), "fail");

    let mut proc = processor(dir.path());
    proc.start();
    proc.refresh(true);

    assert_eq!(proc.completed().len(), 1);
    let project = proc.completed()[0].lock();
    assert_eq!(project.status(), ProjectStatus::Failed);
    let ts = &project.record().task_status;
    assert_eq!(ts.current, "fail");
    assert!(ts.completed.is_empty());
    assert_eq!(ts.pending, vec!["metadata", "package", "upload", "email"]);
    assert!(project.record().failure_exception.as_deref().is_some_and(|e| !e.is_empty()));

    // The durable record captured the failure.
    let saved = fs::read_to_string(project.status_path()).unwrap();
    assert!(saved.contains("status: failed"));
    assert!(saved.contains("failure_exception"));
}

#[test]
fn worker_survives_a_failed_project_and_pops_the_next() {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "RUN_A", "RUN_A", true);
    let exp_dir = dir.path().join("experiments/Exp1");
    fs::create_dir_all(&exp_dir).unwrap();
    // Two projects in one experiment: one poisoned, one healthy.
    fs::write(
        exp_dir.join("metadata.csv"),
        "Sample_Name,Project,Contacts,Tasks\nS1,Bad,Alice <a@x>,fail\nS1,Good,Alice <a@x>,noop\n",
    )
    .unwrap();

    let mut proc = processor(dir.path());
    proc.start();
    proc.refresh(true);

    assert_eq!(proc.completed().len(), 2);
    for handle in proc.completed() {
        let p = handle.lock();
        match p.name() {
            "Bad" => assert_eq!(p.status(), ProjectStatus::Failed),
            "Good" => assert_eq!(p.status(), ProjectStatus::Complete),
            other => panic!("unexpected project {other}"),
        }
    }
}
