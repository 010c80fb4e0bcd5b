// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An explicit task request resolves ahead of the terminal tasks and
//! leaves per-task logs behind.

use super::fixtures::*;
use seqproc_daemon::{Processor, ProjectStatus};
use tempfile::TempDir;

#[test]
fn explicit_trim_request() {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "RUN_A", "RUN_A", true);
    write_metadata(dir.path(), "trim");

    // Stand-in cutadapt: `-a X -o out in` → copy input to output.
    let stub = stub_script(dir.path(), "cutadapt", "cp \"$5\" \"$4\"\n");
    let mut config = config(dir.path());
    let mut trim_settings = seqproc_tasks::TaskSettings::new();
    trim_settings.insert("cutadapt".into(), serde_yaml::Value::from(stub.display().to_string()));
    config.tasks.insert("trim".into(), trim_settings);

    let mut proc = Processor::new(config).unwrap();
    proc.start();
    proc.refresh(true);

    assert_eq!(proc.completed().len(), 1);
    let project = proc.completed()[0].lock();
    assert_eq!(project.status(), ProjectStatus::Complete);
    assert_eq!(
        project.record().task_status.completed,
        vec!["trim", "metadata", "package", "upload", "email"]
    );
    assert!(project.record().task_status.current.is_empty());

    // One log file per executed task.
    let logs = project.proc_dir().join("logs");
    for task in ["trim", "metadata", "package", "upload", "email"] {
        assert!(logs.join(format!("log_{task}.txt")).is_file(), "missing log for {task}");
    }
}
