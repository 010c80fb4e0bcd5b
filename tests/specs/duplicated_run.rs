// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A run directory whose info file declares another run's id loads with a
//! warning and keeps its own identity.

use super::fixtures::*;
use std::io;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Shared in-memory log sink for asserting on emitted warnings.
#[derive(Clone, Default)]
struct LogSink(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn duplicated_run_directory_warns_and_loads() {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "RUN_A", "RUN_A", true);
    // Same declared id under a different directory name.
    write_run(dir.path(), "alt-name", "RUN_A", true);
    write_metadata(dir.path(), "");

    let sink = LogSink::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer({
            let sink = sink.clone();
            move || sink.clone()
        })
        .with_ansi(false)
        .finish();

    // No workers: this scenario is about discovery and identity.
    let mut proc = processor(dir.path());
    tracing::subscriber::with_default(subscriber, || {
        proc.refresh(false);
    });

    assert_eq!(proc.runs().len(), 2);
    let mut run_ids: Vec<&str> = proc.runs().iter().map(|r| r.run_id()).collect();
    run_ids.sort_unstable();
    assert_eq!(run_ids, vec!["RUN_A", "alt-name"]);

    let logs = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    let warnings = logs
        .lines()
        .filter(|l| l.contains("does not match declared run id"))
        .count();
    assert_eq!(warnings, 1, "expected exactly one mismatch warning:\n{logs}");

    // The duplicate is a distinct identity with its own status path.
    assert!(dir.path().join("status/RUN_A/0/P1.yml").is_file());
    assert!(dir.path().join("status/alt-name/0/P1.yml").is_file());
}
