// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn entry(run_id: &str, alignment: Option<usize>, project: &str) -> ReportEntry {
    ReportEntry {
        run_id: run_id.to_string(),
        run_path: format!("/runs/{run_id}"),
        alignment,
        project: project.to_string(),
        ..ReportEntry::default()
    }
}

#[test]
fn sorts_by_run_alignment_project() {
    let mut entries = vec![
        entry("RUN_B", Some(0), "P1"),
        entry("RUN_A", Some(1), "P1"),
        entry("RUN_A", Some(0), "P2"),
        entry("RUN_A", Some(0), "P1"),
        entry("RUN_A", None, ""),
    ];
    sort_entries(&mut entries);
    let keys: Vec<(String, Option<usize>, String)> = entries
        .iter()
        .map(|e| (e.run_id.clone(), e.alignment, e.project.clone()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("RUN_A".into(), None, "".into()),
            ("RUN_A".into(), Some(0), "P1".into()),
            ("RUN_A".into(), Some(0), "P2".into()),
            ("RUN_A".into(), Some(1), "P1".into()),
            ("RUN_B".into(), Some(0), "P1".into()),
        ]
    );
}

#[test]
fn writes_header_and_rows() {
    let entries = vec![ReportEntry {
        run_id: "RUN_A".into(),
        run_path: "/runs/RUN_A".into(),
        alignment: Some(0),
        experiment: "Exp1".into(),
        align_complete: Some(true),
        project: "P1".into(),
        work_dir: "2018-01-01-P1-Ann-FC1".into(),
        status: "complete".into(),
        n_samples: Some(2),
        n_files: Some(4),
        group: "completed".into(),
    }];
    let mut out = Vec::new();
    write_report(&mut out, &entries, 0).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "RunId,RunPath,Alignment,Experiment,AlignComplete,Project,WorkDir,Status,NSamples,NFiles,Group"
    );
    assert_eq!(
        lines.next().unwrap(),
        "RUN_A,/runs/RUN_A,0,Exp1,true,P1,2018-01-01-P1-Ann-FC1,complete,2,4,completed"
    );
    assert!(lines.next().is_none());
}

#[test]
fn empty_optional_columns_render_blank() {
    let entries = vec![entry("RUN_A", None, "")];
    let mut out = Vec::new();
    write_report(&mut out, &entries, 0).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().nth(1).unwrap().starts_with("RUN_A,/runs/RUN_A,,,,"));
}

#[yare::parameterized(
    disabled   = { 0, "abcdefghij" },
    wide       = { 60, "abcdefghij" },
    exact      = { 10, "abcdefghij" },
)]
fn truncate_leaves_short_fields_alone(max_width: usize, field: &str) {
    assert_eq!(truncate(field, max_width), field);
}

#[test]
fn truncate_adds_ellipsis() {
    assert_eq!(truncate("abcdefghijk", 10), "abcdefg...");
}
