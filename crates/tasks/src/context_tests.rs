// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::test_fixtures::ContextFixture;
use std::path::Path;

#[test]
fn log_path_under_logs_dir() {
    let fx = ContextFixture::new();
    let ctx = fx.ctx();
    assert_eq!(ctx.log_path("trim"), fx.proc_dir.join("logs/log_trim.txt"));
}

#[test]
fn log_file_creates_parent() {
    let fx = ContextFixture::new();
    let ctx = fx.ctx();
    ctx.log_file("merge").unwrap();
    assert!(fx.proc_dir.join("logs/log_merge.txt").is_file());
}

#[test]
fn task_dir_parent_defaults_to_proc_dir() {
    let fx = ContextFixture::new();
    let ctx = fx.ctx();
    assert_eq!(ctx.task_dir_parent("trim"), fx.proc_dir);
}

#[test]
fn implicit_tasks_go_to_subdir() {
    let mut fx = ContextFixture::new();
    fx.implicit = Some("implicit".to_string());
    fx.requested = vec!["assemble".to_string()];
    let ctx = fx.ctx();
    // assemble was requested, its dependency trim was not
    assert_eq!(ctx.task_dir_parent("assemble"), fx.proc_dir);
    assert_eq!(ctx.task_dir_parent("trim"), fx.proc_dir.join("implicit"));
}

#[test]
fn read_path_r1only_drops_read_number() {
    let fx = ContextFixture::new();
    let ctx = fx.ctx();
    let out = ctx
        .read_path(Path::new("S1_S1_L001_R1_001.fastq.gz"), "merge", "PairedReads", ".merged.fastq", true)
        .unwrap();
    assert_eq!(out, fx.proc_dir.join("PairedReads/S1_S1_L001_R_001.merged.fastq"));
}

#[test]
fn read_path_keeps_read_number() {
    let fx = ContextFixture::new();
    let ctx = fx.ctx();
    let out = ctx
        .read_path(Path::new("S1_S1_L001_R2_001.fastq.gz"), "trim", "trimmed", ".trimmed.fastq", false)
        .unwrap();
    assert_eq!(out, fx.proc_dir.join("trimmed/S1_S1_L001_R2_001.trimmed.fastq"));
}

#[test]
fn read_path_passes_other_names_through() {
    let fx = ContextFixture::new();
    let ctx = fx.ctx();
    let out = ctx.read_path(Path::new("notes.txt"), "trim", "trimmed", ".x", true).unwrap();
    assert_eq!(out, fx.proc_dir.join("trimmed/notes.txt"));
}

#[test]
fn settings_accessors() {
    let mut fx = ContextFixture::new();
    let mut settings = crate::context::TaskSettings::new();
    settings.insert("timeout".into(), serde_yaml::Value::from(30u64));
    settings.insert("exe".into(), serde_yaml::Value::from("cutadapt-3"));
    settings.insert("mandatory".into(), serde_yaml::Value::from(true));
    fx.settings = Some(settings);
    let ctx = fx.ctx();
    assert_eq!(ctx.setting_u64("timeout", 5), 30);
    assert_eq!(ctx.setting_u64("absent", 5), 5);
    assert_eq!(ctx.setting_str("exe"), Some("cutadapt-3"));
    assert!(ctx.setting_bool("mandatory", false));
}
