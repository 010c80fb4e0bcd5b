// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture for task tests: a populated scratch tree plus the owned
//! backing data a [`TaskContext`] borrows from.

use crate::context::{TaskContext, TaskSettings};
use crate::task::TaskOutput;
use indexmap::IndexMap;
use seqproc_core::test_support::{RecordingMailer, RecordingUploader};
use seqproc_core::FakeClock;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct ContextFixture {
    pub dir: TempDir,
    pub proc_dir: PathBuf,
    pub package_path: PathBuf,
    pub status_path: PathBuf,
    pub run_path: PathBuf,
    pub sample_sheet_path: PathBuf,
    pub experiment_csv_path: PathBuf,
    pub contacts: IndexMap<String, String>,
    pub sample_paths: IndexMap<String, Vec<PathBuf>>,
    pub requested: Vec<String>,
    pub outputs: BTreeMap<String, TaskOutput>,
    pub settings: Option<TaskSettings>,
    pub implicit: Option<String>,
    pub uploader: RecordingUploader,
    pub mailer: RecordingMailer,
    pub clock: FakeClock,
}

impl ContextFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let proc_dir = dir.path().join("processed/2018-01-01-P1-Ann-FC1");
        fs::create_dir_all(&proc_dir).unwrap();
        let run_path = dir.path().join("runs/RUN_A");
        fs::create_dir_all(&run_path).unwrap();
        fs::write(run_path.join("RunInfo.xml"), "<RunInfo/>").unwrap();
        let status_path = dir.path().join("status/RUN_A/0/P1.yml");
        fs::create_dir_all(status_path.parent().unwrap()).unwrap();
        fs::write(&status_path, "status: processing\n").unwrap();
        let sample_sheet_path = run_path.join("SampleSheetUsed.csv");
        fs::write(&sample_sheet_path, "[Header]\nExperiment_Name,Exp1\n").unwrap();
        let experiment_csv_path = dir.path().join("experiments/Exp1/metadata.csv");
        fs::create_dir_all(experiment_csv_path.parent().unwrap()).unwrap();
        fs::write(
            &experiment_csv_path,
            "Sample_Name,Project,Contacts,Tasks\nS1,P1,Ann <ann@x>,\nS2,P2,Bob <bob@x>,\n",
        )
        .unwrap();
        let package_path = dir.path().join("packaged/2018-01-01-P1-Ann-FC1.zip");

        let mut contacts = IndexMap::new();
        contacts.insert("Ann".to_string(), "ann@x".to_string());

        Self {
            dir,
            proc_dir,
            package_path,
            status_path,
            run_path,
            sample_sheet_path,
            experiment_csv_path,
            contacts,
            sample_paths: IndexMap::new(),
            requested: Vec::new(),
            outputs: BTreeMap::new(),
            settings: None,
            implicit: None,
            uploader: RecordingUploader::default(),
            mailer: RecordingMailer::default(),
            clock: FakeClock::new(),
        }
    }

    /// Write paired read files for a sample and record their paths.
    pub fn add_sample(&mut self, name: &str, num: usize, content: &[u8]) {
        let mut paths = Vec::new();
        for rp in 1..=2 {
            let path = self
                .run_path
                .join(format!("{name}_S{num}_L001_R{rp}_001.fastq.gz"));
            fs::write(&path, content).unwrap();
            paths.push(path);
        }
        self.sample_paths.insert(name.to_string(), paths);
    }

    pub fn ctx(&self) -> TaskContext<'_> {
        TaskContext {
            project: "P1",
            work_dir: "2018-01-01-P1-Ann-FC1",
            run_id: "RUN_A",
            run_path: &self.run_path,
            proc_dir: &self.proc_dir,
            package_path: &self.package_path,
            status_path: &self.status_path,
            sample_sheet_path: &self.sample_sheet_path,
            experiment_csv_path: &self.experiment_csv_path,
            contacts: &self.contacts,
            sample_paths: &self.sample_paths,
            requested_tasks: &self.requested,
            outputs: &self.outputs,
            settings: self.settings.as_ref(),
            implicit_tasks_path: self.implicit.as_deref(),
            nthreads: 1,
            uploader: &self.uploader,
            mailer: &self.mailer,
            clock: &self.clock,
        }
    }
}
