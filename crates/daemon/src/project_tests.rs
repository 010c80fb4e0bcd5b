// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use seqproc_core::test_support::{RecordingMailer, RecordingUploader};
use seqproc_core::SystemClock;
use seqproc_illumina::RunOptions;
use tempfile::TempDir;

const SHEET: &str = "\
[Header]
Experiment_Name,Exp1
[Reads]
151
151
[Data]
Sample_ID,Sample_Name
1,S1
2,S2
";

struct Fixture {
    dir: TempDir,
    run: Run,
    env: Arc<ProjectEnv>,
    uploader: Arc<RecordingUploader>,
    mailer: Arc<RecordingMailer>,
}

fn run_info_xml(run_id: &str) -> String {
    format!(
        r#"<RunInfo><Run Id="{run_id}"><Flowcell>FC1</Flowcell><Instrument>M05588</Instrument></Run></RunInfo>"#
    )
}

/// Complete MiSeq run plus an experiment spreadsheet and output roots.
fn fixture(metadata: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let run_dir = dir.path().join("runs/RUN_A");
    let basecalls = run_dir.join("Data/Intensities/BaseCalls");
    let alignment = basecalls.join("Alignment1");
    fs::create_dir_all(&alignment).unwrap();
    fs::write(run_dir.join("RunInfo.xml"), run_info_xml("RUN_A")).unwrap();
    fs::write(run_dir.join("RTAComplete.txt"), "11/2/2017,03:08:24.972,Illumina RTA 1.18.54\n")
        .unwrap();
    fs::write(alignment.join("SampleSheetUsed.csv"), SHEET).unwrap();
    fs::write(alignment.join("Checkpoint.txt"), "3").unwrap();
    for name in [
        "S1_S1_L001_R1_001.fastq.gz",
        "S1_S1_L001_R2_001.fastq.gz",
        "S2_S2_L001_R1_001.fastq.gz",
        "S2_S2_L001_R2_001.fastq.gz",
    ] {
        fs::write(basecalls.join(name), b"").unwrap();
    }

    let exp_dir = dir.path().join("experiments/Exp1");
    fs::create_dir_all(&exp_dir).unwrap();
    fs::write(exp_dir.join("metadata.csv"), metadata).unwrap();

    let mut run = Run::open(&run_dir, RunOptions::default()).unwrap();
    let newly = run.refresh(&SystemClock).unwrap();
    assert_eq!(newly, vec![0]);

    let uploader = Arc::new(RecordingUploader::default());
    let mailer = Arc::new(RecordingMailer::default());
    let env = Arc::new(ProjectEnv {
        experiments_root: dir.path().join("experiments"),
        status_root: dir.path().join("status"),
        processed_root: dir.path().join("processed"),
        packaged_root: dir.path().join("packaged"),
        readonly: false,
        nthreads_per_project: 1,
        implicit_tasks_path: None,
        tasks_settings: BTreeMap::new(),
        registry: Arc::new(TaskRegistry::builtin()),
        uploader: Arc::clone(&uploader) as Arc<dyn Uploader>,
        mailer: Arc::clone(&mailer) as Arc<dyn Mailer>,
        clock: Arc::new(SystemClock),
    });
    Fixture { dir, run, env, uploader, mailer }
}

const BASIC_METADATA: &str = "\
Sample_Name,Project,Contacts,Tasks
S1,P1,Ann Smith <ann@x.org>,
S2,P1,Ann Smith <ann@x.org>,
";

#[test]
fn builds_one_project_per_name() {
    let fx = fixture(BASIC_METADATA);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    assert_eq!(projects.len(), 1);
    let project = projects[0].lock();
    assert_eq!(project.name(), "P1");
    assert_eq!(project.work_dir(), "2017-11-02-P1-Ann-FC1");
    assert_eq!(project.status(), ProjectStatus::None);
    assert!(!project.readonly());
    assert_eq!(project.n_samples(), 2);
    assert_eq!(project.n_files(), 4);
}

#[test]
fn default_task_list_is_resolved() {
    let fx = fixture(BASIC_METADATA);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let project = projects[0].lock();
    assert_eq!(
        project.record().task_status.pending,
        vec!["copy", "metadata", "package", "upload", "email"]
    );
}

#[test]
fn initial_status_file_is_written() {
    let fx = fixture(BASIC_METADATA);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let project = projects[0].lock();
    let expected = fx.dir.path().join("status/RUN_A/0/P1.yml");
    assert_eq!(project.status_path(), expected);
    assert!(expected.is_file());
}

#[test]
fn no_metadata_spreadsheet_yields_no_projects() {
    let fx = fixture(BASIC_METADATA);
    fs::remove_file(fx.dir.path().join("experiments/Exp1/metadata.csv")).unwrap();
    assert!(projects_from_analysis(&fx.run, 0, &fx.env).is_empty());
}

#[test]
fn groups_by_project_name() {
    let metadata = "\
Sample_Name,Project,Contacts,Tasks
S1,P1,Ann <ann@x.org>,
S2,P2,Bob <bob@x.org>,trim
";
    let fx = fixture(metadata);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    assert_eq!(projects.len(), 2);
    let p2 = projects[1].lock();
    assert_eq!(p2.name(), "P2");
    assert_eq!(
        p2.record().task_status.pending,
        vec!["trim", "metadata", "package", "upload", "email"]
    );
}

#[test]
fn unknown_requested_task_fails_the_project_only() {
    let metadata = "\
Sample_Name,Project,Contacts,Tasks
S1,P1,Ann <ann@x.org>,frobnicate
S2,P2,Bob <bob@x.org>,
";
    let fx = fixture(metadata);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    assert_eq!(projects.len(), 2);
    let p1 = projects[0].lock();
    assert_eq!(p1.status(), ProjectStatus::Failed);
    assert!(p1.record().failure_exception.as_deref().unwrap().contains("frobnicate"));
    assert_eq!(projects[1].lock().status(), ProjectStatus::None);
}

#[test]
fn project_with_no_sheet_samples_fails() {
    let metadata = "\
Sample_Name,Project,Contacts,Tasks
S9,P1,Ann <ann@x.org>,
";
    let fx = fixture(metadata);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let project = projects[0].lock();
    assert_eq!(project.status(), ProjectStatus::Failed);
}

#[test]
fn missing_fastq_fails_at_construction() {
    let fx = fixture(BASIC_METADATA);
    fs::remove_file(
        fx.dir
            .path()
            .join("runs/RUN_A/Data/Intensities/BaseCalls/S2_S2_L001_R2_001.fastq.gz"),
    )
    .unwrap();
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let project = projects[0].lock();
    assert_eq!(project.status(), ProjectStatus::Failed);
    assert!(project.record().failure_exception.as_deref().unwrap().contains("fastq"));
}

#[test]
fn existing_status_file_makes_the_project_read_only() {
    let fx = fixture(BASIC_METADATA);
    drop(projects_from_analysis(&fx.run, 0, &fx.env));
    // Second construction sees the first one's status file.
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let project = projects[0].lock();
    assert!(project.readonly());
}

#[test]
fn readonly_env_makes_projects_read_only() {
    let fx = fixture(BASIC_METADATA);
    let env = ProjectEnv {
        experiments_root: fx.env.experiments_root.clone(),
        status_root: fx.env.status_root.clone(),
        processed_root: fx.env.processed_root.clone(),
        packaged_root: fx.env.packaged_root.clone(),
        readonly: true,
        nthreads_per_project: 1,
        implicit_tasks_path: None,
        tasks_settings: BTreeMap::new(),
        registry: Arc::clone(&fx.env.registry),
        uploader: Arc::clone(&fx.env.uploader),
        mailer: Arc::clone(&fx.env.mailer),
        clock: Arc::clone(&fx.env.clock),
    };
    let projects = projects_from_analysis(&fx.run, 0, &Arc::new(env));
    let project = projects[0].lock();
    assert!(project.readonly());
    // Read-only construction writes nothing.
    assert!(!project.status_path().exists());
}

#[test]
fn populated_scratch_dir_makes_the_project_read_only() {
    let fx = fixture(BASIC_METADATA);
    let scratch = fx.dir.path().join("processed/2017-11-02-P1-Ann-FC1");
    fs::create_dir_all(&scratch).unwrap();
    fs::write(scratch.join("leftover.txt"), b"x").unwrap();
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    assert!(projects[0].lock().readonly());
}

#[test]
fn process_runs_the_default_pipeline() {
    let fx = fixture(BASIC_METADATA);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let mut project = projects[0].lock();
    project.process().unwrap();

    assert_eq!(project.status(), ProjectStatus::Complete);
    let ts = &project.record().task_status;
    assert!(ts.pending.is_empty());
    assert!(ts.current.is_empty());
    assert_eq!(ts.completed, vec!["copy", "metadata", "package", "upload", "email"]);

    // Collaborators were exercised and their results recorded.
    assert_eq!(fx.uploader.calls.lock().len(), 1);
    assert_eq!(fx.mailer.sent.lock().len(), 1);
    let url = project.record().task_output.get("upload").unwrap().get("url").unwrap();
    assert!(url.starts_with("https://"));

    // On-disk artifacts from the leaf tasks.
    assert!(project.proc_dir().join("RUN_A/RunInfo.xml").is_file());
    assert!(project.proc_dir().join("Metadata/metadata.csv").is_file());
    assert!(fx.dir.path().join("packaged/2017-11-02-P1-Ann-FC1.zip").is_file());

    // The durable record agrees.
    let saved = crate::status::load(project.status_path()).unwrap().unwrap();
    assert_eq!(saved.status, ProjectStatus::Complete);
    assert_eq!(&saved, project.record());
}

#[test]
fn failing_task_marks_failed_and_propagates() {
    let metadata = "\
Sample_Name,Project,Contacts,Tasks
S1,P1,Ann <ann@x.org>,fail
";
    let fx = fixture(metadata);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let mut project = projects[0].lock();
    let err = project.process().unwrap_err();
    assert!(matches!(err, ProjectError::Task { ref task, .. } if task == "fail"));

    assert_eq!(project.status(), ProjectStatus::Failed);
    let ts = &project.record().task_status;
    assert_eq!(ts.current, "fail");
    assert!(ts.completed.is_empty());
    assert!(project.record().failure_exception.is_some());

    let saved = crate::status::load(project.status_path()).unwrap().unwrap();
    assert_eq!(saved.status, ProjectStatus::Failed);
    assert_eq!(saved.task_status.current, "fail");
}

#[test]
fn process_on_read_only_project_errors() {
    let fx = fixture(BASIC_METADATA);
    drop(projects_from_analysis(&fx.run, 0, &fx.env));
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let mut project = projects[0].lock();
    assert!(matches!(project.process(), Err(ProjectError::ReadOnly(_))));
}

#[test]
fn process_on_failed_project_errors() {
    let metadata = "\
Sample_Name,Project,Contacts,Tasks
S9,P1,Ann <ann@x.org>,
";
    let fx = fixture(metadata);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let mut project = projects[0].lock();
    assert!(matches!(project.process(), Err(ProjectError::AlreadyFailed(_))));
}

#[test]
fn task_sets_partition_the_resolved_list() {
    let fx = fixture(BASIC_METADATA);
    let projects = projects_from_analysis(&fx.run, 0, &fx.env);
    let resolved = projects[0].lock().record().task_status.pending.clone();
    {
        let mut project = projects[0].lock();
        project.process().unwrap();
    }
    let project = projects[0].lock();
    let ts = &project.record().task_status;
    let mut union: Vec<String> = ts.pending.clone();
    if !ts.current.is_empty() {
        union.push(ts.current.clone());
    }
    union.extend(ts.completed.iter().cloned());
    assert_eq!(union, resolved);
}
