// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! seqprocd: the seqproc daemon binary.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use seqproc_daemon::{logging, Config, Processor};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "seqprocd", about = "Process sequencer runs", version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "/etc/seqproc.yml")]
    config: PathBuf,

    /// Program action
    #[arg(short, long, value_enum, default_value_t = Action::Report)]
    action: Action,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Action {
    /// Watch and process, waiting out each cycle
    Process,
    /// Load everything once and print the status report
    Report,
    /// Watch and process continuously
    Daemon,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log = logging::init(i32::from(cli.verbose) - i32::from(cli.quiet));
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    match cli.action {
        Action::Report => {
            let max_width = config
                .save_report
                .as_ref()
                .map(|r| r.max_width)
                .unwrap_or(60);
            let mut processor = Processor::new(config).context("initializing processor")?;
            processor.load(false);
            processor
                .report(std::io::stdout().lock(), max_width)
                .context("writing report")?;
        }
        Action::Process | Action::Daemon => {
            let poll = Duration::from_secs(config.process.poll);
            let wait = config.process.wait;
            let mut processor = Processor::new(config).context("initializing processor")?;
            processor.set_log_handle(log);
            processor.watch_and_process(poll, wait);
        }
    }
    Ok(())
}
