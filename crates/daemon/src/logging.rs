// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup with a runtime-adjustable level.
//!
//! The level ladder runs OFF → ERROR → WARN → INFO → DEBUG → TRACE.
//! `-v` / `-q` shift the starting point from WARN; SIGUSR1 / SIGUSR2
//! shift it while the daemon runs.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::OFF,
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

/// Index of WARN, the default level.
const BASE: i32 = 2;

fn clamp(idx: i32) -> usize {
    idx.clamp(0, LEVELS.len() as i32 - 1) as usize
}

/// Handle for shifting the active log level.
#[derive(Clone)]
pub struct LogHandle {
    handle: reload::Handle<LevelFilter, Registry>,
    level: Arc<AtomicI32>,
}

impl LogHandle {
    /// Shift verbosity by `steps` (positive = more verbose).
    pub fn shift(&self, steps: i32) {
        let current = self.level.load(Ordering::Relaxed);
        let next = clamp(current + steps);
        self.level.store(next as i32, Ordering::Relaxed);
        warn!(from = %LEVELS[clamp(current)], to = %LEVELS[next], "changing log level");
        if let Err(err) = self.handle.modify(|filter| *filter = LEVELS[next]) {
            warn!("failed to update log level: {err}");
        }
    }

    pub fn current(&self) -> LevelFilter {
        LEVELS[clamp(self.level.load(Ordering::Relaxed))]
    }
}

/// Install the global subscriber.
///
/// `verbosity` shifts the starting level from WARN (one step per `-v`,
/// minus one per `-q`). Re-initialization (as happens across tests) is
/// tolerated; the returned handle then controls only the first-installed
/// subscriber.
pub fn init(verbosity: i32) -> LogHandle {
    let idx = clamp(BASE + verbosity);
    let (filter, handle) = reload::Layer::new(LEVELS[idx]);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    LogHandle { handle, level: Arc::new(AtomicI32::new(idx as i32)) }
}
