// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal handling.
//!
//! Handlers only flip atomic flags; the coordinator drains them into its
//! command handling once per cycle. A second SIGINT/SIGTERM while the
//! first is still pending exits the process immediately.

use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook::flag;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// SIGINT / SIGTERM: stop refreshing and shut down after current jobs.
    FinishUp,
    /// SIGHUP: reload all run and project state from disk.
    Reload,
    /// SIGUSR1: increase verbosity.
    MoreVerbose,
    /// SIGUSR2: decrease verbosity.
    LessVerbose,
}

#[derive(Clone, Default)]
pub struct SignalFlags {
    finish: Arc<AtomicBool>,
    reload: Arc<AtomicBool>,
    louder: Arc<AtomicBool>,
    quieter: Arc<AtomicBool>,
}

impl SignalFlags {
    /// Collect and clear the pending signal events.
    pub fn drain(&self) -> Vec<SignalEvent> {
        let mut events = Vec::new();
        if self.finish.swap(false, Ordering::SeqCst) {
            events.push(SignalEvent::FinishUp);
        }
        if self.reload.swap(false, Ordering::SeqCst) {
            events.push(SignalEvent::Reload);
        }
        if self.louder.swap(false, Ordering::SeqCst) {
            events.push(SignalEvent::MoreVerbose);
        }
        if self.quieter.swap(false, Ordering::SeqCst) {
            events.push(SignalEvent::LessVerbose);
        }
        events
    }

    /// Raise a flag as the OS handler would; for tests.
    #[cfg(test)]
    pub(crate) fn raise(&self, event: SignalEvent) {
        match event {
            SignalEvent::FinishUp => self.finish.store(true, Ordering::SeqCst),
            SignalEvent::Reload => self.reload.store(true, Ordering::SeqCst),
            SignalEvent::MoreVerbose => self.louder.store(true, Ordering::SeqCst),
            SignalEvent::LessVerbose => self.quieter.store(true, Ordering::SeqCst),
        }
    }
}

/// Register the daemon's signal handlers.
pub fn install() -> io::Result<SignalFlags> {
    let flags = SignalFlags::default();
    for sig in [SIGINT, SIGTERM] {
        // Registration order matters: the shutdown check runs first, so
        // only a second signal (flag still set) exits immediately.
        flag::register_conditional_shutdown(sig, 1, Arc::clone(&flags.finish))?;
        flag::register(sig, Arc::clone(&flags.finish))?;
    }
    flag::register(SIGHUP, Arc::clone(&flags.reload))?;
    flag::register(SIGUSR1, Arc::clone(&flags.louder))?;
    flag::register(SIGUSR2, Arc::clone(&flags.quieter))?;
    Ok(flags)
}
