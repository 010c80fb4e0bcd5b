// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolve a project's requested task set into the list that runs.

use crate::registry::TaskRegistry;
use std::collections::BTreeSet;
use thiserror::Error;

/// Substituted when a project requests no tasks at all.
pub const TASK_NULL: &[&str] = &["copy"];

/// Terminal tasks always appended to the requested set.
pub const TASK_DEFAULTS: &[&str] = &["metadata", "package", "upload", "email"];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown task {0:?}")]
pub struct UnknownTask(pub String);

/// Compute the effective task list for a project.
///
/// The requested set (or [`TASK_NULL`] if empty) is unioned with
/// [`TASK_DEFAULTS`], closed over direct dependencies transitively,
/// deduplicated, and ordered by `(order, name)` — the name tie-break keeps
/// the result stable across runs.
pub fn resolve(registry: &TaskRegistry, requested: &[String]) -> Result<Vec<String>, UnknownTask> {
    let mut pending: Vec<String> = if requested.is_empty() {
        TASK_NULL.iter().map(|t| t.to_string()).collect()
    } else {
        requested.to_vec()
    };
    pending.extend(TASK_DEFAULTS.iter().map(|t| t.to_string()));

    let mut selected: BTreeSet<String> = BTreeSet::new();
    while let Some(name) = pending.pop() {
        let entry = registry.get(&name).ok_or_else(|| UnknownTask(name.clone()))?;
        if selected.insert(name) {
            pending.extend(entry.deps.iter().cloned());
        }
    }

    let mut tasks: Vec<String> = selected.into_iter().collect();
    tasks.sort_by_key(|name| {
        (registry.get(name).map(|e| e.order).unwrap_or(u32::MAX), name.clone())
    });
    Ok(tasks)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
