// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task registry.
//!
//! Every runnable task is registered here with its name, execution order,
//! and direct dependencies. The built-in table is installed at
//! construction; user-supplied command tasks are added from a plugin
//! directory. `verify` is called once at daemon startup and any
//! inconsistency (unknown dependency, cycle, duplicate name) is fatal.

use crate::task::Task;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate task name {0:?}")]
    DuplicateTask(String),

    #[error("task {task:?} depends on unknown task {dep:?}")]
    UnknownDependency { task: String, dep: String },

    #[error("task dependency cycle: {0}")]
    CyclicTaskGraph(String),

    #[error("bad task definition {path}: {reason}")]
    Plugin { path: PathBuf, reason: String },

    #[error("io error reading task definitions: {0}")]
    Io(#[from] std::io::Error),
}

/// A registered task: order, direct dependencies, and the implementation.
pub struct TaskEntry {
    pub order: u32,
    pub deps: Vec<String>,
    runner: Arc<dyn Task>,
}

impl TaskEntry {
    pub fn runner(&self) -> Arc<dyn Task> {
        Arc::clone(&self.runner)
    }
}

pub struct TaskRegistry {
    entries: BTreeMap<String, TaskEntry>,
}

impl TaskRegistry {
    /// Registry holding only the built-in tasks.
    pub fn builtin() -> Self {
        let mut registry = Self { entries: BTreeMap::new() };
        crate::builtin::install(&mut registry);
        registry
    }

    /// Insert without a duplicate check; for the built-in table only.
    pub(crate) fn insert(
        &mut self,
        name: &str,
        order: u32,
        deps: &[&str],
        runner: Arc<dyn Task>,
    ) {
        self.entries.insert(
            name.to_string(),
            TaskEntry { order, deps: deps.iter().map(|d| d.to_string()).collect(), runner },
        );
    }

    /// Register an additional task; duplicate names are rejected.
    pub fn register(
        &mut self,
        name: &str,
        order: u32,
        deps: Vec<String>,
        runner: Arc<dyn Task>,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(name) {
            return Err(RegistryError::DuplicateTask(name.to_string()));
        }
        self.entries.insert(name.to_string(), TaskEntry { order, deps, runner });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TaskEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Check that every dependency exists and the graph is acyclic.
    pub fn verify(&self) -> Result<(), RegistryError> {
        for (name, entry) in &self.entries {
            for dep in &entry.deps {
                if !self.entries.contains_key(dep) {
                    return Err(RegistryError::UnknownDependency {
                        task: name.clone(),
                        dep: dep.clone(),
                    });
                }
            }
        }
        // Depth-first walk with an explicit in-progress set.
        let mut done: Vec<&str> = Vec::new();
        for name in self.entries.keys() {
            let mut trail: Vec<&str> = Vec::new();
            self.walk(name, &mut trail, &mut done)?;
        }
        Ok(())
    }

    fn walk<'a>(
        &'a self,
        name: &'a str,
        trail: &mut Vec<&'a str>,
        done: &mut Vec<&'a str>,
    ) -> Result<(), RegistryError> {
        if done.contains(&name) {
            return Ok(());
        }
        if trail.contains(&name) {
            let mut cycle: Vec<&str> = trail.clone();
            cycle.push(name);
            return Err(RegistryError::CyclicTaskGraph(cycle.join(" -> ")));
        }
        trail.push(name);
        if let Some(entry) = self.entries.get(name) {
            for dep in &entry.deps {
                self.walk(dep, trail, done)?;
            }
        }
        trail.pop();
        done.push(name);
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
