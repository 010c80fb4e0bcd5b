// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-supplied tasks, declared as TOML files.
//!
//! Each `*.toml` in the configured directory defines one command task:
//!
//! ```toml
//! name = "screen"
//! order = 50
//! dependencies = ["trim"]
//! command = ["kraken2", "--db", "/db/std"]
//! ```
//!
//! The command runs with the processing directory as its working
//! directory and the task's log file as stdout/stderr. A nonzero exit
//! fails the project. Names may not collide with built-in tasks.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::registry::{RegistryError, TaskRegistry};
use crate::task::{Task, TaskOutput};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::debug;

/// Default order for user tasks: after the read-processing tasks, before
/// the manual gates and terminals.
const DEFAULT_ORDER: u32 = 50;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginDef {
    name: String,
    #[serde(default = "default_order")]
    order: u32,
    #[serde(default)]
    dependencies: Vec<String>,
    command: Vec<String>,
}

fn default_order() -> u32 {
    DEFAULT_ORDER
}

/// A task that shells out to a fixed argv.
pub struct CommandTask {
    name: String,
    argv: Vec<String>,
}

impl Task for CommandTask {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        let log = ctx.log_file(&self.name)?;
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| TaskError::Failed(format!("task {:?} has an empty command", self.name)))?;
        let status = Command::new(program)
            .args(args)
            .current_dir(ctx.proc_dir)
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log.try_clone()?))
            .status()?;
        if !status.success() {
            return Err(TaskError::Subprocess { program: program.clone(), status });
        }
        Ok(TaskOutput::new())
    }
}

/// Load every `*.toml` task definition under `dir` into the registry.
///
/// Returns the number of tasks added. A missing directory is fine; a
/// malformed definition is not.
pub fn load_plugins(registry: &mut TaskRegistry, dir: &Path) -> Result<usize, RegistryError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut added = 0;
    for path in paths {
        let text = fs::read_to_string(&path)?;
        let def: PluginDef = toml::from_str(&text).map_err(|e| RegistryError::Plugin {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        if def.command.is_empty() {
            return Err(RegistryError::Plugin {
                path: path.clone(),
                reason: "command must not be empty".into(),
            });
        }
        debug!(name = %def.name, path = %path.display(), "registering user task");
        let runner = Arc::new(CommandTask { name: def.name.clone(), argv: def.command });
        registry.register(&def.name, def.order, def.dependencies, runner)?;
        added += 1;
    }
    Ok(added)
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
