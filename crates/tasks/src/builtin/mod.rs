// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in tasks.
//!
//! Orders are spaced so user tasks can slot in between: raw handling in
//! the single digits, read processing in the tens, manual gates around
//! 100, and the terminal packaging/delivery tasks from 1000 up.

mod assemble;
mod copy;
mod email;
mod fail;
mod geneious;
mod manual;
mod merge;
mod metadata;
mod noop;
mod package;
mod trim;
mod upload;

pub use assemble::Assemble;
pub use copy::CopyRun;
pub use email::Email;
pub use fail::Fail;
pub use geneious::Geneious;
pub use manual::Manual;
pub use merge::Merge;
pub use metadata::Metadata;
pub use noop::Noop;
pub use package::Package;
pub use trim::Trim;
pub use upload::Upload;

use crate::registry::TaskRegistry;
use std::sync::Arc;

/// Install the built-in task table.
pub(crate) fn install(registry: &mut TaskRegistry) {
    registry.insert("noop", 0, &[], Arc::new(Noop));
    registry.insert("fail", 1, &[], Arc::new(Fail));
    registry.insert("copy", 2, &[], Arc::new(CopyRun));
    registry.insert("trim", 10, &[], Arc::new(Trim));
    registry.insert("merge", 11, &["trim"], Arc::new(Merge));
    registry.insert("assemble", 13, &["merge"], Arc::new(Assemble));
    registry.insert("manual", 100, &[], Arc::new(Manual));
    registry.insert("geneious", 101, &["assemble"], Arc::new(Geneious));
    registry.insert("metadata", 1000, &[], Arc::new(Metadata));
    registry.insert("package", 1001, &["metadata"], Arc::new(Package));
    registry.insert("upload", 1002, &["package"], Arc::new(Upload));
    registry.insert("email", 1003, &["upload"], Arc::new(Email));
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
