// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slugify strings for use in file and directory names.

/// Replace every character outside `[A-Za-z0-9-_]` with an underscore.
///
/// Case is preserved: project names show up in work-directory names and in
/// status filenames, and operators grep for them as written in the
/// spreadsheet.
pub fn slugify(input: &str) -> String {
    input
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
