// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contact-string parsing for experiment metadata.
//!
//! Contact columns look like `"Ann Smith <ann@example.com>; bob@lab.gov"`.
//! Full address-grammar parsing is a rabbit hole; this accepts the two
//! shapes that actually occur in the spreadsheets.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

fn named_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::unwrap_used)] // literal pattern
    RE.get_or_init(|| Regex::new(r"^\s*([\w ]*\w)\s*<(.*@.*)>\s*$").unwrap())
}

/// Parse a contact string into an ordered name → email map.
///
/// Chunks are separated by `,` or `;`. A chunk either matches
/// `Name <email>`, or is taken as a bare address whose local part becomes
/// the name. Empty chunks are skipped.
pub fn parse_contacts(text: &str) -> IndexMap<String, String> {
    let mut contacts = IndexMap::new();
    for chunk in text.split([',', ';']) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        if let Some(caps) = named_re().captures(chunk) {
            contacts.insert(caps[1].to_string(), caps[2].to_string());
        } else if let Some((local, _domain)) = chunk.split_once('@') {
            contacts.insert(local.to_string(), chunk.to_string());
        }
        // Chunks with no '@' at all carry no address; drop them.
    }
    contacts
}

/// First names of the given contacts, hyphen-joined, in map order.
///
/// `{"Ann Smith": ..., "Bob": ...}` becomes `"Ann-Bob"`. Used as a
/// component of work-directory names.
pub fn first_names(contacts: &IndexMap<String, String>) -> String {
    contacts
        .keys()
        .filter_map(|name| name.split_whitespace().next())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[path = "contacts_tests.rs"]
mod tests;
