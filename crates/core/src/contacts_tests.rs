// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn pairs(text: &str) -> Vec<(String, String)> {
    parse_contacts(text).into_iter().collect()
}

#[test]
fn named_contact() {
    assert_eq!(
        pairs("Ann Smith <ann@example.com>"),
        vec![("Ann Smith".to_string(), "ann@example.com".to_string())]
    );
}

#[test]
fn bare_address_uses_local_part() {
    assert_eq!(pairs("bob@lab.gov"), vec![("bob".to_string(), "bob@lab.gov".to_string())]);
}

#[test]
fn mixed_separators() {
    let got = pairs("Ann Smith <ann@example.com>, bob@lab.gov; Cy <cy@x.org>");
    assert_eq!(
        got,
        vec![
            ("Ann Smith".to_string(), "ann@example.com".to_string()),
            ("bob".to_string(), "bob@lab.gov".to_string()),
            ("Cy".to_string(), "cy@x.org".to_string()),
        ]
    );
}

#[yare::parameterized(
    empty        = { "" },
    separators   = { ",;," },
    no_address   = { "just words" },
)]
fn degenerate_inputs_yield_nothing(text: &str) {
    assert!(parse_contacts(text).is_empty());
}

#[test]
fn duplicate_name_keeps_last_address() {
    let got = pairs("Ann <a@x>, Ann <b@x>");
    assert_eq!(got, vec![("Ann".to_string(), "b@x".to_string())]);
}

#[test]
fn first_names_joins_in_order() {
    let contacts = parse_contacts("Ann Smith <ann@x>, Bob Jones <bob@x>");
    assert_eq!(first_names(&contacts), "Ann-Bob");
}

#[test]
fn first_names_empty_map() {
    assert_eq!(first_names(&IndexMap::new()), "");
}
