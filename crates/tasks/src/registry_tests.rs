// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::builtin::Noop;
use crate::resolver::{TASK_DEFAULTS, TASK_NULL};

#[test]
fn builtin_table_is_consistent() {
    let registry = TaskRegistry::builtin();
    registry.verify().unwrap();
}

#[test]
fn builtin_contains_defaults_and_null() {
    let registry = TaskRegistry::builtin();
    for name in TASK_DEFAULTS.iter().chain(TASK_NULL) {
        assert!(registry.contains(name), "missing builtin {name:?}");
    }
}

#[test]
fn builtin_orders_put_terminals_last() {
    let registry = TaskRegistry::builtin();
    let trim = registry.get("trim").unwrap().order;
    let metadata = registry.get("metadata").unwrap().order;
    let email = registry.get("email").unwrap().order;
    assert!(trim < metadata);
    assert!(metadata < email);
}

#[test]
fn register_rejects_duplicates() {
    let mut registry = TaskRegistry::builtin();
    let err = registry
        .register("copy", 5, Vec::new(), Arc::new(Noop))
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateTask(name) if name == "copy"));
}

#[test]
fn verify_rejects_unknown_dependency() {
    let mut registry = TaskRegistry::builtin();
    registry
        .register("screen", 50, vec!["nonexistent".to_string()], Arc::new(Noop))
        .unwrap();
    let err = registry.verify().unwrap_err();
    assert!(matches!(err, RegistryError::UnknownDependency { task, dep }
        if task == "screen" && dep == "nonexistent"));
}

#[test]
fn verify_rejects_cycles() {
    let mut registry = TaskRegistry::builtin();
    registry.register("a", 50, vec!["b".to_string()], Arc::new(Noop)).unwrap();
    registry.register("b", 51, vec!["a".to_string()], Arc::new(Noop)).unwrap();
    let err = registry.verify().unwrap_err();
    assert!(matches!(err, RegistryError::CyclicTaskGraph(_)));
}

#[test]
fn verify_accepts_diamonds() {
    let mut registry = TaskRegistry::builtin();
    registry.register("left", 20, vec!["trim".to_string()], Arc::new(Noop)).unwrap();
    registry.register("right", 21, vec!["trim".to_string()], Arc::new(Noop)).unwrap();
    registry
        .register(
            "join",
            22,
            vec!["left".to_string(), "right".to_string()],
            Arc::new(Noop),
        )
        .unwrap();
    registry.verify().unwrap();
}

#[test]
fn names_are_sorted() {
    let registry = TaskRegistry::builtin();
    let names: Vec<&str> = registry.names().collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}
