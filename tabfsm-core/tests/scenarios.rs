//! End-to-end scenarios against compiled tables.

use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use tabfsm_core::{CompileOptions, CompiledTable, Machine};

fn machine(table: serde_json::Value) -> Machine {
    CompiledTable::from_json(&table, CompileOptions::default())
        .unwrap()
        .machine()
}

#[test]
fn turnstile() {
    let mut turnstile = machine(json!({
        "locked": {"coin": "unlocked", "push": "locked"},
        "unlocked": {"push": "locked", "coin": "unlocked"}
    }));

    let origins = Rc::new(RefCell::new(Vec::new()));
    let destinations = Rc::new(RefCell::new(Vec::new()));
    {
        let origins = Rc::clone(&origins);
        let destinations = Rc::clone(&destinations);
        turnstile.on("update", move |n| {
            let args = n.args();
            origins.borrow_mut().push(args[0].to_string());
            destinations.borrow_mut().push(args[1].to_string());
        });
    }

    for input in ["push", "coin", "coin", "push", "push"] {
        turnstile.transition(input);
    }

    assert_eq!(
        *origins.borrow(),
        vec!["locked", "locked", "unlocked", "unlocked", "locked"]
    );
    assert_eq!(
        *destinations.borrow(),
        vec!["locked", "unlocked", "unlocked", "locked", "locked"]
    );
    assert_eq!(turnstile.state(), "locked");
}

#[test]
fn nice_word_recognizer() {
    let mut m = machine(json!({
        "initial": {"n": "n", "_": "initial"},
        "n": {"i": "ni", "_": "initial"},
        "ni": {"c": "nic", "_": "initial"},
        "nic": {"e": "nice"},
        "nice": {"_": "nice"}
    }));

    for input in ["n", "i", "c", "e"] {
        m.transition(input);
    }
    assert_eq!(m.state(), "nice");

    m.transition("x");
    assert_eq!(m.state(), "nice");
}

#[test]
fn nice_word_recognizer_resets_on_wrong_letter() {
    let mut m = machine(json!({
        "initial": {"n": "n", "_": "initial"},
        "n": {"i": "ni", "_": "initial"},
        "ni": {"c": "nic", "_": "initial"}
    }));

    m.transition("n");
    m.transition("x");
    assert_eq!(m.state(), "initial");
}

#[test]
fn underscore_catches_all() {
    let mut m = machine(json!({
        "initial": {"_": "b"},
        "b": {"initial": "initial"}
    }));
    m.transition("z");
    assert_eq!(m.state(), "b");
}

#[test]
fn catch_all_is_evaluated_last() {
    let mut m = machine(json!({
        "initial": {"_": "baz", "a": "foo"},
        "baz": {"_": "initial"},
        "foo": {"_": "initial"}
    }));
    m.transition("a");
    assert_ne!(m.state(), "baz");
    assert_eq!(m.state(), "foo");
}

#[test]
fn regular_expressions() {
    let mut m = machine(json!({
        "lowerCase": {"/[a-z]/": "lowerCase", "/[A-Z]/": "upperCase"},
        "upperCase": {"/[a-z]/": "lowerCase", "/[A-Z]/": "upperCase"}
    }));

    m.transition("a");
    m.transition("K");
    assert_eq!(m.state(), "upperCase");
    m.transition("a");
    assert_eq!(m.state(), "lowerCase");
}

#[test]
fn double_quote_input() {
    let mut m = machine(json!({"initial": {"\"": "doubleQuote"}, "doubleQuote": {}}));
    m.transition("\"");
    assert_eq!(m.state(), "doubleQuote");
}

#[test]
fn single_quote_input() {
    let mut m = machine(json!({"initial": {"'": "single quote"}, "single quote": {}}));
    m.transition("'");
    assert_eq!(m.state(), "single quote");
}

#[test]
fn backslash_input() {
    let mut m = machine(json!({"initial": {"\\": "backslash"}, "backslash": {}}));
    m.transition("\\");
    assert_eq!(m.state(), "backslash");
}

#[test]
fn unknown_target_leaves_state_unchanged_on_unmatched_input() {
    let mut m = machine(json!({"initial": {"a": "c"}}));
    assert_eq!(m.state(), "initial");
    m.transition("z");
    assert_eq!(m.state(), "initial");
}

#[test]
fn yaml_table_behaves_like_json() {
    let yaml = r#"
locked:
  - [coin, unlocked]
  - [push, locked]
unlocked:
  - [push, locked]
  - ["/^co/i", unlocked]
"#;
    let table = tabfsm_core::TransitionTable::from_yaml_str(yaml).unwrap();
    let compiled = CompiledTable::compile(&table, CompileOptions::default()).unwrap();
    let mut m = compiled.machine();

    m.transition("coin");
    assert_eq!(m.state(), "unlocked");
    m.transition("COIN");
    assert_eq!(m.state(), "unlocked");
    m.transition("push");
    assert_eq!(m.state(), "locked");
}
