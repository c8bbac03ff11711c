//! Binding behavior driven through full parse walks.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use argson::{Doc, Group, ParseError, arg_list, bind, parse};
use serde_json::json;

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[test]
fn native_option_accepts_both_surface_forms() {
    let count = Rc::new(RefCell::new(0i32));
    let cli = Group::new().push(bind::option(&["n", "count"], &count, "how many").unwrap());

    parse(&cli, &argv(&["--count=7"])).unwrap();
    assert_eq!(*count.borrow(), 7);

    parse(&cli, &argv(&["--count", "9"])).unwrap();
    assert_eq!(*count.borrow(), 9);

    parse(&cli, &argv(&["-n", "-3"])).unwrap();
    assert_eq!(*count.borrow(), -3);
}

#[test]
fn conversion_failure_aborts_the_parse() {
    let count = Rc::new(RefCell::new(5i32));
    let cli = Group::new().push(bind::option(&["count"], &count, "").unwrap());

    let err = parse(&cli, &argv(&["--count=abc"])).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("--count") && msg.contains("abc"), "got: {msg}");
    assert_eq!(*count.borrow(), 5, "failed parse must not assign");

    // The space-separated surface form fails identically.
    assert!(parse(&cli, &argv(&["--count", "abc"])).is_err());

    // Syntactically valid but out of range for i32.
    let err = parse(&cli, &argv(&["--count=99999999999999999999"])).unwrap_err();
    assert!(matches!(err, ParseError::Conversion { .. }), "got: {err}");
    assert_eq!(*count.borrow(), 5);
}

#[test]
fn float_option_accepts_numeric_syntax_only() {
    let ratio = Rc::new(RefCell::new(0.0f64));
    let cli = Group::new().push(bind::option(&["r", "ratio"], &ratio, "").unwrap());

    parse(&cli, &argv(&["--ratio=2.5e-1"])).unwrap();
    assert_eq!(*ratio.borrow(), 0.25);

    assert!(parse(&cli, &argv(&["--ratio=abc"])).is_err());
}

#[test]
fn string_option_rejects_only_the_empty_token() {
    let name = Rc::new(RefCell::new(String::new()));
    let cli = Group::new().push(bind::option(&["name"], &name, "").unwrap());

    parse(&cli, &argv(&["--name=--weird"])).unwrap();
    assert_eq!(*name.borrow(), "--weird");

    assert!(parse(&cli, &argv(&["--name="])).is_err());
}

#[test]
fn path_option_routes_through_text_conversion() {
    let out = Rc::new(RefCell::new(PathBuf::from("out.json")));
    let cli = Group::new().push(bind::option(&["o", "output"], &out, "Output file").unwrap());
    parse(&cli, &argv(&["--output", "/tmp/report.json"])).unwrap();
    assert_eq!(*out.borrow(), PathBuf::from("/tmp/report.json"));
}

#[test]
fn native_flag_sets_true_on_presence_only() {
    let verbose = Rc::new(RefCell::new(false));
    let cli = Group::new().push(bind::flag(&["v", "verbose"], &verbose, "talk more").unwrap());

    parse(&cli, &argv(&[])).unwrap();
    assert!(!*verbose.borrow());

    parse(&cli, &argv(&["-v", "--verbose"])).unwrap();
    assert!(*verbose.borrow());
}

#[test]
fn json_option_seeds_the_node_before_parsing() {
    let doc = Doc::new();
    let cli = Group::new()
        .push(bind::json_flag(&doc, &["version"], false, "").unwrap())
        .push(bind::json_option(&doc, &["y", "year"], 2112i32, "").unwrap());

    // Defaults are visible without any parse.
    assert_eq!(doc.get("version"), Some(json!(false)));
    assert_eq!(doc.get("year"), Some(json!(2112)));

    parse(&cli, &argv(&["--year", "1984", "--version"])).unwrap();
    assert_eq!(doc.get("version"), Some(json!(true)));
    assert_eq!(doc.get("year"), Some(json!(1984)));
}

#[test]
fn dual_sync_keeps_native_and_node_equal() {
    let doc = Doc::new();
    let count = Rc::new(RefCell::new(42i32));
    let cli = Group::new().push(bind::option_synced(&doc, &["c", "count"], &count, "").unwrap());

    assert_eq!(doc.get("count"), Some(json!(42)), "node seeded from native");

    parse(&cli, &argv(&["--count=7"])).unwrap();
    assert_eq!(*count.borrow(), 7);
    assert_eq!(doc.get("count"), Some(json!(7)));
}

#[test]
fn dual_sync_flag_writes_both() {
    let doc = Doc::new();
    let on = Rc::new(RefCell::new(false));
    let cli = Group::new().push(bind::flag_synced(&doc, &["x", "exact"], &on, "").unwrap());

    assert_eq!(doc.get("exact"), Some(json!(false)));
    parse(&cli, &argv(&["-x", "-x"])).unwrap();
    assert!(*on.borrow());
    assert_eq!(doc.get("exact"), Some(json!(true)));
}

#[test]
fn sequence_option_appends_in_order() {
    let doc = Doc::new();
    let samples: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
    let cli = Group::new().push(bind::option_synced(&doc, &["s", "samples"], &samples, "").unwrap());

    parse(&cli, &argv(&["--samples=3", "-s", "1", "--samples", "3"])).unwrap();
    assert_eq!(*samples.borrow(), vec![3, 1, 3]);
    assert_eq!(doc.get("samples"), Some(json!([3, 1, 3])));
}

#[test]
fn non_sequence_option_cannot_repeat() {
    let count = Rc::new(RefCell::new(0i32));
    let cli = Group::new().push(bind::option(&["count"], &count, "").unwrap());
    let err = parse(&cli, &argv(&["--count=1", "--count=2"])).unwrap_err();
    assert!(matches!(err, ParseError::Repeated { .. }), "got: {err}");
}

#[test]
fn bare_positional_validates_without_storing() {
    let cli = Group::new().push(bind::value::<i32>("nsam"));
    parse(&cli, &argv(&["12"])).unwrap();
    let err = parse(&cli, &argv(&["twelve"])).unwrap_err();
    assert!(matches!(err, ParseError::InvalidValue { .. }), "got: {err}");
}

#[test]
fn json_positional_collects_tokens() {
    let doc = Doc::new();
    let cli = Group::new()
        .push(bind::json_value::<i32>(&doc, "nsam", "sample count").unwrap())
        .push(bind::json_value::<String>(&doc, "label", "run label").unwrap());

    parse(&cli, &argv(&["12", "nightly"])).unwrap();
    assert_eq!(doc.get("nsam"), Some(json!(12)));
    assert_eq!(doc.get("label"), Some(json!("nightly")));
}

#[test]
fn answer_version_help_scenario() {
    let doc = Doc::new();
    let help = Rc::new(RefCell::new(false));
    let answer = Rc::new(RefCell::new(42i32));
    let cli = Group::new()
        .push(bind::flag(&["h", "help"], &help, "Print help").unwrap())
        .push(bind::option(&["a", "answer"], &answer, "The answer").unwrap())
        .push(bind::json_flag(&doc, &["version"], false, "Print version").unwrap());

    parse(&cli, &argv(&["--answer=7"])).unwrap();
    assert_eq!(*answer.borrow(), 7);
    assert!(!*help.borrow());
    assert_eq!(doc.get("version"), Some(json!(false)));

    let answer = Rc::new(RefCell::new(42i32));
    let cli = Group::new()
        .push(bind::flag(&["h", "help"], &help, "Print help").unwrap())
        .push(bind::option(&["a", "answer"], &answer, "The answer").unwrap())
        .push(bind::json_flag(&doc, &["version"], false, "Print version").unwrap());
    parse(&cli, &argv(&["--version"])).unwrap();
    assert_eq!(doc.get("version"), Some(json!(true)));
    assert_eq!(*answer.borrow(), 42, "unrelated option left at its default");
}

#[test]
fn arg_list_round_trips_through_a_fresh_parse() {
    let doc = Doc::new();
    let count = Rc::new(RefCell::new(42i32));
    let samples: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
    let cli = Group::new()
        .push(bind::json_flag(&doc, &["verbose"], false, "").unwrap())
        .push(bind::option_synced(&doc, &["count"], &count, "").unwrap())
        .push(bind::option_synced(&doc, &["samples"], &samples, "").unwrap());
    parse(&cli, &argv(&["--count=7", "--samples=1", "--samples=2", "--verbose"])).unwrap();

    let args = arg_list(&doc);

    let fresh = Doc::new();
    let count = Rc::new(RefCell::new(42i32));
    let samples: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
    let cli = Group::new()
        .push(bind::json_flag(&fresh, &["verbose"], false, "").unwrap())
        .push(bind::option_synced(&fresh, &["count"], &count, "").unwrap())
        .push(bind::option_synced(&fresh, &["samples"], &samples, "").unwrap());
    parse(&cli, &args).unwrap();

    assert_eq!(fresh, doc);
}

#[test]
fn help_text_shows_current_defaults() {
    let doc = Doc::new();
    let answer = Rc::new(RefCell::new(42i32));
    let cli = Group::new()
        .doc("Options:")
        .push(bind::option(&["a", "answer"], &answer, "The answer").unwrap())
        .push(bind::json_option(&doc, &["whoami"], "24601".to_string(), "Who").unwrap());

    let text = argson::usage(&cli, "demo");
    assert!(text.contains("demo ["), "missing usage line: {text}");
    assert!(text.contains("The answer (=42)"), "got: {text}");
    assert!(text.contains("Who (=24601)"), "got: {text}");
    assert!(text.contains("-a,--answer <arg>"), "got: {text}");
}
