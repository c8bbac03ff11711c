//! End-to-end demonstration of the argson binding layer: one set of
//! declared options feeding native values, a JSON document, and help text
//! at the same time.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use argson::{Doc, Group, arg_list, bind, usage};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt};

/// Native storage for the dual-sync group. Every supported category is
/// represented once.
struct Parameters {
    enabled: Rc<RefCell<bool>>,
    count: Rc<RefCell<i32>>,
    offset: Rc<RefCell<i64>>,
    workers: Rc<RefCell<u32>>,
    capacity: Rc<RefCell<usize>>,
    ratio: Rc<RefCell<f64>>,
    greeting: Rc<RefCell<String>>,
    samples: Rc<RefCell<Vec<i32>>>,
}

impl Parameters {
    fn new() -> Self {
        Self {
            enabled: Rc::new(RefCell::new(false)),
            count: Rc::new(RefCell::new(i32::MAX)),
            offset: Rc::new(RefCell::new(i64::MAX)),
            workers: Rc::new(RefCell::new(u32::MAX)),
            capacity: Rc::new(RefCell::new(usize::MAX)),
            ratio: Rc::new(RefCell::new(0.0)),
            greeting: Rc::new(RefCell::new("Hello, world!".to_string())),
            samples: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Options mirrored into both the document and the native fields.
    fn cli(&self, doc: &Doc) -> Result<Group> {
        Ok(Group::new()
            .doc("Synced to the document and native values:")
            .push(bind::flag_synced(doc, &["b", "enabled"], &self.enabled, "Toggle the feature")?)
            .push(bind::option_synced(doc, &["c", "count"], &self.count, "Iteration count")?)
            .push(bind::option_synced(doc, &["offset"], &self.offset, "Start offset")?)
            .push(bind::option_synced(doc, &["w", "workers"], &self.workers, "Worker count")?)
            .push(bind::option_synced(doc, &["capacity"], &self.capacity, "Queue capacity")?)
            .push(bind::option_synced(doc, &["r", "ratio"], &self.ratio, "Sampling ratio")?)
            .push(bind::option_synced(doc, &["g", "greeting"], &self.greeting, "Greeting text")?)
            .push(bind::option_synced(doc, &["s", "samples"], &self.samples, "Sample ids")?))
    }
}

/// One full set of bindings over a fresh document.
struct Bindings {
    help: Rc<RefCell<bool>>,
    answer: Rc<RefCell<i32>>,
    doc: Doc,
    cli: Group,
}

fn build_cli() -> Result<Bindings> {
    let help = Rc::new(RefCell::new(false));
    let answer = Rc::new(RefCell::new(42i32));
    let native_only = Group::new()
        .doc("Native values only:")
        .push(bind::flag(&["h", "help"], &help, "Print help")?)
        .push(bind::option(&["a", "answer"], &answer, "The answer")?);

    let doc = Doc::new();
    let json_only = Group::new()
        .doc("Document only:")
        .push(bind::json_flag(&doc, &["version"], false, "Print version")?)
        .push(bind::json_option(&doc, &["whoami"], "24601".to_string(), "Caller name")?)
        .push(bind::json_option(&doc, &["y", "year"], 2112i32, "Target year")?);

    let params = Parameters::new();
    let synced = params.cli(&doc)?;

    let cli = Group::new().merge(native_only).merge(json_only).merge(synced);
    Ok(Bindings { help, answer, doc, cli })
}

fn main() -> Result<()> {
    init_tracing();
    let argv: Vec<String> = std::env::args().skip(1).collect();
    run(&argv)
}

fn run(argv: &[String]) -> Result<()> {
    let bindings = build_cli()?;

    // Snapshot before parsing so the pristine defaults stay visible.
    let defaults = bindings.doc.dump();

    argson::parse(&bindings.cli, argv).context("failed to parse command line")?;

    if *bindings.help.borrow() {
        print!("{}", usage(&bindings.cli, "argson-demo"));
        return Ok(());
    }
    if bindings.doc.get("version") == Some(Value::Bool(true)) {
        println!("argson-demo {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    println!("Default values: {defaults}");
    println!("Current values: {}", bindings.doc.dump());
    println!("Answer: {}", bindings.answer.borrow());

    // The document serialized back to argv reproduces itself when parsed
    // against an equally-declared fresh set of bindings.
    let args = arg_list(&bindings.doc);
    tracing::debug!("round trip argv: {args:?}");
    let fresh = build_cli()?;
    argson::parse(&fresh.cli, &args).context("failed to re-parse the serialized document")?;
    println!("Round trip: {}", fresh.doc.dump());

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
