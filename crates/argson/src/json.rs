//! Shared handle over the JSON document options write into.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

/// Cheap clonable handle over one JSON object document.
///
/// Every bound option holds a clone of the handle, so an option description
/// cannot outlive the storage its callbacks write into. Access is
/// single-threaded: the parse walk invokes callbacks strictly in sequence
/// and never re-enters one.
#[derive(Clone, Default)]
pub struct Doc {
    inner: Rc<RefCell<Map<String, Value>>>,
}

impl Doc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value under `key`, cloned out of the document.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.borrow().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: Value) {
        self.inner.borrow_mut().insert(key.to_string(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Snapshot of the whole document as one JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.inner.borrow().clone())
    }

    /// Pretty-printed dump, typically captured before parsing to snapshot
    /// the defaults.
    pub fn dump(&self) -> String {
        // An object map serializes infallibly.
        serde_json::to_string_pretty(&*self.inner.borrow()).unwrap_or_default()
    }
}

impl fmt::Debug for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.borrow().fmt(f)
    }
}

impl PartialEq for Doc {
    fn eq(&self, other: &Self) -> bool {
        *self.inner.borrow() == *other.inner.borrow()
    }
}

/// Serialize the current document back into argv form.
///
/// Scalars render as `--key=value`, arrays as one `--key=element` per
/// element, true booleans as a bare `--key`. False booleans and nulls are
/// omitted, so re-parsing the result against equally-declared bindings
/// reproduces the document.
pub fn arg_list(doc: &Doc) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in doc.inner.borrow().iter() {
        match value {
            Value::Bool(true) => args.push(format!("--{key}")),
            Value::Bool(false) | Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    args.push(format!("--{key}={}", scalar_text(item)));
                }
            }
            other => args.push(format!("--{key}={}", scalar_text(other))),
        }
    }
    args
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
