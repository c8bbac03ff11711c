//! Option binding: key derivation, default-decorated help text, and the
//! entry points wiring typed storage and JSON nodes into option
//! descriptions.
//!
//! Every entry point returns an opaque [`Param`] ready to be composed into
//! a [`Group`](argson_argparse::Group) and handed to the parse walk. The
//! callbacks inside hold [`Rc`] back-references to the caller's storage;
//! nothing is owned by the description itself.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use argson_argparse::Param;
use serde_json::Value;

use crate::json::Doc;
use crate::value::Bindable;

/// An option was declared with an unusable shape. Raised when the
/// description is built, never at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    /// The alias set was empty or contained only blank aliases.
    EmptyFlags,
    /// A positional binding was declared with an empty name.
    EmptyKey,
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFlags => f.write_str("option declared with an empty alias set"),
            Self::EmptyKey => f.write_str("positional binding declared with an empty name"),
        }
    }
}

impl std::error::Error for BindError {}

/// Canonical JSON field name for an alias set: strip leading dashes, take
/// the alias whose stripped form is longest, ties broken by first
/// occurrence. `["i", "int"]` derives `"int"`; `["--version"]` derives
/// `"version"`. The same aliases always derive the same key.
pub fn derive_key(flags: &[&str]) -> String {
    let mut best = "";
    for flag in flags {
        let stripped = flag.trim_start_matches('-');
        if stripped.len() > best.len() {
            best = stripped;
        }
    }
    best.to_string()
}

/// Help text decorated with the current default: value `3` and doc
/// `"count"` render `"count (=3)"`; a sequence default `[0, 1]` renders
/// `"... (=[0,1])"`.
pub fn doc_default<T: Bindable>(value: &T, doc: &str) -> String {
    format!("{doc} (={})", value.default_text())
}

fn ensure_flags(flags: &[&str]) -> Result<(), BindError> {
    if flags.iter().any(|f| !f.trim_start_matches('-').trim().is_empty()) {
        Ok(())
    } else {
        Err(BindError::EmptyFlags)
    }
}

/// Bind a value option to caller-owned typed storage. Each match converts
/// the token and assigns it (appends, for sequences); help text shows the
/// storage's value at declaration time as the default.
pub fn option<T: Bindable>(
    flags: &[&str],
    target: &Rc<RefCell<T>>,
    doc: &str,
) -> Result<Param, BindError> {
    ensure_flags(flags)?;
    let help = doc_default(&*target.borrow(), doc);
    let target = Rc::clone(target);
    Ok(Param::value(flags, T::matcher())
        .repeatable(T::REPEATABLE)
        .doc(help)
        .on_token(move |raw| {
            target
                .borrow_mut()
                .apply_token(raw)
                .map_err(|e| e.to_string())
        }))
}

/// Bind a boolean flag to caller-owned storage; presence sets it to true.
/// Help text is the doc string, unadorned.
pub fn flag(flags: &[&str], target: &Rc<RefCell<bool>>, doc: &str) -> Result<Param, BindError> {
    ensure_flags(flags)?;
    let target = Rc::clone(target);
    Ok(Param::flag(flags)
        .doc(doc)
        .on_present(move || *target.borrow_mut() = true))
}

/// Bind a value option to a JSON node only. The node is created under the
/// derived key and seeded with `init` before any parsing happens.
pub fn json_option<T: Bindable>(
    doc: &Doc,
    flags: &[&str],
    init: T,
    help: &str,
) -> Result<Param, BindError> {
    ensure_flags(flags)?;
    let key = derive_key(flags);
    tracing::debug!("binding json node '{key}'");
    doc.set(&key, init.to_json());
    let help = doc_default(&init, help);
    let state = Rc::new(RefCell::new(init));
    let doc = doc.clone();
    Ok(Param::value(flags, T::matcher())
        .repeatable(T::REPEATABLE)
        .doc(help)
        .on_token(move |raw| {
            let mut value = state.borrow_mut();
            value.apply_token(raw).map_err(|e| e.to_string())?;
            doc.set(&key, value.to_json());
            Ok(())
        }))
}

/// Bind a boolean flag to a JSON node only. The node is seeded with `init`;
/// presence sets it to true, however often the flag repeats.
pub fn json_flag(doc: &Doc, flags: &[&str], init: bool, help: &str) -> Result<Param, BindError> {
    ensure_flags(flags)?;
    let key = derive_key(flags);
    doc.set(&key, Value::Bool(init));
    let doc = doc.clone();
    Ok(Param::flag(flags)
        .doc(help)
        .on_present(move || doc.set(&key, Value::Bool(true))))
}

/// Bind a value option to typed storage and a JSON node at once. The node
/// is seeded from the storage's current value; each match converts the
/// token once and writes the result to both, so they stay value-equal
/// after every successful parse.
pub fn option_synced<T: Bindable>(
    doc: &Doc,
    flags: &[&str],
    target: &Rc<RefCell<T>>,
    help: &str,
) -> Result<Param, BindError> {
    ensure_flags(flags)?;
    let key = derive_key(flags);
    tracing::debug!("binding json node '{key}' synced to native storage");
    doc.set(&key, target.borrow().to_json());
    let help = doc_default(&*target.borrow(), help);
    let target = Rc::clone(target);
    let doc = doc.clone();
    Ok(Param::value(flags, T::matcher())
        .repeatable(T::REPEATABLE)
        .doc(help)
        .on_token(move |raw| {
            let mut value = target.borrow_mut();
            value.apply_token(raw).map_err(|e| e.to_string())?;
            doc.set(&key, value.to_json());
            Ok(())
        }))
}

/// Bind a boolean flag to typed storage and a JSON node at once.
pub fn flag_synced(
    doc: &Doc,
    flags: &[&str],
    target: &Rc<RefCell<bool>>,
    help: &str,
) -> Result<Param, BindError> {
    ensure_flags(flags)?;
    let key = derive_key(flags);
    doc.set(&key, Value::Bool(*target.borrow()));
    let target = Rc::clone(target);
    let doc = doc.clone();
    Ok(Param::flag(flags)
        .doc(help)
        .on_present(move || {
            *target.borrow_mut() = true;
            doc.set(&key, Value::Bool(true));
        }))
}

/// A bare typed positional: the token is vetted by the type's matcher and
/// otherwise discarded. Compose with [`Param::on_token`] to capture it.
pub fn value<T: Bindable>(label: &str) -> Param {
    Param::positional(T::matcher(), label).repeatable(T::REPEATABLE)
}

/// A typed positional bound to a JSON node under `name`. The node is
/// created on the first match; a sequence-typed positional collects every
/// remaining non-flag token.
pub fn json_value<T: Bindable>(doc: &Doc, name: &str, help: &str) -> Result<Param, BindError> {
    if name.trim().is_empty() {
        return Err(BindError::EmptyKey);
    }
    let state: Rc<RefCell<T>> = Rc::new(RefCell::new(T::default()));
    let doc = doc.clone();
    let key = name.to_string();
    Ok(Param::positional(T::matcher(), name)
        .repeatable(T::REPEATABLE)
        .doc(help)
        .on_token(move |raw| {
            let mut value = state.borrow_mut();
            value.apply_token(raw).map_err(|e| e.to_string())?;
            doc.set(&key, value.to_json());
            Ok(())
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_prefers_the_longest_stripped_alias() {
        assert_eq!(derive_key(&["i", "int"]), "int");
        assert_eq!(derive_key(&["--version"]), "version");
        assert_eq!(derive_key(&["-v", "--verbose"]), "verbose");
    }

    #[test]
    fn derive_key_breaks_ties_by_first_occurrence() {
        assert_eq!(derive_key(&["ab", "cd"]), "ab");
        assert_eq!(derive_key(&["--aa", "bb"]), "aa");
    }

    #[test]
    fn derive_key_is_deterministic() {
        let flags = ["y", "year"];
        assert_eq!(derive_key(&flags), derive_key(&flags));
    }

    #[test]
    fn doc_default_decorates_scalars_and_sequences() {
        assert_eq!(doc_default(&3i32, "count"), "count (=3)");
        assert_eq!(doc_default(&vec![0i32, 1], "ids"), "ids (=[0,1])");
        assert_eq!(
            doc_default(&"Hello, world!".to_string(), "greeting"),
            "greeting (=Hello, world!)"
        );
    }

    #[test]
    fn empty_alias_set_is_rejected_at_declaration() {
        let target = Rc::new(RefCell::new(0i32));
        let err = option::<i32>(&[], &target, "doc").unwrap_err();
        assert_eq!(err, BindError::EmptyFlags);
        let err = option::<i32>(&["-", "--"], &target, "doc").unwrap_err();
        assert_eq!(err, BindError::EmptyFlags);
    }

    #[test]
    fn empty_positional_name_is_rejected_at_declaration() {
        let doc = Doc::new();
        let err = json_value::<i32>(&doc, "  ", "doc").unwrap_err();
        assert_eq!(err, BindError::EmptyKey);
    }
}
