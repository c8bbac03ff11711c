//! Minimal declarative argument parsing and help rendering.
//!
//! This crate is intentionally small and dependency-free so it can be reused by:
//! - `argson` (to drive its typed option bindings through one parse walk)
//! - applications that want to declare ad-hoc options next to bound ones
//!
//! The model is callback-driven: a [`Param`] describes one option (alias
//! flags, an optional value [`Matcher`], help text) and carries the closures
//! to run when it matches. [`parse`] walks a token list exactly once and
//! invokes those closures in argument order.

use std::collections::HashMap;
use std::fmt;

/// Predicate deciding whether a raw token is an acceptable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Optionally signed base-10 integer.
    Integers,
    /// Integer, decimal, or exponential floating-point syntax.
    Numbers,
    /// Any token of length >= 1.
    NonEmpty,
}

impl Matcher {
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Self::Integers => is_integer(token),
            Self::Numbers => is_number(token),
            Self::NonEmpty => !token.is_empty(),
        }
    }

    /// Short description of the accepted syntax, used in error messages.
    pub fn expects(&self) -> &'static str {
        match self {
            Self::Integers => "an integer",
            Self::Numbers => "a number",
            Self::NonEmpty => "a non-empty value",
        }
    }
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_number(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (unsigned, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => {
            (all_digits(int_part) && (frac_part.is_empty() || all_digits(frac_part)))
                || (int_part.is_empty() && all_digits(frac_part))
        }
        None => all_digits(mantissa),
    };
    let exponent_ok = match exponent {
        Some(e) => all_digits(e.strip_prefix(['+', '-']).unwrap_or(e)),
        None => true,
    };
    mantissa_ok && exponent_ok
}

/// Normalize a declared alias: `i` becomes `-i`, `int` becomes `--int`,
/// anything already dash-prefixed is kept as given.
fn normalize_flag(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        trimmed.to_string()
    } else if trimmed.chars().count() == 1 {
        format!("-{trimmed}")
    } else {
        format!("--{trimmed}")
    }
}

type TokenCallback = Box<dyn Fn(&str) -> Result<(), String>>;
type PresenceCallback = Box<dyn Fn()>;

/// One option description: alias flags (empty for a positional), an optional
/// value matcher, help text, and the callbacks invoked on a match.
///
/// A `Param` holds back-references to whatever storage its callbacks write
/// into; it must not outlive that storage.
pub struct Param {
    flags: Vec<String>,
    matcher: Option<Matcher>,
    label: String,
    doc: String,
    repeatable: bool,
    on_token: Option<TokenCallback>,
    on_present: Option<PresenceCallback>,
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Param")
            .field("flags", &self.flags)
            .field("matcher", &self.matcher)
            .field("label", &self.label)
            .field("doc", &self.doc)
            .field("repeatable", &self.repeatable)
            .field("on_token", &self.on_token.as_ref().map(|_| "..."))
            .field("on_present", &self.on_present.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Param {
    /// A pure flag with no attached value token.
    pub fn flag(flags: &[&str]) -> Self {
        Self {
            flags: flags.iter().map(|f| normalize_flag(f)).collect(),
            matcher: None,
            label: String::new(),
            doc: String::new(),
            repeatable: false,
            on_token: None,
            on_present: None,
        }
    }

    /// A flag that consumes one value token vetted by `matcher`.
    ///
    /// Both `--flag=value` and `--flag value` match it.
    pub fn value(flags: &[&str], matcher: Matcher) -> Self {
        Self {
            flags: flags.iter().map(|f| normalize_flag(f)).collect(),
            matcher: Some(matcher),
            label: "arg".to_string(),
            doc: String::new(),
            repeatable: false,
            on_token: None,
            on_present: None,
        }
    }

    /// A positional value, matched against non-flag tokens in declaration
    /// order.
    pub fn positional(matcher: Matcher, label: &str) -> Self {
        Self {
            flags: Vec::new(),
            matcher: Some(matcher),
            label: label.to_string(),
            doc: String::new(),
            repeatable: false,
            on_token: None,
            on_present: None,
        }
    }

    /// Attach help text.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Override the value-placeholder label shown in help output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Allow the param to match more than once per parse.
    pub fn repeatable(mut self, yes: bool) -> Self {
        self.repeatable = yes;
        self
    }

    /// Callback invoked with the raw matched value token. Returning `Err`
    /// aborts the whole parse as a conversion failure.
    pub fn on_token(mut self, callback: impl Fn(&str) -> Result<(), String> + 'static) -> Self {
        self.on_token = Some(Box::new(callback));
        self
    }

    /// Callback invoked when a pure flag is present (no token attached).
    pub fn on_present(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_present = Some(Box::new(callback));
        self
    }

    pub fn takes_value(&self) -> bool {
        self.matcher.is_some()
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    fn is_positional(&self) -> bool {
        self.flags.is_empty()
    }

    /// Preferred name for error messages: the first long flag, else the
    /// first flag, else the label (positionals).
    fn display_name(&self) -> &str {
        self.flags
            .iter()
            .find(|f| f.starts_with("--"))
            .or_else(|| self.flags.first())
            .map(String::as_str)
            .unwrap_or(&self.label)
    }

    fn invoke_token(&self, flag: &str, token: &str) -> Result<(), ParseError> {
        if let Some(callback) = &self.on_token {
            callback(token).map_err(|message| ParseError::Conversion {
                flag: flag.to_string(),
                token: token.to_string(),
                message,
            })?;
        }
        Ok(())
    }

    fn invoke_present(&self) {
        if let Some(callback) = &self.on_present {
            callback();
        }
    }
}

/// An ordered collection of params and subgroups under a shared heading.
#[derive(Default)]
pub struct Group {
    doc: String,
    items: Vec<Node>,
}

enum Node {
    Param(Param),
    Group(Group),
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a heading rendered above the group's params in help output.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn push(mut self, param: Param) -> Self {
        self.items.push(Node::Param(param));
        self
    }

    /// Nest another group (its heading is kept).
    pub fn merge(mut self, group: Group) -> Self {
        self.items.push(Node::Group(group));
        self
    }

    fn collect_params<'a>(&'a self, out: &mut Vec<&'a Param>) {
        for node in &self.items {
            match node {
                Node::Param(p) => out.push(p),
                Node::Group(g) => g.collect_params(out),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownFlag(String),
    MissingValue { flag: String },
    UnexpectedValue { flag: String },
    InvalidValue { flag: String, token: String, expected: &'static str },
    Conversion { flag: String, token: String, message: String },
    Repeated { flag: String },
    Unmatched { token: String },
    Grammar(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFlag(flag) => write!(f, "unknown flag: {flag}"),
            Self::MissingValue { flag } => write!(f, "missing value for {flag}"),
            Self::UnexpectedValue { flag } => write!(f, "flag does not take a value: {flag}"),
            Self::InvalidValue { flag, token, expected } => {
                write!(f, "invalid value '{token}' for {flag}: expected {expected}")
            }
            Self::Conversion { flag, token, message } => {
                write!(f, "cannot convert '{token}' for {flag}: {message}")
            }
            Self::Repeated { flag } => write!(f, "option {flag} cannot be used multiple times"),
            Self::Unmatched { token } => write!(f, "unexpected argument: {token}"),
            Self::Grammar(message) => write!(f, "grammar error: {message}"),
        }
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Walk `argv` once against the grammar in `cli`, invoking param callbacks
/// in token order.
///
/// `--flag=value` and `--flag value` are equivalent. A bare `--` ends flag
/// parsing; everything after it is treated as positional. A dash-prefixed
/// token that is not a declared flag is still offered to the pending
/// positional (so negative numbers parse), and rejected as an unknown flag
/// otherwise.
pub fn parse(cli: &Group, argv: &[String]) -> ParseResult<()> {
    let mut params: Vec<&Param> = Vec::new();
    cli.collect_params(&mut params);

    let mut by_flag: HashMap<&str, usize> = HashMap::new();
    let mut positionals: Vec<usize> = Vec::new();
    for (idx, param) in params.iter().enumerate() {
        if param.is_positional() {
            positionals.push(idx);
            continue;
        }
        for flag in &param.flags {
            if let Some(prev) = by_flag.insert(flag.as_str(), idx) {
                if prev != idx {
                    return Err(ParseError::Grammar(format!(
                        "flag {flag} is declared by two options"
                    )));
                }
            }
        }
    }

    let mut seen = vec![0usize; params.len()];
    let mut pos_cursor = 0usize;
    let mut after_separator = false;
    let mut i = 0usize;

    while i < argv.len() {
        let token = argv[i].as_str();

        if !after_separator && token == "--" {
            after_separator = true;
            i += 1;
            continue;
        }

        if !after_separator && token.len() > 1 && token.starts_with('-') {
            // --flag=value (also -f=value)
            if let Some((flag, value)) = token.split_once('=') {
                let Some(&idx) = by_flag.get(flag) else {
                    return Err(ParseError::UnknownFlag(flag.to_string()));
                };
                let param = params[idx];
                if !param.takes_value() {
                    return Err(ParseError::UnexpectedValue { flag: flag.to_string() });
                }
                check_repeat(param, seen[idx], flag)?;
                check_value(param, flag, value)?;
                param.invoke_token(flag, value)?;
                seen[idx] += 1;
                i += 1;
                continue;
            }

            if let Some(&idx) = by_flag.get(token) {
                let param = params[idx];
                if param.takes_value() {
                    check_repeat(param, seen[idx], token)?;
                    let Some(value) = argv.get(i + 1) else {
                        return Err(ParseError::MissingValue { flag: token.to_string() });
                    };
                    check_value(param, token, value)?;
                    param.invoke_token(token, value)?;
                    seen[idx] += 1;
                    i += 2;
                } else {
                    // Pure flags are idempotent; repeats are allowed.
                    param.invoke_present();
                    seen[idx] += 1;
                    i += 1;
                }
                continue;
            }

            // Not a declared flag: may still be a valid positional value
            // such as a negative number.
            match pending_positional(&positionals, pos_cursor) {
                Some(idx) if accepts(params[idx], token) => {
                    apply_positional(params[idx], token, &mut pos_cursor)?;
                    i += 1;
                    continue;
                }
                _ => return Err(ParseError::UnknownFlag(token.to_string())),
            }
        }

        let Some(idx) = pending_positional(&positionals, pos_cursor) else {
            return Err(ParseError::Unmatched { token: token.to_string() });
        };
        let param = params[idx];
        check_value(param, param.display_name(), token)?;
        apply_positional(param, token, &mut pos_cursor)?;
        i += 1;
    }

    Ok(())
}

fn check_repeat(param: &Param, count: usize, flag: &str) -> ParseResult<()> {
    if !param.repeatable && count > 0 {
        return Err(ParseError::Repeated { flag: flag.to_string() });
    }
    Ok(())
}

fn check_value(param: &Param, flag: &str, token: &str) -> ParseResult<()> {
    if let Some(matcher) = param.matcher {
        if !matcher.matches(token) {
            return Err(ParseError::InvalidValue {
                flag: flag.to_string(),
                token: token.to_string(),
                expected: matcher.expects(),
            });
        }
    }
    Ok(())
}

fn accepts(param: &Param, token: &str) -> bool {
    param.matcher.is_none_or(|m| m.matches(token))
}

fn pending_positional(positionals: &[usize], cursor: usize) -> Option<usize> {
    positionals.get(cursor).copied()
}

fn apply_positional(param: &Param, token: &str, cursor: &mut usize) -> ParseResult<()> {
    param.invoke_token(param.display_name(), token)?;
    // A repeatable positional consumes every remaining non-flag token.
    if !param.repeatable {
        *cursor += 1;
    }
    Ok(())
}

/// Column and separator configuration for help rendering.
pub struct DocFormatting {
    first_column: usize,
    doc_column: usize,
    last_column: usize,
    indent_size: usize,
    flag_separator: String,
}

impl Default for DocFormatting {
    fn default() -> Self {
        Self {
            first_column: 0,
            doc_column: 24,
            last_column: 80,
            indent_size: 2,
            flag_separator: ", ".to_string(),
        }
    }
}

impl DocFormatting {
    pub fn first_column(mut self, column: usize) -> Self {
        self.first_column = column;
        self
    }

    pub fn doc_column(mut self, column: usize) -> Self {
        self.doc_column = column;
        self
    }

    pub fn last_column(mut self, column: usize) -> Self {
        self.last_column = column;
        self
    }

    pub fn indent_size(mut self, size: usize) -> Self {
        self.indent_size = size;
        self
    }

    pub fn flag_separator(mut self, separator: impl Into<String>) -> Self {
        self.flag_separator = separator.into();
        self
    }
}

/// Render the option reference: group headings, one row per param with the
/// help text starting at `doc_column` and wrapped at `last_column`.
pub fn documentation(cli: &Group, fmt: &DocFormatting) -> String {
    let mut out = String::new();
    render_group(cli, fmt, &mut out);
    out
}

fn render_group(group: &Group, fmt: &DocFormatting, out: &mut String) {
    if !group.doc.is_empty() {
        out.push_str(&" ".repeat(fmt.first_column));
        out.push_str(&group.doc);
        out.push('\n');
    }
    for node in &group.items {
        match node {
            Node::Param(param) => render_param(param, fmt, out),
            Node::Group(sub) => {
                if !out.is_empty() {
                    out.push('\n');
                }
                render_group(sub, fmt, out);
            }
        }
    }
}

fn render_param(param: &Param, fmt: &DocFormatting, out: &mut String) {
    let mut left = " ".repeat(fmt.first_column + fmt.indent_size);
    if param.is_positional() {
        left.push('<');
        left.push_str(&param.label);
        left.push('>');
    } else {
        left.push_str(&param.flags.join(&fmt.flag_separator));
        if param.takes_value() {
            left.push_str(" <");
            left.push_str(&param.label);
            left.push('>');
        }
    }

    if param.doc.is_empty() {
        out.push_str(&left);
        out.push('\n');
        return;
    }

    if left.len() + 1 > fmt.doc_column {
        out.push_str(&left);
        out.push('\n');
        out.push_str(&" ".repeat(fmt.doc_column));
    } else {
        out.push_str(&left);
        out.push_str(&" ".repeat(fmt.doc_column - left.len()));
    }

    let width = fmt.last_column.saturating_sub(fmt.doc_column).max(1);
    for (n, line) in wrap_text(&param.doc, width).iter().enumerate() {
        if n > 0 {
            out.push_str(&" ".repeat(fmt.doc_column));
        }
        out.push_str(line);
        out.push('\n');
    }
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
        } else if line.len() + 1 + word.len() <= width {
            line.push(' ');
            line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Render a one-line usage summary, wrapped at `last_column` with
/// continuation lines aligned under the first option.
pub fn usage_lines(cli: &Group, program: &str, fmt: &DocFormatting) -> String {
    let mut params: Vec<&Param> = Vec::new();
    cli.collect_params(&mut params);

    let mut pieces: Vec<String> = Vec::new();
    for param in params {
        let mut piece = if param.is_positional() {
            format!("<{}>", param.label)
        } else {
            let mut inner = param.flags.join("|");
            if param.takes_value() {
                inner.push_str(" <");
                inner.push_str(&param.label);
                inner.push('>');
            }
            format!("[{inner}]")
        };
        if param.repeatable {
            piece.push_str("...");
        }
        pieces.push(piece);
    }

    let mut out = String::new();
    let mut line = " ".repeat(fmt.first_column);
    line.push_str(program);
    let continuation = fmt.first_column + program.len() + 1;
    for piece in pieces {
        if line.len() + 1 + piece.len() > fmt.last_column && !line.trim().is_empty() {
            out.push_str(&line);
            out.push('\n');
            line = " ".repeat(continuation);
            line.push_str(&piece);
        } else {
            line.push(' ');
            line.push_str(&piece);
        }
    }
    out.push_str(&line);
    out
}
