//! Bind one declared command-line option to three things at once:
//!
//! - a typed native value owned by the caller,
//! - a node in a JSON document (one field per option, named by the
//!   canonical key derived from the option's aliases),
//! - a help line showing the option's current default, e.g. `count (=3)`.
//!
//! The parse walk itself lives in `argson-argparse`; this crate supplies
//! the typed glue: which matcher vets a token for a given static type,
//! how the token converts, which JSON key an alias set maps to, and the
//! callbacks that keep native and JSON copies of a value equal.
//!
//! Binding styles, one entry point each in [`bind`]:
//! - [`bind::option`] / [`bind::flag`] — native storage only
//! - [`bind::json_option`] / [`bind::json_flag`] — JSON node only
//! - [`bind::option_synced`] / [`bind::flag_synced`] — both, kept equal
//! - [`bind::value`] / [`bind::json_value`] — typed positionals

pub mod bind;
pub mod json;
pub mod value;

pub use argson_argparse::{
    DocFormatting, Group, Matcher, Param, ParseError, ParseResult, documentation, usage_lines,
};
pub use bind::BindError;
pub use json::{Doc, arg_list};
pub use value::{Bindable, Category, ConvertError};

/// The fixed help-formatting policy: first column 0, help column 24,
/// line-wrap column 80, indent 2, flags separated by a comma.
pub fn doc_format() -> DocFormatting {
    DocFormatting::default()
        .first_column(0)
        .doc_column(24)
        .last_column(80)
        .indent_size(2)
        .flag_separator(",")
}

/// Walk `argv` against `cli`, applying every bound option's side effects
/// in token order.
pub fn parse(cli: &Group, argv: &[String]) -> ParseResult<()> {
    tracing::debug!("parsing {} command line tokens", argv.len());
    argson_argparse::parse(cli, argv)
}

/// Usage summary followed by the option reference, rendered under
/// [`doc_format`].
pub fn usage(cli: &Group, program: &str) -> String {
    let fmt = doc_format();
    format!(
        "{}\n\n{}",
        usage_lines(cli, program, &fmt),
        documentation(cli, &fmt)
    )
}
