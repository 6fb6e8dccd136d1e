//! Doc comment extraction.
//!
//! `///` comments reach the syntax tree as `#[doc = " text"]` attributes, one per line, with the
//! marker already removed. Normalizing drops the single space that followed the marker and
//! joins the lines with no separator, so a two-line comment `/// foo` + `/// bar` becomes
//! `"foobar"`. Multi-line comments are not reflowed.

use syn::{Attribute, AttrStyle, Expr, ExprLit, Lit, Meta};

/// The raw doc lines attached to a declaration, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentationComment {
    pub lines: Vec<String>,
}

impl DocumentationComment {
    /// Collects the outer `#[doc = "..."]` lines from `attrs`.
    ///
    /// Returns `None` when there are none. Inner docs (`//!`), `#[doc(hidden)]` and docs
    /// produced by macros such as `include_str!` are ignored.
    pub fn from_attrs(attrs: &[Attribute]) -> Option<Self> {
        let lines: Vec<String> = attrs.iter().filter_map(doc_line).collect();
        if lines.is_empty() {
            None
        } else {
            Some(Self { lines })
        }
    }
}

fn doc_line(attr: &Attribute) -> Option<String> {
    if !matches!(attr.style, AttrStyle::Outer) || !attr.path().is_ident("doc") {
        return None;
    }
    match &attr.meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

/// Converts a doc comment into a single description string.
///
/// An absent comment yields the empty string.
pub fn normalize(comment: Option<&DocumentationComment>) -> String {
    let Some(comment) = comment else {
        return String::new();
    };
    comment
        .lines
        .iter()
        .map(|line| line.strip_prefix(' ').unwrap_or(line))
        .collect()
}

/// Shorthand for `normalize(DocumentationComment::from_attrs(attrs).as_ref())`.
pub fn description_of(attrs: &[Attribute]) -> String {
    normalize(DocumentationComment::from_attrs(attrs).as_ref())
}
