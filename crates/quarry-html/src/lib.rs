//! HTML parsing adapter for the quarry selection engine.
//!
//! # Scope
//!
//! Tokenizing and tree construction are delegated to
//! [html5ever](https://docs.rs/html5ever), which implements the
//! [WHATWG parsing algorithm](https://html.spec.whatwg.org/multipage/parsing.html).
//! This crate converts the resulting tree into a [`quarry_dom::DomTree`].
//!
//! `<template>` content is attached under the template element, so
//! selectors and traversal see it like any other subtree.
//!
//! # Not Converted
//!
//! - Processing instructions

/// html5ever driver and tree conversion.
pub mod parser;

pub use parser::HtmlParser;

use quarry_dom::DomTree;

/// Parse a complete HTML document with default options.
///
/// # Errors
///
/// Returns [`ParseError::Read`] if the markup cannot be fed to the parser.
pub fn parse_document(markup: &str) -> Result<DomTree, ParseError> {
    HtmlParser::new().parse(markup)
}

/// Failure to produce a document tree.
///
/// The HTML parsing algorithm recovers from every markup error, so the only
/// failure left is the input stream itself.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input could not be read into the parser.
    #[error("failed to read markup: {0}")]
    Read(#[from] std::io::Error),
}
