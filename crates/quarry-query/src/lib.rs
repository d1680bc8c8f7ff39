//! jQuery-style selection and traversal over parsed HTML.
//!
//! [`parse_document`] turns markup into a root [`Selection`]. Every
//! operation on a selection returns a new one that remembers where it came
//! from, so [`Selection::end`] steps back exactly one operation:
//!
//! ```
//! let doc = quarry_query::parse_document("<body><p>a</p><div>b</div></body>")?;
//! let children = doc.find("body")?.children();
//! assert_eq!(children.filter("p")?.end(), children);
//! # Ok::<(), quarry_query::QueryError>(())
//! ```
//!
//! Selections share one immutable [`Document`]; they hold node ids, never
//! node data, so chains and callbacks can alias freely.

mod accessors;
mod document;
mod error;
pub mod host;
mod iteration;
mod options;
mod selection;
mod traversal;

pub use accessors::{FormField, FormValue};
pub use document::Document;
pub use error::QueryError;
pub use iteration::SelectionIter;
pub use options::{QueryOptions, UnionOrder};
pub use selection::Selection;

pub use quarry_dom::{DomTree, NodeId};

/// Parse `markup` with default [`QueryOptions`].
///
/// # Errors
///
/// Returns [`QueryError::Parse`] when the markup could not be read.
pub fn parse_document(markup: &str) -> Result<Selection, QueryError> {
    parse_document_with(markup, QueryOptions::default())
}

/// Parse `markup` into a root selection carrying `options`.
///
/// # Errors
///
/// Returns [`QueryError::Parse`] when the markup could not be read.
pub fn parse_document_with(markup: &str, options: QueryOptions) -> Result<Selection, QueryError> {
    let tree = quarry_html::parse_document(markup)?;
    tracing::debug!(nodes = tree.len(), union_order = %options.union_order, "document ready");
    Ok(Document::from_tree(tree, options).into_selection())
}
