//! Errors surfaced by selection operations.

use quarry_html::ParseError;
use quarry_selector::SelectorError;

/// Everything a query can fail with.
///
/// Missing attributes, empty matches, out-of-range indices and `end()` on a
/// root selection are not errors; they yield empty or absent results.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The markup could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A selector string failed to compile.
    #[error("invalid selector {selector:?}")]
    Selector {
        /// The selector text as given
        selector: String,
        /// What was wrong with it
        #[source]
        source: SelectorError,
    },

    /// A callback argument was not callable.
    #[error("{method}: argument must be a function")]
    NotCallable {
        /// The operation that was called
        method: &'static str,
    },

    /// An argument of a type the operation does not accept.
    #[error("{method}: unsupported argument of type {found}")]
    InvalidArgument {
        /// The operation that was called
        method: &'static str,
        /// Host type name of the argument
        found: &'static str,
    },
}
