//! The parsed document that every selection borrows from.

use std::rc::Rc;

use quarry_dom::DomTree;
use quarry_selector::Selector;

use crate::{QueryError, QueryOptions, Selection};

/// An immutable tree plus the options its selections share.
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    options: QueryOptions,
}

impl Document {
    /// Wrap an already-built tree.
    #[must_use]
    pub const fn from_tree(tree: DomTree, options: QueryOptions) -> Self {
        Self { tree, options }
    }

    /// The underlying node tree.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The options this document was created with.
    #[must_use]
    pub const fn options(&self) -> QueryOptions {
        self.options
    }

    /// The root selection: the document node alone, with no history.
    #[must_use]
    pub fn into_selection(self) -> Selection {
        Selection::root(Rc::new(self))
    }
}

/// Compile `selector`, keeping the text for the error.
pub(crate) fn compile(selector: &str) -> Result<Selector, QueryError> {
    Selector::parse(selector).map_err(|source| QueryError::Selector {
        selector: selector.to_string(),
        source,
    })
}
