//! Tree-walking operations: children, siblings and ancestors.
//!
//! Operations that take one step from each node (`children`, `next`,
//! `parent`, ...) return document order. Operations that walk a run of
//! nodes (`next_all`, `prev_all`, `parents`, and the `_until` forms) keep
//! the walk order of each starting node, concatenated with repeats dropped.

use std::iter;

use quarry_dom::{DomTree, NodeId};
use quarry_selector::Selector;

use crate::document::compile;
use crate::{QueryError, Selection};

/// Which way a run of nodes is walked, for the `_all` and `_until` forms.
#[derive(Debug, Clone, Copy)]
enum Walk {
    Following,
    Preceding,
    Ancestors,
}

impl Walk {
    fn nodes(self, tree: &DomTree, id: NodeId) -> Box<dyn Iterator<Item = NodeId> + '_> {
        match self {
            Self::Following => Box::new(
                tree.following_siblings(id)
                    .filter(move |&s| tree.is_element(s)),
            ),
            Self::Preceding => Box::new(
                tree.preceding_siblings(id)
                    .filter(move |&s| tree.is_element(s)),
            ),
            Self::Ancestors => Box::new(tree.ancestors(id).filter(move |&a| tree.is_element(a))),
        }
    }
}

impl Selection {
    /// Collect one step from every node, in document order.
    fn step(&self, next: impl Fn(&DomTree, NodeId) -> Option<NodeId>) -> Vec<NodeId> {
        let tree = self.tree();
        let found = self.nodes().iter().filter_map(|&id| next(tree, id)).collect();
        self.in_document_order(found)
    }

    /// Walk from every node, stopping before the first node matching
    /// `until`, optionally keeping only nodes matching `filter`.
    fn walk(
        &self,
        op: &'static str,
        walk: Walk,
        until: Option<&Selector>,
        filter: Option<&Selector>,
        selector: Option<&str>,
    ) -> Self {
        let tree = self.tree();
        let found = self.nodes().iter().flat_map(|&id| {
            walk.nodes(tree, id)
                .take_while(move |&n| until.is_none_or(|stop| !stop.matches(tree, n)))
        });
        let nodes =
            Self::unique(found.filter(|&n| filter.is_none_or(|keep| keep.matches(tree, n))));
        self.derive(op, nodes, selector)
    }

    fn retain_matching(
        &self,
        op: &'static str,
        nodes: Vec<NodeId>,
        selector: &str,
    ) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        let tree = self.tree();
        let kept = nodes
            .into_iter()
            .filter(|&id| compiled.matches(tree, id))
            .collect();
        Ok(self.derive(op, kept, Some(selector)))
    }

    // ========== children ==========

    fn child_elements(&self) -> Vec<NodeId> {
        let tree = self.tree();
        let found = self
            .nodes()
            .iter()
            .flat_map(|&id| tree.element_children(id))
            .collect();
        self.in_document_order(found)
    }

    /// Element children of every node.
    #[must_use]
    pub fn children(&self) -> Self {
        self.derive("children", self.child_elements(), None)
    }

    /// Element children of every node that match `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn children_filtered(&self, selector: &str) -> Result<Self, QueryError> {
        self.retain_matching("children", self.child_elements(), selector)
    }

    /// Every child node, including text and comments.
    #[must_use]
    pub fn contents(&self) -> Self {
        let tree = self.tree();
        let found = self
            .nodes()
            .iter()
            .flat_map(|&id| tree.children(id).iter().copied())
            .collect();
        self.derive("contents", self.in_document_order(found), None)
    }

    // ========== ancestors ==========

    /// For each node, the node itself or its nearest ancestor matching
    /// `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn closest(&self, selector: &str) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        let tree = self.tree();
        let found = self
            .nodes()
            .iter()
            .filter_map(|&id| {
                iter::once(id)
                    .chain(tree.ancestors(id))
                    .find(|&a| compiled.matches(tree, a))
            })
            .collect();
        Ok(self.derive("closest", self.in_document_order(found), Some(selector)))
    }

    /// The parent element of every node. The document node is not an
    /// element, so the root element has no parent here.
    #[must_use]
    pub fn parent(&self) -> Self {
        let nodes = self.step(|tree, id| {
            tree.parent(id).filter(|&p| tree.is_element(p))
        });
        self.derive("parent", nodes, None)
    }

    /// Every ancestor element, nearest first for each node.
    #[must_use]
    pub fn parents(&self) -> Self {
        self.walk("parents", Walk::Ancestors, None, None, None)
    }

    /// Ancestor elements up to (not including) the first matching `until`,
    /// optionally narrowed by `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if either selector does not compile.
    pub fn parents_until(&self, until: &str, filter: Option<&str>) -> Result<Self, QueryError> {
        self.walk_until("parents_until", Walk::Ancestors, until, filter)
    }

    fn walk_until(
        &self,
        op: &'static str,
        walk: Walk,
        until: &str,
        filter: Option<&str>,
    ) -> Result<Self, QueryError> {
        let until_compiled = compile(until)?;
        let filter_compiled = filter.map(compile).transpose()?;
        Ok(self.walk(
            op,
            walk,
            Some(&until_compiled),
            filter_compiled.as_ref(),
            filter.or(Some(until)),
        ))
    }

    // ========== siblings ==========

    /// The next element sibling of every node.
    #[must_use]
    pub fn next(&self) -> Self {
        let nodes = self.step(DomTree::next_element_sibling);
        self.derive("next", nodes, None)
    }

    /// The next element sibling of every node, kept only if it matches
    /// `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn next_filtered(&self, selector: &str) -> Result<Self, QueryError> {
        self.retain_matching("next", self.step(DomTree::next_element_sibling), selector)
    }

    /// Every following element sibling of every node.
    #[must_use]
    pub fn next_all(&self) -> Self {
        self.walk("next_all", Walk::Following, None, None, None)
    }

    /// Every following element sibling matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn next_all_filtered(&self, selector: &str) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        Ok(self.walk("next_all", Walk::Following, None, Some(&compiled), Some(selector)))
    }

    /// Following element siblings up to (not including) the first matching
    /// `until`, optionally narrowed by `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if either selector does not compile.
    pub fn next_until(&self, until: &str, filter: Option<&str>) -> Result<Self, QueryError> {
        self.walk_until("next_until", Walk::Following, until, filter)
    }

    /// The previous element sibling of every node.
    #[must_use]
    pub fn prev(&self) -> Self {
        let nodes = self.step(DomTree::prev_element_sibling);
        self.derive("prev", nodes, None)
    }

    /// The previous element sibling of every node, kept only if it matches
    /// `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn prev_filtered(&self, selector: &str) -> Result<Self, QueryError> {
        self.retain_matching("prev", self.step(DomTree::prev_element_sibling), selector)
    }

    /// Every preceding element sibling, nearest first for each node.
    #[must_use]
    pub fn prev_all(&self) -> Self {
        self.walk("prev_all", Walk::Preceding, None, None, None)
    }

    /// Every preceding element sibling matching `selector`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn prev_all_filtered(&self, selector: &str) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        Ok(self.walk("prev_all", Walk::Preceding, None, Some(&compiled), Some(selector)))
    }

    /// Preceding element siblings up to (not including) the first matching
    /// `until`, nearest first, optionally narrowed by `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if either selector does not compile.
    pub fn prev_until(&self, until: &str, filter: Option<&str>) -> Result<Self, QueryError> {
        self.walk_until("prev_until", Walk::Preceding, until, filter)
    }

    /// Every element sibling of every node, excluding the nodes themselves
    /// unless they are siblings of one another.
    #[must_use]
    pub fn siblings(&self) -> Self {
        let tree = self.tree();
        let found = self
            .nodes()
            .iter()
            .flat_map(|&id| {
                tree.parent(id)
                    .into_iter()
                    .flat_map(|p| tree.element_children(p))
                    .filter(move |&s| s != id)
            })
            .collect();
        self.derive("siblings", self.in_document_order(found), None)
    }
}
