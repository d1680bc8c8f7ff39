//! The selection value and its set operations.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use quarry_common::warning::warn_once;
use quarry_dom::{DomTree, NodeId};

use crate::document::compile;
use crate::{Document, QueryError, UnionOrder};

/// An ordered, duplicate-free set of nodes from one [`Document`], plus the
/// selection it was derived from.
///
/// Selections are immutable. Cloning one is cheap: the node list, the
/// document and the history are all shared.
#[derive(Clone)]
pub struct Selection {
    document: Rc<Document>,
    nodes: Rc<[NodeId]>,
    prev: Option<Rc<Self>>,
    selector: Option<Rc<str>>,
}

impl Selection {
    pub(crate) fn root(document: Rc<Document>) -> Self {
        Self {
            document,
            nodes: Rc::from([NodeId::ROOT].as_slice()),
            prev: None,
            selector: None,
        }
    }

    /// A selection of `id` alone with no history, as handed to callbacks.
    pub(crate) fn single(&self, id: NodeId) -> Self {
        Self {
            document: Rc::clone(&self.document),
            nodes: Rc::from([id].as_slice()),
            prev: None,
            selector: None,
        }
    }

    /// A new selection whose history link points at `self`.
    ///
    /// `nodes` must already be duplicate-free.
    pub(crate) fn derive(
        &self,
        op: &'static str,
        nodes: Vec<NodeId>,
        selector: Option<&str>,
    ) -> Self {
        tracing::trace!(
            op,
            selector,
            from = self.nodes.len(),
            to = nodes.len(),
            "derived selection"
        );
        Self {
            document: Rc::clone(&self.document),
            nodes: nodes.into(),
            prev: Some(Rc::new(self.clone())),
            selector: selector.map(Rc::from),
        }
    }

    pub(crate) fn tree(&self) -> &DomTree {
        self.document.tree()
    }

    /// Drop repeats, keeping the first occurrence of each node.
    pub(crate) fn unique(nodes: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        nodes.into_iter().filter(|&id| seen.insert(id)).collect()
    }

    /// Sort into document order and drop repeats.
    pub(crate) fn in_document_order(&self, mut nodes: Vec<NodeId>) -> Vec<NodeId> {
        let tree = self.tree();
        nodes.sort_by(|&a, &b| tree.compare_document_order(a, b));
        nodes.dedup();
        nodes
    }

    /// The nodes of `other`, or nothing when it belongs to another document.
    fn shared_nodes<'a>(&self, other: &'a Self, method: &str) -> &'a [NodeId] {
        if Rc::ptr_eq(&self.document, &other.document) {
            &other.nodes
        } else {
            let _ = warn_once(
                "query",
                &format!("{method}: ignoring a selection from a different document"),
            );
            &[]
        }
    }

    // ========== inspection ==========

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the selection holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node at `index`; negative indices count from the end.
    #[must_use]
    pub fn get(&self, index: isize) -> Option<NodeId> {
        let len = isize::try_from(self.nodes.len()).ok()?;
        let index = if index < 0 { len + index } else { index };
        usize::try_from(index)
            .ok()
            .and_then(|i| self.nodes.get(i).copied())
    }

    /// All nodes, in selection order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Position of `id` within this selection.
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == id)
    }

    /// The document the nodes belong to.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The selector that produced this selection, if one did.
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    // ========== history ==========

    /// The selection this one was derived from. A selection without
    /// history returns itself.
    #[must_use]
    pub fn end(&self) -> Self {
        self.prev
            .as_deref()
            .map_or_else(|| self.clone(), Clone::clone)
    }

    // ========== positional ==========

    /// The node at `index` (negative from the end), or an empty selection.
    #[must_use]
    pub fn eq(&self, index: isize) -> Self {
        let nodes = self.get(index).into_iter().collect();
        self.derive("eq", nodes, None)
    }

    /// The first node.
    #[must_use]
    pub fn first(&self) -> Self {
        let nodes = self.get(0).into_iter().collect();
        self.derive("first", nodes, None)
    }

    /// The last node.
    #[must_use]
    pub fn last(&self) -> Self {
        let nodes = self.get(-1).into_iter().collect();
        self.derive("last", nodes, None)
    }

    /// Nodes from `start` up to (not including) `end`. Negative bounds count
    /// from the end; bounds are clamped to the selection.
    #[must_use]
    pub fn slice(&self, start: isize, end: Option<isize>) -> Self {
        let len = self.nodes.len();
        let clamp = |bound: isize| {
            let len = isize::try_from(len).unwrap_or(isize::MAX);
            let bound = if bound < 0 { len + bound } else { bound };
            usize::try_from(bound.clamp(0, len)).unwrap_or(0)
        };
        let from = clamp(start);
        let to = end.map_or(len, clamp);
        let nodes = if from < to {
            self.nodes[from..to].to_vec()
        } else {
            Vec::new()
        };
        self.derive("slice", nodes, None)
    }

    // ========== searching ==========

    /// Descendants of every node matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn find(&self, selector: &str) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        let tree = self.tree();
        let found: Vec<NodeId> = self
            .nodes
            .iter()
            .flat_map(|&id| compiled.find_all(tree, id))
            .collect();
        let nodes = if self.nodes.len() > 1 {
            self.in_document_order(found)
        } else {
            found
        };
        Ok(self.derive("find", nodes, Some(selector)))
    }

    /// The current nodes plus every node in the document matching
    /// `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn add(&self, selector: &str) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        let found = compiled.find_all(self.tree(), NodeId::ROOT);
        Ok(self.union("add", found, Some(selector)))
    }

    /// The current nodes plus the nodes of `other`.
    #[must_use]
    pub fn add_selection(&self, other: &Self) -> Self {
        let extra = self.shared_nodes(other, "add").to_vec();
        self.union("add", extra, other.selector())
    }

    fn union(&self, op: &'static str, extra: Vec<NodeId>, selector: Option<&str>) -> Self {
        let combined = Self::unique(self.nodes.iter().copied().chain(extra));
        let nodes = match self.document.options().union_order {
            UnionOrder::Append => combined,
            UnionOrder::Document => self.in_document_order(combined),
        };
        self.derive(op, nodes, selector)
    }

    // ========== narrowing ==========

    fn retain(
        &self,
        op: &'static str,
        selector: Option<&str>,
        mut keep: impl FnMut(usize, NodeId) -> bool,
    ) -> Self {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter(|&(index, &id)| keep(index, id))
            .map(|(_, &id)| id)
            .collect();
        self.derive(op, nodes, selector)
    }

    /// Nodes matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn filter(&self, selector: &str) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        let tree = self.tree();
        Ok(self.retain("filter", Some(selector), |_, id| compiled.matches(tree, id)))
    }

    /// Nodes for which `predicate(index, node)` holds. Each node is passed
    /// as a single-node selection without history.
    #[must_use]
    pub fn filter_fn(&self, mut predicate: impl FnMut(usize, &Self) -> bool) -> Self {
        self.retain("filter", None, |index, id| predicate(index, &self.single(id)))
    }

    /// Nodes that are also in `other`.
    #[must_use]
    pub fn filter_selection(&self, other: &Self) -> Self {
        let wanted: HashSet<NodeId> = self.shared_nodes(other, "filter").iter().copied().collect();
        self.retain("filter", other.selector(), |_, id| wanted.contains(&id))
    }

    /// Nodes not matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn not(&self, selector: &str) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        let tree = self.tree();
        Ok(self.retain("not", Some(selector), |_, id| !compiled.matches(tree, id)))
    }

    /// Nodes for which `predicate(index, node)` does not hold.
    #[must_use]
    pub fn not_fn(&self, mut predicate: impl FnMut(usize, &Self) -> bool) -> Self {
        self.retain("not", None, |index, id| !predicate(index, &self.single(id)))
    }

    /// Nodes not in `other`.
    #[must_use]
    pub fn not_selection(&self, other: &Self) -> Self {
        let unwanted: HashSet<NodeId> = self.shared_nodes(other, "not").iter().copied().collect();
        self.retain("not", other.selector(), |_, id| !unwanted.contains(&id))
    }

    /// Nodes with at least one descendant matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn has(&self, selector: &str) -> Result<Self, QueryError> {
        let compiled = compile(selector)?;
        let tree = self.tree();
        Ok(self.retain("has", Some(selector), |_, id| {
            tree.descendants(id).any(|d| compiled.matches(tree, d))
        }))
    }

    // ========== tests ==========

    /// Whether any node matches `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Selector`] if `selector` does not compile.
    pub fn is(&self, selector: &str) -> Result<bool, QueryError> {
        let compiled = compile(selector)?;
        let tree = self.tree();
        Ok(self.nodes.iter().any(|&id| compiled.matches(tree, id)))
    }

    /// Whether `predicate` holds for any node. Stops at the first match.
    #[must_use]
    pub fn is_fn(&self, mut predicate: impl FnMut(usize, &Self) -> bool) -> bool {
        self.nodes
            .iter()
            .enumerate()
            .any(|(index, &id)| predicate(index, &self.single(id)))
    }

    /// Whether any node is also in `other`.
    #[must_use]
    pub fn is_selection(&self, other: &Self) -> bool {
        let theirs = self.shared_nodes(other, "is");
        self.nodes.iter().any(|id| theirs.contains(id))
    }
}

/// Two selections are equal when they hold the same nodes, in the same
/// order, of the same document. History is not compared.
impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.document, &other.document) && self.nodes == other.nodes
    }
}

impl Eq for Selection {}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree();
        let names: Vec<&str> = self.nodes.iter().map(|&id| tree.node_name(id)).collect();
        f.debug_struct("Selection")
            .field("nodes", &names)
            .field("selector", &self.selector())
            .field("has_prev", &self.prev.is_some())
            .finish()
    }
}
