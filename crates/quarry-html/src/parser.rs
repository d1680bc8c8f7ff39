//! Uses html5ever's `RcDom` and converts it to our arena.

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use quarry_dom::{Attributes, DomTree, ElementData, NodeId, NodeType};

use crate::ParseError;

/// HTML5 document parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser {
    scripting: bool,
}

impl HtmlParser {
    /// Create a parser with scripting disabled, so `<noscript>` content is
    /// parsed as markup.
    #[must_use]
    pub const fn new() -> Self {
        Self { scripting: false }
    }

    /// [§ 13.2.6 scripting flag](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// When enabled, `<noscript>` content is kept as raw text.
    #[must_use]
    pub const fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting = enabled;
        self
    }

    /// Parse a complete document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Read`] if html5ever fails to read the input.
    pub fn parse(&self, markup: &str) -> Result<DomTree, ParseError> {
        let mut opts = ParseOpts::default();
        opts.tree_builder.scripting_enabled = self.scripting;

        let dom = parse_document(RcDom::default(), opts)
            .from_utf8()
            .read_from(&mut markup.as_bytes())?;

        let tree = convert(&dom.document);
        tracing::debug!(nodes = tree.len(), "parsed HTML document");
        Ok(tree)
    }
}

/// Copy the `RcDom` into a [`DomTree`].
///
/// Nodes are allocated in pre-order, so arena order is tree order.
/// Whitespace-only text is kept. A `<template>`'s content fragment is
/// attached under the template element itself.
fn convert(document: &Handle) -> DomTree {
    let mut tree = DomTree::new();
    let mut stack: Vec<(Handle, NodeId)> = document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), NodeId::ROOT))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let node_type = match &handle.data {
            NodeData::Document => continue,
            NodeData::Doctype { name, .. } => NodeType::Doctype(name.to_string()),
            NodeData::Text { contents } => NodeType::Text(contents.borrow().to_string()),
            NodeData::Comment { contents } => NodeType::Comment(contents.to_string()),
            NodeData::Element { name, attrs, .. } => {
                let attrs: Attributes = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                NodeType::Element(ElementData::new(&name.local, attrs))
            }
            NodeData::ProcessingInstruction { .. } => continue,
        };

        let id = tree.alloc(node_type);
        tree.append_child(parent, id);
        let mut children: Vec<Handle> = handle.children.borrow().clone();
        let fragment = match &handle.data {
            NodeData::Element {
                template_contents, ..
            } => template_contents.borrow().clone(),
            _ => None,
        };
        if let Some(fragment) = fragment {
            children.extend(fragment.children.borrow().iter().cloned());
        }
        stack.extend(children.into_iter().rev().map(|child| (child, id)));
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let tree = HtmlParser::new().parse(html).unwrap();
        assert!(tree.len() > 1, "Expected more than 1 node, got {}", tree.len());
    }

    #[test]
    fn test_arena_order_is_tree_order() {
        let tree = HtmlParser::new()
            .parse("<div><p>a</p><p>b<i>c</i></p></div><span></span>")
            .unwrap();
        let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_template_content_is_attached_to_the_template() {
        let tree = HtmlParser::new()
            .parse("<body><template><p>x</p><i>y</i></template></body>")
            .unwrap();
        let template = tree
            .descendants(NodeId::ROOT)
            .find(|&id| tree.tag_name(id) == "template")
            .unwrap();
        let tags: Vec<&str> = tree.children(template).iter().map(|&c| tree.tag_name(c)).collect();
        assert_eq!(tags, vec!["p", "i"]);
    }

    #[test]
    fn test_scripting_flag_controls_noscript() {
        let markup = "<body><noscript><p>x</p></noscript></body>";
        let without = HtmlParser::new().parse(markup).unwrap();
        let with = HtmlParser::new().with_scripting(true).parse(markup).unwrap();
        let count_p = |tree: &DomTree| {
            tree.descendants(NodeId::ROOT)
                .filter(|&id| tree.tag_name(id) == "p")
                .count()
        };
        assert_eq!(count_p(&without), 1);
        assert_eq!(count_p(&with), 0);
    }
}
