//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)

use crate::{DomTree, NodeId, NodeType};

/// [§ 13.1.2 Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are serialized without escaping.
const RAW_TEXT_PARENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
];

/// The markup of the children of `id`.
#[must_use]
pub fn inner_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    if VOID_ELEMENTS.contains(&tree.tag_name(id)) {
        return out;
    }
    for &child in tree.children(id) {
        serialize_node(tree, child, &mut out);
    }
    out
}

/// The markup of `id` itself, including its own start and end tags.
#[must_use]
pub fn outer_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    serialize_node(tree, id, &mut out);
    out
}

fn serialize_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => {
            for &child in &node.children {
                serialize_node(tree, child, out);
            }
        }
        NodeType::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeType::Element(data) => {
            out.push('<');
            out.push_str(&data.tag_name);
            for (name, value) in data.attrs.iter() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&data.tag_name.as_str()) {
                return;
            }
            for &child in &node.children {
                serialize_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&data.tag_name);
            out.push('>');
        }
        NodeType::Text(text) => {
            let raw = node
                .parent
                .is_some_and(|p| RAW_TEXT_PARENTS.contains(&tree.tag_name(p)));
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        NodeType::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
fn escape_into(text: &str, attribute_mode: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// One line per node, indented two spaces per level, labelled the way
/// [`DomTree::node_name`] names nodes:
///
/// ```text
/// #document
///   html
///     body
///       p#intro.lead [lang=en]
///         #text "Hello\n"
/// ```
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![(id, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node_label(tree, node));
        out.push('\n');
        stack.extend(tree.children(node).iter().rev().map(|&c| (c, depth + 1)));
    }
    out
}

fn node_label(tree: &DomTree, id: NodeId) -> String {
    match tree.get(id).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) => {
            let mut label = data.tag_name.clone();
            if let Some(node_id) = data.id() {
                label.push('#');
                label.push_str(node_id);
            }
            for class in data.classes() {
                label.push('.');
                label.push_str(class);
            }
            for (name, value) in data.attrs.iter() {
                if name == "id" || name == "class" {
                    continue;
                }
                if value.is_empty() {
                    label.push_str(&format!(" [{name}]"));
                } else {
                    label.push_str(&format!(" [{name}={value:?}]"));
                }
            }
            label
        }
        Some(NodeType::Text(text)) => format!("#text {text:?}"),
        Some(NodeType::Comment(text)) => format!("#comment {text:?}"),
        Some(NodeType::Doctype(name)) => format!("#doctype {name}"),
        Some(NodeType::Document) | None => "#document".to_string(),
    }
}

/// Print [`format_tree`] for the subtree at `id` to stdout, starting at
/// `indent` levels.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    for line in format_tree(tree, id).lines() {
        println!("{prefix}{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_and_attribute_modes() {
        let mut text = String::new();
        escape_into("a < b & \"c\"", false, &mut text);
        assert_eq!(text, "a &lt; b &amp; \"c\"");

        let mut attr = String::new();
        escape_into("a < b & \"c\"", true, &mut attr);
        assert_eq!(attr, "a < b &amp; &quot;c&quot;");
    }
}
