//! Integration tests for converting parsed HTML into the arena tree.

use quarry_dom::{DomTree, NodeId, NodeType};
use quarry_html::parse_document;

fn first_element(tree: &DomTree, tag: &str) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .find(|&id| tree.tag_name(id) == tag)
        .unwrap_or_else(|| panic!("no <{tag}> in document"))
}

#[test]
fn test_implied_structure() {
    let tree = parse_document("<p>Hello</p>").unwrap();
    let html = tree.document_element().unwrap();
    assert_eq!(tree.tag_name(html), "html");
    let body = tree.body().unwrap();
    let p = first_element(&tree, "p");
    assert_eq!(tree.parent(p), Some(body));
    assert_eq!(tree.text_content(p), "Hello");
}

#[test]
fn test_whitespace_text_in_head_is_kept() {
    let tree = parse_document("<html>\n<head>\n\t<title>T</title>\n</head><body></body></html>").unwrap();
    let head = first_element(&tree, "head");
    let children = tree.children(head);
    assert_eq!(children.len(), 3);
    assert_eq!(tree.as_text(children[0]), Some("\n\t"));
    assert_eq!(tree.tag_name(children[1]), "title");
    assert_eq!(tree.as_text(children[2]), Some("\n"));
}

#[test]
fn test_tag_and_attribute_names_are_lowercased() {
    let tree = parse_document("<DIV ID=\"main\" Data-X=\"1\"></DIV>").unwrap();
    let div = first_element(&tree, "div");
    let element = tree.as_element(div).unwrap();
    assert_eq!(element.id(), Some("main"));
    assert_eq!(element.attrs.iter().nth(1), Some(("data-x", "1")));
}

#[test]
fn test_doctype_and_comments_are_nodes() {
    let tree = parse_document("<!DOCTYPE html><!-- note --><html><body></body></html>").unwrap();
    let children = tree.children(NodeId::ROOT);
    assert!(matches!(
        tree.get(children[0]).map(|n| &n.node_type),
        Some(NodeType::Doctype(name)) if name == "html"
    ));
    assert!(matches!(
        tree.get(children[1]).map(|n| &n.node_type),
        Some(NodeType::Comment(text)) if text == " note "
    ));
}

#[test]
fn test_empty_markup_still_builds_a_document() {
    let tree = parse_document("").unwrap();
    assert!(tree.document_element().is_some());
    assert!(tree.body().is_some());
}

#[test]
fn test_template_content_is_part_of_the_tree() {
    let tree = parse_document("<body><template><p id=\"t\">x</p></template><p id=\"o\">y</p></body>").unwrap();
    let template = first_element(&tree, "template");
    let inner = first_element(&tree, "p");
    assert_eq!(tree.parent(inner), Some(template));
    assert_eq!(tree.text_content(template), "x");
    let paragraphs = tree
        .descendants(NodeId::ROOT)
        .filter(|&id| tree.tag_name(id) == "p")
        .count();
    assert_eq!(paragraphs, 2);
}

#[test]
fn test_duplicate_attribute_keeps_the_first() {
    let tree = parse_document("<p id=\"a\" id=\"b\"></p>").unwrap();
    let p = first_element(&tree, "p");
    let element = tree.as_element(p).unwrap();
    assert_eq!(element.id(), Some("a"));
    assert_eq!(element.attrs.len(), 1);
}
