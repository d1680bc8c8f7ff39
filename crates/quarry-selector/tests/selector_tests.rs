//! Integration tests for CSS selector parsing and matching.

use quarry_dom::{DomTree, NodeId};
use quarry_html::parse_document;
use quarry_selector::{
    AttributeSelector, Combinator, Nth, PseudoClass, Selector, SelectorError, SimpleSelector,
};

const PAGE: &str = r#"<html><head><title>t</title></head><body>
<h1 id="top" class="title main">Heading</h1>
<div class="content">
  <p class="lead">First <b>bold</b></p>
  <p lang="en-US">Second</p>
  <ul><li>a</li><li class="x">b</li><li>c</li><li>d</li></ul>
  <span></span>
  <a href="/home">home</a><a>nowhere</a>
</div>
<form><input type="checkbox" name="c" checked><input type="text" name="t" disabled>
<select><option>1</option><option selected>2</option></select></form>
</body></html>"#;

fn page() -> DomTree {
    parse_document(PAGE).unwrap()
}

fn tags(tree: &DomTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| tree.tag_name(id).to_string()).collect()
}

fn texts(tree: &DomTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| tree.text_content(id)).collect()
}

fn select(tree: &DomTree, selector: &str) -> Vec<NodeId> {
    Selector::parse(selector).unwrap().find_all(tree, NodeId::ROOT)
}

// ========== parsing ==========

#[test]
fn test_parse_compound_selector() {
    let selector = Selector::parse("DIV.content#main").unwrap();
    let complex = &selector.complex_selectors()[0];
    assert!(complex.combinators.is_empty());
    assert_eq!(
        complex.subject.simple_selectors,
        vec![
            SimpleSelector::Type("div".to_string()),
            SimpleSelector::Class("content".to_string()),
            SimpleSelector::Id("main".to_string()),
        ]
    );
}

#[test]
fn test_parse_combinators_right_to_left() {
    let selector = Selector::parse("ul > li + li ~ span a").unwrap();
    let complex = &selector.complex_selectors()[0];
    let chain: Vec<_> = complex.combinators.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        chain,
        vec![
            Combinator::Descendant,
            Combinator::SubsequentSibling,
            Combinator::NextSibling,
            Combinator::Child,
        ]
    );
    assert!(matches!(
        &complex.subject.simple_selectors[0],
        SimpleSelector::Type(name) if name == "a"
    ));
}

#[test]
fn test_parse_selector_list() {
    let selector = Selector::parse(" h1 ,  footer ").unwrap();
    assert_eq!(selector.complex_selectors().len(), 2);
    assert_eq!(selector.source(), "h1 ,  footer");
    assert_eq!(selector.to_string(), "h1 ,  footer");
}

#[test]
fn test_parse_attribute_operators() {
    let selector = Selector::parse("[HREF][type=text][class~='a'][lang|=en][src^=\"http\"][src$=.png][title*=x]").unwrap();
    let simple = &selector.complex_selectors()[0].subject.simple_selectors;
    assert_eq!(
        simple,
        &vec![
            SimpleSelector::Attribute(AttributeSelector::Exists("href".to_string())),
            SimpleSelector::Attribute(AttributeSelector::Equals("type".to_string(), "text".to_string())),
            SimpleSelector::Attribute(AttributeSelector::Includes("class".to_string(), "a".to_string())),
            SimpleSelector::Attribute(AttributeSelector::DashMatch("lang".to_string(), "en".to_string())),
            SimpleSelector::Attribute(AttributeSelector::PrefixMatch("src".to_string(), "http".to_string())),
            SimpleSelector::Attribute(AttributeSelector::SuffixMatch("src".to_string(), ".png".to_string())),
            SimpleSelector::Attribute(AttributeSelector::SubstringMatch("title".to_string(), "x".to_string())),
        ]
    );
}

#[test]
fn test_parse_pseudo_classes() {
    let selector = Selector::parse("li:nth-child(2n+1):not(.x)").unwrap();
    let simple = &selector.complex_selectors()[0].subject.simple_selectors;
    assert_eq!(
        simple[1],
        SimpleSelector::PseudoClass(PseudoClass::NthChild(Nth { a: 2, b: 1 }))
    );
    assert!(matches!(&simple[2], SimpleSelector::PseudoClass(PseudoClass::Not(_))));
}

#[test]
fn test_interactive_pseudo_classes_never_match() {
    let selector = Selector::parse("a:hover, p::before").unwrap();
    let members = selector.complex_selectors();
    assert_eq!(members[0].subject.simple_selectors[1], SimpleSelector::NeverMatch);
    assert_eq!(members[1].subject.simple_selectors[1], SimpleSelector::NeverMatch);
    assert!(select(&page(), "a:hover, p::before").is_empty());
}

#[test]
fn test_parse_errors() {
    assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
    assert_eq!(Selector::parse("h1,"), Err(SelectorError::Empty));
    assert_eq!(Selector::parse("> p"), Err(SelectorError::DanglingCombinator('>')));
    assert_eq!(Selector::parse("div >"), Err(SelectorError::DanglingCombinator('>')));
    assert_eq!(Selector::parse("[href"), Err(SelectorError::BadAttribute));
    assert_eq!(Selector::parse("[title=\"x]"), Err(SelectorError::UnterminatedString));
    assert_eq!(Selector::parse("p:not(a"), Err(SelectorError::UnbalancedParens));
    assert_eq!(
        Selector::parse("p:bogus"),
        Err(SelectorError::UnsupportedPseudoClass("bogus".to_string()))
    );
    assert_eq!(
        Selector::parse("p:not"),
        Err(SelectorError::MissingArgument("not".to_string()))
    );
    assert_eq!(
        Selector::parse("p!"),
        Err(SelectorError::UnexpectedChar { ch: '!', offset: 1 })
    );
    assert!(Selector::parse("li:nth-child(foo)").is_err());
}

// ========== matching ==========

#[test]
fn test_find_all_is_document_order_without_duplicates() {
    let tree = page();
    let found = select(&tree, "p, div, b, p.lead");
    assert_eq!(tags(&tree, &found), vec!["div", "p", "b", "p"]);
}

#[test]
fn test_descendant_and_child_combinators() {
    let tree = page();
    assert_eq!(select(&tree, "div b").len(), 1);
    assert_eq!(select(&tree, "div > b").len(), 0);
    assert_eq!(select(&tree, "body > div > p").len(), 2);
}

#[test]
fn test_combinator_backtracks_over_ancestors() {
    // The nearest <div> is not a child of <body>; the outer one is.
    let tree = parse_document("<body><div><div><span>x</span></div></div></body>").unwrap();
    assert_eq!(select(&tree, "body > div span").len(), 1);
}

#[test]
fn test_sibling_combinators() {
    let tree = page();
    assert_eq!(texts(&tree, &select(&tree, "li.x + li")), vec!["c"]);
    assert_eq!(texts(&tree, &select(&tree, "li.x ~ li")), vec!["c", "d"]);
    assert_eq!(select(&tree, "h1 ~ form").len(), 1);
}

#[test]
fn test_attribute_matching() {
    let tree = page();
    assert_eq!(select(&tree, "[lang|=en]").len(), 1);
    assert_eq!(select(&tree, "h1[class~=main]").len(), 1);
    assert_eq!(select(&tree, "a[href^='/']").len(), 1);
    assert_eq!(select(&tree, "[class^='']").len(), 0);
    assert_eq!(select(&tree, "[CLASS=lead]").len(), 1);
}

#[test]
fn test_structural_pseudo_classes() {
    let tree = page();
    assert_eq!(texts(&tree, &select(&tree, "li:first-child")), vec!["a"]);
    assert_eq!(texts(&tree, &select(&tree, "li:last-child")), vec!["d"]);
    assert_eq!(texts(&tree, &select(&tree, "li:nth-child(even)")), vec!["b", "d"]);
    assert_eq!(texts(&tree, &select(&tree, "li:nth-last-child(1)")), vec!["d"]);
    assert_eq!(texts(&tree, &select(&tree, "li:nth-child(-n+2)")), vec!["a", "b"]);
    assert_eq!(texts(&tree, &select(&tree, "div > p:first-of-type")), vec!["First bold"]);
    assert_eq!(select(&tree, "ul:only-of-type").len(), 1);
    assert_eq!(select(&tree, ":root").len(), 1);
    assert_eq!(tags(&tree, &select(&tree, "div > :empty")), vec!["span"]);
}

#[test]
fn test_logical_pseudo_classes() {
    let tree = page();
    assert_eq!(texts(&tree, &select(&tree, "li:not(.x):not(:first-child)")), vec!["c", "d"]);
    assert_eq!(tags(&tree, &select(&tree, ":is(h1, span)")), vec!["h1", "span"]);
    assert_eq!(select(&tree, "p:has(b)").len(), 1);
    assert_eq!(texts(&tree, &select(&tree, "p:contains('Sec')")), vec!["Second"]);
}

#[test]
fn test_form_state_pseudo_classes() {
    let tree = page();
    assert_eq!(select(&tree, "input:checked").len(), 1);
    assert_eq!(texts(&tree, &select(&tree, "option:checked")), vec!["2"]);
    assert_eq!(select(&tree, "input:disabled").len(), 1);
    assert_eq!(select(&tree, "input:enabled").len(), 1);
    assert_eq!(texts(&tree, &select(&tree, "a:link")), vec!["home"]);
}

#[test]
fn test_text_nodes_never_match() {
    let tree = page();
    let selector = Selector::parse("*").unwrap();
    assert!(!selector.matches(&tree, NodeId::ROOT));
    let h1 = select(&tree, "h1")[0];
    let text = tree.children(h1)[0];
    assert!(!selector.matches(&tree, text));
}

#[test]
fn test_find_all_excludes_scope() {
    let tree = page();
    let div = select(&tree, "div")[0];
    let selector = Selector::parse("div, p").unwrap();
    assert_eq!(selector.find_all(&tree, div).len(), 2);
}
