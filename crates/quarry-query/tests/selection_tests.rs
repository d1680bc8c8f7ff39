//! Tests for building, narrowing and walking selections.

use quarry_query::{
    Document, DomTree, NodeId, QueryError, QueryOptions, Selection, UnionOrder, parse_document,
    parse_document_with,
};

const PAGE: &str = include_str!("fixtures/page.html");

fn doc() -> Selection {
    parse_document(PAGE).unwrap()
}

fn tags(selection: &Selection) -> Vec<String> {
    selection.map(|_, s| s.document().tree().tag_name(s.nodes()[0]).to_string())
}

// ========== find / add ==========

#[test]
fn test_find() {
    let h1 = doc().find("h1").unwrap();
    assert_eq!(h1.len(), 1);
    assert_eq!(h1.text(), "Lorem ipsum");
    assert_eq!(h1.selector(), Some("h1"));
}

#[test]
fn test_find_on_empty_selection_is_empty() {
    let none = doc().find("nav").unwrap();
    assert!(none.is_empty());
    assert!(none.find("p").unwrap().is_empty());
    assert!(none.children().is_empty());
    assert!(none.first().is_empty());
}

#[test]
fn test_find_merges_in_document_order() {
    let root = doc();
    let both = root.find("select").unwrap().find("option").unwrap();
    assert_eq!(both.len(), 7);
    let options = root.find("option").unwrap();
    assert_eq!(both, options);
}

#[test]
fn test_find_nested_scopes_do_not_duplicate() {
    let scopes = doc().find("body, form").unwrap();
    assert_eq!(scopes.len(), 2);
    assert_eq!(scopes.find("select").unwrap().len(), 3);
}

#[test]
fn test_bad_selector_is_an_error() {
    let err = doc().find("p >").unwrap_err();
    assert!(matches!(err, QueryError::Selector { ref selector, .. } if selector == "p >"));
    assert!(err.to_string().contains("p >"));
}

#[test]
fn test_add_selector() {
    let sel = doc().find("h1").unwrap().add("footer").unwrap();
    assert_eq!(sel.len(), 2);
    assert_eq!(sel.text(), "Lorem ipsumThis is the footer.");
}

#[test]
fn test_add_selection() {
    let root = doc();
    let sel = root
        .find("h1")
        .unwrap()
        .add_selection(&root.find("footer").unwrap());
    assert_eq!(sel.len(), 2);
    assert_eq!(sel.text(), "Lorem ipsumThis is the footer.");
}

#[test]
fn test_add_appends_by_default_and_dedups() {
    let sel = doc().find("footer").unwrap().add("h1, footer").unwrap();
    assert_eq!(tags(&sel), vec!["footer", "h1"]);
}

#[test]
fn test_add_document_order_option() {
    let options = QueryOptions::default().with_union_order(UnionOrder::Document);
    let root = parse_document_with(PAGE, options).unwrap();
    let sel = root.find("footer").unwrap().add("h1").unwrap();
    assert_eq!(tags(&sel), vec!["h1", "footer"]);
}

#[test]
fn test_add_selection_from_another_document_adds_nothing() {
    let ours = doc().find("h1").unwrap();
    let theirs = doc().find("footer").unwrap();
    assert_eq!(ours.add_selection(&theirs).len(), 1);
}

// ========== children / contents ==========

#[test]
fn test_children() {
    let head_children = doc().find("head").unwrap().children();
    assert_eq!(head_children.len(), 1);
    assert!(head_children.is("title").unwrap());

    let paragraphs = doc().find("body").unwrap().children_filtered("p").unwrap();
    assert_eq!(paragraphs.len(), 2);
    assert!(paragraphs.last().text().starts_with("Nullam id nisi"));
}

#[test]
fn test_contents_includes_text_nodes() {
    let contents = doc().find("head").unwrap().contents();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents.first().text(), "\n\t");
    assert_eq!(contents.eq(1).children().len(), 0);
    assert!(contents.is("title").unwrap());
}

#[test]
fn test_filter_skips_text_nodes() {
    let contents = doc().find("head").unwrap().contents();
    assert_eq!(contents.filter("*").unwrap().len(), 1);
    assert_eq!(contents.not("*").unwrap().len(), 2);
}

// ========== ancestors ==========

#[test]
fn test_closest() {
    let form = doc().find("textarea").unwrap().closest("form").unwrap();
    assert_eq!(form.attr("id"), Some("form1"));
    let itself = doc().find("form").unwrap().closest("form").unwrap();
    assert_eq!(itself.len(), 1);
}

#[test]
fn test_closest_dedups_shared_ancestors() {
    let forms = doc().find("option").unwrap().closest("form").unwrap();
    assert_eq!(forms.len(), 1);
}

#[test]
fn test_parent_and_parents() {
    let selects = doc().find("option").unwrap().parent();
    assert_eq!(selects.len(), 3);
    assert_eq!(tags(&selects), vec!["select", "select", "select"]);

    let ancestors = doc().find("#text_input").unwrap().parents();
    assert_eq!(tags(&ancestors), vec!["form", "body", "html"]);
    assert!(doc().find("html").unwrap().parent().is_empty());
}

#[test]
fn test_parents_until() {
    let sel = doc()
        .find("option")
        .unwrap()
        .first()
        .parents_until("body", None)
        .unwrap();
    assert_eq!(tags(&sel), vec!["select", "form"]);

    let filtered = doc()
        .find("option")
        .unwrap()
        .first()
        .parents_until("html", Some("form"))
        .unwrap();
    assert_eq!(tags(&filtered), vec!["form"]);
}

// ========== siblings ==========

#[test]
fn test_next() {
    let next = doc().find("h1").unwrap().next();
    assert_eq!(next.len(), 1);
    assert!(next.is("p").unwrap());
    assert_eq!(doc().find("p").unwrap().next_filtered("form").unwrap().len(), 1);
    assert!(doc().find("footer").unwrap().next().is_empty());
}

#[test]
fn test_next_all() {
    let h1 = doc().find("h1").unwrap();
    assert_eq!(h1.next_all().len(), 4);
    assert_eq!(h1.next_all_filtered("p").unwrap().len(), 2);
}

#[test]
fn test_next_until() {
    let h1 = doc().find("h1").unwrap();
    assert_eq!(tags(&h1.next_until("form", None).unwrap()), vec!["p", "p"]);
    assert_eq!(h1.next_until("nav", None).unwrap().len(), 4);
}

#[test]
fn test_prev() {
    let prev = doc().find("footer").unwrap().prev();
    assert!(prev.is("form").unwrap());
    assert_eq!(doc().find("footer").unwrap().prev_filtered("form").unwrap().len(), 1);
    assert_eq!(doc().find("footer").unwrap().prev_filtered("p").unwrap().len(), 0);
}

#[test]
fn test_prev_all_is_nearest_first() {
    let form = doc().find("form").unwrap();
    let all = form.prev_all();
    assert_eq!(tags(&all), vec!["p", "p", "h1"]);
    assert_eq!(form.prev_all_filtered("p").unwrap().len(), 2);
    assert_eq!(tags(&form.prev_until("h1", None).unwrap()), vec!["p", "p"]);
}

#[test]
fn test_siblings() {
    let sel = doc().find("form").unwrap().siblings();
    assert_eq!(tags(&sel), vec!["h1", "p", "p", "footer"]);
    let both = doc().find("h1, footer").unwrap().siblings();
    assert_eq!(both.len(), 5);
}

#[test]
fn test_has() {
    let sel = doc().find("body").unwrap().children().has("input").unwrap();
    assert_eq!(sel.len(), 1);
    assert_eq!(sel.attr("id"), Some("form1"));
}

// ========== filter / not / is ==========

#[test]
fn test_filter_selector_and_predicate() {
    let children = doc().find("body").unwrap().children();
    assert_eq!(children.filter("p").unwrap().len(), 2);
    assert_eq!(children.filter_fn(|_, el| el.is("p").unwrap()).len(), 2);
    assert_eq!(children.filter_fn(|index, _| index % 2 == 0).len(), 3);
}

#[test]
fn test_filter_selection() {
    let root = doc();
    let children = root.find("body").unwrap().children();
    let paragraphs = root.find("p").unwrap();
    assert_eq!(children.filter_selection(&paragraphs).len(), 2);
}

#[test]
fn test_not() {
    let children = doc().find("body").unwrap().children();
    assert_eq!(tags(&children.not("p").unwrap()), vec!["h1", "form", "footer"]);
    assert_eq!(children.not_fn(|index, _| index > 0).len(), 1);
}

#[test]
fn test_is() {
    let h1 = doc().find("h1").unwrap();
    assert!(h1.is("h1").unwrap());
    assert!(!h1.is("p").unwrap());
    assert!(!doc().find("nav").unwrap().is("*").unwrap());
    assert!(h1.is_fn(|_, el| el.attr("id") == Some("top")));
    let root = doc();
    let any = root.find("h1, p").unwrap();
    assert!(any.is_selection(&root.find("p").unwrap()));
}

// ========== positional ==========

#[test]
fn test_eq_first_last() {
    let children = doc().find("body").unwrap().children();
    assert_eq!(children.len(), 5);
    assert_eq!(children.eq(3).attr("id"), Some("form1"));
    assert_eq!(children.eq(-1).text(), "This is the footer.");
    assert!(children.eq(5).is_empty());
    assert!(children.eq(-6).is_empty());
    assert_eq!(children.first().attr("id"), Some("top"));
    assert_eq!(children.last().text(), "This is the footer.");
}

#[test]
fn test_slice() {
    let children = doc().find("body").unwrap().children();
    assert_eq!(tags(&children.slice(1, Some(3))), vec!["p", "p"]);
    assert_eq!(tags(&children.slice(-2, None)), vec!["form", "footer"]);
    assert!(children.slice(4, Some(2)).is_empty());
    assert_eq!(children.slice(0, Some(99)).len(), 5);
}

#[test]
fn test_get_and_index_of() {
    let children = doc().find("body").unwrap().children();
    let form = children.get(3).unwrap();
    assert_eq!(children.index_of(form), Some(3));
    assert_eq!(children.get(-5), children.get(0));
    assert_eq!(children.get(5), None);
}

// ========== history ==========

#[test]
fn test_end_undoes_one_step() {
    let body = doc().find("body").unwrap();
    let children = body.children();
    let back = children.filter("p").unwrap().end();
    assert_eq!(back.len(), 5);
    assert_eq!(back, children);
    assert_eq!(children.end(), body);
}

#[test]
fn test_end_on_root_returns_itself() {
    let root = doc();
    assert_eq!(root.end(), root);
    assert_eq!(root.end().end().nodes(), &[NodeId::ROOT]);
}

#[test]
fn test_callback_elements_have_no_history() {
    let children = doc().find("body").unwrap().children();
    children.each(|_, el| {
        assert_eq!(el.len(), 1);
        assert_eq!(el.end(), *el);
    });
}

// ========== template content ==========

#[test]
fn test_template_content_is_searchable() {
    let root = parse_document(
        "<body><template><p id=\"t\">x</p></template><p id=\"o\">y</p></body>",
    )
    .unwrap();
    assert_eq!(root.find("p").unwrap().len(), 2);
    assert_eq!(root.find("template p").unwrap().len(), 1);
    let template = root.find("template").unwrap();
    assert_eq!(template.contents().len(), 1);
    assert_eq!(template.text(), "x");
    assert_eq!(template.html().as_deref(), Some("<p id=\"t\">x</p>"));
}

// ========== documents from trees ==========

#[test]
fn test_document_from_prebuilt_tree() {
    let tree: DomTree = quarry_html::parse_document("<ul><li>a</li><li>b</li></ul>").unwrap();
    let root = Document::from_tree(tree, QueryOptions::default()).into_selection();
    assert_eq!(root.find("li").unwrap().text(), "ab");
    assert_eq!(root.document().options().union_order, UnionOrder::Append);
}
