//! Selector matching against a [`DomTree`].

use quarry_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector,
};

impl ComplexSelector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Match against an element with full DOM tree context.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        compound_matches_in_tree(&self.subject, tree, node_id)
            && matches_combinators(&self.combinators, tree, node_id)
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// The chain is stored right-to-left (from the subject outward). For each
/// combinator we look for a related element matching the compound, and the
/// rest of the chain must match from that element. Every candidate is tried,
/// so `div > p span` still matches when the nearest `p` is not a child of a
/// `div` but a farther one is.
fn matches_combinators(
    chain: &[(Combinator, CompoundSelector)],
    tree: &DomTree,
    current_id: NodeId,
) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    let candidate_matches = |id: NodeId| {
        compound_matches_in_tree(compound, tree, id) && matches_combinators(rest, tree, id)
    };

    match combinator {
        // "A selector of the form 'A B' represents an element B that is an
        // arbitrary descendant of some ancestor element A."
        Combinator::Descendant => tree.ancestors(current_id).any(candidate_matches),

        // "A selector of the form 'A > B' represents an element B that is a
        // direct child of element A."
        Combinator::Child => tree.parent(current_id).is_some_and(candidate_matches),

        // "A selector of the form 'A + B' represents an element B that
        // immediately follows element A, where A and B share the same parent."
        Combinator::NextSibling => tree
            .prev_element_sibling(current_id)
            .is_some_and(candidate_matches),

        // "A selector of the form 'A ~ B' represents an element B that follows
        // element A (not necessarily immediately)"
        Combinator::SubsequentSibling => tree
            .preceding_siblings(current_id)
            .any(candidate_matches),
    }
}

/// Check if a compound selector matches an element, with tree context for
/// structural pseudo-class matching. Non-elements never match.
fn compound_matches_in_tree(compound: &CompoundSelector, tree: &DomTree, node_id: NodeId) -> bool {
    let Some(element) = tree.as_element(node_id) else {
        return false;
    };
    compound.simple_selectors.iter().all(|simple| match simple {
        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(pc, tree, node_id, element),
        _ => simple.matches(element),
    })
}

/// 1-based position among the element siblings accepted by `same_kind`,
/// counted from the front or (with `from_end`) from the back.
fn sibling_position(
    tree: &DomTree,
    node_id: NodeId,
    from_end: bool,
    same_kind: impl Fn(&ElementData) -> bool,
) -> usize {
    let counted = |s: &NodeId| tree.as_element(*s).is_some_and(&same_kind);
    let before = if from_end {
        tree.following_siblings(node_id).filter(counted).count()
    } else {
        tree.preceding_siblings(node_id).filter(counted).count()
    };
    before + 1
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
fn pseudo_class_matches(
    pc: &PseudoClass,
    tree: &DomTree,
    node_id: NodeId,
    element: &ElementData,
) -> bool {
    let any_element = |_: &ElementData| true;
    let same_type = |e: &ElementData| e.tag_name == element.tag_name;

    match pc {
        // "In HTML, this is the <html> element."
        PseudoClass::Root => tree.document_element() == Some(node_id),

        PseudoClass::FirstChild => {
            tree.parent(node_id).is_some() && tree.prev_element_sibling(node_id).is_none()
        }
        PseudoClass::LastChild => {
            tree.parent(node_id).is_some() && tree.next_element_sibling(node_id).is_none()
        }
        PseudoClass::OnlyChild => {
            tree.parent(node_id).is_some()
                && tree.prev_element_sibling(node_id).is_none()
                && tree.next_element_sibling(node_id).is_none()
        }

        PseudoClass::FirstOfType => sibling_position(tree, node_id, false, same_type) == 1,
        PseudoClass::LastOfType => sibling_position(tree, node_id, true, same_type) == 1,
        PseudoClass::OnlyOfType => {
            sibling_position(tree, node_id, false, same_type) == 1
                && sibling_position(tree, node_id, true, same_type) == 1
        }

        PseudoClass::NthChild(nth) => nth.matches(sibling_position(tree, node_id, false, any_element)),
        PseudoClass::NthLastChild(nth) => {
            nth.matches(sibling_position(tree, node_id, true, any_element))
        }
        PseudoClass::NthOfType(nth) => nth.matches(sibling_position(tree, node_id, false, same_type)),
        PseudoClass::NthLastOfType(nth) => {
            nth.matches(sibling_position(tree, node_id, true, same_type))
        }

        // "The :empty pseudo-class represents an element that has no children at all."
        PseudoClass::Empty => {
            tree.children(node_id)
                .iter()
                .all(|&c| match tree.get(c).map(|n| &n.node_type) {
                    Some(NodeType::Text(t)) => t.trim().is_empty(),
                    Some(NodeType::Comment(_)) => true,
                    _ => false,
                })
        }

        // Every link is unvisited, so :link matches any <a> or <area> with an href.
        PseudoClass::Link => {
            matches!(element.tag_name.as_str(), "a" | "area") && element.attrs.contains("href")
        }

        PseudoClass::Disabled => element.attrs.contains("disabled"),
        PseudoClass::Enabled => !element.attrs.contains("disabled"),

        PseudoClass::Checked => match element.tag_name.as_str() {
            "input" => {
                element.attrs.contains("checked")
                    && element.attrs.get("type").is_some_and(|t| {
                        t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio")
                    })
            }
            "option" => element.attrs.contains("selected"),
            _ => false,
        },

        PseudoClass::Not(list) => !list.matches(tree, node_id),
        PseudoClass::Is(list) => list.matches(tree, node_id),
        PseudoClass::Has(list) => tree
            .descendants(node_id)
            .any(|descendant| list.matches(tree, descendant)),
        PseudoClass::Contains(needle) => tree.text_content(node_id).contains(needle.as_str()),
    }
}

impl SimpleSelector {
    /// Check if this simple selector matches the given element.
    ///
    /// Pseudo-classes need tree context to match; without it,
    /// conservatively return false.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            // "A type selector written in the style sheet as an identifier represents
            // an element in the document tree with the same qualified name as the identifier."
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),

            Self::Class(class_name) => element.has_class(class_name),

            Self::Id(id) => element.id() == Some(id.as_str()),

            Self::Universal => true,

            Self::NeverMatch | Self::PseudoClass(_) => false,

            Self::Attribute(attr_sel) => attr_sel.matches(element),
        }
    }
}

impl AttributeSelector {
    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// The substring operators never match an empty value.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        let attr = |name: &String| element.attrs.get(name);
        match self {
            Self::Exists(name) => element.attrs.contains(name),
            Self::Equals(name, val) => attr(name) == Some(val.as_str()),
            Self::Includes(name, val) => {
                attr(name).is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val))
            }
            Self::DashMatch(name, val) => attr(name).is_some_and(|v| {
                v.strip_prefix(val.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
            }),
            Self::PrefixMatch(name, val) => {
                !val.is_empty() && attr(name).is_some_and(|v| v.starts_with(val.as_str()))
            }
            Self::SuffixMatch(name, val) => {
                !val.is_empty() && attr(name).is_some_and(|v| v.ends_with(val.as_str()))
            }
            Self::SubstringMatch(name, val) => {
                !val.is_empty() && attr(name).is_some_and(|v| v.contains(val.as_str()))
            }
        }
    }
}
