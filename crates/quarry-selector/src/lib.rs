//! CSS selector compilation and matching.
//!
//! This crate implements the subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) that a static,
//! read-only document can answer: type, class, id, attribute and structural
//! pseudo-class selectors joined by the four combinators, plus selector lists.
//!
//! A compiled [`Selector`] provides the two operations a query engine needs:
//! [`Selector::matches`] tests one node, and [`Selector::find_all`] collects
//! every matching descendant of a scope node in document order.

mod matching;
mod parser;

use std::fmt;
use std::str::FromStr;

use quarry_dom::{DomTree, NodeId};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Examples: `div`, `p`, `span`, `body`, `h1`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Examples: `.highlight`, `.btn`, `.nav-item`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Examples: `#main`, `#header`, `#nav-bar`
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    ///
    /// Example: `*`
    Universal,

    /// Pseudo-class or pseudo-element that never matches a static document.
    ///
    /// Examples: `:hover`, `:focus`, `:visited`, `::before`, `::placeholder`
    NeverMatch,

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    /// Pseudo-class that requires DOM tree context to match.
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Examples: `[href]`, `[type=text]`, `[class~=active]`, `[lang|=en]`
    Attribute(AttributeSelector),
}

/// Pseudo-classes per [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,

    /// [§ 14.4.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,

    /// [§ 14.4.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,

    /// [§ 14.4.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,

    /// [§ 14.5.1 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,

    /// [§ 14.5.2 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,

    /// [§ 14.5.3 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,

    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    ///
    /// Whitespace-only text and comments do not count as content.
    Empty,

    /// [§ 8.2 :link](https://www.w3.org/TR/selectors-4/#the-link-pseudo)
    /// Every link in a static document is unvisited.
    Link,

    /// :disabled: element with a disabled attribute
    Disabled,

    /// :enabled: element without a disabled attribute
    Enabled,

    /// [§ 13.3.1 :checked](https://www.w3.org/TR/selectors-4/#checked)
    /// Checked checkboxes and radio buttons, and selected options.
    Checked,

    /// [§ 14.4.4 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild(Nth),

    /// [§ 14.4.5 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild(Nth),

    /// [§ 14.5.4 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType(Nth),

    /// [§ 14.5.5 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType(Nth),

    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    Not(Selector),

    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches), also `:where()`
    Is(Selector),

    /// [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
    /// Matches when any descendant matches the argument.
    Has(Selector),

    /// `:contains("text")`: the element's text content contains the string.
    Contains(String),
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Attribute names are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`: "Represents an element with the att attribute"
    Exists(String),

    /// `[attr=value]`: value is exactly `value`
    Equals(String, String),

    /// `[attr~=value]`: whitespace-separated list containing `value`
    Includes(String, String),

    /// `[attr|=value]`: exactly `value` or `value` followed by `-`
    DashMatch(String, String),

    /// `[attr^=value]`: begins with `value`
    PrefixMatch(String, String),

    /// `[attr$=value]`: ends with `value`
    SuffixMatch(String, String),

    /// `[attr*=value]`: contains `value`
    SubstringMatch(String, String),
}

/// [§ 14.4 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Matches 1-based positions `p` for which `p = a*n + b` for some `n >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Step
    pub a: i32,
    /// Offset
    pub b: i32,
}

impl Nth {
    /// Whether the 1-based `position` is selected.
    #[must_use]
    pub fn matches(self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return position == b;
        }
        let diff = position - b;
        diff % a == 0 && diff / a >= 0
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`: B is an arbitrary descendant of A
    Descendant,
    /// `A > B`: B is a direct child of A
    Child,
    /// `A + B`: B immediately follows A
    NextSibling,
    /// `A ~ B`: B follows A, not necessarily immediately
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Example: `div.container > ul.nav li a.active`
/// This would be parsed as:
/// ```text
/// [div.container] --(Child)--> [ul.nav] --(Descendant)--> [li] --(Descendant)--> [a.active]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject of the selector).
    pub subject: CompoundSelector,

    /// Chain of (combinator, compound) pairs going left from the subject.
    ///
    /// For `A > B C`, this would be:
    /// - subject: C
    /// - combinators: [(Descendant, B), (Child, A)]
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// A compiled selector list (`h1, footer`).
///
/// An element matches when any of its complex selectors matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    list: Vec<ComplexSelector>,
}

impl Selector {
    /// Compile a selector string.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] describing the first syntax problem.
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let list = parser::parse_selector_list(raw)?;
        tracing::trace!(selector = raw, complex = list.len(), "compiled selector");
        Ok(Self {
            source: raw.trim().to_string(),
            list,
        })
    }

    /// The (trimmed) text this selector was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The comma-separated members of the list.
    #[must_use]
    pub fn complex_selectors(&self) -> &[ComplexSelector] {
        &self.list
    }

    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Test a single node without searching. Non-element nodes never match.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId) -> bool {
        self.list
            .iter()
            .any(|complex| complex.matches_in_tree(tree, node_id))
    }

    /// Every descendant of `scope` (not `scope` itself) that matches, in
    /// document order. Each node appears once.
    #[must_use]
    pub fn find_all(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .filter(|&id| self.matches(tree, id))
            .collect()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Malformed selector text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// Nothing but whitespace (or an empty list member).
    #[error("empty selector")]
    Empty,

    /// A character that cannot appear at this position.
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar {
        /// The offending character
        ch: char,
        /// Byte offset within the complex selector
        offset: usize,
    },

    /// The selector stops where more input is required.
    #[error("unexpected end of selector")]
    UnexpectedEnd,

    /// `>`, `+` or `~` without a compound selector on both sides.
    #[error("combinator '{0}' is missing a selector on one side")]
    DanglingCombinator(char),

    /// `[` without a matching `]`, or a malformed attribute selector.
    #[error("malformed attribute selector")]
    BadAttribute,

    /// A quoted string that never ends.
    #[error("unterminated string")]
    UnterminatedString,

    /// `(` without a matching `)`.
    #[error("unbalanced parentheses")]
    UnbalancedParens,

    /// A pseudo-class we do not know (or that does not take arguments).
    #[error("unsupported pseudo-class ':{0}'")]
    UnsupportedPseudoClass(String),

    /// A functional pseudo-class without its argument.
    #[error("pseudo-class ':{0}' requires an argument")]
    MissingArgument(String),

    /// A malformed `an+b` expression.
    #[error("invalid an+b expression {0:?}")]
    InvalidNth(String),
}
