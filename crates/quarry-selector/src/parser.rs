//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! "The grammar of Selectors is defined in terms of CSS syntax."

use std::iter::Peekable;
use std::str::CharIndices;

use quarry_common::warning::warn_once;

use crate::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Nth, PseudoClass, Selector,
    SelectorError, SimpleSelector,
};

type Chars<'a> = Peekable<CharIndices<'a>>;

/// User-action pseudo-classes. A static document is never in these states.
const INTERACTIVE_PSEUDO_CLASSES: &[&str] = &[
    "hover",
    "focus",
    "focus-within",
    "focus-visible",
    "active",
    "visited",
    "target",
    "target-within",
];

/// Pseudo-elements that CSS 2 allowed with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Compile a comma-separated selector list.
pub(crate) fn parse_selector_list(raw: &str) -> Result<Vec<ComplexSelector>, SelectorError> {
    split_top_level(raw)?
        .into_iter()
        .map(parse_complex)
        .collect()
}

/// Split on commas outside of brackets, parentheses and strings.
fn split_top_level(raw: &str) -> Result<Vec<&str>, SelectorError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (offset, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')') => depth = depth.checked_sub(1).ok_or(SelectorError::UnbalancedParens)?,
            (None, ']') => depth = depth.checked_sub(1).ok_or(SelectorError::BadAttribute)?,
            (None, ',') if depth == 0 => {
                parts.push(&raw[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(SelectorError::UnterminatedString);
    }
    parts.push(&raw[start..]);
    Ok(parts)
}

/// Parse one member of a selector list.
///
/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
/// "A complex selector is a chain of one or more compound selectors
/// separated by combinators."
///
/// Compounds and combinators are collected left-to-right, then the chain is
/// reversed so the rightmost compound (the subject) comes first.
fn parse_complex(raw: &str) -> Result<ComplexSelector, SelectorError> {
    /// Flush the current identifier as a type selector into the compound.
    fn flush_ident(ident: &mut String, compound: &mut Vec<SimpleSelector>) {
        if !ident.is_empty() {
            compound.push(SimpleSelector::Type(ident.to_ascii_lowercase()));
            ident.clear();
        }
    }

    /// Flush the current compound selector into the compounds list.
    /// Returns true if a non-empty compound was flushed.
    fn flush_compound(
        ident: &mut String,
        compound: &mut Vec<SimpleSelector>,
        compounds: &mut Vec<CompoundSelector>,
    ) -> bool {
        flush_ident(ident, compound);
        if compound.is_empty() {
            return false;
        }
        compounds.push(CompoundSelector {
            simple_selectors: std::mem::take(compound),
        });
        true
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SelectorError::Empty);
    }

    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators_between: Vec<(Combinator, char)> = Vec::new();

    let mut chars = trimmed.char_indices().peekable();
    let mut current_compound = Vec::new();
    let mut current_ident = String::new();

    while let Some((offset, c)) = chars.next() {
        match c {
            // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
            // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
            '.' | '#' => {
                flush_ident(&mut current_ident, &mut current_compound);
                let name = take_ident(&mut chars);
                if name.is_empty() {
                    return Err(unexpected(&mut chars));
                }
                current_compound.push(if c == '.' {
                    SimpleSelector::Class(name)
                } else {
                    SimpleSelector::Id(name)
                });
            }

            // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
            '*' => {
                flush_ident(&mut current_ident, &mut current_compound);
                current_compound.push(SimpleSelector::Universal);
            }

            // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
            // Whitespace is a descendant combinator unless an explicit
            // combinator follows it.
            c if c.is_ascii_whitespace() => {
                skip_whitespace(&mut chars);
                if matches!(chars.peek(), Some((_, '>' | '+' | '~'))) {
                    flush_ident(&mut current_ident, &mut current_compound);
                } else if flush_compound(
                    &mut current_ident,
                    &mut current_compound,
                    &mut compounds,
                ) {
                    combinators_between.push((Combinator::Descendant, ' '));
                }
            }

            // [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
            // [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
            // [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
            '>' | '+' | '~' => {
                if !flush_compound(&mut current_ident, &mut current_compound, &mut compounds) {
                    return Err(SelectorError::DanglingCombinator(c));
                }
                skip_whitespace(&mut chars);
                let combinator = match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::NextSibling,
                    _ => Combinator::SubsequentSibling,
                };
                combinators_between.push((combinator, c));
            }

            ':' => {
                flush_ident(&mut current_ident, &mut current_compound);
                current_compound.push(parse_pseudo(&mut chars)?);
            }

            '[' => {
                flush_ident(&mut current_ident, &mut current_compound);
                current_compound.push(SimpleSelector::Attribute(parse_attribute(&mut chars)?));
            }

            // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
            _ if current_ident.is_empty() && (is_ident_start_char(c) || c == '-') => {
                current_ident.push(c);
            }
            _ if !current_ident.is_empty() && is_ident_char(c) => current_ident.push(c),

            _ => return Err(SelectorError::UnexpectedChar { ch: c, offset }),
        }
    }

    let _ = flush_compound(&mut current_ident, &mut current_compound, &mut compounds);

    // A combinator with nothing after it: `div >`
    if compounds.len() != combinators_between.len() + 1 {
        let ch = combinators_between.last().map_or(' ', |&(_, ch)| ch);
        return Err(SelectorError::DanglingCombinator(ch));
    }

    let Some(subject) = compounds.pop() else {
        return Err(SelectorError::Empty);
    };
    let combinators = compounds
        .into_iter()
        .zip(combinators_between)
        .rev()
        .map(|(compound, (combinator, _))| (combinator, compound))
        .collect();

    Ok(ComplexSelector {
        subject,
        combinators,
    })
}

/// Parse what follows a `:`.
///
/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
fn parse_pseudo(chars: &mut Chars<'_>) -> Result<SimpleSelector, SelectorError> {
    let is_pseudo_element = chars.next_if(|&(_, ch)| ch == ':').is_some();
    let name = take_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err(unexpected(chars));
    }
    let argument = if chars.next_if(|&(_, ch)| ch == '(').is_some() {
        Some(take_parenthesized(chars)?)
    } else {
        None
    };

    if is_pseudo_element || LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
        let _ = warn_once(
            "selector",
            &format!("pseudo-element '::{name}' never matches a document node"),
        );
        return Ok(SimpleSelector::NeverMatch);
    }
    if INTERACTIVE_PSEUDO_CLASSES.contains(&name.as_str()) {
        let _ = warn_once(
            "selector",
            &format!("':{name}' never matches in a static document"),
        );
        return Ok(SimpleSelector::NeverMatch);
    }

    let pseudo_class = match (name.as_str(), argument) {
        ("root", None) => PseudoClass::Root,
        ("first-child", None) => PseudoClass::FirstChild,
        ("last-child", None) => PseudoClass::LastChild,
        ("only-child", None) => PseudoClass::OnlyChild,
        ("first-of-type", None) => PseudoClass::FirstOfType,
        ("last-of-type", None) => PseudoClass::LastOfType,
        ("only-of-type", None) => PseudoClass::OnlyOfType,
        ("empty", None) => PseudoClass::Empty,
        ("link" | "any-link", None) => PseudoClass::Link,
        ("disabled", None) => PseudoClass::Disabled,
        ("enabled", None) => PseudoClass::Enabled,
        ("checked", None) => PseudoClass::Checked,

        ("nth-child", Some(arg)) => PseudoClass::NthChild(parse_nth(&arg)?),
        ("nth-last-child", Some(arg)) => PseudoClass::NthLastChild(parse_nth(&arg)?),
        ("nth-of-type", Some(arg)) => PseudoClass::NthOfType(parse_nth(&arg)?),
        ("nth-last-of-type", Some(arg)) => PseudoClass::NthLastOfType(parse_nth(&arg)?),
        ("not", Some(arg)) => PseudoClass::Not(Selector::parse(&arg)?),
        ("is" | "where" | "matches", Some(arg)) => PseudoClass::Is(Selector::parse(&arg)?),
        ("has", Some(arg)) => PseudoClass::Has(Selector::parse(&arg)?),
        ("contains", Some(arg)) => PseudoClass::Contains(unquote(&arg)?),

        (
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" | "not" | "is"
            | "where" | "matches" | "has" | "contains",
            None,
        ) => return Err(SelectorError::MissingArgument(name.clone())),
        (_, Some(_)) => return Err(SelectorError::UnsupportedPseudoClass(format!("{name}()"))),
        (_, None) => return Err(SelectorError::UnsupportedPseudoClass(name.clone())),
    };
    Ok(SimpleSelector::PseudoClass(pseudo_class))
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Called after the opening `[`; consumes through the closing `]`.
fn parse_attribute(chars: &mut Chars<'_>) -> Result<AttributeSelector, SelectorError> {
    skip_whitespace(chars);
    let name = take_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err(SelectorError::BadAttribute);
    }
    skip_whitespace(chars);

    let operator = match chars.next() {
        Some((_, ']')) => return Ok(AttributeSelector::Exists(name)),
        Some((_, '=')) => '=',
        Some((_, op @ ('~' | '|' | '^' | '$' | '*'))) => {
            if chars.next_if(|&(_, ch)| ch == '=').is_none() {
                return Err(SelectorError::BadAttribute);
            }
            op
        }
        _ => return Err(SelectorError::BadAttribute),
    };

    let value = parse_attr_value(chars)?;
    skip_whitespace(chars);
    if chars.next_if(|&(_, ch)| ch == ']').is_none() {
        return Err(SelectorError::BadAttribute);
    }

    Ok(match operator {
        '=' => AttributeSelector::Equals(name, value),
        '~' => AttributeSelector::Includes(name, value),
        '|' => AttributeSelector::DashMatch(name, value),
        '^' => AttributeSelector::PrefixMatch(name, value),
        '$' => AttributeSelector::SuffixMatch(name, value),
        _ => AttributeSelector::SubstringMatch(name, value),
    })
}

/// Parse an attribute value inside `[attr=value]`.
/// Handles both quoted (`"val"`, `'val'`) and unquoted values.
fn parse_attr_value(chars: &mut Chars<'_>) -> Result<String, SelectorError> {
    skip_whitespace(chars);

    if let Some((_, quote)) = chars.next_if(|&(_, ch)| ch == '"' || ch == '\'') {
        let mut value = String::new();
        for (_, ch) in chars.by_ref() {
            if ch == quote {
                return Ok(value);
            }
            value.push(ch);
        }
        return Err(SelectorError::UnterminatedString);
    }

    let mut value = String::new();
    while let Some((_, ch)) = chars.next_if(|&(_, ch)| !ch.is_ascii_whitespace() && ch != ']') {
        value.push(ch);
    }
    if value.is_empty() {
        return Err(SelectorError::BadAttribute);
    }
    Ok(value)
}

/// Consume up to the `)` matching an already-consumed `(` and return the
/// trimmed text between them.
fn take_parenthesized(chars: &mut Chars<'_>) -> Result<String, SelectorError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut inner = String::new();

    for (_, ch) in chars.by_ref() {
        match (quote, ch) {
            (Some(q), _) if ch == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') if depth == 0 => return Ok(inner.trim().to_string()),
            (None, ')') => depth -= 1,
            _ => {}
        }
        inner.push(ch);
    }
    if quote.is_some() {
        return Err(SelectorError::UnterminatedString);
    }
    Err(SelectorError::UnbalancedParens)
}

/// `:contains()` accepts quoted or bare text.
fn unquote(arg: &str) -> Result<String, SelectorError> {
    let arg = arg.trim();
    match arg.chars().next() {
        Some(quote @ ('"' | '\'')) => arg[1..]
            .strip_suffix(quote)
            .map(str::to_string)
            .ok_or(SelectorError::UnterminatedString),
        _ => Ok(arg.to_string()),
    }
}

/// [§ 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Accepts `odd`, `even`, a bare integer, or `an+b` with optional parts
/// (`n`, `-n+3`, `2n`, `3n-1`). Whitespace is ignored.
fn parse_nth(arg: &str) -> Result<Nth, SelectorError> {
    let compact = arg
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let invalid = || SelectorError::InvalidNth(arg.trim().to_string());

    match compact.as_str() {
        "odd" => return Ok(Nth { a: 2, b: 1 }),
        "even" => return Ok(Nth { a: 2, b: 0 }),
        "" => return Err(invalid()),
        _ => {}
    }

    let Some((a_part, b_part)) = compact.split_once('n') else {
        let b = compact.parse().map_err(|_| invalid())?;
        return Ok(Nth { a: 0, b });
    };
    let a = match a_part {
        "" | "+" => 1,
        "-" => -1,
        _ => a_part.parse().map_err(|_| invalid())?,
    };
    let b = if b_part.is_empty() {
        0
    } else if b_part.starts_with(['+', '-']) {
        b_part.parse().map_err(|_| invalid())?
    } else {
        return Err(invalid());
    };
    Ok(Nth { a, b })
}

fn unexpected(chars: &mut Chars<'_>) -> SelectorError {
    match chars.peek() {
        Some(&(offset, ch)) => SelectorError::UnexpectedChar { ch, offset },
        None => SelectorError::UnexpectedEnd,
    }
}

fn skip_whitespace(chars: &mut Chars<'_>) {
    while chars.next_if(|&(_, ch)| ch.is_ascii_whitespace()).is_some() {}
}

fn take_ident(chars: &mut Chars<'_>) -> String {
    let mut ident = String::new();
    while let Some((_, ch)) = chars.next_if(|&(_, ch)| is_ident_char(ch)) {
        ident.push(ch);
    }
    ident
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}
