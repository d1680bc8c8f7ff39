//! Chain steps given on the command line.
//!
//! A step is `op` or `op=argument`, for example `find=ul li`, `children`,
//! `eq=-1` or `slice=1:3`.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, bail};
use quarry_query::{QueryError, Selection};

/// One selection operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `find=SEL`
    Find(String),
    /// `filter=SEL`
    Filter(String),
    /// `not=SEL`
    Not(String),
    /// `has=SEL`
    Has(String),
    /// `add=SEL`
    Add(String),
    /// `closest=SEL`
    Closest(String),
    /// `children` or `children=SEL`
    Children(Option<String>),
    /// `contents`
    Contents,
    /// `parent`
    Parent,
    /// `parents`
    Parents,
    /// `parents-until=SEL`
    ParentsUntil(String),
    /// `next` or `next=SEL`
    Next(Option<String>),
    /// `next-all` or `next-all=SEL`
    NextAll(Option<String>),
    /// `next-until=SEL`
    NextUntil(String),
    /// `prev` or `prev=SEL`
    Prev(Option<String>),
    /// `prev-all` or `prev-all=SEL`
    PrevAll(Option<String>),
    /// `prev-until=SEL`
    PrevUntil(String),
    /// `siblings`
    Siblings,
    /// `first`
    First,
    /// `last`
    Last,
    /// `eq=N`, negative from the end
    Eq(isize),
    /// `slice=START:END`, either bound may be left out
    Slice(isize, Option<isize>),
    /// `end`
    End,
}

fn required(op: &str, argument: Option<&str>) -> anyhow::Result<String> {
    match argument {
        Some(argument) if !argument.is_empty() => Ok(argument.to_string()),
        _ => bail!("step `{op}` needs an argument: {op}=..."),
    }
}

fn none(op: &str, argument: Option<&str>) -> anyhow::Result<()> {
    if argument.is_some() {
        bail!("step `{op}` takes no argument");
    }
    Ok(())
}

fn index(raw: &str) -> anyhow::Result<isize> {
    raw.trim()
        .parse()
        .with_context(|| format!("`{raw}` is not an index"))
}

fn slice_bounds(raw: &str) -> anyhow::Result<(isize, Option<isize>)> {
    let (start, end) = raw.split_once(':').unwrap_or((raw, ""));
    let start = if start.trim().is_empty() { 0 } else { index(start)? };
    let end = if end.trim().is_empty() {
        None
    } else {
        Some(index(end)?)
    };
    Ok((start, end))
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (op, argument) = match raw.split_once('=') {
            Some((op, argument)) => (op.trim(), Some(argument)),
            None => (raw.trim(), None),
        };
        let optional = argument.map(str::to_string);
        let step = match op {
            "find" => Self::Find(required(op, argument)?),
            "filter" => Self::Filter(required(op, argument)?),
            "not" => Self::Not(required(op, argument)?),
            "has" => Self::Has(required(op, argument)?),
            "add" => Self::Add(required(op, argument)?),
            "closest" => Self::Closest(required(op, argument)?),
            "children" => Self::Children(optional),
            "contents" => none(op, argument).map(|()| Self::Contents)?,
            "parent" => none(op, argument).map(|()| Self::Parent)?,
            "parents" => none(op, argument).map(|()| Self::Parents)?,
            "parents-until" => Self::ParentsUntil(required(op, argument)?),
            "next" => Self::Next(optional),
            "next-all" => Self::NextAll(optional),
            "next-until" => Self::NextUntil(required(op, argument)?),
            "prev" => Self::Prev(optional),
            "prev-all" => Self::PrevAll(optional),
            "prev-until" => Self::PrevUntil(required(op, argument)?),
            "siblings" => none(op, argument).map(|()| Self::Siblings)?,
            "first" => none(op, argument).map(|()| Self::First)?,
            "last" => none(op, argument).map(|()| Self::Last)?,
            "end" => none(op, argument).map(|()| Self::End)?,
            "eq" => Self::Eq(index(&required(op, argument)?)?),
            "slice" => {
                let (start, end) = slice_bounds(&required(op, argument)?)?;
                Self::Slice(start, end)
            }
            other => bail!("unknown step `{other}`"),
        };
        Ok(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find(s) => write!(f, "find({s:?})"),
            Self::Filter(s) => write!(f, "filter({s:?})"),
            Self::Not(s) => write!(f, "not({s:?})"),
            Self::Has(s) => write!(f, "has({s:?})"),
            Self::Add(s) => write!(f, "add({s:?})"),
            Self::Closest(s) => write!(f, "closest({s:?})"),
            Self::Children(s) => write_optional(f, "children", s.as_deref()),
            Self::Contents => f.write_str("contents()"),
            Self::Parent => f.write_str("parent()"),
            Self::Parents => f.write_str("parents()"),
            Self::ParentsUntil(s) => write!(f, "parentsUntil({s:?})"),
            Self::Next(s) => write_optional(f, "next", s.as_deref()),
            Self::NextAll(s) => write_optional(f, "nextAll", s.as_deref()),
            Self::NextUntil(s) => write!(f, "nextUntil({s:?})"),
            Self::Prev(s) => write_optional(f, "prev", s.as_deref()),
            Self::PrevAll(s) => write_optional(f, "prevAll", s.as_deref()),
            Self::PrevUntil(s) => write!(f, "prevUntil({s:?})"),
            Self::Siblings => f.write_str("siblings()"),
            Self::First => f.write_str("first()"),
            Self::Last => f.write_str("last()"),
            Self::Eq(n) => write!(f, "eq({n})"),
            Self::Slice(start, Some(end)) => write!(f, "slice({start}, {end})"),
            Self::Slice(start, None) => write!(f, "slice({start})"),
            Self::End => f.write_str("end()"),
        }
    }
}

fn write_optional(f: &mut fmt::Formatter<'_>, name: &str, selector: Option<&str>) -> fmt::Result {
    match selector {
        Some(s) => write!(f, "{name}({s:?})"),
        None => write!(f, "{name}()"),
    }
}

impl Step {
    /// Run this step against `selection`.
    ///
    /// # Errors
    ///
    /// Fails when a selector argument does not parse.
    pub fn apply(&self, selection: &Selection) -> Result<Selection, QueryError> {
        Ok(match self {
            Self::Find(s) => selection.find(s)?,
            Self::Filter(s) => selection.filter(s)?,
            Self::Not(s) => selection.not(s)?,
            Self::Has(s) => selection.has(s)?,
            Self::Add(s) => selection.add(s)?,
            Self::Closest(s) => selection.closest(s)?,
            Self::Children(None) => selection.children(),
            Self::Children(Some(s)) => selection.children_filtered(s)?,
            Self::Contents => selection.contents(),
            Self::Parent => selection.parent(),
            Self::Parents => selection.parents(),
            Self::ParentsUntil(s) => selection.parents_until(s, None)?,
            Self::Next(None) => selection.next(),
            Self::Next(Some(s)) => selection.next_filtered(s)?,
            Self::NextAll(None) => selection.next_all(),
            Self::NextAll(Some(s)) => selection.next_all_filtered(s)?,
            Self::NextUntil(s) => selection.next_until(s, None)?,
            Self::Prev(None) => selection.prev(),
            Self::Prev(Some(s)) => selection.prev_filtered(s)?,
            Self::PrevAll(None) => selection.prev_all(),
            Self::PrevAll(Some(s)) => selection.prev_all_filtered(s)?,
            Self::PrevUntil(s) => selection.prev_until(s, None)?,
            Self::Siblings => selection.siblings(),
            Self::First => selection.first(),
            Self::Last => selection.last(),
            Self::Eq(n) => selection.eq(*n),
            Self::Slice(start, end) => selection.slice(*start, *end),
            Self::End => selection.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector_steps() {
        assert_eq!("find=ul li".parse::<Step>().unwrap(), Step::Find("ul li".into()));
        assert_eq!(
            "filter=[href=\"a\"]".parse::<Step>().unwrap(),
            Step::Filter("[href=\"a\"]".into())
        );
        assert_eq!("children".parse::<Step>().unwrap(), Step::Children(None));
        assert_eq!(
            "next-all=p".parse::<Step>().unwrap(),
            Step::NextAll(Some("p".into()))
        );
    }

    #[test]
    fn test_parse_positional_steps() {
        assert_eq!("eq=-1".parse::<Step>().unwrap(), Step::Eq(-1));
        assert_eq!("slice=1:3".parse::<Step>().unwrap(), Step::Slice(1, Some(3)));
        assert_eq!("slice=2".parse::<Step>().unwrap(), Step::Slice(2, None));
        assert_eq!("slice=:2".parse::<Step>().unwrap(), Step::Slice(0, Some(2)));
    }

    #[test]
    fn test_parse_rejects_bad_steps() {
        assert!("find".parse::<Step>().is_err());
        assert!("find=".parse::<Step>().is_err());
        assert!("first=1".parse::<Step>().is_err());
        assert!("eq=x".parse::<Step>().is_err());
        assert!("explode".parse::<Step>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Step::Find("p".into()).to_string(), "find(\"p\")");
        assert_eq!(Step::NextAll(None).to_string(), "nextAll()");
        assert_eq!(Step::Slice(1, Some(2)).to_string(), "slice(1, 2)");
    }

    #[test]
    fn test_apply_chain() {
        let root = quarry_query::parse_document("<ul><li>a</li><li>b</li><li>c</li></ul>").unwrap();
        let steps: Vec<Step> = ["find=li", "eq=1", "next-all"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mut selection = root;
        for step in &steps {
            selection = step.apply(&selection).unwrap();
        }
        assert_eq!(selection.text(), "c");
        assert_eq!(Step::End.apply(&selection).unwrap().text(), "b");
    }
}
