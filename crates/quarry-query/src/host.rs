//! The boundary with a dynamically typed host.
//!
//! A scripting host hands over arguments whose type is only known at run
//! time. The `_with` methods check an [`Argument`] before touching any node,
//! so a bad argument never causes a partial iteration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FormValue, QueryError, Selection};

/// A value crossing the host boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value
    #[default]
    Undefined,
    /// `true` or `false`
    Bool(bool),
    /// Any number
    Number(f64),
    /// Text
    String(String),
    /// Ordered values
    Array(Vec<Value>),
}

impl Value {
    /// Truthiness as a scripting host sees it: `undefined`, `false`, `0`,
    /// `NaN` and `""` are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) => true,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<FormValue> for Value {
    fn from(value: FormValue) -> Self {
        match value {
            FormValue::Single(s) => Self::String(s),
            FormValue::Multiple(items) => items.into(),
        }
    }
}

/// A host callback: `(index, element) -> value`.
///
/// Every `FnMut(usize, &Selection) -> Value` is one; hosts wrap their own
/// function objects.
pub trait Invokable {
    /// Call with the element's position and the element as a single-node
    /// selection.
    fn invoke(&mut self, index: usize, element: &Selection) -> Value;
}

impl<F> Invokable for F
where
    F: FnMut(usize, &Selection) -> Value,
{
    fn invoke(&mut self, index: usize, element: &Selection) -> Value {
        self(index, element)
    }
}

/// A dynamically typed argument from the host.
pub enum Argument<'a> {
    /// Nothing was passed
    Undefined,
    /// A boolean
    Bool(bool),
    /// A number
    Number(f64),
    /// A string, usually a selector
    String(&'a str),
    /// A selection
    Selection(&'a Selection),
    /// A callable
    Function(&'a mut dyn Invokable),
}

impl Argument<'_> {
    /// Host type name, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Selection(_) => "Selection",
            Self::Function(_) => "function",
        }
    }
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Selection(s) => write!(f, "Selection({s:?})"),
            Self::Undefined | Self::Function(_) => f.write_str(self.type_name()),
        }
    }
}

impl Selection {
    /// [`each`](Self::each) with a host callback.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotCallable`] unless `callback` is a function; no node
    /// is visited in that case.
    pub fn each_with(&self, callback: Argument<'_>) -> Result<(), QueryError> {
        let Argument::Function(f) = callback else {
            return Err(QueryError::NotCallable { method: "each" });
        };
        self.each(|index, element| {
            let _ = f.invoke(index, element);
        });
        Ok(())
    }

    /// [`map`](Self::map) with a host callback.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotCallable`] unless `callback` is a function.
    pub fn map_with(&self, callback: Argument<'_>) -> Result<Vec<Value>, QueryError> {
        let Argument::Function(f) = callback else {
            return Err(QueryError::NotCallable { method: "map" });
        };
        Ok(self.map(|index, element| f.invoke(index, element)))
    }

    /// `filter` taking a selector, a selection, or a callback whose result
    /// is tested for truthiness.
    ///
    /// # Errors
    ///
    /// [`QueryError::Selector`] for a bad selector, [`QueryError::NotCallable`]
    /// for any other kind of argument.
    pub fn filter_with(&self, argument: Argument<'_>) -> Result<Self, QueryError> {
        match argument {
            Argument::String(selector) => self.filter(selector),
            Argument::Selection(other) => Ok(self.filter_selection(other)),
            Argument::Function(f) => {
                Ok(self.filter_fn(|index, element| f.invoke(index, element).is_truthy()))
            }
            _ => Err(QueryError::NotCallable { method: "filter" }),
        }
    }

    /// `not` taking a selector, a selection, or a callback.
    ///
    /// # Errors
    ///
    /// [`QueryError::Selector`] for a bad selector, [`QueryError::NotCallable`]
    /// for any other kind of argument.
    pub fn not_with(&self, argument: Argument<'_>) -> Result<Self, QueryError> {
        match argument {
            Argument::String(selector) => self.not(selector),
            Argument::Selection(other) => Ok(self.not_selection(other)),
            Argument::Function(f) => {
                Ok(self.not_fn(|index, element| f.invoke(index, element).is_truthy()))
            }
            _ => Err(QueryError::NotCallable { method: "not" }),
        }
    }

    /// `is` taking a selector, a selection, or a callback.
    ///
    /// # Errors
    ///
    /// [`QueryError::Selector`] for a bad selector, [`QueryError::NotCallable`]
    /// for any other kind of argument.
    pub fn is_with(&self, argument: Argument<'_>) -> Result<bool, QueryError> {
        match argument {
            Argument::String(selector) => self.is(selector),
            Argument::Selection(other) => Ok(self.is_selection(other)),
            Argument::Function(f) => {
                Ok(self.is_fn(|index, element| f.invoke(index, element).is_truthy()))
            }
            _ => Err(QueryError::NotCallable { method: "is" }),
        }
    }

    /// `add` taking a selector or a selection.
    ///
    /// # Errors
    ///
    /// [`QueryError::Selector`] for a bad selector,
    /// [`QueryError::InvalidArgument`] for any other kind of argument.
    pub fn add_with(&self, argument: Argument<'_>) -> Result<Self, QueryError> {
        match argument {
            Argument::String(selector) => self.add(selector),
            Argument::Selection(other) => Ok(self.add_selection(other)),
            other => Err(QueryError::InvalidArgument {
                method: "add",
                found: other.type_name(),
            }),
        }
    }
}
