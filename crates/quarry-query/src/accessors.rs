//! Reading text, markup, attributes and form values.

use quarry_dom::{DomTree, ElementData, NodeId, inner_html, outer_html};
use serde::Serialize;

use crate::Selection;
use crate::host::Value;

/// What `val()` reads, by the kind of the first element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    InputLike,
    SelectSingle,
    SelectMultiple,
    TextArea,
    Other,
}

impl ValueKind {
    fn of(element: &ElementData) -> Self {
        match element.tag_name.as_str() {
            "input" | "button" => Self::InputLike,
            "select" if element.attrs.contains("multiple") => Self::SelectMultiple,
            "select" => Self::SelectSingle,
            "textarea" => Self::TextArea,
            _ => Self::Other,
        }
    }
}

/// The value of a form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    /// One value
    Single(String),
    /// Every selected option of a `<select multiple>`, in document order
    Multiple(Vec<String>),
}

/// One successful control, as produced by [`Selection::serialize_array`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    /// Control name
    pub name: String,
    /// Submitted value
    pub value: String,
}

/// Input types that never contribute to a serialized form.
const UNSUBMITTED_INPUT_TYPES: &[&str] = &["submit", "button", "image", "reset", "file"];

/// An option's value: its `value` attribute, else its text.
fn option_value(tree: &DomTree, option: NodeId) -> String {
    tree.as_element(option)
        .and_then(|e| e.attrs.get("value"))
        .map_or_else(|| tree.text_content(option), str::to_string)
}

/// Options of a select, in document order (including those in optgroups).
fn options_of(tree: &DomTree, select: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.descendants(select)
        .filter(move |&id| tree.tag_name(id) == "option")
}

fn is_selected(tree: &DomTree, option: NodeId) -> bool {
    tree.as_element(option)
        .is_some_and(|e| e.attrs.contains("selected"))
}

fn select_single_value(tree: &DomTree, select: NodeId) -> Option<String> {
    options_of(tree, select)
        .find(|&o| is_selected(tree, o))
        .or_else(|| options_of(tree, select).next())
        .map(|o| option_value(tree, o))
}

fn select_multiple_values(tree: &DomTree, select: NodeId) -> Vec<String> {
    options_of(tree, select)
        .filter(|&o| is_selected(tree, o))
        .map(|o| option_value(tree, o))
        .collect()
}

/// `data-*` attribute name for a `data()` key: `fooBar` reads `data-foo-bar`.
fn data_attribute_name(key: &str) -> String {
    let mut name = String::from("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

/// `data()` converts `true`, `false` and numbers that print back the same
/// way; everything else stays a string.
fn convert_data_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match raw.parse::<f64>() {
            Ok(number) if number.is_finite() && number.to_string() == raw => Value::Number(number),
            _ => Value::String(raw.to_string()),
        },
    }
}

impl Selection {
    fn first_element(&self) -> Option<(NodeId, &ElementData)> {
        let id = self.get(0)?;
        self.tree().as_element(id).map(|element| (id, element))
    }

    /// Text content of every node, concatenated in selection order.
    #[must_use]
    pub fn text(&self) -> String {
        let tree = self.tree();
        self.nodes().iter().map(|&id| tree.text_content(id)).collect()
    }

    /// Inner markup of the first node.
    #[must_use]
    pub fn html(&self) -> Option<String> {
        self.get(0).map(|id| inner_html(self.tree(), id))
    }

    /// Markup of the first node including its own tags.
    #[must_use]
    pub fn outer_html(&self) -> Option<String> {
        self.get(0).map(|id| outer_html(self.tree(), id))
    }

    /// Attribute `name` of the first element. Present-but-empty attributes
    /// yield `Some("")`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.first_element()?.1.attrs.get(name)
    }

    /// Attribute `name` of the first element, or `default` when it is
    /// absent (or the selection is empty).
    #[must_use]
    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attr(name).unwrap_or(default)
    }

    /// The form value of the first element.
    ///
    /// `input` and `button` read their `value` attribute. A single `select`
    /// reads its selected option (or its first one) and a `select multiple`
    /// reads every selected option; options without a `value` attribute
    /// give their text. A `textarea` reads its text. Any other element,
    /// `option` included, reads its `value` attribute.
    #[must_use]
    pub fn val(&self) -> Option<FormValue> {
        let (id, element) = self.first_element()?;
        let tree = self.tree();
        match ValueKind::of(element) {
            ValueKind::InputLike | ValueKind::Other => element
                .attrs
                .get("value")
                .map(|v| FormValue::Single(v.to_string())),
            ValueKind::SelectSingle => select_single_value(tree, id).map(FormValue::Single),
            ValueKind::SelectMultiple => Some(FormValue::Multiple(select_multiple_values(tree, id))),
            ValueKind::TextArea => Some(FormValue::Single(tree.text_content(id))),
        }
    }

    /// The `data-*` attribute for `key` on the first element, converted.
    /// Keys may be camel case (`userId`) or the attribute suffix
    /// (`user-id`).
    #[must_use]
    pub fn data(&self, key: &str) -> Option<Value> {
        self.attr(&data_attribute_name(key)).map(convert_data_value)
    }

    /// Name/value pairs of every successful form control in the selection.
    /// A `form` contributes its descendant controls.
    #[must_use]
    pub fn serialize_array(&self) -> Vec<FormField> {
        let tree = self.tree();
        let controls = Self::unique(self.nodes().iter().flat_map(|&id| -> Vec<NodeId> {
            if tree.tag_name(id) == "form" {
                tree.descendants(id).collect()
            } else {
                vec![id]
            }
        }));

        let mut fields = Vec::new();
        for id in controls {
            let Some(element) = tree.as_element(id) else {
                continue;
            };
            let Some(name) = element.attrs.get("name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if element.attrs.contains("disabled") {
                continue;
            }
            let field = |value: String| FormField {
                name: name.to_string(),
                value,
            };
            match element.tag_name.as_str() {
                "input" => {
                    let kind = element
                        .attrs
                        .get("type")
                        .unwrap_or("text")
                        .to_ascii_lowercase();
                    if UNSUBMITTED_INPUT_TYPES.contains(&kind.as_str()) {
                        continue;
                    }
                    let checkable = kind == "checkbox" || kind == "radio";
                    if checkable && !element.attrs.contains("checked") {
                        continue;
                    }
                    let default = if checkable { "on" } else { "" };
                    let value = element.attrs.get("value").unwrap_or(default);
                    fields.push(field(value.to_string()));
                }
                "select" if element.attrs.contains("multiple") => {
                    fields.extend(select_multiple_values(tree, id).into_iter().map(field));
                }
                "select" => fields.extend(select_single_value(tree, id).map(field)),
                "textarea" => fields.push(field(tree.text_content(id))),
                _ => {}
            }
        }
        fields
    }

    /// The successful controls as `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn serialize(&self) -> String {
        let fields = self.serialize_array();
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().map(|f| (f.name.as_str(), f.value.as_str())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_attribute_name() {
        assert_eq!(data_attribute_name("userId"), "data-user-id");
        assert_eq!(data_attribute_name("user-id"), "data-user-id");
        assert_eq!(data_attribute_name("x"), "data-x");
    }

    #[test]
    fn test_convert_data_value() {
        assert_eq!(convert_data_value("true"), Value::Bool(true));
        assert_eq!(convert_data_value("42"), Value::Number(42.0));
        assert_eq!(convert_data_value("1.5"), Value::Number(1.5));
        assert_eq!(convert_data_value("007"), Value::String("007".to_string()));
        assert_eq!(convert_data_value("abc"), Value::String("abc".to_string()));
    }
}
