//! The canonical, fully-owned form of a style descriptor.
//!
//! `CanonicalStyle` is what the rest of the engine works with: an inline map the host can
//! apply directly, plus the ordered list of rules that need a real stylesheet.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A declaration value after unit inference.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Text(String),
    Number(f64),
}

impl StyleValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Text(text) => Some(text),
            StyleValue::Number(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Text(text) => f.write_str(text),
            StyleValue::Number(number) => write!(f, "{}", format_number(*number)),
        }
    }
}

impl Serialize for StyleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StyleValue::Text(text) => serializer.serialize_str(text),
            StyleValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                serializer.serialize_i64(*number as i64)
            }
            StyleValue::Number(number) => serializer.serialize_f64(*number),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(text: &str) -> Self {
        StyleValue::Text(text.to_string())
    }
}

impl From<f64> for StyleValue {
    fn from(number: f64) -> Self {
        StyleValue::Number(number)
    }
}

/// Formats a number the way a stylesheet expects it: `10`, not `10.0`.
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

/// Property -> value, in declaration order.
pub type Declarations = IndexMap<String, StyleValue>;

/// The inline half of a resolved style: applied directly as the element's style map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InlineStyle(pub Declarations);

impl InlineStyle {
    pub fn new() -> Self {
        InlineStyle(IndexMap::new())
    }

    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.0.get(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StyleValue)> {
        self.0.iter()
    }

    /// Later values replace earlier ones in place, keeping the first position.
    pub fn insert(&mut self, property: impl Into<String>, value: StyleValue) {
        self.0.insert(property.into(), value);
    }

    /// Renders the map as `style` attribute text, e.g. `padding: 8px; opacity: 0.5`.
    pub fn to_attribute(&self) -> String {
        self.0
            .iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// One block that needs a stylesheet rule: the at-rules wrapping it (outermost first), the
/// pseudo suffix appended to the generated class selector, and its declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    pub at_rules: Vec<String>,
    pub pseudo: String,
    pub declarations: Declarations,
}

impl Rule {
    pub fn new(at_rules: Vec<String>, pseudo: String) -> Self {
        Rule {
            at_rules,
            pseudo,
            declarations: IndexMap::new(),
        }
    }

    /// The at-rule wrappers followed by the pseudo suffix, e.g. `@media (max-width: 768px):hover`.
    /// Empty for the base rule.
    pub fn selector_suffix(&self) -> String {
        let mut suffix = self.at_rules.join(" ");
        suffix.push_str(&self.pseudo);
        suffix
    }

    pub fn is_base(&self) -> bool {
        self.at_rules.is_empty() && self.pseudo.is_empty()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Selector suffix: {:?}", self.selector_suffix())?;
        for (property, value) in &self.declarations {
            writeln!(f, "  {}: {}", property, value)?;
        }
        Ok(())
    }
}

/// A normalized descriptor, split into what the host can apply inline and what it cannot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalStyle {
    pub inline: InlineStyle,
    pub rules: Vec<Rule>,
}

impl CanonicalStyle {
    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.rules.is_empty()
    }
}
