//! Helpers for building style descriptors.
//!
//! A descriptor is a `serde_json::Value` object. Components usually assemble one from a base
//! block plus conditional fragments; `compose` gives that assembly object-spread semantics.

use serde_json::{Map, Value};

/// A style descriptor as handed to the engine.
pub type StyleDescriptor = Value;

/// Merges descriptor fragments left to right.
///
/// Non-object parts (`null`, `false`, …) contribute nothing, so a disabled conditional
/// fragment can be passed as-is. A key set again by a later part takes the later value but
/// keeps the position it was first declared at.
///
/// ```
/// use serde_json::json;
/// use vistara_style_lib::style::descriptor::compose;
///
/// let disabled = false;
/// let style = compose([
///     json!({ "color": "red" }),
///     if disabled { json!({ "opacity": 0.6 }) } else { json!(false) },
/// ]);
/// assert_eq!(style, json!({ "color": "red" }));
/// ```
pub fn compose<I>(parts: I) -> StyleDescriptor
where
    I: IntoIterator<Item = Value>,
{
    let mut merged = Map::new();
    for part in parts {
        if let Value::Object(map) = part {
            for (key, value) in map {
                merged.insert(key, value);
            }
        }
    }
    Value::Object(merged)
}

/// Short type name used in error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// True for keys that open a nested block rather than name a property.
pub fn is_selector_key(key: &str) -> bool {
    key.starts_with(':') || key.starts_with('@')
}

/// Property keys are camelCase or kebab-case words; custom properties start with `--`.
pub fn is_property_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// True if `text` would close the declaration or rule it is written into: a `{`, `}` or `;`
/// outside a quoted string, or a string left unterminated.
pub fn breaks_out_of_rule(text: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => {
                chars.next();
            }
            (Some(open), c) if c == open => quote = None,
            (Some(_), '\n') => return true,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '{' | '}' | ';') => return true,
            (None, _) => {}
        }
    }
    quote.is_some()
}
