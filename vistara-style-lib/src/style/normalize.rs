//! Parses loosely-typed style descriptors into the `StyleNode` tree.
//!
//! This is the only place that looks at raw `serde_json::Value` input. Everything downstream
//! (classification, hashing, injection) works on `StyleNode` and `CanonicalStyle`.

use crate::config::EngineConfig;
use crate::error::DescriptorError;
use crate::style::canonical::{format_number, CanonicalStyle, StyleValue};
use crate::style::classify::classify;
use crate::style::descriptor::{breaks_out_of_rule, is_property_key, is_selector_key, kind_name};
use crate::style::properties::{canonical_property, is_unitless};
use crate::style::tokens::TokenMap;
use log::trace;
use serde_json::{Map, Number, Value};

/// A single property declaration after canonicalization and unit inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: StyleValue,
    /// Vendor-prefixed with no standard form; must go to a stylesheet rule.
    pub rule_only: bool,
}

/// The parsed shape of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleNode {
    Leaf(Declaration),
    /// `:hover`, `::before`, … applied to the generated class.
    SelectorBlock {
        suffix: String,
        children: Vec<StyleNode>,
    },
    /// `@media …`, `@supports …` wrapping its children.
    AtRuleBlock {
        condition: String,
        children: Vec<StyleNode>,
    },
}

/// Walks descriptors with the unit, token and depth settings of an `EngineConfig`.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    default_unit: &'a str,
    tokens: Option<&'a TokenMap>,
    max_depth: usize,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Normalizer {
            default_unit: &config.default_unit,
            tokens: config.tokens.as_ref(),
            max_depth: config.max_depth,
        }
    }

    /// Parses and classifies a descriptor.
    pub fn normalize(&self, descriptor: &Value) -> Result<CanonicalStyle, DescriptorError> {
        let nodes = self.parse(descriptor)?;
        let canonical = classify(&nodes);
        trace!(
            "normalized descriptor: {} inline, {} rules",
            canonical.inline.len(),
            canonical.rules.len()
        );
        Ok(canonical)
    }

    /// Parses a descriptor into nodes without classifying it.
    pub fn parse(&self, descriptor: &Value) -> Result<Vec<StyleNode>, DescriptorError> {
        match descriptor {
            Value::Object(map) => self.parse_block(map, "", 1),
            other => Err(DescriptorError::NotAnObject {
                found: kind_name(other),
            }),
        }
    }

    fn parse_block(
        &self,
        map: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Result<Vec<StyleNode>, DescriptorError> {
        if depth > self.max_depth {
            return Err(DescriptorError::TooDeep {
                limit: self.max_depth,
                path: path.to_string(),
            });
        }

        let mut nodes = Vec::with_capacity(map.len());
        for (key, value) in map {
            if is_selector_key(key) {
                if let Some(node) = self.parse_nested(key, value, path, depth)? {
                    nodes.push(node);
                }
            } else if let Some(declaration) = self.parse_declaration(key, value)? {
                nodes.push(StyleNode::Leaf(declaration));
            }
        }
        Ok(nodes)
    }

    fn parse_nested(
        &self,
        key: &str,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<Option<StyleNode>, DescriptorError> {
        let map = match value {
            // collapsed conditional fragments
            Value::Null | Value::Bool(false) => return Ok(None),
            Value::Object(map) => map,
            other => {
                return Err(DescriptorError::InvalidBlock {
                    selector: key.to_string(),
                    found: kind_name(other),
                })
            }
        };

        if breaks_out_of_rule(key) {
            return Err(DescriptorError::UnsafeSelector {
                selector: key.to_string(),
            });
        }
        let children = self.parse_block(map, &format!("{}{}", path, key), depth + 1)?;
        if children.is_empty() {
            return Ok(None);
        }

        let key = key.trim();
        Ok(Some(if key.starts_with('@') {
            StyleNode::AtRuleBlock {
                condition: key.to_string(),
                children,
            }
        } else {
            StyleNode::SelectorBlock {
                suffix: key.to_string(),
                children,
            }
        }))
    }

    fn parse_declaration(
        &self,
        key: &str,
        value: &Value,
    ) -> Result<Option<Declaration>, DescriptorError> {
        if !is_property_key(key) {
            return Err(DescriptorError::InvalidProperty {
                property: key.to_string(),
            });
        }
        let property = canonical_property(key);
        let value = match value {
            Value::Null | Value::Bool(_) => return Ok(None),
            Value::String(text) if text.is_empty() => return Ok(None),
            Value::String(text) if breaks_out_of_rule(text) => {
                return Err(DescriptorError::UnsafeValue {
                    property: key.to_string(),
                    value: text.clone(),
                })
            }
            Value::String(text) => StyleValue::Text(self.substitute(text)),
            Value::Number(number) => self.infer_unit(&property.name, number, key)?,
            other => {
                return Err(DescriptorError::InvalidValue {
                    property: key.to_string(),
                    found: kind_name(other),
                })
            }
        };

        Ok(Some(Declaration {
            property: property.name,
            value,
            rule_only: property.rule_only,
        }))
    }

    fn substitute(&self, text: &str) -> String {
        self.tokens
            .and_then(|tokens| tokens.lookup(text))
            .unwrap_or(text)
            .to_string()
    }

    fn infer_unit(
        &self,
        property: &str,
        number: &Number,
        key: &str,
    ) -> Result<StyleValue, DescriptorError> {
        let number = number
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| DescriptorError::NonFiniteNumber {
                property: key.to_string(),
            })?;

        if number == 0.0 || is_unitless(property) {
            return Ok(StyleValue::Number(number));
        }
        Ok(StyleValue::Text(format!(
            "{}{}",
            format_number(number),
            self.default_unit
        )))
    }
}

/// Normalizes a descriptor with the default configuration.
pub fn normalize(descriptor: &Value) -> Result<CanonicalStyle, DescriptorError> {
    let config = EngineConfig::default();
    Normalizer::new(&config).normalize(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::descriptor::compose;
    use serde_json::json;

    #[test]
    fn numbers_get_default_unit_unless_unitless() {
        let canonical = normalize(&json!({
            "width": 10,
            "opacity": 0.5,
            "zIndex": 10,
            "fontWeight": 600,
            "margin": 0
        }))
        .unwrap();
        assert_eq!(canonical.inline.get("width"), Some(&"10px".into()));
        assert_eq!(canonical.inline.get("opacity"), Some(&StyleValue::Number(0.5)));
        assert_eq!(canonical.inline.get("z-index"), Some(&StyleValue::Number(10.0)));
        assert_eq!(canonical.inline.get("font-weight"), Some(&StyleValue::Number(600.0)));
        assert_eq!(canonical.inline.get("margin"), Some(&StyleValue::Number(0.0)));
    }

    #[test]
    fn fractional_lengths_keep_their_fraction() {
        let canonical = normalize(&json!({ "borderWidth": 1.5 })).unwrap();
        assert_eq!(canonical.inline.get("border-width"), Some(&"1.5px".into()));
    }

    #[test]
    fn custom_unit_from_config() {
        let config = EngineConfig {
            default_unit: "rem".to_string(),
            ..EngineConfig::default()
        };
        let canonical = Normalizer::new(&config)
            .normalize(&json!({ "gap": 2 }))
            .unwrap();
        assert_eq!(canonical.inline.get("gap"), Some(&"2rem".into()));
    }

    #[test]
    fn sparse_input_is_tolerated() {
        let loading = false;
        let descriptor = compose([
            json!({ "color": "red", "cursor": null, "outline": false, "border": "" }),
            if loading { json!({ "fontSize": 12 }) } else { json!(false) },
            json!({ ":hover": {}, ":focus": null, "@media print": false }),
        ]);
        let canonical = normalize(&descriptor).unwrap();
        assert_eq!(canonical.inline.len(), 1);
        assert_eq!(canonical.inline.get("color"), Some(&"red".into()));
        assert!(canonical.rules.is_empty());
    }

    #[test]
    fn block_with_only_empty_values_yields_no_rule() {
        let canonical = normalize(&json!({ ":hover": { "color": null, "::after": {} } })).unwrap();
        assert!(canonical.rules.is_empty());
    }

    #[test]
    fn tree_shape_follows_nesting() {
        let config = EngineConfig::default();
        let nodes = Normalizer::new(&config)
            .parse(&json!({
                "color": "red",
                "@media (max-width: 768px)": { ":hover": { "color": "blue" } }
            }))
            .unwrap();
        assert_eq!(nodes.len(), 2);
        match &nodes[1] {
            StyleNode::AtRuleBlock { condition, children } => {
                assert_eq!(condition, "@media (max-width: 768px)");
                assert!(matches!(&children[0], StyleNode::SelectorBlock { suffix, .. } if suffix == ":hover"));
            }
            other => panic!("expected at-rule block, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_object_top_level() {
        assert_eq!(
            normalize(&json!("color: red")),
            Err(DescriptorError::NotAnObject { found: "string" })
        );
        assert_eq!(
            normalize(&json!(null)),
            Err(DescriptorError::NotAnObject { found: "null" })
        );
    }

    #[test]
    fn rejects_invalid_value_types() {
        assert_eq!(
            normalize(&json!({ "margin": [1, 2] })),
            Err(DescriptorError::InvalidValue {
                property: "margin".to_string(),
                found: "array"
            })
        );
        assert_eq!(
            normalize(&json!({ "padding": { "top": 1 } })),
            Err(DescriptorError::InvalidValue {
                property: "padding".to_string(),
                found: "object"
            })
        );
        assert_eq!(
            normalize(&json!({ ":hover": "red" })),
            Err(DescriptorError::InvalidBlock {
                selector: ":hover".to_string(),
                found: "string"
            })
        );
    }

    #[test]
    fn rejects_text_that_escapes_its_rule() {
        assert_eq!(
            normalize(&json!({ ":hover": { "color": "red}.other{color:blue" } })),
            Err(DescriptorError::UnsafeValue {
                property: "color".to_string(),
                value: "red}.other{color:blue".to_string()
            })
        );
        assert!(matches!(
            normalize(&json!({ "margin": "0;position:fixed" })),
            Err(DescriptorError::UnsafeValue { .. })
        ));
        assert_eq!(
            normalize(&json!({ ":hover{}.x": { "color": "red" } })),
            Err(DescriptorError::UnsafeSelector {
                selector: ":hover{}.x".to_string()
            })
        );
        assert_eq!(
            normalize(&json!({ "color:red;top": 0 })),
            Err(DescriptorError::InvalidProperty {
                property: "color:red;top".to_string()
            })
        );

        let quoted = normalize(&json!({ "::after": { "content": "\"{;}\"" } })).unwrap();
        assert_eq!(
            quoted.rules[0].declarations.get("content"),
            Some(&StyleValue::from("\"{;}\""))
        );
    }

    #[test]
    fn rejects_excessive_nesting() {
        let config = EngineConfig {
            max_depth: 3,
            ..EngineConfig::default()
        };
        let descriptor = json!({ ":hover": { ":focus": { ":active": { "color": "red" } } } });
        let err = Normalizer::new(&config).normalize(&descriptor).unwrap_err();
        assert_eq!(
            err,
            DescriptorError::TooDeep {
                limit: 3,
                path: ":hover:focus:active".to_string()
            }
        );
    }

    #[test]
    fn tokens_replace_exact_literals() {
        let config = EngineConfig::default().with_tokens(TokenMap::builtin());
        let canonical = Normalizer::new(&config)
            .normalize(&json!({
                "backgroundColor": "#6c5ce7",
                "padding": "8px",
                "margin": "8px 16px",
                "width": 8
            }))
            .unwrap();
        assert_eq!(
            canonical.inline.get("background-color"),
            Some(&"var(--color-primary)".into())
        );
        assert_eq!(canonical.inline.get("padding"), Some(&"var(--space-2)".into()));
        assert_eq!(canonical.inline.get("margin"), Some(&"8px 16px".into()));
        assert_eq!(canonical.inline.get("width"), Some(&"8px".into()));
    }

    #[test]
    fn token_references_pass_through() {
        let canonical = normalize(&json!({ "color": "var(--color-primary)" })).unwrap();
        assert_eq!(
            canonical.inline.get("color"),
            Some(&"var(--color-primary)".into())
        );
    }
}
