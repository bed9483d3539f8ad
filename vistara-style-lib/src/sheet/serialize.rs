//! Deterministic serialization of rules: the content key used for deduplication, the content
//! hash behind class names, and the CSS text injected into the stylesheet.

use crate::style::canonical::{Declarations, Rule};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// `prop:value;prop:value`, in declaration order.
pub fn declarations_css(declarations: &Declarations) -> String {
    declarations
        .iter()
        .map(|(property, value)| format!("{}:{}", property, value))
        .collect::<Vec<_>>()
        .join(";")
}

/// CSS text of one rule scoped to `.class_name`, wrapped in its at-rules (outermost first).
///
/// `.genab12:hover{background-color:#eeeeee}`,
/// `@media (max-width: 768px){.genab12{display:none}}`.
pub fn rule_css(class_name: &str, rule: &Rule) -> String {
    let mut css = format!(
        ".{}{}{{{}}}",
        class_name,
        rule.pseudo,
        declarations_css(&rule.declarations)
    );
    for at_rule in rule.at_rules.iter().rev() {
        css = format!("{}{{{}}}", at_rule, css);
    }
    css
}

/// Class-independent serialization of a rule list. Equal keys mean equal injected CSS.
///
/// The key is a JSON array of `[at_rules, pseudo, [[property, value], ..]]` per rule, so no
/// text inside a value can make two different rule lists serialize alike.
pub fn content_key(rules: &[Rule]) -> String {
    let rules: Vec<Value> = rules
        .iter()
        .map(|rule| {
            let declarations: Vec<Value> = rule
                .declarations
                .iter()
                .map(|(property, value)| {
                    Value::Array(vec![
                        Value::String(property.clone()),
                        Value::String(value.to_string()),
                    ])
                })
                .collect();
            Value::Array(vec![
                Value::Array(rule.at_rules.iter().cloned().map(Value::String).collect()),
                Value::String(rule.pseudo.clone()),
                Value::Array(declarations),
            ])
        })
        .collect();
    Value::Array(rules).to_string()
}

/// Lowercase hex SHA-256 of the content key. A non-zero `salt` derives an alternative hash
/// for resolving class-name collisions.
pub fn content_hash(content_key: &str, salt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content_key.as_bytes());
    if salt > 0 {
        hasher.update(salt.to_le_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// `prefix` followed by the first `hash_len` hex digits of `hash`.
pub fn class_name(prefix: &str, hash: &str, hash_len: usize) -> String {
    let len = hash_len.min(hash.len());
    format!("{}{}", prefix, &hash[..len])
}
