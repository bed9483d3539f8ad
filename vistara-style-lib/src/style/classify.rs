//! Splits parsed style nodes into inline declarations and stylesheet rules.
//!
//! A declaration can be applied inline only if it sits at the top level and is not rule-only.
//! Anything under a pseudo or at-rule block needs a real rule, because a flat style map has no
//! way to express state or media conditions.

use crate::style::canonical::{CanonicalStyle, Rule};
use crate::style::normalize::StyleNode;

/// Builds the canonical form of a parsed descriptor.
///
/// Rules appear in declaration order, depth-first. A block's own declarations form one rule
/// placed ahead of the rules of its nested blocks; blocks with no declarations of their own
/// produce no rule. Top-level rule-only declarations share a single base rule created where
/// the first of them was declared.
pub fn classify(nodes: &[StyleNode]) -> CanonicalStyle {
    let mut canonical = CanonicalStyle::default();
    let mut base_rule: Option<usize> = None;

    for node in nodes {
        match node {
            StyleNode::Leaf(declaration) if declaration.rule_only => {
                let rules = &mut canonical.rules;
                let index = *base_rule.get_or_insert_with(|| {
                    rules.push(Rule::default());
                    rules.len() - 1
                });
                rules[index]
                    .declarations
                    .insert(declaration.property.clone(), declaration.value.clone());
            }
            StyleNode::Leaf(declaration) => {
                canonical
                    .inline
                    .insert(declaration.property.clone(), declaration.value.clone());
            }
            StyleNode::SelectorBlock { suffix, children } => {
                flatten(children, &[], suffix, &mut canonical.rules);
            }
            StyleNode::AtRuleBlock {
                condition,
                children,
            } => {
                flatten(children, &[condition.clone()], "", &mut canonical.rules);
            }
        }
    }
    canonical
}

fn flatten(nodes: &[StyleNode], at_rules: &[String], pseudo: &str, rules: &mut Vec<Rule>) {
    let slot = rules.len();
    rules.push(Rule::new(at_rules.to_vec(), pseudo.to_string()));

    for node in nodes {
        match node {
            StyleNode::Leaf(declaration) => {
                rules[slot]
                    .declarations
                    .insert(declaration.property.clone(), declaration.value.clone());
            }
            StyleNode::SelectorBlock { suffix, children } => {
                let nested = format!("{}{}", pseudo, suffix);
                flatten(children, at_rules, &nested, rules);
            }
            StyleNode::AtRuleBlock {
                condition,
                children,
            } => {
                let mut wrappers = at_rules.to_vec();
                wrappers.push(condition.clone());
                flatten(children, &wrappers, pseudo, rules);
            }
        }
    }

    if rules[slot].declarations.is_empty() {
        rules.remove(slot);
    }
}

#[cfg(test)]
mod tests {
    use crate::style::canonical::StyleValue;
    use crate::style::normalize::normalize;
    use serde_json::json;

    #[test]
    fn pseudo_blocks_never_inline() {
        let canonical = normalize(&json!({
            "padding": "8px",
            ":hover": { "backgroundColor": "#eeeeee" }
        }))
        .unwrap();
        assert_eq!(canonical.inline.len(), 1);
        assert!(!canonical.inline.contains("background-color"));
        assert_eq!(canonical.rules.len(), 1);
        assert_eq!(canonical.rules[0].pseudo, ":hover");
        assert_eq!(
            canonical.rules[0].declarations.get("background-color"),
            Some(&StyleValue::from("#eeeeee"))
        );
    }

    #[test]
    fn media_block_becomes_wrapped_rule() {
        let canonical = normalize(&json!({ "@media (max-width: 768px)": { "display": "none" } }))
            .unwrap();
        assert!(canonical.inline.is_empty());
        assert_eq!(canonical.rules.len(), 1);
        assert_eq!(canonical.rules[0].at_rules, ["@media (max-width: 768px)"]);
        assert_eq!(canonical.rules[0].pseudo, "");
    }

    #[test]
    fn nested_blocks_flatten_depth_first() {
        let canonical = normalize(&json!({
            ":hover": {
                "color": "red",
                "::before": { "content": "'>'" },
                "@media (min-width: 600px)": { "color": "blue" }
            },
            "@media print": {
                "display": "none",
                "@supports (display: grid)": { ":focus": { "display": "grid" } }
            }
        }))
        .unwrap();

        let suffixes: Vec<String> = canonical.rules.iter().map(|r| r.selector_suffix()).collect();
        assert_eq!(
            suffixes,
            [
                ":hover",
                ":hover::before",
                "@media (min-width: 600px):hover",
                "@media print",
                "@media print @supports (display: grid):focus",
            ]
        );
        assert_eq!(
            canonical.rules[4].at_rules,
            ["@media print", "@supports (display: grid)"]
        );
    }

    #[test]
    fn parent_rule_precedes_children_even_when_declared_after() {
        let canonical = normalize(&json!({
            ":hover": { "::after": { "opacity": 1 }, "color": "red" }
        }))
        .unwrap();
        assert_eq!(canonical.rules[0].pseudo, ":hover");
        assert_eq!(canonical.rules[1].pseudo, ":hover::after");
    }

    #[test]
    fn rule_only_vendor_properties_share_a_base_rule() {
        let canonical = normalize(&json!({
            "display": "-webkit-box",
            ":hover": { "color": "red" },
            "WebkitLineClamp": 3,
            "WebkitBoxOrient": "vertical",
            "WebkitTransform": "scale(1)"
        }))
        .unwrap();

        assert_eq!(
            canonical.inline.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            ["display", "transform"]
        );
        assert_eq!(canonical.rules.len(), 2);
        assert!(canonical.rules[1].is_base());
        assert_eq!(
            canonical.rules[1].declarations.get("-webkit-line-clamp"),
            Some(&StyleValue::Number(3.0))
        );
        assert!(canonical.rules[1]
            .declarations
            .contains_key("-webkit-box-orient"));
    }

    #[test]
    fn declaration_order_is_input_order() {
        let canonical = normalize(&json!({
            ":focus": { "outline": "none", "borderColor": "blue", "boxShadow": "none" }
        }))
        .unwrap();
        let keys: Vec<&str> = canonical.rules[0]
            .declarations
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["outline", "border-color", "box-shadow"]);
    }
}
