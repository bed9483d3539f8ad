//! Property-name canonicalization and the unitless-number table.

/// Properties whose numeric values are emitted without a unit.
const UNITLESS_PROPERTIES: &[&str] = &[
    "animation-iteration-count",
    "aspect-ratio",
    "border-image-outset",
    "border-image-slice",
    "border-image-width",
    "box-flex",
    "box-flex-group",
    "box-ordinal-group",
    "column-count",
    "columns",
    "flex",
    "flex-grow",
    "flex-positive",
    "flex-shrink",
    "flex-negative",
    "flex-order",
    "font-weight",
    "grid-area",
    "grid-column",
    "grid-column-end",
    "grid-column-span",
    "grid-column-start",
    "grid-row",
    "grid-row-end",
    "grid-row-span",
    "grid-row-start",
    "line-clamp",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "scale",
    "tab-size",
    "widows",
    "z-index",
    "zoom",
    "fill-opacity",
    "flood-opacity",
    "stop-opacity",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
];

/// Legacy or alternative names mapped to their representative property.
const ALIASES: &[(&str, &str)] = &[
    ("word-wrap", "overflow-wrap"),
    ("grid-gap", "gap"),
    ("grid-row-gap", "row-gap"),
    ("grid-column-gap", "column-gap"),
    ("css-float", "float"),
    ("style-float", "float"),
];

/// Properties that were once vendor-prefixed and now have a standard form.
const UNPREFIXED_EQUIVALENTS: &[&str] = &[
    "align-items",
    "animation",
    "animation-delay",
    "animation-direction",
    "animation-duration",
    "animation-fill-mode",
    "animation-name",
    "animation-timing-function",
    "appearance",
    "backface-visibility",
    "backdrop-filter",
    "border-radius",
    "box-shadow",
    "box-sizing",
    "column-gap",
    "filter",
    "flex",
    "flex-basis",
    "flex-direction",
    "flex-grow",
    "flex-shrink",
    "flex-wrap",
    "hyphens",
    "justify-content",
    "mask",
    "mask-image",
    "order",
    "perspective",
    "tab-size",
    "text-size-adjust",
    "transform",
    "transform-origin",
    "transform-style",
    "transition",
    "transition-delay",
    "transition-duration",
    "transition-property",
    "transition-timing-function",
    "user-select",
];

const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

/// A property name in its canonical kebab-case form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyName {
    pub name: String,
    /// Vendor-prefixed with no standard equivalent: never applied inline.
    pub rule_only: bool,
}

/// Canonicalizes a descriptor key such as `backgroundColor`, `WebkitTransform` or `--space-2`.
///
/// Custom properties are returned verbatim. Vendor variants with a standard equivalent are
/// rewritten to it; the remaining vendor-prefixed names keep their prefix and are marked
/// rule-only.
pub fn canonical_property(key: &str) -> PropertyName {
    if key.starts_with("--") {
        return PropertyName {
            name: key.to_string(),
            rule_only: false,
        };
    }

    let kebab = to_kebab_case(key);
    let name = ALIASES
        .iter()
        .find(|(alias, _)| *alias == kebab)
        .map(|(_, target)| (*target).to_string())
        .unwrap_or(kebab);

    for prefix in VENDOR_PREFIXES {
        if let Some(unprefixed) = name.strip_prefix(prefix) {
            if UNPREFIXED_EQUIVALENTS.contains(&unprefixed) {
                return PropertyName {
                    name: unprefixed.to_string(),
                    rule_only: false,
                };
            }
            return PropertyName {
                name,
                rule_only: true,
            };
        }
    }

    PropertyName {
        name,
        rule_only: false,
    }
}

/// True if numeric values of this (canonical) property carry no unit.
pub fn is_unitless(property: &str) -> bool {
    if property.starts_with("--") {
        return true;
    }
    let unprefixed = VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| property.strip_prefix(prefix))
        .unwrap_or(property);
    UNITLESS_PROPERTIES.contains(&unprefixed)
}

/// `backgroundColor` -> `background-color`, `WebkitTransform` -> `-webkit-transform`,
/// `msTransform` -> `-ms-transform`. Names already in kebab-case pass through unchanged.
fn to_kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    if key.starts_with("ms") && key[2..].starts_with(|c: char| c.is_ascii_uppercase()) {
        out.push('-');
    }
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
