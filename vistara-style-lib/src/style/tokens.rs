//! Theme-token substitution and the hardcoded-value audit.
//!
//! Components are meant to reference theme tokens (`var(--color-primary)`) rather than literal
//! design values. `TokenMap` rewrites known literals to their token, and `audit` reports the
//! literals that slipped through.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// The stock palette, spacing, radius and font-size tokens. Order matters: when a literal is
/// listed twice the later token wins.
const BUILTIN_TOKENS: &[(&str, &str)] = &[
    ("#6c5ce7", "var(--color-primary)"),
    ("#a29bfe", "var(--color-primary-light)"),
    ("#5f3dc4", "var(--color-primary-dark)"),
    ("#0984e3", "var(--color-secondary)"),
    ("#74b9ff", "var(--color-secondary-light)"),
    ("#ffffff", "var(--color-white)"),
    ("#000000", "var(--color-black)"),
    ("4px", "var(--space-1)"),
    ("8px", "var(--space-2)"),
    ("12px", "var(--space-3)"),
    ("16px", "var(--space-4)"),
    ("20px", "var(--space-5)"),
    ("24px", "var(--space-6)"),
    ("32px", "var(--space-8)"),
    ("48px", "var(--space-12)"),
    ("0.25rem", "var(--border-radius-sm)"),
    ("0.5rem", "var(--border-radius-md)"),
    ("0.75rem", "var(--border-radius-lg)"),
    ("1rem", "var(--border-radius-xl)"),
    ("12px", "var(--font-size-xs)"),
    ("14px", "var(--font-size-sm)"),
    ("16px", "var(--font-size-base)"),
    ("18px", "var(--font-size-lg)"),
    ("20px", "var(--font-size-xl)"),
    ("24px", "var(--font-size-2xl)"),
    ("30px", "var(--font-size-3xl)"),
    ("36px", "var(--font-size-4xl)"),
];

/// Literal value -> token reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    entries: IndexMap<String, String>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        BUILTIN_TOKENS
            .iter()
            .map(|(literal, token)| (literal.to_string(), token.to_string()))
            .collect()
    }

    pub fn insert(&mut self, literal: impl Into<String>, token: impl Into<String>) {
        self.entries.insert(literal.into(), token.into());
    }

    /// Exact, case-sensitive match.
    pub fn lookup(&self, literal: &str) -> Option<&str> {
        self.entries.get(literal).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for TokenMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = TokenMap::new();
        for (literal, token) in iter {
            map.insert(literal, token);
        }
        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardcodedKind {
    HexColor,
    PixelLength,
}

/// A literal found where a theme token was expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardcodedValue {
    /// Dotted key path, e.g. `:hover.backgroundColor`.
    pub path: String,
    pub value: String,
    pub kind: HardcodedKind,
}

impl fmt::Display for HardcodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (use CSS variable instead)", self.path, self.value)
    }
}

/// Walks a descriptor and reports six-digit hex colours and whole-pixel lengths.
pub fn audit(descriptor: &Value) -> Vec<HardcodedValue> {
    let mut found = Vec::new();
    scan(descriptor, "", &mut found);
    found
}

fn scan(value: &Value, path: &str, found: &mut Vec<HardcodedValue>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                scan(child, &join_path(path, key), found);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                scan(child, &join_path(path, &index.to_string()), found);
            }
        }
        Value::String(text) => {
            let kind = if is_hex_color(text) {
                Some(HardcodedKind::HexColor)
            } else if is_pixel_length(text) {
                Some(HardcodedKind::PixelLength)
            } else {
                None
            };
            if let Some(kind) = kind {
                found.push(HardcodedValue {
                    path: path.to_string(),
                    value: text.clone(),
                    kind,
                });
            }
        }
        _ => {}
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn is_hex_color(text: &str) -> bool {
    text.strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_pixel_length(text: &str) -> bool {
    text.strip_suffix("px")
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}
