//! Engine configuration.
//!
//! Every knob has a default that matches what components expect out of the box: `gen`-prefixed
//! class names, `px` as the implied length unit, and reference-counted eviction turned on.

use crate::error::ConfigError;
use crate::style::tokens::TokenMap;
use log::warn;

/// Default prefix of synthesized class names.
pub const DEFAULT_CLASS_PREFIX: &str = "gen";

/// Hex digits of the content hash kept in a class name.
pub const DEFAULT_HASH_LEN: usize = 8;

/// Deepest descriptor nesting accepted by the normalizer.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Prefix of every generated class name. Must pass `validate_class_prefix`; an invalid
    /// prefix is replaced by `DEFAULT_CLASS_PREFIX` when the cache is built.
    pub class_prefix: String,
    /// Number of hex digits of the content hash appended to the prefix (clamped to 4..=64).
    pub hash_len: usize,
    /// Unit appended to bare numbers of properties outside the unitless set.
    pub default_unit: String,
    /// Remove rule text once the last consumer releases it. When off, `release` is a no-op and
    /// the stylesheet only grows.
    pub eviction: bool,
    /// Literal values rewritten to theme tokens before unit inference.
    pub tokens: Option<TokenMap>,
    /// Log a warning for hardcoded colours and pixel lengths found in descriptors.
    pub audit_hardcoded: bool,
    /// Nesting limit; deeper descriptors are rejected.
    pub max_depth: usize,
    /// Parse generated rule text with lightningcss before injecting it.
    pub validate_css: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            hash_len: DEFAULT_HASH_LEN,
            default_unit: "px".to_string(),
            eviction: true,
            tokens: None,
            audit_hardcoded: false,
            max_depth: DEFAULT_MAX_DEPTH,
            validate_css: false,
        }
    }
}

impl EngineConfig {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    pub fn with_tokens(mut self, tokens: TokenMap) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_eviction(mut self, eviction: bool) -> Self {
        self.eviction = eviction;
        self
    }

    pub(crate) fn effective_hash_len(&self) -> usize {
        self.hash_len.clamp(4, 64)
    }

    pub(crate) fn effective_class_prefix(&self) -> String {
        match validate_class_prefix(&self.class_prefix) {
            Ok(()) => self.class_prefix.clone(),
            Err(err) => {
                warn!("{}; using `{}`", err, DEFAULT_CLASS_PREFIX);
                DEFAULT_CLASS_PREFIX.to_string()
            }
        }
    }
}

/// Checks that `prefix` followed by hex digits is always a CSS identifier: it must start
/// with a letter or `_` (or `-` then one of those) and contain only `[A-Za-z0-9_-]`.
pub fn validate_class_prefix(prefix: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidClassPrefix {
        prefix: prefix.to_string(),
    };
    let mut chars = prefix.chars();
    let first = match chars.next() {
        Some('-') => chars.next().ok_or_else(invalid)?,
        Some(c) => c,
        None => return Err(invalid()),
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(invalid());
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(invalid());
    }
    Ok(())
}
