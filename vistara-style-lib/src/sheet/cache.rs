//! Content-addressed rule cache in front of a `SheetBackend`.
//!
//! Each distinct rule set is injected once, under a class name derived from the hash of its
//! content, and reference counted across every consumer that resolved it.

use crate::config::EngineConfig;
use crate::error::InjectionUnavailableError;
use crate::sheet::backend::SheetBackend;
use crate::sheet::css_check;
use crate::sheet::serialize::{class_name, content_hash, content_key, rule_css};
use crate::style::canonical::{CanonicalStyle, InlineStyle};
use log::{debug, warn};
use std::collections::HashMap;

/// What a component applies to its element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    /// Generated class, empty when the style has no rules or injection was unavailable.
    pub class_name: String,
    pub style: InlineStyle,
    /// Set when rules had to be dropped because the host cannot inject them.
    pub diagnostic: Option<InjectionUnavailableError>,
}

impl ResolvedStyle {
    pub fn has_class(&self) -> bool {
        !self.class_name.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub content_hash: String,
    pub class_name: String,
    /// Class-independent serialization, the key of the content index.
    pub content_key: String,
    pub rule_text: Vec<String>,
    pub ref_count: usize,
}

pub struct StyleCache<B: SheetBackend> {
    backend: B,
    entries: HashMap<String, CacheEntry>,
    /// Content key -> class it was injected under. Survives eviction of colliding classes.
    classes_by_content: HashMap<String, String>,
    class_prefix: String,
    hash_len: usize,
    eviction: bool,
    validate_css: bool,
    reported_unavailable: bool,
}

impl<B: SheetBackend> StyleCache<B> {
    pub fn new(backend: B, config: &EngineConfig) -> Self {
        StyleCache {
            backend,
            entries: HashMap::new(),
            classes_by_content: HashMap::new(),
            class_prefix: config.effective_class_prefix(),
            hash_len: config.effective_hash_len(),
            eviction: config.eviction,
            validate_css: config.validate_css,
            reported_unavailable: false,
        }
    }

    /// Returns the class name for the rules of `canonical`, injecting them on first sight.
    pub fn resolve(&mut self, canonical: &CanonicalStyle) -> ResolvedStyle {
        let style = canonical.inline.clone();
        if canonical.rules.is_empty() {
            return ResolvedStyle {
                class_name: String::new(),
                style,
                diagnostic: None,
            };
        }

        let key = content_key(&canonical.rules);
        if let Some(class) = self.classes_by_content.get(&key) {
            if let Some(entry) = self.entries.get_mut(class) {
                entry.ref_count += 1;
                debug!("style cache hit {} (refs {})", class, entry.ref_count);
                return ResolvedStyle {
                    class_name: class.clone(),
                    style,
                    diagnostic: None,
                };
            }
        }

        // content is new: take the first salted name not held by other content
        let mut salt = 0;
        loop {
            let hash = content_hash(&key, salt);
            let class = class_name(&self.class_prefix, &hash, self.hash_len);
            if !self.entries.contains_key(&class) {
                return self.inject(class, hash, key, canonical, style);
            }
            warn!("class name collision on {}, rehashing", class);
            salt += 1;
        }
    }

    fn inject(
        &mut self,
        class: String,
        hash: String,
        key: String,
        canonical: &CanonicalStyle,
        style: InlineStyle,
    ) -> ResolvedStyle {
        let mut rule_text: Vec<String> = canonical
            .rules
            .iter()
            .map(|rule| rule_css(&class, rule))
            .collect();

        if self.validate_css {
            rule_text.retain(|text| match css_check::validate_rule(text) {
                Ok(()) => true,
                Err(err) => {
                    warn!("dropping generated rule: {}", err);
                    false
                }
            });
            if rule_text.is_empty() {
                return ResolvedStyle {
                    class_name: String::new(),
                    style,
                    diagnostic: None,
                };
            }
        }

        if let Err(err) = self.backend.insert(&class, &rule_text) {
            if !self.reported_unavailable {
                warn!("{}; falling back to inline styles only", err);
                self.reported_unavailable = true;
            }
            return ResolvedStyle {
                class_name: String::new(),
                style,
                diagnostic: Some(err),
            };
        }

        debug!("injected {} rule(s) as {}", rule_text.len(), class);
        self.classes_by_content.insert(key.clone(), class.clone());
        self.entries.insert(
            class.clone(),
            CacheEntry {
                content_hash: hash,
                class_name: class.clone(),
                content_key: key,
                rule_text,
                ref_count: 1,
            },
        );
        ResolvedStyle {
            class_name: class,
            style,
            diagnostic: None,
        }
    }

    /// Drops one reference to `class_name`; the last release removes its rules from the sheet.
    /// A no-op when eviction is disabled or the class is unknown.
    pub fn release(&mut self, class_name: &str) {
        if !self.eviction || class_name.is_empty() {
            return;
        }
        let Some(entry) = self.entries.get_mut(class_name) else {
            debug!("release of unknown class {}", class_name);
            return;
        };

        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count == 0 {
            if let Some(evicted) = self.entries.remove(class_name) {
                if self.classes_by_content.get(&evicted.content_key).map(String::as_str)
                    == Some(class_name)
                {
                    self.classes_by_content.remove(&evicted.content_key);
                }
            }
            self.backend.remove(class_name);
            debug!("evicted {}", class_name);
        }
    }

    pub fn ref_count(&self, class_name: &str) -> usize {
        self.entries.get(class_name).map_or(0, |entry| entry.ref_count)
    }

    pub fn entry(&self, class_name: &str) -> Option<&CacheEntry> {
        self.entries.get(class_name)
    }

    /// Number of distinct rule sets currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn css_text(&self) -> String {
        self.backend.css_text()
    }

    pub fn rule_count(&self) -> usize {
        self.backend.rule_count()
    }
}
