//! The entry point components call on every render.
//!
//! `StyleEngine::resolve_style` turns a descriptor into a class name plus inline style.
//! `StyleSlot` tracks what one element currently holds so that re-renders and teardown keep
//! the cache's reference counts balanced.

use crate::config::EngineConfig;
use crate::dom::dom_tree::ElementNode;
use crate::error::{CssError, DescriptorError, InjectionUnavailableError};
use crate::sheet::backend::{MemorySheet, SheetBackend};
use crate::sheet::cache::{ResolvedStyle, StyleCache};
use crate::sheet::css_check;
use crate::style::canonical::{CanonicalStyle, InlineStyle};
use crate::style::normalize::Normalizer;
use crate::style::tokens::audit;
use log::warn;
use serde_json::Value;
use std::cell::RefCell;

/// Normalizer plus rule cache, sharing one configuration.
pub struct StyleEngine<B: SheetBackend = MemorySheet> {
    config: EngineConfig,
    cache: StyleCache<B>,
}

impl StyleEngine<MemorySheet> {
    pub fn new(config: EngineConfig) -> Self {
        StyleEngine::with_backend(MemorySheet::new(), config)
    }
}

impl Default for StyleEngine<MemorySheet> {
    fn default() -> Self {
        StyleEngine::new(EngineConfig::default())
    }
}

impl<B: SheetBackend> StyleEngine<B> {
    pub fn with_backend(backend: B, config: EngineConfig) -> Self {
        let cache = StyleCache::new(backend, &config);
        StyleEngine { config, cache }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &StyleCache<B> {
        &self.cache
    }

    /// Normalizes without touching the cache.
    pub fn normalize(&self, descriptor: &Value) -> Result<CanonicalStyle, DescriptorError> {
        Normalizer::new(&self.config).normalize(descriptor)
    }

    /// Normalizes `descriptor` and resolves its rules to a shared class.
    ///
    /// Every successful call holding a class takes a reference that must later be given back
    /// with `release`.
    pub fn resolve_style(&mut self, descriptor: &Value) -> Result<ResolvedStyle, DescriptorError> {
        self.resolve_labeled("Unknown", descriptor)
    }

    /// `resolve_style`, naming the calling component in audit warnings.
    pub fn resolve_labeled(
        &mut self,
        label: &str,
        descriptor: &Value,
    ) -> Result<ResolvedStyle, DescriptorError> {
        if self.config.audit_hardcoded {
            let findings = audit(descriptor);
            if !findings.is_empty() {
                let listed: Vec<String> = findings.iter().map(ToString::to_string).collect();
                warn!("[{}] hardcoded values detected: {}", label, listed.join(", "));
            }
        }
        let canonical = self.normalize(descriptor)?;
        Ok(self.cache.resolve(&canonical))
    }

    pub fn release(&mut self, class_name: &str) {
        self.cache.release(class_name);
    }

    pub fn css_text(&self) -> String {
        self.cache.css_text()
    }

    pub fn rule_count(&self) -> usize {
        self.cache.rule_count()
    }

    /// The whole stylesheet minified by LightningCSS.
    pub fn minified_css(&self) -> Result<String, CssError> {
        let css = self.css_text();
        if css.is_empty() {
            return Ok(css);
        }
        css_check::minify(&css)
    }
}

/// Generated class first, caller classes after it, so caller classes win ties by source
/// order. Empty and repeated entries are skipped.
pub fn merge_class_names(generated: &str, caller: &[&str]) -> String {
    let mut merged: Vec<&str> = Vec::new();
    let candidates = std::iter::once(generated)
        .chain(caller.iter().copied().flat_map(str::split_whitespace));
    for class in candidates {
        if !class.is_empty() && !merged.contains(&class) {
            merged.push(class);
        }
    }
    merged.join(" ")
}

/// The attributes one element ends up with after a render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedStyle {
    /// Merged class attribute.
    pub class: String,
    pub style: InlineStyle,
    pub diagnostic: Option<InjectionUnavailableError>,
}

impl AppliedStyle {
    /// Writes `class` and `style` onto the element, removing attributes that would be empty.
    pub fn apply_to(&self, element: &mut ElementNode) {
        if self.class.is_empty() {
            element.remove_attribute("class");
        } else {
            element.set_attribute("class", self.class.clone());
        }
        if self.style.is_empty() {
            element.remove_attribute("style");
        } else {
            element.set_attribute("style", self.style.to_attribute());
        }
    }
}

/// Per-element mount/update/unmount lifecycle.
#[derive(Debug, Default)]
pub struct StyleSlot {
    label: Option<String>,
    class_name: String,
}

impl StyleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot whose audit warnings name `label`.
    pub fn named(label: impl Into<String>) -> Self {
        StyleSlot {
            label: Some(label.into()),
            class_name: String::new(),
        }
    }

    /// Class currently held from the cache, empty if none.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Resolves `descriptor` and swaps the held class for the new one. The new reference is
    /// taken before the old one is released, so unchanged content is never evicted in between.
    /// On error the slot keeps what it held.
    pub fn render<B: SheetBackend>(
        &mut self,
        engine: &mut StyleEngine<B>,
        descriptor: &Value,
        caller_classes: &[&str],
    ) -> Result<AppliedStyle, DescriptorError> {
        let label = self.label.as_deref().unwrap_or("Unknown");
        let resolved = engine.resolve_labeled(label, descriptor)?;
        let previous = std::mem::replace(&mut self.class_name, resolved.class_name.clone());
        engine.release(&previous);

        Ok(AppliedStyle {
            class: merge_class_names(&resolved.class_name, caller_classes),
            style: resolved.style,
            diagnostic: resolved.diagnostic,
        })
    }

    /// Gives the held class back to the cache.
    pub fn teardown<B: SheetBackend>(&mut self, engine: &mut StyleEngine<B>) {
        let held = std::mem::take(&mut self.class_name);
        engine.release(&held);
    }
}

thread_local! {
    static GLOBAL_ENGINE: RefCell<StyleEngine> = RefCell::new(StyleEngine::default());
}

/// Runs `f` against this thread's shared engine. `f` must not call back into the global
/// engine.
pub fn with_global_engine<R>(f: impl FnOnce(&mut StyleEngine) -> R) -> R {
    GLOBAL_ENGINE.with(|engine| f(&mut engine.borrow_mut()))
}

/// `StyleEngine::resolve_style` on the thread's shared engine.
pub fn resolve_style(descriptor: &Value) -> Result<ResolvedStyle, DescriptorError> {
    with_global_engine(|engine| engine.resolve_style(descriptor))
}

/// `StyleEngine::release` on the thread's shared engine.
pub fn release_style(class_name: &str) {
    with_global_engine(|engine| engine.release(class_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generated_class_comes_first() {
        assert_eq!(merge_class_names("gen1", &["btn", "btn-primary"]), "gen1 btn btn-primary");
        assert_eq!(merge_class_names("", &["btn"]), "btn");
        assert_eq!(merge_class_names("gen1", &[]), "gen1");
        assert_eq!(merge_class_names("gen1", &["a b", "", "a", "gen1"]), "gen1 a b");
    }

    #[test]
    fn slot_swaps_references_on_rerender() {
        let mut engine = StyleEngine::default();
        let mut slot = StyleSlot::new();
        let hover = json!({ ":hover": { "color": "red" } });
        let focus = json!({ ":focus": { "color": "blue" } });

        slot.render(&mut engine, &hover, &[]).unwrap();
        let hover_class = slot.class_name().to_string();
        slot.render(&mut engine, &hover, &[]).unwrap();
        assert_eq!(engine.cache().ref_count(&hover_class), 1);

        slot.render(&mut engine, &focus, &[]).unwrap();
        assert_eq!(engine.cache().ref_count(&hover_class), 0);
        assert_eq!(engine.rule_count(), 1);

        slot.teardown(&mut engine);
        assert_eq!(engine.rule_count(), 0);
        assert_eq!(slot.class_name(), "");
    }

    #[test]
    fn failed_render_keeps_held_class() {
        let mut engine = StyleEngine::default();
        let mut slot = StyleSlot::named("Badge");
        slot.render(&mut engine, &json!({ ":hover": { "color": "red" } }), &[])
            .unwrap();
        let held = slot.class_name().to_string();

        assert!(slot.render(&mut engine, &json!([1, 2]), &[]).is_err());
        assert_eq!(slot.class_name(), held);
        assert_eq!(engine.cache().ref_count(&held), 1);
    }

    #[test]
    fn applied_style_writes_attributes() {
        let mut engine = StyleEngine::default();
        let mut slot = StyleSlot::new();
        let applied = slot
            .render(
                &mut engine,
                &json!({ "padding": 8, "opacity": 0.5, ":hover": { "opacity": 1 } }),
                &["card"],
            )
            .unwrap();

        let mut element = ElementNode::html("div");
        element.set_attribute("style", "color: red");
        applied.apply_to(&mut element);
        assert_eq!(
            element.attribute("class"),
            Some(format!("{} card", slot.class_name()).as_str())
        );
        assert_eq!(element.attribute("style"), Some("padding: 8px; opacity: 0.5"));

        AppliedStyle::default().apply_to(&mut element);
        assert!(element.attribute("class").is_none());
        assert!(element.attribute("style").is_none());
    }

    #[test]
    fn global_engine_is_shared_per_thread() {
        let descriptor = json!({ "@media print": { "display": "none" } });
        let first = resolve_style(&descriptor).unwrap();
        let second = resolve_style(&descriptor).unwrap();
        assert_eq!(first.class_name, second.class_name);
        assert_eq!(
            with_global_engine(|engine| engine.cache().ref_count(&first.class_name)),
            2
        );
        release_style(&first.class_name);
        release_style(&second.class_name);
        assert_eq!(with_global_engine(|engine| engine.rule_count()), 0);
    }

    #[test]
    fn minified_export_of_empty_sheet_is_empty() {
        assert_eq!(StyleEngine::default().minified_css().unwrap(), "");
    }
}
