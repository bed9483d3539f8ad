//! Injection backends: where generated rule text ends up.

use crate::error::InjectionUnavailableError;
use indexmap::IndexMap;

/// A mutable stylesheet owned by the host.
///
/// Rule text is grouped under the class name that owns it, so a whole group can be excised
/// when the last consumer releases it.
pub trait SheetBackend {
    /// Appends the rule texts of a newly generated class.
    fn insert(&mut self, class_name: &str, rules: &[String])
        -> Result<(), InjectionUnavailableError>;

    /// Removes every rule inserted for `class_name`. Unknown names are ignored.
    fn remove(&mut self, class_name: &str);

    /// The full stylesheet text, one rule per line, in insertion order.
    fn css_text(&self) -> String;

    /// Number of individual rules currently in the sheet.
    fn rule_count(&self) -> usize;
}

impl<B: SheetBackend + ?Sized> SheetBackend for Box<B> {
    fn insert(
        &mut self,
        class_name: &str,
        rules: &[String],
    ) -> Result<(), InjectionUnavailableError> {
        (**self).insert(class_name, rules)
    }

    fn remove(&mut self, class_name: &str) {
        (**self).remove(class_name)
    }

    fn css_text(&self) -> String {
        (**self).css_text()
    }

    fn rule_count(&self) -> usize {
        (**self).rule_count()
    }
}

/// Ordered class -> rule texts store shared by the in-memory and document backends.
#[derive(Debug, Default, Clone)]
pub(crate) struct RuleGroups {
    groups: IndexMap<String, Vec<String>>,
}

impl RuleGroups {
    pub(crate) fn insert(&mut self, class_name: &str, rules: &[String]) {
        self.groups.insert(class_name.to_string(), rules.to_vec());
    }

    pub(crate) fn remove(&mut self, class_name: &str) -> bool {
        self.groups.shift_remove(class_name).is_some()
    }

    pub(crate) fn css_text(&self) -> String {
        self.groups
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn rule_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// The default backend: one process-wide stylesheet kept in memory, read back with
/// `css_text` by whatever host emits the final page.
#[derive(Debug, Default, Clone)]
pub struct MemorySheet {
    rules: RuleGroups,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SheetBackend for MemorySheet {
    fn insert(
        &mut self,
        class_name: &str,
        rules: &[String],
    ) -> Result<(), InjectionUnavailableError> {
        self.rules.insert(class_name, rules);
        Ok(())
    }

    fn remove(&mut self, class_name: &str) {
        self.rules.remove(class_name);
    }

    fn css_text(&self) -> String {
        self.rules.css_text()
    }

    fn rule_count(&self) -> usize {
        self.rules.rule_count()
    }
}

/// A host with no stylesheet-mutation capability. Every insertion fails, so the engine falls
/// back to inline-only output.
#[derive(Debug, Clone)]
pub struct UnavailableSheet {
    reason: String,
}

impl UnavailableSheet {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableSheet {
            reason: reason.into(),
        }
    }
}

impl SheetBackend for UnavailableSheet {
    fn insert(
        &mut self,
        _class_name: &str,
        _rules: &[String],
    ) -> Result<(), InjectionUnavailableError> {
        Err(InjectionUnavailableError::new(self.reason.clone()))
    }

    fn remove(&mut self, _class_name: &str) {}

    fn css_text(&self) -> String {
        String::new()
    }

    fn rule_count(&self) -> usize {
        0
    }
}
