//! Style normalization and CSS rule injection for component styles.
//!
//! Components describe their look as loosely shaped style descriptors (JSON objects with
//! camelCase properties, nested `:pseudo` and `@media` blocks). The engine normalizes them
//! into a canonical form, splits what can be applied inline from what needs real CSS rules,
//! and injects those rules once into a shared stylesheet under a content-addressed class name.

pub mod binding;
pub mod config;
pub mod dom;
pub mod error;
pub mod parser;
pub mod render;
pub mod sheet;
pub mod style;

pub use binding::{release_style, resolve_style, AppliedStyle, StyleEngine, StyleSlot};
pub use config::EngineConfig;
pub use error::{ConfigError, CssError, DescriptorError, InjectionUnavailableError, RenderError};
pub use sheet::backend::{MemorySheet, SheetBackend, UnavailableSheet};
pub use sheet::cache::ResolvedStyle;
pub use style::canonical::{CanonicalStyle, InlineStyle, Rule, StyleValue};
pub use style::normalize::normalize;
pub use style::tokens::TokenMap;
