use thiserror::Error;

/// A malformed style descriptor. Always a programming error in the calling component.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptorError {
    #[error("style descriptor must be an object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("property `{property}` has an unsupported value of type {found}")]
    InvalidValue {
        property: String,
        found: &'static str,
    },

    #[error("selector block `{selector}` must be an object, found {found}")]
    InvalidBlock {
        selector: String,
        found: &'static str,
    },

    #[error("property `{property}` has a non-finite numeric value")]
    NonFiniteNumber { property: String },

    #[error("style descriptor nests deeper than {limit} levels at `{path}`")]
    TooDeep { limit: usize, path: String },

    #[error("`{property}` is not a CSS property name")]
    InvalidProperty { property: String },

    #[error("value of `{property}` would end its declaration: `{value}`")]
    UnsafeValue { property: String, value: String },

    #[error("block key `{selector}` would end its rule")]
    UnsafeSelector { selector: String },
}

/// The host cannot mutate its stylesheet. Recovered locally with inline-only output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stylesheet injection unavailable: {reason}")]
pub struct InjectionUnavailableError {
    pub reason: String,
}

impl InjectionUnavailableError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// An `EngineConfig` value that cannot produce valid CSS.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("class prefix `{prefix}` does not start a CSS identifier")]
    InvalidClassPrefix { prefix: String },
}

/// Generated CSS that `lightningcss` refused to parse or print.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssError {
    #[error("invalid CSS `{css}`: {message}")]
    Parse { css: String, message: String },

    #[error("failed to print stylesheet: {0}")]
    Print(String),
}

/// Failure to render a page whose elements carry `data-style` descriptors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("<{tag}> element #{index} has a `data-style` attribute that is not valid JSON: {source}")]
    InvalidJson {
        tag: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("<{tag}> element #{index}: {source}")]
    Descriptor {
        tag: String,
        index: usize,
        #[source]
        source: DescriptorError,
    },
}
