//! Checks generated CSS with LightningCSS and produces minified exports of the stylesheet.

use crate::error::CssError;
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{style::StyleRule, CssRule};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;

/// A style rule as LightningCSS read it back, fully owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    /// The `@media` prelude the rule sat in, if any.
    pub media: Option<String>,
    /// e.g. `.gen1a2b3c4d:hover`
    pub selectors: Vec<String>,
    /// `(property, value)` in source order.
    pub declarations: Vec<(String, String)>,
}

/// Parse CSS text and flatten its style rules (including those nested in `@media`) into
/// owned `ParsedRule`s. Other at-rules are skipped.
pub fn parse_rules(css_text: &str) -> Result<Vec<ParsedRule>, CssError> {
    let sheet = LightningStyleSheet::parse(css_text, ParserOptions::default()).map_err(|e| {
        CssError::Parse {
            css: css_text.to_string(),
            message: e.to_string(),
        }
    })?;

    let mut parsed = Vec::new();
    for rule in &sheet.rules.0 {
        match rule {
            CssRule::Style(style_rule) => parsed.push(convert_style_rule(style_rule, None)?),
            CssRule::Media(media_rule) => {
                let media = media_rule
                    .query
                    .to_css_string(PrinterOptions::default())
                    .map_err(|e| CssError::Print(e.to_string()))?;
                for inner_rule in &media_rule.rules.0 {
                    if let CssRule::Style(style_rule) = inner_rule {
                        parsed.push(convert_style_rule(style_rule, Some(media.clone()))?);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(parsed)
}

/// Copy a StyleRule's selectors and declarations (normal, then `!important`).
fn convert_style_rule(
    style_rule: &StyleRule<'_>,
    media: Option<String>,
) -> Result<ParsedRule, CssError> {
    let mut selectors = Vec::new();
    for selector in &style_rule.selectors.0 {
        if let Ok(sel_str) = selector.to_css_string(Default::default()) {
            selectors.push(sel_str);
        }
    }

    let block = &style_rule.declarations;
    let mut declarations = Vec::new();
    for property in block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
    {
        let name = property.property_id().name().to_string();
        let value = property
            .value_to_css_string(PrinterOptions::default())
            .map_err(|e| CssError::Print(e.to_string()))?;
        declarations.push((name, value));
    }

    Ok(ParsedRule {
        media,
        selectors,
        declarations,
    })
}

/// Accepts the text of one generated rule if LightningCSS parses it and every style rule it
/// reads back kept at least one declaration.
pub fn validate_rule(rule_text: &str) -> Result<(), CssError> {
    let parsed = parse_rules(rule_text)?;
    if parsed.iter().all(|rule| !rule.declarations.is_empty()) {
        Ok(())
    } else {
        Err(CssError::Parse {
            css: rule_text.to_string(),
            message: "no declarations survived parsing".to_string(),
        })
    }
}

/// Minified form of a whole stylesheet.
pub fn minify(css_text: &str) -> Result<String, CssError> {
    let sheet = LightningStyleSheet::parse(css_text, ParserOptions::default()).map_err(|e| {
        CssError::Parse {
            css: css_text.to_string(),
            message: e.to_string(),
        }
    })?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| CssError::Print(e.to_string()))?;
    Ok(printed.code)
}
