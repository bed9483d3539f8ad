use crate::binding::{StyleEngine, StyleSlot};
use crate::config::EngineConfig;
use crate::dom::dom_tree;
use crate::error::{InjectionUnavailableError, RenderError};
use crate::parser::html::{create_dom_tree, render_document};
use crate::sheet::backend::{SheetBackend, UnavailableSheet};
use crate::sheet::dom_sheet::DomStyleSheet;
use log::{info, warn};
use serde_json::Value;
use std::rc::Rc;

/// Static rendering of pages whose elements carry their style descriptor as JSON in a
/// `data-style` attribute.
pub mod page {
    use super::*;

    /// Attribute holding an element's descriptor. Removed once the element is styled.
    pub const STYLE_ATTRIBUTE: &str = "data-style";

    #[derive(Debug)]
    pub struct RenderedPage {
        pub html: String,
        /// Number of elements that carried a descriptor.
        pub styled_elements: usize,
        /// Distinct classes injected into the page's stylesheet.
        pub injected_classes: usize,
        /// Set when the page had nowhere to put a stylesheet.
        pub diagnostic: Option<InjectionUnavailableError>,
    }

    /// Styles every `data-style` element of `html_content` and returns the rendered page,
    /// with the generated rules in a `<style>` element in `<head>`.
    ///
    /// Existing `class` attributes are kept after the generated class; existing `style`
    /// attributes are kept after the generated inline declarations.
    pub fn render(html_content: &str, config: EngineConfig) -> Result<RenderedPage, RenderError> {
        let document = create_dom_tree(html_content);

        let mut diagnostic = None;
        let mut sheet_node = None;
        let backend: Box<dyn SheetBackend> = match DomStyleSheet::attach(&document) {
            Ok(sheet) => {
                sheet_node = Some(Rc::clone(sheet.style_element()));
                Box::new(sheet)
            }
            Err(err) => {
                warn!("{}; rendering inline styles only", err);
                diagnostic = Some(err.clone());
                Box::new(UnavailableSheet::new(err.reason))
            }
        };
        let mut engine = StyleEngine::with_backend(backend, config);

        let mut styled = dom_tree::elements_with_attribute(&document.root, STYLE_ATTRIBUTE);
        if let Some(sheet_node) = &sheet_node {
            styled.retain(|node| {
                let own_sheet = Rc::ptr_eq(node, sheet_node);
                if own_sheet {
                    warn!("ignoring `{}` on the generated <style> element", STYLE_ATTRIBUTE);
                }
                !own_sheet
            });
        }
        for (index, node) in styled.iter().enumerate() {
            style_element(&mut engine, node, index)?;
        }

        info!(
            "styled {} element(s) with {} rule(s)",
            styled.len(),
            engine.rule_count()
        );
        Ok(RenderedPage {
            html: render_document(&document),
            styled_elements: styled.len(),
            injected_classes: engine.cache().len(),
            diagnostic,
        })
    }

    /// The element is only borrowed around reading and writing its attributes, never while
    /// the engine runs, since a miss writes into the document's `<style>` node.
    fn style_element<B: SheetBackend>(
        engine: &mut StyleEngine<B>,
        node: &dom_tree::Handle,
        index: usize,
    ) -> Result<(), RenderError> {
        let (tag, raw, caller_classes, existing_style) = {
            let mut node = node.borrow_mut();
            let Some(elem) = node.as_element_mut() else {
                return Ok(());
            };
            let raw = elem.remove_attribute(STYLE_ATTRIBUTE).unwrap_or_default();
            let caller_classes: Vec<String> =
                elem.class_names().into_iter().map(str::to_string).collect();
            let existing_style = elem.attribute("style").map(str::to_string);
            (elem.tag.clone(), raw, caller_classes, existing_style)
        };

        let descriptor: Value =
            serde_json::from_str(&raw).map_err(|source| RenderError::InvalidJson {
                tag: tag.clone(),
                index,
                source,
            })?;
        let caller_refs: Vec<&str> = caller_classes.iter().map(String::as_str).collect();

        // the page is rendered once, so the slot's reference is never released
        let mut slot = StyleSlot::named(tag.clone());
        let applied = slot
            .render(engine, &descriptor, &caller_refs)
            .map_err(|source| RenderError::Descriptor {
                tag: tag.clone(),
                index,
                source,
            })?;

        let mut node = node.borrow_mut();
        let Some(elem) = node.as_element_mut() else {
            return Ok(());
        };
        applied.apply_to(elem);
        if let Some(existing) = existing_style.filter(|s| !s.trim().is_empty()) {
            let merged = match elem.attribute("style") {
                Some(generated) => format!("{}; {}", generated, existing.trim()),
                None => existing.trim().to_string(),
            };
            elem.set_attribute("style", merged);
        }
        Ok(())
    }
}
