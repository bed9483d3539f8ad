//! A backend that keeps the shared stylesheet inside the host document, as the text of a
//! `<style>` element in `<head>`.

use crate::dom::dom_tree::{self, Document, ElementNode, Handle, Node};
use crate::error::InjectionUnavailableError;
use crate::sheet::backend::{RuleGroups, SheetBackend};
use std::rc::Rc;

/// Marks the `<style>` element owned by the engine.
pub const STYLE_MARKER_ATTRIBUTE: &str = "data-vistara-style";

#[derive(Debug)]
pub struct DomStyleSheet {
    style_node: Handle,
    rules: RuleGroups,
}

impl DomStyleSheet {
    /// Adopts the document's marked `<style>` element, creating one at the end of `<head>` if
    /// there is none. Fails when the document has no `<head>` to hold it.
    pub fn attach(document: &Document) -> Result<Self, InjectionUnavailableError> {
        let head = dom_tree::find_element(&document.root, "head")
            .ok_or_else(|| InjectionUnavailableError::new("document has no <head> element"))?;

        let existing = head
            .borrow()
            .children()
            .iter()
            .find(|child| {
                child.borrow().as_element().is_some_and(|elem| {
                    elem.tag == "style" && elem.attributes.contains_key(STYLE_MARKER_ATTRIBUTE)
                })
            })
            .cloned();

        let style_node = match existing {
            Some(node) => node,
            None => {
                let mut style = ElementNode::html("style");
                style.set_attribute(STYLE_MARKER_ATTRIBUTE, "");
                let node = dom_tree::new_handle(Node::Element(style));
                dom_tree::append_child(&head, Rc::clone(&node));
                node
            }
        };

        let sheet = DomStyleSheet {
            style_node,
            rules: RuleGroups::default(),
        };
        sheet.sync();
        Ok(sheet)
    }

    /// The `<style>` element this sheet writes to.
    pub fn style_element(&self) -> &Handle {
        &self.style_node
    }

    fn sync(&self) {
        let css = escape_style_text(&self.rules.css_text());
        if let Node::Element(style) = &mut *self.style_node.borrow_mut() {
            style.children.clear();
            if !css.is_empty() {
                style.children.push(dom_tree::new_handle(Node::Text(css)));
            }
        }
    }
}

/// `<style>` content is raw text that ends at the first `</style`. Every `</` is written as
/// the CSS escape `\3c /`, which reads back as `</` inside CSS strings.
fn escape_style_text(css: &str) -> String {
    css.replace("</", "\\3c /")
}

impl SheetBackend for DomStyleSheet {
    fn insert(
        &mut self,
        class_name: &str,
        rules: &[String],
    ) -> Result<(), InjectionUnavailableError> {
        self.rules.insert(class_name, rules);
        self.sync();
        Ok(())
    }

    fn remove(&mut self, class_name: &str) {
        if self.rules.remove(class_name) {
            self.sync();
        }
    }

    fn css_text(&self) -> String {
        self.rules.css_text()
    }

    fn rule_count(&self) -> usize {
        self.rules.rule_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::html::{create_dom_tree, render_document};

    #[test]
    fn writes_rules_into_head() {
        let document = create_dom_tree("<html><head><title>x</title></head><body></body></html>");
        let mut sheet = DomStyleSheet::attach(&document).unwrap();
        sheet
            .insert("gen1", &[".gen1:hover{color:red}".to_string()])
            .unwrap();

        let rendered = render_document(&document);
        assert!(rendered.contains(
            r#"<head><title>x</title><style data-vistara-style="">.gen1:hover{color:red}</style></head>"#
        ));

        sheet.remove("gen1");
        let rendered = render_document(&document);
        assert!(rendered.contains(r#"<style data-vistara-style=""></style>"#));
        assert_eq!(sheet.rule_count(), 0);
    }

    #[test]
    fn reuses_marked_style_element() {
        let document = create_dom_tree(
            r#"<html><head><style data-vistara-style="">.stale{}</style></head></html>"#,
        );
        let sheet = DomStyleSheet::attach(&document).unwrap();
        let head = dom_tree::find_element(&document.root, "head").unwrap();
        assert_eq!(head.borrow().children().len(), 1);
        assert!(Rc::ptr_eq(&head.borrow().children()[0], sheet.style_element()));
        assert!(!render_document(&document).contains(".stale"));
    }

    #[test]
    fn rule_text_cannot_close_the_style_element() {
        let document = create_dom_tree("<html><head></head><body></body></html>");
        let mut sheet = DomStyleSheet::attach(&document).unwrap();
        let rule = r#".gen1::after{content:"</style><script>x()</script>"}"#.to_string();
        sheet.insert("gen1", &[rule.clone()]).unwrap();
        assert_eq!(sheet.css_text(), rule);

        let rendered = render_document(&document);
        assert!(rendered.contains(r#"content:"\3c /style><script>x()\3c /script>""#));

        let reparsed = create_dom_tree(&rendered);
        assert!(dom_tree::find_element(&reparsed.root, "script").is_none());
        let head = dom_tree::find_element(&reparsed.root, "head").unwrap();
        assert_eq!(head.borrow().children().len(), 1);
    }

    #[test]
    fn document_without_head_is_unavailable() {
        let document = dom_tree::new_document();
        assert!(DomStyleSheet::attach(&document).is_err());
    }
}
