//! Parsing host pages into the document tree and serializing them back.
//!
//! It uses html5ever as the HTML parser and builds a DOM tree defined in the
//! `crate::dom::dom_tree` module.

use crate::dom::dom_tree;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, NodeOrText, QuirksMode, TreeSink},
    LocalName, Namespace, QualName,
};
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "meta", "img", "br", "hr", "input", "link", "area", "base", "col", "embed", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Creates a DOM tree from the provided HTML content.
///
/// # Arguments
///
/// * `html_content` - A string slice containing the HTML to parse.
///
/// # Returns
///
/// A `dom_tree::Document` representing the parsed HTML.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let tree_sink = HostTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content.to_string())
}

/// Serializes the document, including its DOCTYPE, back to HTML.
pub fn render_document(document: &dom_tree::Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = &*document.doctype.borrow() {
        out.push_str(&format!("<!DOCTYPE {}>", doctype.name));
    }
    render_node(&document.root.borrow(), false, &mut out);
    out
}

fn render_node(node: &dom_tree::Node, raw_text: bool, out: &mut String) {
    match node {
        dom_tree::Node::DocumentRoot(root) => {
            for child in &root.children {
                render_node(&child.borrow(), false, out);
            }
        }
        dom_tree::Node::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for (name, value) in &elem.attributes {
                out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&elem.tag.as_str());
            for child in &elem.children {
                render_node(&child.borrow(), raw, out);
            }
            out.push_str(&format!("</{}>", elem.tag));
        }
        dom_tree::Node::Text(text) if raw_text => out.push_str(text),
        dom_tree::Node::Text(text) => out.push_str(&escape(text, false)),
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' if attribute => escaped.push_str("&quot;"),
            '<' if !attribute => escaped.push_str("&lt;"),
            '>' if !attribute => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// A TreeSink building the host document.
///
/// It holds the Document being built and the current quirks mode.
pub struct HostTreeSink {
    document: dom_tree::Document,
    quirks_mode: RefCell<QuirksMode>,
}

impl HostTreeSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        *self.quirks_mode.borrow()
    }
}

impl Default for HostTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Element name handed back to the tree builder.
#[derive(Debug)]
pub struct HostElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for HostElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for HostTreeSink {
    type Handle = Rc<RefCell<dom_tree::Node>>;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = HostElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: std::borrow::Cow<'static, str>) {
        debug!("html parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match &*target.borrow() {
            dom_tree::Node::Element(elem) => HostElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            },
            // the tree builder only asks for names of elements it created
            _ => HostElemName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            },
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: html5ever::interface::ElementFlags,
    ) -> Self::Handle {
        let mut element = dom_tree::ElementNode::new(name.local.to_string(), name);
        for attr in attrs {
            element
                .attributes
                .insert(attr.name.local.to_string(), attr.value.to_string());
        }
        dom_tree::new_handle(dom_tree::Node::Element(element))
    }

    /// Comments are not kept; they become empty text nodes.
    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        dom_tree::new_handle(dom_tree::Node::Text(String::new()))
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        dom_tree::new_handle(dom_tree::Node::Text(format!("{} {}", target, data)))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let index = parent.borrow().children().len();
        insert_child(parent, index, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if dom_tree::find_parent(&self.document.root, element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let Some((parent, index)) = dom_tree::find_parent(&self.document.root, sibling) else {
            debug!("append_before_sibling on a detached node");
            return;
        };
        if let NodeOrText::AppendNode(node) = &child {
            dom_tree::detach(&self.document.root, node);
        }
        // detaching cannot shift `sibling`: a new node is never an earlier sibling of it
        insert_child(&parent, index, child);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        if let dom_tree::Node::Element(elem_node) = &mut *target.borrow_mut() {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if !elem_node.attributes.contains_key(&key) {
                    elem_node.attributes.insert(key, attr.value.to_string());
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        dom_tree::detach(&self.document.root, target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let moved = match node.borrow_mut().children_mut() {
            Some(children) => std::mem::take(children),
            None => return,
        };
        if let Some(children) = new_parent.borrow_mut().children_mut() {
            children.extend(moved);
        }
    }
}

/// Inserts `child` at `index` of `parent`'s children, merging text into an adjacent text
/// node before it.
fn insert_child(
    parent: &dom_tree::Handle,
    index: usize,
    child: NodeOrText<dom_tree::Handle>,
) {
    let mut parent_borrow = parent.borrow_mut();
    let Some(children) = parent_borrow.children_mut() else {
        return;
    };
    let index = index.min(children.len());
    match child {
        NodeOrText::AppendNode(node) => children.insert(index, node),
        NodeOrText::AppendText(text) => {
            if let Some(previous) = index.checked_sub(1).and_then(|i| children.get(i)) {
                if let dom_tree::Node::Text(existing) = &mut *previous.borrow_mut() {
                    existing.push_str(&text);
                    return;
                }
            }
            children.insert(
                index,
                dom_tree::new_handle(dom_tree::Node::Text(text.to_string())),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_and_renders_round_trip() {
        let html = r#"<!DOCTYPE html><html><head><title>T</title></head><body><p class="a">Hi &amp; bye</p><br></body></html>"#;
        let document = create_dom_tree(html);
        assert_eq!(render_document(&document), html);
    }

    #[test]
    fn attributes_are_escaped() {
        let document = create_dom_tree(r#"<div title='say "hi"'>x</div>"#);
        let rendered = render_document(&document);
        assert!(rendered.contains(r#"<div title="say &quot;hi&quot;">x</div>"#));
    }

    #[test]
    fn style_text_is_not_escaped() {
        let document = create_dom_tree("<style>.a>.b{color:red}</style>");
        let rendered = render_document(&document);
        assert!(rendered.contains("<style>.a>.b{color:red}</style>"));
    }

    #[test]
    fn misnested_table_content_is_foster_parented() {
        let document =
            create_dom_tree("<table><span>a</span>b<tr><td>c</td></tr></table>");
        assert_eq!(
            render_document(&document),
            "<html><head></head><body><span>a</span>b<table><tbody><tr><td>c</td></tr></tbody></table></body></html>"
        );
    }

    #[test]
    fn misnested_formatting_is_adopted() {
        let document = create_dom_tree("<b>1<p>2</b>3</p>");
        assert_eq!(
            render_document(&document),
            "<html><head></head><body><b>1</b><p><b>2</b>3</p></body></html>"
        );
    }

    #[test]
    fn parser_wraps_fragments_in_html_body() {
        let document = create_dom_tree("<p>Hello</p>");
        assert!(dom_tree::find_element(&document.root, "head").is_some());
        let body = dom_tree::find_element(&document.root, "body").unwrap();
        let body = body.borrow();
        assert_eq!(body.children().len(), 1);
    }
}
