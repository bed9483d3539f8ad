use html5ever::{LocalName, Namespace, QualName};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// The host document: elements the binding styles, and the `<head>` a document-backed
/// stylesheet lives in.
pub mod dom_tree {
    use super::*;

    pub type Handle = Rc<RefCell<Node>>;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(String),
    }

    #[derive(Debug, Clone, Default)]
    pub struct DocumentRootNode {
        pub children: Vec<Handle>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        /// Attributes in source order.
        pub attributes: IndexMap<String, String>,
        pub children: Vec<Handle>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: Handle,
        pub doctype: RefCell<Option<Doctype>>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl DocumentRootNode {
        pub fn new() -> Self {
            DocumentRootNode {
                children: Vec::new(),
            }
        }
    }

    impl ElementNode {
        pub fn new(tag: String, qual_name: QualName) -> Self {
            ElementNode {
                tag,
                qual_name,
                attributes: IndexMap::new(),
                children: Vec::new(),
            }
        }

        /// An element in the HTML namespace.
        pub fn html(tag: &str) -> Self {
            let qual_name = QualName::new(
                None,
                Namespace::from(HTML_NAMESPACE),
                LocalName::from(tag),
            );
            ElementNode::new(tag.to_string(), qual_name)
        }

        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes.get(name).map(String::as_str)
        }

        pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
            self.attributes.insert(name.to_string(), value.into());
        }

        pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
            self.attributes.shift_remove(name)
        }

        /// Whitespace-separated entries of the `class` attribute.
        pub fn class_names(&self) -> Vec<&str> {
            self.attribute("class")
                .map(|classes| classes.split_whitespace().collect())
                .unwrap_or_default()
        }
    }

    impl Node {
        pub fn children(&self) -> &[Handle] {
            match self {
                Node::DocumentRoot(root) => &root.children,
                Node::Element(elem) => &elem.children,
                Node::Text(_) => &[],
            }
        }

        /// Child list of an element or the document root.
        pub fn children_mut(&mut self) -> Option<&mut Vec<Handle>> {
            match self {
                Node::DocumentRoot(root) => Some(&mut root.children),
                Node::Element(elem) => Some(&mut elem.children),
                Node::Text(_) => None,
            }
        }

        pub fn as_element(&self) -> Option<&ElementNode> {
            match self {
                Node::Element(elem) => Some(elem),
                _ => None,
            }
        }

        pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
            match self {
                Node::Element(elem) => Some(elem),
                _ => None,
            }
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::new()))),
            doctype: RefCell::new(None),
        }
    }

    pub fn new_handle(node: Node) -> Handle {
        Rc::new(RefCell::new(node))
    }

    /// Appends `child` to an element or the document root. Text nodes take no children.
    pub fn append_child(parent: &Handle, child: Handle) {
        match &mut *parent.borrow_mut() {
            Node::DocumentRoot(root) => root.children.push(child),
            Node::Element(elem) => elem.children.push(child),
            Node::Text(_) => {}
        }
    }

    /// The node holding `target` under `root`, with `target`'s index in its children.
    pub fn find_parent(root: &Handle, target: &Handle) -> Option<(Handle, usize)> {
        let node = root.borrow();
        for (index, child) in node.children().iter().enumerate() {
            if Rc::ptr_eq(child, target) {
                return Some((Rc::clone(root), index));
            }
            if let Some(found) = find_parent(child, target) {
                return Some(found);
            }
        }
        None
    }

    /// Detaches `target` from wherever it sits under `root`.
    pub fn detach(root: &Handle, target: &Handle) {
        if let Some((parent, index)) = find_parent(root, target) {
            if let Some(children) = parent.borrow_mut().children_mut() {
                children.remove(index);
            }
        }
    }

    /// First element with the given tag, depth-first.
    pub fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
        if let Node::Element(elem) = &*node.borrow() {
            if elem.tag.eq_ignore_ascii_case(tag) {
                return Some(Rc::clone(node));
            }
        }
        for child in node.borrow().children() {
            if let Some(found) = find_element(child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// Every element carrying `attribute`, in document order.
    pub fn elements_with_attribute(node: &Handle, attribute: &str) -> Vec<Handle> {
        let mut found = Vec::new();
        collect_with_attribute(node, attribute, &mut found);
        found
    }

    fn collect_with_attribute(node: &Handle, attribute: &str, found: &mut Vec<Handle>) {
        let borrowed = node.borrow();
        if let Node::Element(elem) = &*borrowed {
            if elem.attributes.contains_key(attribute) {
                found.push(Rc::clone(node));
            }
        }
        for child in borrowed.children() {
            collect_with_attribute(child, attribute, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::dom_tree::*;
    use std::rc::Rc;

    #[test]
    fn finds_nested_elements() {
        let document = new_document();
        let html = new_handle(Node::Element(ElementNode::html("html")));
        let body = new_handle(Node::Element(ElementNode::html("body")));
        let mut div = ElementNode::html("div");
        div.set_attribute("data-style", "{}");
        let div = new_handle(Node::Element(div));

        append_child(&body, Rc::clone(&div));
        append_child(&html, body);
        append_child(&document.root, html);

        let found = find_element(&document.root, "DIV").unwrap();
        assert!(Rc::ptr_eq(&found, &div));
        assert!(find_element(&document.root, "head").is_none());
        assert_eq!(elements_with_attribute(&document.root, "data-style").len(), 1);
    }

    #[test]
    fn finds_and_detaches_from_parent() {
        let document = new_document();
        let body = new_handle(Node::Element(ElementNode::html("body")));
        let first = new_handle(Node::Text("a".to_string()));
        let second = new_handle(Node::Element(ElementNode::html("p")));
        append_child(&document.root, Rc::clone(&body));
        append_child(&body, Rc::clone(&first));
        append_child(&body, Rc::clone(&second));

        let (parent, index) = find_parent(&document.root, &second).unwrap();
        assert!(Rc::ptr_eq(&parent, &body));
        assert_eq!(index, 1);

        detach(&document.root, &first);
        assert_eq!(body.borrow().children().len(), 1);
        assert!(find_parent(&document.root, &first).is_none());
    }

    #[test]
    fn class_names_split_on_whitespace() {
        let mut elem = ElementNode::html("span");
        elem.set_attribute("class", " a  b ");
        assert_eq!(elem.class_names(), ["a", "b"]);
        assert_eq!(elem.remove_attribute("class").as_deref(), Some(" a  b "));
        assert!(elem.class_names().is_empty());
    }
}
