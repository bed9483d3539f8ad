use std::cell::RefCell;
use std::rc::Rc;
use vistara_style_lib::dom::dom_tree;
use vistara_style_lib::parser::html::create_dom_tree;
use vistara_style_lib::render::page;
use vistara_style_lib::EngineConfig;

#[cfg(test)]
pub mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect_structure(node: &Rc<RefCell<dom_tree::Node>>) -> String {
        let mut output = String::new();
        traverse_node(node, 0, &mut output);
        output
    }

    fn traverse_node(node: &Rc<RefCell<dom_tree::Node>>, depth: usize, output: &mut String) {
        let node_ref = node.borrow();
        match &*node_ref {
            dom_tree::Node::DocumentRoot(root_node) => {
                for child in &root_node.children {
                    traverse_node(child, depth, output);
                }
            }
            dom_tree::Node::Element(elem_node) => {
                let class = elem_node
                    .attribute("class")
                    .map(|c| format!(" .{}", c.replace(' ', ".")))
                    .unwrap_or_default();
                *output += &format!("{}<{}>{}\n", "  ".repeat(depth), elem_node.tag, class);
                for child in &elem_node.children {
                    traverse_node(child, depth + 1, output);
                }
            }
            dom_tree::Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    *output += &format!("{}{}\n", "  ".repeat(depth), trimmed);
                }
            }
        }
    }

    #[test]
    fn test_rendered_structure() {
        let html = r#"
            <!DOCTYPE html>
            <html>
                <head>
                    <title>Test</title>
                </head>
                <body>
                    <h1 data-style='{"fontWeight": 700}'>Hello</h1>
                    <button class="btn" data-style='{":hover": {"opacity": 0.8}}'>Go</button>
                </body>
            </html>
        "#;
        let rendered = page::render(html, EngineConfig::default().with_prefix("vs")).unwrap();
        let document = create_dom_tree(&rendered.html);

        let button = dom_tree::find_element(&document.root, "button").unwrap();
        let class = button
            .borrow()
            .as_element()
            .map(|elem| elem.class_names()[0].to_string())
            .unwrap();

        let expected = format!(
            "<html>\n  <head>\n    <title>\n      Test\n    <style>\n      .{class}:hover{{opacity:0.8}}\n  <body>\n    <h1>\n      Hello\n    <button> .{class}.btn\n      Go\n"
        );
        assert_eq!(collect_structure(&document.root), expected);
        assert!(class.starts_with("vs"));
        assert!(rendered.html.contains(r#"<h1 style="font-weight: 700">Hello</h1>"#));
    }

    #[test]
    fn identical_descriptors_share_one_rule() {
        let mut html = String::from("<html><head></head><body>");
        for _ in 0..20 {
            html.push_str(r#"<a data-style='{":focus": {"outline": "2px solid"}}'>x</a>"#);
        }
        html.push_str("</body></html>");

        let rendered = page::render(&html, EngineConfig::default()).unwrap();
        assert_eq!(rendered.styled_elements, 20);
        assert_eq!(rendered.injected_classes, 1);
        assert_eq!(rendered.html.matches(":focus{outline:2px solid}").count(), 1);
    }

    #[test]
    fn page_without_styles_is_unchanged_apart_from_the_sheet() {
        let rendered = page::render(
            "<html><head></head><body><p>plain</p></body></html>",
            EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(
            rendered.html,
            r#"<html><head><style data-vistara-style=""></style></head><body><p>plain</p></body></html>"#
        );
        assert_eq!(rendered.styled_elements, 0);
    }
}
