//! Bare element builder for content that has no source text yet.

use crate::xml::grouped::GroupedNode;
use quick_xml::escape::{escape, partial_escape};
use std::borrow::Cow;

pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape(value)
}

pub fn escape_text(value: &str) -> Cow<'_, str> {
    partial_escape(value)
}

/// Render ` name="value"` pairs for every attribute of `node`.
pub fn render_attributes(node: &GroupedNode) -> String {
    node.attributes
        .iter()
        .map(|a| format!(" {}=\"{}\"", a.name, escape_attribute(&a.value)))
        .collect()
}

/// Render `node` as a new element.
///
/// `indent` is the indentation of the line the element starts on; nested
/// children go one `unit` deeper, one per line.
pub fn render_element(node: &GroupedNode, indent: &str, unit: &str) -> String {
    let mut out = format!("<{}{}", node.tag_name, render_attributes(node));

    if !node.has_children() && node.text.is_empty() {
        out.push_str("/>");
        return out;
    }

    out.push('>');
    out.push_str(&escape_text(&node.text));

    if node.has_children() {
        let child_indent = format!("{indent}{unit}");
        for group in &node.children {
            for child in &group.nodes {
                out.push('\n');
                out.push_str(&child_indent);
                out.push_str(&render_element(child, &child_indent, unit));
            }
        }
        out.push('\n');
        out.push_str(indent);
    }

    out.push_str("</");
    out.push_str(&node.tag_name);
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_self_closing() {
        let mut node = GroupedNode::new("field");
        node.set_attribute("sep", Some("<&>".into()));
        assert_eq!(render_element(&node, "", "  "), "<field sep=\"&lt;&amp;&gt;\"/>");
    }

    #[test]
    fn test_render_nested() {
        let mut field = GroupedNode::new("field");
        field.text = "a & b".into();
        let mut fields = GroupedNode::new("fields");
        fields.set_children("field", vec![field.clone(), field]);

        assert_eq!(
            render_element(&fields, "  ", "  "),
            "<fields>\n    <field>a &amp; b</field>\n    <field>a &amp; b</field>\n  </fields>"
        );
    }
}
