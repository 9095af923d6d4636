//! Lossless mirror of a parsed XML document.
//!
//! Every element, attribute, text run and comment of the source appears here
//! in source order with its original casing. Elements remember their byte span
//! and their index among same-named siblings so they can be located again.

use serde::Serialize;

/// Half-open byte range into the text a node was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Declarations, comments and processing instructions around the root.
    pub prolog: Vec<XmlNode>,
    pub root: XmlElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub tag_name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
    pub span: Span,
    pub self_closing: bool,
    /// Position among siblings sharing the same lower-cased tag name.
    pub sibling_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl XmlElement {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            span: Span::default(),
            self_closing: true,
            sibling_index: 0,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Comment(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Concatenated direct text and CDATA content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Append a child element, assigning its sibling index.
    pub fn push_element(&mut self, mut element: XmlElement) {
        element.sibling_index = self
            .elements()
            .filter(|e| e.tag_name.eq_ignore_ascii_case(&element.tag_name))
            .count();
        self.self_closing = false;
        self.children.push(XmlNode::Element(element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_element_assigns_sibling_index() {
        let mut parent = XmlElement::new("fields");
        parent.push_element(XmlElement::new("field"));
        parent.push_element(XmlElement::new("other"));
        parent.push_element(XmlElement::new("FIELD"));

        let indexes: Vec<_> = parent.elements().map(|e| e.sibling_index).collect();
        assert_eq!(indexes, vec![0, 0, 1]);
        assert!(!parent.self_closing);
    }

    #[test]
    fn test_text_skips_comments() {
        let mut element = XmlElement::new("field");
        element.children.push(XmlNode::Text("a".into()));
        element.children.push(XmlNode::Comment(" note ".into()));
        element.children.push(XmlNode::CData("b".into()));
        assert_eq!(element.text(), "ab");
        assert_eq!(element.comments().collect::<Vec<_>>(), vec![" note "]);
    }
}
