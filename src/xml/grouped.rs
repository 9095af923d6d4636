//! The grouped form of an element that syncers read and write.
//!
//! Same-named child elements collapse into one ordered list keyed by the
//! lower-cased tag name; attributes are keyed the same way. Original casing is
//! retained on every attribute and node so that re-emitted text matches the
//! source.

use crate::xml::node::XmlElement;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedAttribute {
    /// Lower-cased lookup key.
    pub key: String,
    /// Name as written in the source.
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildGroup {
    /// Lower-cased tag name shared by every node of the group.
    pub key: String,
    pub nodes: Vec<GroupedNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GroupedNode {
    pub tag_name: String,
    pub attributes: Vec<GroupedAttribute>,
    pub children: Vec<ChildGroup>,
    /// Direct text and CDATA content, concatenated verbatim.
    pub text: String,
    /// Number of comments directly inside this element.
    pub comments: usize,
}

/// Derive the grouped form of a lossless element.
pub fn normalize(element: &XmlElement) -> GroupedNode {
    let mut node = GroupedNode::new(&element.tag_name);
    for attr in &element.attributes {
        node.attributes.push(GroupedAttribute {
            key: attr.name.to_lowercase(),
            name: attr.name.clone(),
            value: attr.value.clone(),
        });
    }
    for child in element.elements() {
        let key = child.tag_name.to_lowercase();
        let grouped = normalize(child);
        match node.children.iter_mut().find(|g| g.key == key) {
            Some(group) => group.nodes.push(grouped),
            None => node.children.push(ChildGroup {
                key,
                nodes: vec![grouped],
            }),
        }
    }
    node.text = element.text();
    node.comments = element.comments().count();
    node
}

impl GroupedNode {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> String {
        self.tag_name.to_lowercase()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        let key = name.to_lowercase();
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// Set or remove an attribute, keeping the position of an existing one.
    pub fn set_attribute(&mut self, name: &str, value: Option<String>) {
        let key = name.to_lowercase();
        let existing = self.attributes.iter().position(|a| a.key == key);
        match (existing, value) {
            (Some(index), Some(value)) => self.attributes[index].value = value,
            (Some(index), None) => {
                self.attributes.remove(index);
            }
            (None, Some(value)) => self.attributes.push(GroupedAttribute {
                key,
                name: name.to_string(),
                value,
            }),
            (None, None) => {}
        }
    }

    pub fn children(&self, tag_name: &str) -> &[GroupedNode] {
        let key = tag_name.to_lowercase();
        self.children
            .iter()
            .find(|g| g.key == key)
            .map(|g| g.nodes.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the list of children named `tag_name`.
    ///
    /// Nodes with an empty tag name take the group's name. An empty list
    /// removes the group.
    pub fn set_children(&mut self, tag_name: &str, mut nodes: Vec<GroupedNode>) {
        let key = tag_name.to_lowercase();
        for node in &mut nodes {
            if node.tag_name.is_empty() {
                node.tag_name = tag_name.to_string();
            }
        }
        let existing = self.children.iter().position(|g| g.key == key);
        match existing {
            Some(index) if nodes.is_empty() => {
                self.children.remove(index);
            }
            Some(index) => self.children[index].nodes = nodes,
            None if nodes.is_empty() => {}
            None => self.children.push(ChildGroup { key, nodes }),
        }
    }

    pub fn has_children(&self) -> bool {
        self.children.iter().any(|g| !g.nodes.is_empty())
    }

    /// No attributes, children or text.
    pub fn is_blank(&self) -> bool {
        self.attributes.is_empty() && !self.has_children() && self.text.trim().is_empty()
    }
}
