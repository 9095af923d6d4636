//! Syncers that address parts of a [`GroupedNode`].

use crate::position::PathPart;
use crate::syncer::context::SyncContext;
use crate::syncer::combinators::{Required, Syncer, SyncerExt};
use crate::xml::GroupedNode;

/// Reads and writes one attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
}

pub fn attribute(name: impl Into<String>) -> Attribute {
    Attribute { name: name.into() }
}

/// An attribute that must be present; reads `""` and reports when absent.
pub fn required_attribute(name: impl Into<String>) -> Required<Attribute> {
    let name = name.into();
    let message = format!("Required attribute \"{name}\" is missing");
    attribute(name).required(message)
}

impl Syncer for Attribute {
    type Input = GroupedNode;
    type Output = Option<String>;

    fn serialize(&self, input: &GroupedNode, ctx: &mut SyncContext) -> Option<String> {
        ctx.enter(PathPart::Attribute(self.name.clone()));
        input.attribute(&self.name).map(str::to_string)
    }

    fn deserialize(&self, output: &Option<String>, previous: &GroupedNode) -> GroupedNode {
        if previous.attribute(&self.name) == output.as_deref() {
            return previous.clone();
        }
        let mut node = previous.clone();
        node.set_attribute(&self.name, output.clone());
        node
    }
}

/// Selects the first child element with a tag name.
///
/// A missing child reads as an empty element and is reported. More than one
/// match is a syncer-definition problem: it is logged and the first one wins.
#[derive(Debug, Clone)]
pub struct Child {
    tag_name: String,
}

pub fn child(tag_name: impl Into<String>) -> Child {
    Child {
        tag_name: tag_name.into(),
    }
}

impl Syncer for Child {
    type Input = GroupedNode;
    type Output = GroupedNode;

    fn serialize(&self, input: &GroupedNode, ctx: &mut SyncContext) -> GroupedNode {
        let nodes = input.children(&self.tag_name);
        warn_if_ambiguous(&self.tag_name, nodes.len(), ctx);
        ctx.enter(PathPart::Child(self.tag_name.clone()));
        match nodes.first() {
            Some(node) => node.clone(),
            None => {
                ctx.error(format!("Required element <{}> is missing", self.tag_name));
                GroupedNode::new(self.tag_name.clone())
            }
        }
    }

    fn deserialize(&self, output: &GroupedNode, previous: &GroupedNode) -> GroupedNode {
        let mut nodes = previous.children(&self.tag_name).to_vec();
        match nodes.first_mut() {
            Some(first) if first == output => return previous.clone(),
            Some(first) => *first = output.clone(),
            None if output.is_blank() => return previous.clone(),
            None => nodes.push(output.clone()),
        }
        let mut node = previous.clone();
        node.set_children(&self.tag_name, nodes);
        node
    }
}

/// Selects the first child element with a tag name, if any.
#[derive(Debug, Clone)]
pub struct OptionalChild {
    tag_name: String,
}

pub fn optional_child(tag_name: impl Into<String>) -> OptionalChild {
    OptionalChild {
        tag_name: tag_name.into(),
    }
}

impl Syncer for OptionalChild {
    type Input = GroupedNode;
    type Output = Option<GroupedNode>;

    fn serialize(&self, input: &GroupedNode, ctx: &mut SyncContext) -> Option<GroupedNode> {
        let nodes = input.children(&self.tag_name);
        warn_if_ambiguous(&self.tag_name, nodes.len(), ctx);
        ctx.enter(PathPart::Child(self.tag_name.clone()));
        nodes.first().cloned()
    }

    fn deserialize(&self, output: &Option<GroupedNode>, previous: &GroupedNode) -> GroupedNode {
        let mut nodes = previous.children(&self.tag_name).to_vec();
        match (nodes.is_empty(), output) {
            (true, None) => return previous.clone(),
            (false, None) => {
                nodes.remove(0);
            }
            (false, Some(output)) if nodes[0] == *output => return previous.clone(),
            (false, Some(output)) => nodes[0] = output.clone(),
            (true, Some(output)) => nodes.push(output.clone()),
        }
        let mut node = previous.clone();
        node.set_children(&self.tag_name, nodes);
        node
    }
}

/// Selects every child element with a tag name, in document order.
#[derive(Debug, Clone)]
pub struct Children {
    tag_name: String,
}

pub fn children(tag_name: impl Into<String>) -> Children {
    Children {
        tag_name: tag_name.into(),
    }
}

impl Syncer for Children {
    type Input = GroupedNode;
    type Output = Vec<GroupedNode>;

    fn serialize(&self, input: &GroupedNode, ctx: &mut SyncContext) -> Vec<GroupedNode> {
        ctx.enter(PathPart::Children(self.tag_name.clone()));
        input.children(&self.tag_name).to_vec()
    }

    fn deserialize(&self, output: &Vec<GroupedNode>, previous: &GroupedNode) -> GroupedNode {
        if previous.children(&self.tag_name) == output.as_slice() {
            return previous.clone();
        }
        let mut node = previous.clone();
        node.set_children(&self.tag_name, output.clone());
        node
    }
}

/// Element text content, trimmed on read.
#[derive(Debug, Clone, Default)]
pub struct Text;

pub fn text() -> Text {
    Text
}

impl Syncer for Text {
    type Input = GroupedNode;
    type Output = String;

    fn serialize(&self, input: &GroupedNode, ctx: &mut SyncContext) -> String {
        ctx.enter(PathPart::Content);
        input.text.trim().to_string()
    }

    fn deserialize(&self, output: &String, previous: &GroupedNode) -> GroupedNode {
        if previous.text.trim() == output.as_str() {
            return previous.clone();
        }
        let mut node = previous.clone();
        node.text = output.clone();
        node
    }
}

fn warn_if_ambiguous(tag_name: &str, count: usize, ctx: &SyncContext) {
    if count > 1 {
        tracing::warn!(
            path = %ctx.path(),
            tag = tag_name,
            count,
            "expected at most one <{tag_name}> element; using the first"
        );
    }
}
