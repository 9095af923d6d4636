//! Text patcher: rewrites raw XML so it reflects an edited grouped tree.
//!
//! The old and new trees are compared node by node. Every difference becomes
//! an [`Edit`] against the original text, located with the position resolver,
//! and the whole batch is applied back to front. Text outside the edited
//! spans (comments, whitespace, attribute order, quoting) is kept verbatim.

use crate::edit::{apply_batch, Edit, EditError};
use crate::position::scanner::{
    attributes, find_attribute, find_closing, line_indent, start_tag_at, Token, TokenKind, Tokens,
};
use crate::position::{resolve, Path};
use crate::xml::{escape_attribute, escape_text, render_element, GroupedNode, XmlError};
use std::collections::BTreeMap;
use thiserror::Error;

const DEFAULT_INDENT_UNIT: &str = "  ";

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("cannot patch a document that does not parse: {0}")]
    Unparsed(#[from] XmlError),

    #[error("no source text found for {path}")]
    Unresolved { path: String },

    #[error("cannot place the new text of {path} between the element's existing text runs")]
    UnpatchableText { path: String },

    #[error("root element cannot be renamed from <{old}> to <{new}>")]
    RootRenamed { old: String, new: String },

    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}

/// Produce the text of `text` with the differences between `old` and `new`
/// applied.
///
/// `old` must be the grouped form of `text`'s root element. Identical trees
/// return the input unchanged.
pub fn patch(text: &str, old: &GroupedNode, new: &GroupedNode) -> Result<String, PatchError> {
    if old == new {
        return Ok(text.to_string());
    }
    if old.key() != new.key() {
        return Err(PatchError::RootRenamed {
            old: old.tag_name.clone(),
            new: new.tag_name.clone(),
        });
    }

    let mut planner = Planner::new(text);
    planner.element(&Path::root(), old, new)?;
    let edits = planner.into_edits();
    tracing::debug!(edits = edits.len(), "applying patch");
    Ok(apply_batch(text, edits)?)
}

#[derive(Debug, Default)]
struct Insertion {
    text: String,
    /// Appended once after every merged insertion at the same offset.
    suffix: String,
}

struct Planner<'a> {
    text: &'a str,
    unit: String,
    edits: Vec<Edit>,
    insertions: BTreeMap<usize, Insertion>,
}

impl<'a> Planner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            unit: detect_indent_unit(text),
            edits: Vec::new(),
            insertions: BTreeMap::new(),
        }
    }

    fn into_edits(mut self) -> Vec<Edit> {
        for (offset, insertion) in std::mem::take(&mut self.insertions) {
            self.edits
                .push(Edit::insert(offset, insertion.text + &insertion.suffix));
        }
        self.edits
    }

    fn insert(&mut self, offset: usize, text: String) {
        self.insertions.entry(offset).or_default().text.push_str(&text);
    }

    fn start_tag(&self, path: &Path) -> Result<Token<'a>, PatchError> {
        resolve(self.text, path)
            .and_then(|position| start_tag_at(self.text, position.from))
            .ok_or_else(|| PatchError::Unresolved {
                path: path.to_string(),
            })
    }

    fn element(&mut self, path: &Path, old: &GroupedNode, new: &GroupedNode) -> Result<(), PatchError> {
        if old == new {
            return Ok(());
        }
        let tag = self.start_tag(path)?;
        self.attributes(path, &tag, old, new)?;

        if tag.kind == TokenKind::SelfClosing {
            if new.has_children() || !new.text.is_empty() {
                self.expand_self_closing(&tag, new);
            }
            return Ok(());
        }

        if old.has_children() || new.has_children() {
            if old.text.trim() != new.text.trim() {
                self.text_run(path, &tag, &new.text)?;
            }
            self.children(path, &tag, old, new)
        } else if old.text != new.text {
            self.content(path, &tag, old, new)
        } else {
            Ok(())
        }
    }

    fn attributes(
        &mut self,
        path: &Path,
        tag: &Token<'a>,
        old: &GroupedNode,
        new: &GroupedNode,
    ) -> Result<(), PatchError> {
        let text = self.text;
        let unresolved = |name: &str| PatchError::Unresolved {
            path: path.attribute(name).to_string(),
        };

        for attribute in &new.attributes {
            match old.attribute(&attribute.key) {
                Some(value) if value == attribute.value => {}
                Some(_) => {
                    let span = find_attribute(text, tag, &attribute.name)
                        .ok_or_else(|| unresolved(&attribute.name))?;
                    self.edits.push(Edit::replace(
                        text,
                        span.value_start,
                        span.value_end,
                        escape_attribute(&attribute.value),
                    ));
                }
                None => {
                    let offset = attributes(text, tag)
                        .last()
                        .map_or(tag.attributes_start, |a| a.end);
                    self.insert(
                        offset,
                        format!(" {}=\"{}\"", attribute.name, escape_attribute(&attribute.value)),
                    );
                }
            }
        }

        for attribute in &old.attributes {
            if new.attribute(&attribute.key).is_some() {
                continue;
            }
            let span = find_attribute(text, tag, &attribute.name)
                .ok_or_else(|| unresolved(&attribute.name))?;
            let start = text[..span.name_start].trim_end().len();
            self.edits.push(Edit::replace(text, start, span.end, ""));
        }
        Ok(())
    }

    /// `<a/>` becomes `<a>...</a>` when it gains text or children.
    fn expand_self_closing(&mut self, tag: &Token<'a>, new: &GroupedNode) {
        let indent = line_indent(self.text, tag.start).to_string();
        let mut rendered = GroupedNode::new(tag.name);
        rendered.text = new.text.clone();
        rendered.children = new.children.clone();
        let element = render_element(&rendered, &indent, &self.unit);
        let body = element
            .strip_prefix(&format!("<{}", tag.name))
            .unwrap_or(&element);
        self.edits
            .push(Edit::replace(self.text, tag.attributes_end, tag.end, body));
    }

    fn content(
        &mut self,
        path: &Path,
        tag: &Token<'a>,
        old: &GroupedNode,
        new: &GroupedNode,
    ) -> Result<(), PatchError> {
        if old.comments > 0 {
            return self.text_run(path, tag, &new.text);
        }
        let close = find_closing(self.text, tag).ok_or_else(|| PatchError::Unresolved {
            path: path.content().to_string(),
        })?;
        self.edits.push(Edit::replace(
            self.text,
            tag.end,
            close.start,
            escape_text(&new.text),
        ));
        Ok(())
    }

    /// Rewrite one direct text run of an element that also holds comments or
    /// child elements, leaving everything between the runs untouched.
    ///
    /// The run chosen is the first one whose replacement makes the element's
    /// trimmed text equal `new_text` trimmed. Leading and trailing whitespace
    /// of the run is kept.
    fn text_run(&mut self, path: &Path, tag: &Token<'a>, new_text: &str) -> Result<(), PatchError> {
        let text = self.text;
        let unpatchable = || PatchError::UnpatchableText {
            path: path.content().to_string(),
        };
        let segments = content_segments(text, tag).ok_or_else(unpatchable)?;

        let mut pieces = Vec::with_capacity(segments.len());
        for segment in &segments {
            match segment {
                Segment::Text { start, end } => {
                    let raw = quick_xml::escape::unescape(&text[*start..*end])
                        .map_err(|_| unpatchable())?;
                    pieces.push(raw.into_owned());
                }
                Segment::Opaque(body) => pieces.push(body.clone()),
            }
        }

        let target = new_text.trim();
        for (index, segment) in segments.iter().enumerate() {
            let Segment::Text { start, end } = *segment else {
                continue;
            };
            let raw = &text[start..end];
            // Whitespace-only runs take new text right after their start.
            let (lead, trail) = if raw.trim().is_empty() {
                (0, raw.len())
            } else {
                (
                    raw.len() - raw.trim_start().len(),
                    raw.len() - raw.trim_end().len(),
                )
            };

            let before = pieces[..index].concat() + &raw[..lead];
            let after = raw[raw.len() - trail..].to_string() + &pieces[index + 1..].concat();
            let (prefix, suffix) = (before.trim_start(), after.trim_end());
            if prefix.len() + suffix.len() > target.len()
                || !target.starts_with(prefix)
                || !target.ends_with(suffix)
            {
                continue;
            }

            let middle = &target[prefix.len()..target.len() - suffix.len()];
            self.edits.push(Edit::replace(
                text,
                start + lead,
                end - trail,
                escape_text(middle),
            ));
            return Ok(());
        }
        Err(unpatchable())
    }

    fn children(
        &mut self,
        path: &Path,
        tag: &Token<'a>,
        old: &GroupedNode,
        new: &GroupedNode,
    ) -> Result<(), PatchError> {
        let mut keys: Vec<&str> = old.children.iter().map(|g| g.key.as_str()).collect();
        for group in &new.children {
            if !keys.contains(&group.key.as_str()) {
                keys.push(&group.key);
            }
        }

        for key in keys {
            let old_nodes = old.children(key);
            let new_nodes = new.children(key);
            let common = old_nodes.len().min(new_nodes.len());

            for index in 0..common {
                self.element(&path.nth(key, index), &old_nodes[index], &new_nodes[index])?;
            }
            for index in common..old_nodes.len() {
                self.remove(&path.nth(key, index))?;
            }
            if new_nodes.len() > common {
                self.add(path, tag, key, old_nodes.len(), &new_nodes[common..])?;
            }
        }
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<(), PatchError> {
        let text = self.text;
        let span = resolve(text, path).ok_or_else(|| PatchError::Unresolved {
            path: path.to_string(),
        })?;
        let line_start = text[..span.from].rfind('\n');
        let start = match line_start {
            Some(newline) if text[newline + 1..span.from].trim().is_empty() => newline,
            _ => span.from,
        };
        self.edits.push(Edit::replace(text, start, span.to, ""));
        Ok(())
    }

    /// Insert `nodes` after the last existing `key` sibling, or at the end of
    /// the parent's content when there is none.
    fn add(
        &mut self,
        path: &Path,
        parent: &Token<'a>,
        key: &str,
        existing: usize,
        nodes: &[GroupedNode],
    ) -> Result<(), PatchError> {
        let text = self.text;

        if existing > 0 {
            let sibling_path = path.nth(key, existing - 1);
            let sibling = resolve(text, &sibling_path).ok_or_else(|| PatchError::Unresolved {
                path: sibling_path.to_string(),
            })?;
            let indent = line_indent(text, sibling.from).to_string();
            let rendered = self.render_all(nodes, &indent);
            self.insert(sibling.to, rendered);
            return Ok(());
        }

        let close = find_closing(text, parent).ok_or_else(|| PatchError::Unresolved {
            path: path.content().to_string(),
        })?;
        let content = &text[parent.end..close.start];
        let offset = parent.end + content.trim_end().len();
        let parent_indent = line_indent(text, parent.start).to_string();
        let child_indent = format!("{parent_indent}{}", self.unit);
        let rendered = self.render_all(nodes, &child_indent);
        self.insert(offset, rendered);

        if !text[offset..close.start].contains('\n') {
            self.insertions.entry(offset).or_default().suffix = format!("\n{parent_indent}");
        }
        Ok(())
    }

    fn render_all(&self, nodes: &[GroupedNode], indent: &str) -> String {
        nodes
            .iter()
            .map(|node| format!("\n{indent}{}", render_element(node, indent, &self.unit)))
            .collect()
    }
}

/// A piece of an element's direct content.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Raw, still escaped, text between two tokens.
    Text { start: usize, end: usize },
    /// CDATA body; part of the element's text but never rewritten.
    Opaque(String),
}

/// The direct content of the element opened by `open`, split at child
/// elements and comments. `None` when the element is not closed.
fn content_segments(text: &str, open: &Token<'_>) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut cursor = open.end;
    let mut cdata = None;

    for token in Tokens::new(text, open.end) {
        match token.kind {
            TokenKind::Close if depth == 0 => {
                segments.push(Segment::Text {
                    start: cursor,
                    end: token.start,
                });
                return Some(segments);
            }
            TokenKind::Close => {
                depth -= 1;
                if depth == 0 {
                    cursor = token.end;
                }
            }
            _ if depth > 0 => {
                if token.kind == TokenKind::Open {
                    depth += 1;
                }
            }
            TokenKind::Open | TokenKind::SelfClosing | TokenKind::CommentStart => {
                segments.push(Segment::Text {
                    start: cursor,
                    end: token.start,
                });
                cursor = token.end;
                if token.kind == TokenKind::Open {
                    depth += 1;
                }
            }
            TokenKind::CDataStart => {
                segments.push(Segment::Text {
                    start: cursor,
                    end: token.start,
                });
                cdata = Some(token.end);
            }
            TokenKind::CDataEnd => {
                if let Some(body_start) = cdata.take() {
                    segments.push(Segment::Opaque(text[body_start..token.start].to_string()));
                }
                cursor = token.end;
            }
            TokenKind::CommentEnd => cursor = token.end,
        }
    }
    None
}

/// The smallest indentation used by any line that starts with markup.
fn detect_indent_unit(text: &str) -> String {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            (trimmed.starts_with('<') && !indent.is_empty()).then_some(indent)
        })
        .min_by_key(|indent| indent.len())
        .unwrap_or(DEFAULT_INDENT_UNIT)
        .to_string()
}
