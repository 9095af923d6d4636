//! Maps a [`Path`] to a byte span of the exact text it was asked about.
//!
//! The path is folded left to right over a cursor `{from, to, tag_name}`
//! seeded at `{0, 0}`. Every step re-scans the raw text with the shared
//! tokenizer; nothing here trusts ranges reported by a parser.

use crate::position::path::{Path, PathPart};
use crate::position::scanner::{element_end, find_attribute, find_child, find_closing, start_tag_at, TokenKind};
use serde::Serialize;

/// Half-open byte span `[from, to)` into one specific text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub from: usize,
    pub to: usize,
}

impl Position {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.from..self.to).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
struct Cursor {
    position: Position,
    /// Set by `Children`, consumed by `Index`.
    tag_name: Option<String>,
}

/// A path step that could not be resolved, with the last span that could.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub resolved: Position,
    pub part: PathPart,
    pub step: usize,
}

/// Resolve `path` against `text`.
pub fn resolve(text: &str, path: &Path) -> Option<Position> {
    resolve_parts(text, path.parts()).ok()
}

/// Resolve `path`, falling back to the nearest enclosing span that resolved.
pub fn resolve_best_effort(text: &str, path: &Path) -> Position {
    match resolve_parts(text, path.parts()) {
        Ok(position) => position,
        Err(unresolved) => {
            tracing::debug!(
                path = %path,
                step = unresolved.step,
                part = ?unresolved.part,
                from = unresolved.resolved.from,
                to = unresolved.resolved.to,
                "path did not resolve; using enclosing span"
            );
            unresolved.resolved
        }
    }
}

pub fn resolve_parts(text: &str, parts: &[PathPart]) -> Result<Position, Unresolved> {
    let mut cursor = Cursor {
        position: Position::default(),
        tag_name: None,
    };

    for (step, part) in parts.iter().enumerate() {
        match step_cursor(text, &cursor, part) {
            Some(next) => cursor = next,
            None => {
                return Err(Unresolved {
                    resolved: cursor.position,
                    part: part.clone(),
                    step,
                })
            }
        }
    }

    Ok(cursor.position)
}

fn step_cursor(text: &str, cursor: &Cursor, part: &PathPart) -> Option<Cursor> {
    let from = cursor.position.from;
    let position = match part {
        PathPart::Root => return Some(cursor.clone()),
        PathPart::Children(tag_name) => {
            return Some(Cursor {
                position: cursor.position,
                tag_name: Some(tag_name.clone()),
            })
        }
        PathPart::Attribute(name) => {
            let tag = start_tag_at(text, from)?;
            match find_attribute(text, &tag, name) {
                Some(attribute) => Position::new(attribute.value_start, attribute.value_end),
                None => Position::new(tag.start, tag.end),
            }
        }
        PathPart::Content => {
            let tag = start_tag_at(text, from)?;
            match tag.kind {
                TokenKind::SelfClosing => Position::new(tag.end, tag.end),
                _ => {
                    let close = find_closing(text, &tag)?;
                    Position::new(tag.end, close.start)
                }
            }
        }
        PathPart::Child(tag_name) => child_span(text, from, tag_name, 0)?,
        PathPart::Index(index) => {
            let tag_name = cursor.tag_name.as_deref()?;
            child_span(text, from, tag_name, *index)?
        }
    };

    Some(Cursor {
        position,
        tag_name: None,
    })
}

fn child_span(text: &str, from: usize, tag_name: &str, index: usize) -> Option<Position> {
    let parent = start_tag_at(text, from)?;
    let child = find_child(text, &parent, tag_name, index)?;
    let end = element_end(text, &child)?;
    Some(Position::new(child.start, end))
}
