//! One XML text together with its grouped root.
//!
//! [`SourceDocument`] is the editing surface: read a typed value through a
//! syncer, write an edited value back as patched text, and turn diagnostics
//! into byte spans of the text they came from.

use crate::format::{format_attributes, FormatOptions};
use crate::patch::{patch, PatchError};
use crate::position::scanner::start_tag_at;
use crate::position::{resolve, resolve_best_effort, Path, Position};
use crate::syncer::{Diagnostic, Severity, SyncResult, Syncer, SyncerExt};
use crate::xml::{normalize, parse_document, GroupedNode, XmlError};
use serde::Serialize;

/// A diagnostic mapped onto the text it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionedDiagnostic {
    pub from: usize,
    pub to: usize,
    /// 1-based line and column of `from`.
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub message: String,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct SourceDocument {
    text: String,
    root: GroupedNode,
    parse_error: Option<XmlError>,
}

impl SourceDocument {
    /// Parse `text`. Malformed XML yields an empty root and keeps the error
    /// for [`SourceDocument::parse_diagnostics`].
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        match parse_document(&text) {
            Ok(document) => Self {
                root: normalize(&document.root),
                text,
                parse_error: None,
            },
            Err(error) => {
                tracing::debug!(%error, "document did not parse; reading an empty root");
                Self {
                    text,
                    root: GroupedNode::default(),
                    parse_error: Some(error),
                }
            }
        }
    }

    /// Parse `text`, failing on malformed XML.
    pub fn try_parse(text: impl Into<String>) -> Result<Self, XmlError> {
        let document = Self::parse(text);
        match document.parse_error {
            Some(error) => Err(error),
            None => Ok(document),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &GroupedNode {
        &self.root
    }

    pub fn parse_error(&self) -> Option<&XmlError> {
        self.parse_error.as_ref()
    }

    pub fn read<S>(&self, syncer: &S) -> SyncResult<S::Output>
    where
        S: Syncer<Input = GroupedNode>,
    {
        syncer.read(&self.root)
    }

    /// Write `value` back through `syncer`, producing the patched document.
    pub fn write<S>(&self, syncer: &S, value: &S::Output) -> Result<SourceDocument, PatchError>
    where
        S: Syncer<Input = GroupedNode>,
    {
        let root = syncer.deserialize(value, &self.root);
        self.update_root(&root)
    }

    /// Patch the text so its root becomes `root`.
    pub fn update_root(&self, root: &GroupedNode) -> Result<SourceDocument, PatchError> {
        if let Some(error) = &self.parse_error {
            return Err(PatchError::Unparsed(error.clone()));
        }
        let text = patch(&self.text, &self.root, root)?;
        Ok(Self::parse(text))
    }

    pub fn position_of(&self, path: &Path) -> Option<Position> {
        resolve(&self.text, path)
    }

    /// Spans for `diagnostics`, falling back to the nearest enclosing span.
    ///
    /// A path that resolves to nothing but the document start is reported on
    /// the root start tag so editors have something to highlight.
    pub fn positioned(&self, diagnostics: &[Diagnostic]) -> Vec<PositionedDiagnostic> {
        diagnostics
            .iter()
            .map(|diagnostic| {
                let mut position = resolve_best_effort(&self.text, &diagnostic.path);
                if position.is_empty() && position.from == 0 {
                    position = self.root_span();
                }
                self.located(position, diagnostic.severity, &diagnostic.message, diagnostic.path.to_string())
            })
            .collect()
    }

    /// The parse error, if any, as a diagnostic at the parser's offset.
    pub fn parse_diagnostics(&self) -> Vec<PositionedDiagnostic> {
        let Some(error) = &self.parse_error else {
            return Vec::new();
        };
        let position = match error.position() {
            Some(offset) => {
                let offset = floor_char_boundary(&self.text, offset);
                Position::new(offset, offset)
            }
            None => Position::new(0, self.text.len()),
        };
        vec![self.located(position, Severity::Error, &error.to_string(), Path::root().to_string())]
    }

    /// A copy with over-long start tags wrapped.
    pub fn format(&self, options: &FormatOptions) -> SourceDocument {
        Self::parse(format_attributes(&self.text, options))
    }

    fn root_span(&self) -> Position {
        match start_tag_at(&self.text, 0) {
            Some(tag) => Position::new(tag.start, tag.end),
            None => Position::new(0, self.text.len()),
        }
    }

    fn located(&self, position: Position, severity: Severity, message: &str, path: String) -> PositionedDiagnostic {
        let (line, column) = line_column(&self.text, position.from);
        PositionedDiagnostic {
            from: position.from,
            to: position.to,
            line,
            column,
            severity,
            message: message.to_string(),
            path,
        }
    }
}

/// 1-based line and column (in characters) of a byte offset.
pub fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = floor_char_boundary(text, offset);
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syncer::{attribute, child, required_attribute};

    #[test]
    fn test_read_and_write_attribute() {
        let document = SourceDocument::parse("<a>\n  <!-- note -->\n  <b k=\"1\" j='2'/>\n</a>\n");
        let syncer = child("b").then(attribute("k"));
        assert_eq!(document.read(&syncer).value.as_deref(), Some("1"));

        let written = document.write(&syncer, &Some("9".into())).unwrap();
        assert_eq!(written.text(), "<a>\n  <!-- note -->\n  <b k=\"9\" j='2'/>\n</a>\n");
    }

    #[test]
    fn test_unchanged_write_is_identity() {
        let text = "<?xml version=\"1.0\"?>\n<a  x='y' >\n\t<b/>\n</a>";
        let document = SourceDocument::parse(text);
        let syncer = attribute("x");
        let value = document.read(&syncer).value;
        assert_eq!(document.write(&syncer, &value).unwrap().text(), text);
    }

    #[test]
    fn test_malformed_reads_empty_root() {
        let document = SourceDocument::parse("<a><b></a>");
        assert!(document.parse_error().is_some());
        assert_eq!(document.root(), &GroupedNode::default());

        let diagnostics = document.parse_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert!(matches!(
            document.write(&attribute("x"), &Some("1".into())),
            Err(PatchError::Unparsed(_))
        ));
    }

    #[test]
    fn test_positioned_uses_attribute_value() {
        let text = "<a>\n  <b k=\"1\"/>\n</a>";
        let document = SourceDocument::parse(text);
        let diagnostics = document.read(&child("b").then(required_attribute("k"))).diagnostics;
        assert!(diagnostics.is_empty());

        let diagnostics = document.read(&child("b").then(required_attribute("missing"))).diagnostics;
        let positioned = document.positioned(&diagnostics);
        assert_eq!(&text[positioned[0].from..positioned[0].to], "<b k=\"1\"/>");
        assert_eq!((positioned[0].line, positioned[0].column), (2, 3));
        assert_eq!(positioned[0].path, "/b/@missing");
    }

    #[test]
    fn test_unresolvable_path_falls_back_to_root_tag() {
        let text = "<!-- header -->\n<a x=\"1\"><b/></a>";
        let document = SourceDocument::parse(text);
        let diagnostics = document.read(&child("c")).diagnostics;
        let positioned = document.positioned(&diagnostics);
        assert_eq!(&text[positioned[0].from..positioned[0].to], "<a x=\"1\">");
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("ab\ncé\nx", 0), (1, 1));
        assert_eq!(line_column("ab\ncé\nx", 4), (2, 2));
        assert_eq!(line_column("ab\ncé\nx", 7), (3, 1));
    }
}
