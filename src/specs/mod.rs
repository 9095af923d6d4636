//! Built-in specs for the resource documents this crate understands.
//!
//! A [`SpecRegistry`] is built once from a [`TableRegistry`] and passed by
//! reference; it holds no mutable state.

pub mod formatters;
pub mod tables;
pub mod weblinks;

pub use formatters::{Aggregator, Format, Formatters};
pub use tables::{TableRegistry, DEFAULT_CLASS_PREFIX};
pub use weblinks::{Parameter, WebLink, WebLinks};

use crate::document::{PositionedDiagnostic, SourceDocument};
use crate::patch::PatchError;
use crate::position::PathPart;
use crate::syncer::{map, optional_child, Object, SyncContext, SyncResult, Syncer, SyncerExt};
use crate::xml::GroupedNode;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The text of a child element, or `None` when the child is absent.
///
/// Diagnostics about a present value point at the child's text, not the
/// whole element.
pub fn child_text(tag_name: &str) -> impl Syncer<Input = GroupedNode, Output = Option<String>> {
    let tag_name = tag_name.to_string();
    optional_child(tag_name.clone()).then(map(
        |node: &Option<GroupedNode>, ctx: &mut SyncContext| {
            match node {
                Some(node) => {
                    ctx.enter(PathPart::Content);
                    Some(node.text.trim().to_string())
                }
                None => None,
            }
        },
        move |text: &Option<String>, previous: &Option<GroupedNode>| match (previous, text) {
            (_, None) => None,
            (Some(node), Some(text)) if node.text.trim() == text.as_str() => Some(node.clone()),
            (Some(node), Some(text)) => {
                let mut node = node.clone();
                node.text = text.clone();
                Some(node)
            }
            (None, Some(text)) => {
                let mut node = GroupedNode::new(tag_name.clone());
                node.text = text.clone();
                Some(node)
            }
        },
    ))
}

/// A wrapper element whose absence reads as an empty element.
///
/// Writing back an empty element where none existed leaves the document alone.
pub fn optional_container(
    tag_name: &str,
) -> impl Syncer<Input = GroupedNode, Output = GroupedNode> {
    let tag_name = tag_name.to_string();
    optional_child(tag_name.clone()).then(map(
        move |node: &Option<GroupedNode>, _: &mut SyncContext| {
            node.clone()
                .unwrap_or_else(|| GroupedNode::new(tag_name.clone()))
        },
        |node: &GroupedNode, previous: &Option<GroupedNode>| {
            if previous.is_none() && node.is_blank() {
                None
            } else {
                Some(node.clone())
            }
        },
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Formatters,
    WebLinks,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Formatters, ResourceKind::WebLinks];

    /// Guess the kind from the root element's tag name.
    pub fn detect(root_tag: &str) -> Option<Self> {
        match root_tag.to_lowercase().as_str() {
            "formatters" => Some(Self::Formatters),
            "vector" => Some(Self::WebLinks),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Formatters => "formatters",
            Self::WebLinks => "web-links",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "formatters" | "dataobjformatters" => Ok(Self::Formatters),
            "web-links" | "weblinks" => Ok(Self::WebLinks),
            other => Err(format!(
                "unknown resource kind '{other}' (expected 'formatters' or 'web-links')"
            )),
        }
    }
}

pub struct SpecRegistry {
    tables: TableRegistry,
    formatters: Object<Formatters>,
    web_links: Object<WebLinks>,
}

impl SpecRegistry {
    pub fn new(tables: TableRegistry) -> Self {
        Self {
            formatters: formatters::formatters(&tables),
            web_links: weblinks::web_links(&tables),
            tables,
        }
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    pub fn formatters(&self) -> &Object<Formatters> {
        &self.formatters
    }

    pub fn web_links(&self) -> &Object<WebLinks> {
        &self.web_links
    }

    /// Read a document as JSON through the syncer for `kind`.
    pub fn read_json(
        &self,
        kind: ResourceKind,
        document: &SourceDocument,
    ) -> serde_json::Result<SyncResult<serde_json::Value>> {
        fn to_json<T: Serialize>(result: SyncResult<T>) -> serde_json::Result<SyncResult<serde_json::Value>> {
            Ok(SyncResult {
                value: serde_json::to_value(&result.value)?,
                diagnostics: result.diagnostics,
            })
        }
        match kind {
            ResourceKind::Formatters => to_json(document.read(&self.formatters)),
            ResourceKind::WebLinks => to_json(document.read(&self.web_links)),
        }
    }

    /// Every diagnostic for a document, parse errors included, with spans.
    pub fn lint(&self, kind: ResourceKind, document: &SourceDocument) -> Vec<PositionedDiagnostic> {
        let diagnostics = match kind {
            ResourceKind::Formatters => document.read(&self.formatters).diagnostics,
            ResourceKind::WebLinks => document.read(&self.web_links).diagnostics,
        };
        let mut positioned = document.parse_diagnostics();
        positioned.extend(document.positioned(&diagnostics));
        positioned
    }

    /// Read the document and write the value straight back.
    ///
    /// Returns the regenerated text, which equals the input for any
    /// document the syncer can represent.
    pub fn roundtrip(&self, kind: ResourceKind, document: &SourceDocument) -> Result<String, PatchError> {
        let written = match kind {
            ResourceKind::Formatters => {
                let value = document.read(&self.formatters).value;
                document.write(&self.formatters, &value)?
            }
            ResourceKind::WebLinks => {
                let value = document.read(&self.web_links).value;
                document.write(&self.web_links, &value)?
            }
        };
        Ok(written.text().to_string())
    }
}

impl Default for SpecRegistry {
    fn default() -> Self {
        Self::new(TableRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{normalize, parse_document};

    fn root(xml: &str) -> GroupedNode {
        normalize(&parse_document(xml).unwrap().root)
    }

    #[test]
    fn test_kind_parse_and_detect() {
        assert_eq!("web-links".parse::<ResourceKind>(), Ok(ResourceKind::WebLinks));
        assert_eq!("Formatters".parse::<ResourceKind>(), Ok(ResourceKind::Formatters));
        assert!("other".parse::<ResourceKind>().is_err());
        assert_eq!(ResourceKind::detect("vector"), Some(ResourceKind::WebLinks));
        assert_eq!(ResourceKind::detect("formatters"), Some(ResourceKind::Formatters));
    }

    #[test]
    fn test_child_text_absent_stays_absent() {
        let input = root("<a><b> x </b></a>");
        let syncer = child_text("c");
        assert_eq!(syncer.read(&input).value, None);
        assert_eq!(syncer.deserialize(&None, &input), input);

        let syncer = child_text("b");
        assert_eq!(syncer.read(&input).value.as_deref(), Some("x"));
        assert_eq!(syncer.deserialize(&Some("x".into()), &input), input);
    }

    #[test]
    fn test_optional_container_blank_not_created() {
        let input = root("<a/>");
        let syncer = optional_container("list");
        let value = syncer.read(&input).value;
        assert_eq!(value.tag_name, "list");
        assert_eq!(syncer.deserialize(&value, &input), input);
    }

    #[test]
    fn test_roundtrip_is_identity() {
        let text = "<formatters>\n  <!-- keep -->\n  <format name=\"A\" class=\"Agent\">\n    <switch/>\n  </format>\n</formatters>\n";
        let document = SourceDocument::parse(text);
        let registry = SpecRegistry::default();
        assert_eq!(registry.roundtrip(ResourceKind::Formatters, &document).unwrap(), text);
    }

    #[test]
    fn test_lint_positions_missing_attribute() {
        let text = "<formatters>\n  <format class=\"Agent\"><switch/></format>\n</formatters>";
        let document = SourceDocument::parse(text);
        let diagnostics = SpecRegistry::default().lint(ResourceKind::Formatters, &document);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.path, "/format[0]/@name");
        // Missing attribute falls back to the start tag of its element.
        assert_eq!(&text[diagnostic.from..diagnostic.to], "<format class=\"Agent\">");
    }

    #[test]
    fn test_lint_positions_child_text_value() {
        let text = "<vector>\n  <weblinkdef>\n    <name>x</name>\n    <tableName> Taxn </tableName>\n    <args>\n      <weblinkdefarg><name>id</name><prompt>maybe</prompt></weblinkdefarg>\n    </args>\n  </weblinkdef>\n</vector>";
        let document = SourceDocument::parse(text);
        let diagnostics = SpecRegistry::default().lint(ResourceKind::WebLinks, &document);
        assert_eq!(diagnostics.len(), 2);

        assert_eq!(diagnostics[0].path, "/weblinkdef[0]/tableName/#content");
        assert_eq!(&text[diagnostics[0].from..diagnostics[0].to], " Taxn ");
        assert_eq!(
            diagnostics[1].path,
            "/weblinkdef[0]/args/weblinkdefarg[0]/prompt/#content"
        );
        assert_eq!(&text[diagnostics[1].from..diagnostics[1].to], "maybe");
    }
}
