//! Attribute line formatter: wraps over-long start tags one attribute per line.

use crate::edit::{apply_batch, Edit};
use crate::position::scanner::{attributes, line_indent, Token, Tokens};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_LINE_LENGTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatOptions {
    pub max_line_length: usize,
    pub indent_unit: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            indent_unit: "  ".to_string(),
        }
    }
}

/// Rewrap every single-line start tag whose line runs past
/// `max_line_length`.
///
/// A tag's width is the indentation of its line plus the tag itself. Tags at
/// or under the limit, tags already spread over several lines and tags
/// without attributes are left alone, so formatting twice changes nothing.
pub fn format_attributes(text: &str, options: &FormatOptions) -> String {
    let edits: Vec<Edit> = Tokens::new(text, 0)
        .filter(Token::is_start_tag)
        .filter_map(|tag| wrap_tag(text, &tag, options))
        .collect();
    if edits.is_empty() {
        return text.to_string();
    }

    match apply_batch(text, edits) {
        Ok(formatted) => formatted,
        Err(error) => {
            tracing::warn!(%error, "attribute formatting skipped");
            text.to_string()
        }
    }
}

fn wrap_tag(text: &str, tag: &Token<'_>, options: &FormatOptions) -> Option<Edit> {
    let source = &text[tag.start..tag.end];
    if source.contains('\n') {
        return None;
    }
    let indent = line_indent(text, tag.start);
    if indent.chars().count() + source.chars().count() <= options.max_line_length {
        return None;
    }

    let pairs = attributes(text, tag);
    if pairs.is_empty() {
        return None;
    }

    // Anything in the blob besides the pairs and whitespace is left as written.
    let mut covered = tag.attributes_start;
    for pair in &pairs {
        if !text[covered..pair.name_start].trim().is_empty() {
            return None;
        }
        covered = pair.end;
    }
    if !text[covered..tag.attributes_end].trim().is_empty() {
        return None;
    }

    let wrapped: String = pairs
        .iter()
        .map(|pair| {
            format!(
                "\n{indent}{}{}",
                options.indent_unit,
                &text[pair.name_start..pair.end]
            )
        })
        .collect();
    Some(Edit::replace(text, tag.attributes_start, tag.attributes_end, wrapped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_line_length: usize) -> FormatOptions {
        FormatOptions {
            max_line_length,
            ..FormatOptions::default()
        }
    }

    #[test]
    fn test_long_tag_is_wrapped() {
        let text = "<a>\n  <format name=\"Agent\" class=\"Agent\" default='true'/>\n</a>";
        let formatted = format_attributes(text, &options(30));
        assert_eq!(
            formatted,
            "<a>\n  <format\n    name=\"Agent\"\n    class=\"Agent\"\n    default='true'/>\n</a>"
        );
    }

    #[test]
    fn test_short_tag_untouched() {
        let text = "<a>\n  <b x=\"1\" y=\"2\"/>\n</a>";
        assert_eq!(format_attributes(text, &options(80)), text);
        // Exactly at the limit stays.
        let width = "  <b x=\"1\" y=\"2\"/>".len();
        assert_eq!(format_attributes(text, &options(width)), text);
        assert_ne!(format_attributes(text, &options(width - 1)), text);
    }

    #[test]
    fn test_idempotent() {
        let text = "<root first=\"1\" second=\"2\" third=\"3\"><child a=\"1\" b=\"2\" c=\"3\">x</child></root>";
        let once = format_attributes(text, &options(20));
        assert_eq!(format_attributes(&once, &options(20)), once);
    }

    #[test]
    fn test_comments_and_attributeless_tags_skipped() {
        let text = "<!-- <format name=\"a-very-long-value-here\" other=\"x\"/> --><a-really-long-tag-name-without-attributes/>";
        assert_eq!(format_attributes(text, &options(10)), text);
    }

    #[test]
    fn test_open_tag_closer_kept() {
        let text = "<a x=\"1\" y=\"2\" >text</a>";
        assert_eq!(format_attributes(text, &options(5)), "<a\n  x=\"1\"\n  y=\"2\" >text</a>");
    }
}
