//! Property tests for span validity, patch idempotence and the formatter budget.

use proptest::prelude::*;
use xml_sync::position::scanner::{attributes, line_indent, Token, TokenKind, Tokens};
use xml_sync::xml::GroupedNode;
use xml_sync::{format_attributes, patch, resolve, FormatOptions, Path, SourceDocument};

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    comment: bool,
}

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "item", "field", "ns:x", "übung"]).prop_map(String::from)
}

fn value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .;é<&]{0,12}"
}

fn element() -> impl Strategy<Value = Element> {
    let leaf = (name(), prop::collection::vec((name(), value()), 0..4), any::<bool>()).prop_map(
        |(name, attributes, comment)| Element {
            name,
            attributes: dedupe(attributes),
            children: Vec::new(),
            comment,
        },
    );
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            name(),
            prop::collection::vec((name(), value()), 0..4),
            prop::collection::vec(inner, 0..4),
            any::<bool>(),
        )
            .prop_map(|(name, attributes, children, comment)| Element {
                name,
                attributes: dedupe(attributes),
                children,
                comment,
            })
    })
}

fn dedupe(attributes: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut seen = Vec::new();
    attributes
        .into_iter()
        .filter(|(name, _)| {
            let fresh = !seen.contains(name);
            seen.push(name.clone());
            fresh
        })
        .collect()
}

fn render(element: &Element, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    out.push_str(&pad);
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        let escaped = value.replace('&', "&amp;").replace('<', "&lt;");
        out.push_str(&format!(" {name}=\"{escaped}\""));
    }
    if element.children.is_empty() && !element.comment {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    if element.comment {
        out.push_str(&format!("{pad}  <!-- <{0}> not a tag </{0}> -->\n", element.name));
    }
    for child in &element.children {
        render(child, indent + 1, out);
    }
    out.push_str(&pad);
    out.push_str(&format!("</{}>\n", element.name));
}

fn document() -> impl Strategy<Value = String> {
    element().prop_map(|root| {
        let mut out = String::new();
        render(&root, 0, &mut out);
        out
    })
}

/// Every path that addresses something in `node`, paired with the node.
fn paths(node: &GroupedNode, path: Path, out: &mut Vec<Path>) {
    for attribute in &node.attributes {
        out.push(path.attribute(&attribute.name));
    }
    out.push(path.content());
    for group in &node.children {
        for (index, child) in group.nodes.iter().enumerate() {
            let child_path = path.nth(&group.key, index);
            out.push(child_path.clone());
            paths(child, child_path, out);
        }
    }
}

proptest! {
    #[test]
    fn resolved_spans_are_valid_offsets(text in document()) {
        let document = SourceDocument::parse(text.as_str());
        prop_assert!(document.parse_error().is_none(), "{:?}", document.parse_error());

        let mut all = Vec::new();
        paths(document.root(), Path::root(), &mut all);
        for path in all {
            let position = resolve(&text, &path);
            prop_assert!(position.is_some(), "{} did not resolve", path);
            let position = position.unwrap();
            prop_assert!(position.from <= position.to && position.to <= text.len());
            prop_assert!(text.is_char_boundary(position.from));
            prop_assert!(text.is_char_boundary(position.to));
        }
    }

    #[test]
    fn attribute_spans_hold_the_raw_value(text in document()) {
        let document = SourceDocument::parse(text.as_str());
        let root = document.root();
        for attribute in &root.attributes {
            let position = resolve(&text, &Path::root().attribute(&attribute.name)).unwrap();
            let raw = position.slice(&text);
            let unescaped = quick_xml::escape::unescape(raw).unwrap().into_owned();
            prop_assert_eq!(unescaped, attribute.value.clone());
        }
    }

    #[test]
    fn comment_bodies_never_yield_tags(text in document()) {
        let mut inside_comment = false;
        for token in Tokens::new(&text, 0) {
            match token.kind {
                TokenKind::CommentStart => inside_comment = true,
                TokenKind::CommentEnd => inside_comment = false,
                _ => prop_assert!(!inside_comment || !token.is_tag()),
            }
        }
    }

    #[test]
    fn unmodified_patch_is_identity(text in document()) {
        let document = SourceDocument::parse(text.as_str());
        let patched = patch(&text, document.root(), &document.root().clone()).unwrap();
        prop_assert_eq!(patched, text);
    }

    #[test]
    fn formatter_respects_budget(text in document(), max in 10usize..60) {
        let options = FormatOptions { max_line_length: max, ..FormatOptions::default() };
        let formatted = format_attributes(&text, &options);

        // Idempotent, and the tree is unchanged.
        prop_assert_eq!(format_attributes(&formatted, &options), formatted.clone());
        let formatted_document = SourceDocument::parse(formatted.as_str());
        let original_document = SourceDocument::parse(text.as_str());
        prop_assert_eq!(formatted_document.root(), original_document.root());

        // Every over-budget tag has one attribute per line, one unit deeper
        // than its own line.
        for tag in Tokens::new(&text, 0).filter(Token::is_start_tag) {
            let source = &text[tag.start..tag.end];
            let indent = line_indent(&text, tag.start);
            let pairs = attributes(&text, &tag);
            if pairs.is_empty() || indent.chars().count() + source.chars().count() <= max {
                continue;
            }
            let mut expected = format!("{indent}{}", &text[tag.start..tag.attributes_start]);
            for pair in &pairs {
                expected.push_str(&format!(
                    "\n{indent}{}{}",
                    options.indent_unit,
                    &text[pair.name_start..pair.end]
                ));
            }
            expected.push_str(&text[tag.attributes_end..tag.end]);
            prop_assert!(
                formatted.contains(&expected),
                "{} was not wrapped as:\n{}\nin:\n{}",
                source,
                expected,
                formatted
            );
        }

        // Lines within budget survive verbatim and in order, including the
        // ones after a wrapped tag.
        let mut remaining = formatted.lines();
        for line in text.lines().filter(|line| line.chars().count() <= max) {
            prop_assert!(
                remaining.any(|candidate| candidate == line),
                "short line {:?} was rewritten",
                line
            );
        }
    }
}
