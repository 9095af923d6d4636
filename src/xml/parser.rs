//! Builds the lossless [`XmlDocument`] tree from raw text with quick-xml.

use crate::xml::errors::XmlError;
use crate::xml::node::{Span, XmlAttribute, XmlDocument, XmlElement, XmlNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parse `source` into a lossless tree.
///
/// Whitespace text, comments and processing instructions are all kept.
pub fn parse_document(source: &str) -> Result<XmlDocument, XmlError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut prolog = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event_start = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|err| XmlError::Syntax {
            message: err.to_string(),
            position: reader.error_position() as usize,
        })?;
        let event_end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let mut element = start_element(&e, event_start)?;
                element.self_closing = false;
                stack.push(element);
            }
            Event::Empty(e) => {
                let mut element = start_element(&e, event_start)?;
                element.span.end = event_end;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut element = stack.pop().ok_or(XmlError::UnexpectedClosingTag {
                    tag_name,
                    position: event_start,
                })?;
                element.span.end = event_end;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|err| XmlError::Syntax {
                    message: format!("invalid text content: {err}"),
                    position: event_start,
                })?;
                push_node(&mut stack, &mut prolog, XmlNode::Text(text.into_owned()));
            }
            Event::CData(_) => {
                let raw = slice(source, event_start + "<![CDATA[".len(), event_end - "]]>".len());
                push_node(&mut stack, &mut prolog, XmlNode::CData(raw));
            }
            Event::Comment(_) => {
                let raw = slice(source, event_start + "<!--".len(), event_end - "-->".len());
                push_node(&mut stack, &mut prolog, XmlNode::Comment(raw));
            }
            Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {
                let raw = slice(source, event_start, event_end);
                push_node(&mut stack, &mut prolog, XmlNode::ProcessingInstruction(raw));
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::UnclosedElement {
            tag_name: open.tag_name,
            position: open.span.start,
        });
    }

    let root = root.ok_or(XmlError::EmptyDocument)?;
    Ok(XmlDocument { prolog, root })
}

fn start_element(e: &BytesStart<'_>, event_start: usize) -> Result<XmlElement, XmlError> {
    let tag_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut element = XmlElement::new(tag_name);
    element.span.start = event_start;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::Syntax {
            message: format!("invalid attribute: {err}"),
            position: event_start,
        })?;
        let value = attr.unescape_value().map_err(|err| XmlError::Syntax {
            message: format!("invalid attribute value: {err}"),
            position: event_start,
        })?;
        element.attributes.push(XmlAttribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }

    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_element(element);
            Ok(())
        }
        None if root.is_some() => Err(XmlError::MultipleRoots {
            position: element.span.start,
        }),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn push_node(stack: &mut [XmlElement], prolog: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => {
            parent.self_closing = false;
            parent.children.push(node);
        }
        None => prolog.push(node),
    }
}

fn slice(source: &str, start: usize, end: usize) -> String {
    source.get(start..end.max(start)).unwrap_or_default().to_string()
}
