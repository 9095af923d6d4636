//! Single-pass tokenizer for tag-like tokens in raw XML text.
//!
//! Shared by the position resolver, the text patcher and the attribute line
//! formatter. It works on the exact source text instead of parser output so
//! that every offset it reports is valid against that text. Comment and CDATA
//! bodies are skipped, so tag-shaped text inside them never yields a tag.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\A<(/)?([\p{L}_:][\p{L}\p{M}\p{N}_:.\-\x{B7}]*)((?:[^<>"']|"[^"]*"|'[^']*')*?)\s*(/)?>"#,
    )
    .expect("tag pattern is valid")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s="'/<>]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attribute pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name ...>`
    Open,
    /// `<name .../>`
    SelfClosing,
    /// `</name>`
    Close,
    CommentStart,
    CommentEnd,
    CDataStart,
    CDataEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Offset of the token's first byte.
    pub start: usize,
    /// Offset just past the token's last byte.
    pub end: usize,
    /// Tag name as written; empty for delimiters.
    pub name: &'a str,
    /// Offsets of the attribute blob between the name and the closer,
    /// trailing whitespace excluded.
    pub attributes_start: usize,
    pub attributes_end: usize,
}

impl Token<'_> {
    pub fn is_tag(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Open | TokenKind::SelfClosing | TokenKind::Close
        )
    }

    pub fn is_start_tag(&self) -> bool {
        matches!(self.kind, TokenKind::Open | TokenKind::SelfClosing)
    }

    pub fn has_name(&self, name: &str) -> bool {
        same_name(self.name, name)
    }
}

/// A `name="value"` pair inside a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpan<'a> {
    pub name: &'a str,
    pub name_start: usize,
    /// Value without its quotes.
    pub value_start: usize,
    pub value_end: usize,
    /// Just past the closing quote.
    pub end: usize,
}

pub fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opaque {
    Comment,
    CData,
}

/// Iterator over tokens starting at a byte offset.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
    inside: Option<Opaque>,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str, from: usize) -> Self {
        Self {
            text,
            pos: from.min(text.len()),
            inside: None,
        }
    }

    fn delimiter(&mut self, kind: TokenKind, start: usize, len: usize) -> Token<'a> {
        self.pos = start + len;
        Token {
            kind,
            start,
            end: start + len,
            name: "",
            attributes_start: start + len,
            attributes_end: start + len,
        }
    }

    fn skip_past(&mut self, from: usize, terminator: &str) {
        self.pos = match self.text[from..].find(terminator) {
            Some(offset) => from + offset + terminator.len(),
            None => self.text.len(),
        };
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(opaque) = self.inside {
            let (terminator, kind) = match opaque {
                Opaque::Comment => ("-->", TokenKind::CommentEnd),
                Opaque::CData => ("]]>", TokenKind::CDataEnd),
            };
            // Unterminated comment: nothing after it can be a token.
            let offset = self.text[self.pos..].find(terminator)?;
            self.inside = None;
            return Some(self.delimiter(kind, self.pos + offset, terminator.len()));
        }

        loop {
            let start = self.pos + self.text[self.pos..].find('<')?;
            let rest = &self.text[start..];

            if rest.starts_with("<!--") {
                self.inside = Some(Opaque::Comment);
                return Some(self.delimiter(TokenKind::CommentStart, start, 4));
            }
            if rest.starts_with("<![CDATA[") {
                self.inside = Some(Opaque::CData);
                return Some(self.delimiter(TokenKind::CDataStart, start, 9));
            }
            if rest.starts_with("<?") {
                self.skip_past(start, "?>");
                continue;
            }
            if rest.starts_with("<!") {
                self.skip_past(start, ">");
                continue;
            }

            let Some(caps) = TAG.captures(rest) else {
                self.pos = start + 1;
                continue;
            };

            let whole = caps.get(0).map_or(0, |m| m.end());
            let name = caps.get(2).map_or("", |m| m.as_str());
            let (attributes_start, attributes_end) = caps
                .get(3)
                .map_or((0, 0), |m| (start + m.start(), start + m.end()));
            let kind = if caps.get(1).is_some() {
                TokenKind::Close
            } else if caps.get(4).is_some() {
                TokenKind::SelfClosing
            } else {
                TokenKind::Open
            };

            self.pos = start + whole;
            return Some(Token {
                kind,
                start,
                end: start + whole,
                name,
                attributes_start,
                attributes_end,
            });
        }
    }
}

/// The first start tag at or after `from`.
pub fn start_tag_at(text: &str, from: usize) -> Option<Token<'_>> {
    Tokens::new(text, from).find(Token::is_start_tag)
}

/// The closing tag matching the open tag `open`.
///
/// Depth rises on every open tag and falls on every close tag; self-closing
/// tags leave it unchanged. Returns `None` when the text ends first.
pub fn find_closing<'a>(text: &'a str, open: &Token<'a>) -> Option<Token<'a>> {
    if open.kind != TokenKind::Open {
        return None;
    }
    let mut depth = 0usize;
    for token in Tokens::new(text, open.end) {
        match token.kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close if depth == 0 => {
                if !token.has_name(open.name) {
                    tracing::debug!(
                        expected = open.name,
                        found = token.name,
                        offset = token.start,
                        "closing tag name does not match"
                    );
                }
                return Some(token);
            }
            TokenKind::Close => depth -= 1,
            _ => {}
        }
    }
    None
}

/// The `index`-th direct child of `parent` named `name`.
///
/// Self-closing matches count toward `index` without changing depth.
pub fn find_child<'a>(
    text: &'a str,
    parent: &Token<'a>,
    name: &str,
    index: usize,
) -> Option<Token<'a>> {
    if parent.kind != TokenKind::Open {
        return None;
    }
    let mut depth = 0usize;
    let mut matched = 0usize;
    for token in Tokens::new(text, parent.end) {
        match token.kind {
            TokenKind::Open | TokenKind::SelfClosing => {
                if depth == 0 && token.has_name(name) {
                    if matched == index {
                        return Some(token);
                    }
                    matched += 1;
                }
                if token.kind == TokenKind::Open {
                    depth += 1;
                }
            }
            TokenKind::Close if depth == 0 => return None,
            TokenKind::Close => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Offset just past the end of the element whose start tag is `start`.
pub fn element_end(text: &str, start: &Token<'_>) -> Option<usize> {
    match start.kind {
        TokenKind::SelfClosing => Some(start.end),
        TokenKind::Open => find_closing(text, start).map(|close| close.end),
        _ => None,
    }
}

/// Every `name="value"` pair of a start tag, in source order.
pub fn attributes<'a>(text: &'a str, tag: &Token<'a>) -> Vec<AttributeSpan<'a>> {
    let base = tag.attributes_start;
    let blob = &text[tag.attributes_start..tag.attributes_end];
    ATTRIBUTE
        .captures_iter(blob)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            let value = caps.get(2).or_else(|| caps.get(3))?;
            Some(AttributeSpan {
                name: name.as_str(),
                name_start: base + name.start(),
                value_start: base + value.start(),
                value_end: base + value.end(),
                end: base + whole.end(),
            })
        })
        .collect()
}

pub fn find_attribute<'a>(text: &'a str, tag: &Token<'a>, name: &str) -> Option<AttributeSpan<'a>> {
    attributes(text, tag)
        .into_iter()
        .find(|a| same_name(a.name, name))
}

/// Whitespace that starts the line containing `offset`.
pub fn line_indent(text: &str, offset: usize) -> &str {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &text[line_start..offset];
    &line[..line.len() - line.trim_start().len()]
}
