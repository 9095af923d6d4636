use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPart {
    Root,
    Attribute(String),
    Content,
    Child(String),
    /// Remembers a tag name for the following [`PathPart::Index`].
    Children(String),
    Index(usize),
}

/// An ordered address of one location inside a grouped node.
///
/// The textual form joins parts with `/`: `@name` for an attribute,
/// `#content` for element content, `tag` for a child and `tag[n]` for the
/// n-th (0-based) child of that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    parts: Vec<PathPart>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathParseError {
    #[error("invalid index in path segment '{segment}'")]
    InvalidIndex { segment: String },

    #[error("empty name in path segment '{segment}'")]
    EmptyName { segment: String },
}

impl Path {
    pub fn root() -> Self {
        Self {
            parts: vec![PathPart::Root],
        }
    }

    pub fn parts(&self) -> &[PathPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn push(&mut self, part: PathPart) {
        self.parts.push(part);
    }

    pub fn truncate(&mut self, len: usize) {
        self.parts.truncate(len.max(1));
    }

    #[must_use]
    pub fn join(&self, part: PathPart) -> Self {
        let mut path = self.clone();
        path.push(part);
        path
    }

    pub fn attribute(&self, name: &str) -> Self {
        self.join(PathPart::Attribute(name.to_string()))
    }

    pub fn content(&self) -> Self {
        self.join(PathPart::Content)
    }

    pub fn child(&self, tag_name: &str) -> Self {
        self.join(PathPart::Child(tag_name.to_string()))
    }

    /// `Children(tag_name)` followed by `Index(index)`.
    pub fn nth(&self, tag_name: &str, index: usize) -> Self {
        self.join(PathPart::Children(tag_name.to_string()))
            .join(PathPart::Index(index))
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl From<Vec<PathPart>> for Path {
    fn from(mut parts: Vec<PathPart>) -> Self {
        if parts.first() != Some(&PathPart::Root) {
            parts.insert(0, PathPart::Root);
        }
        Self { parts }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = Vec::new();
        let mut parts = self.parts.iter().peekable();
        while let Some(part) = parts.next() {
            match part {
                PathPart::Root => {}
                PathPart::Attribute(name) => segments.push(format!("@{name}")),
                PathPart::Content => segments.push("#content".to_string()),
                PathPart::Child(name) => segments.push(name.clone()),
                PathPart::Children(name) => match parts.peek() {
                    Some(PathPart::Index(index)) => {
                        segments.push(format!("{name}[{index}]"));
                        parts.next();
                    }
                    _ => segments.push(format!("{name}[]")),
                },
                PathPart::Index(index) => segments.push(format!("[{index}]")),
            }
        }
        write!(f, "/{}", segments.join("/"))
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut path = Path::root();
        for segment in input.trim().split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = segment.strip_prefix('@') {
                if name.is_empty() {
                    return Err(PathParseError::EmptyName {
                        segment: segment.to_string(),
                    });
                }
                path.push(PathPart::Attribute(name.to_string()));
            } else if segment == "#content" {
                path.push(PathPart::Content);
            } else if let Some(open) = segment.find('[') {
                let name = &segment[..open];
                let index = segment[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| PathParseError::InvalidIndex {
                        segment: segment.to_string(),
                    })?;
                if !name.is_empty() {
                    path.push(PathPart::Children(name.to_string()));
                }
                if index.is_empty() {
                    continue;
                }
                let index = index.parse().map_err(|_| PathParseError::InvalidIndex {
                    segment: segment.to_string(),
                })?;
                path.push(PathPart::Index(index));
            } else {
                path.push(PathPart::Child(segment.to_string()));
            }
        }
        Ok(path)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path: Path = "/aggregators/aggregator[2]/@class".parse().unwrap();
        assert_eq!(
            path.parts(),
            &[
                PathPart::Root,
                PathPart::Child("aggregators".into()),
                PathPart::Children("aggregator".into()),
                PathPart::Index(2),
                PathPart::Attribute("class".into()),
            ]
        );
        assert_eq!(path.to_string(), "/aggregators/aggregator[2]/@class");
    }

    #[test]
    fn test_root_forms() {
        assert_eq!("".parse::<Path>().unwrap(), Path::root());
        assert_eq!("/".parse::<Path>().unwrap(), Path::root());
        assert_eq!(Path::root().to_string(), "/");
    }

    #[test]
    fn test_content_and_bare_children() {
        let path: Path = "field[]/[0]/#content".parse().unwrap();
        assert_eq!(path, Path::root().nth("field", 0).content());
        assert_eq!(path.to_string(), "/field[0]/#content");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "a[x]".parse::<Path>(),
            Err(PathParseError::InvalidIndex { .. })
        ));
        assert!(matches!(
            "a[1".parse::<Path>(),
            Err(PathParseError::InvalidIndex { .. })
        ));
        assert!(matches!("@".parse::<Path>(), Err(PathParseError::EmptyName { .. })));
    }

    #[test]
    fn test_truncate_keeps_root() {
        let mut path = Path::root().child("a");
        path.truncate(0);
        assert_eq!(path, Path::root());
    }
}
