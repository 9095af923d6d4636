use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { message: String, position: usize },

    #[error("unexpected end of input: expected closing tag </{tag_name}>")]
    UnclosedElement { tag_name: String, position: usize },

    #[error("unexpected closing tag </{tag_name}>")]
    UnexpectedClosingTag { tag_name: String, position: usize },

    #[error("document has no root element")]
    EmptyDocument,

    #[error("document has more than one root element")]
    MultipleRoots { position: usize },
}

impl XmlError {
    /// Byte offset the error is attributed to, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            XmlError::Syntax { position, .. }
            | XmlError::UnclosedElement { position, .. }
            | XmlError::UnexpectedClosingTag { position, .. }
            | XmlError::MultipleRoots { position } => Some(*position),
            XmlError::EmptyDocument => None,
        }
    }
}
