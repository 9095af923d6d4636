use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// One verified byte-span replacement in a document's text.
///
/// Both the text patcher and the attribute formatter compile down to batches
/// of this primitive. Intelligence lives in span acquisition, not application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied"]
pub struct Edit {
    /// First byte replaced
    pub byte_start: usize,
    /// One past the last byte replaced; equal to `byte_start` for an insertion
    pub byte_end: usize,
    /// Replacement text
    pub new_text: String,
    /// What the span must hold in the original text
    pub expected_before: EditVerification,
}

/// How an edit checks the span it replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// The expected text itself
    ExactMatch(String),
    /// xxh3 of the expected text, used for long spans
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Before-text verification failed at {byte_start}..{byte_end}: found {found:?}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("Invalid byte range: [{byte_start}, {byte_end}) in text of length {text_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        text_len: usize,
    },

    #[error("Overlapping edits: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    Overlap {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("Edit boundary {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },
}

impl Edit {
    /// Create a new edit with automatic verification generation.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        let expected = expected_before.into();
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(&expected),
        }
    }

    /// Create an edit whose expected before-text is read from `text` itself.
    pub fn replace(text: &str, byte_start: usize, byte_end: usize, new_text: impl Into<String>) -> Self {
        let before = text.get(byte_start..byte_end).unwrap_or_default();
        Self::new(byte_start, byte_end, new_text, before)
    }

    /// Create a pure insertion at `offset`.
    pub fn insert(offset: usize, new_text: impl Into<String>) -> Self {
        Self::new(offset, offset, new_text, "")
    }

    pub fn is_insertion(&self) -> bool {
        self.byte_start == self.byte_end
    }

    /// Validate the edit against `text`.
    ///
    /// Returns the current text at [byte_start, byte_end) if validation succeeds.
    fn validate<'a>(&self, text: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > text.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                text_len: text.len(),
            });
        }

        for offset in [self.byte_start, self.byte_end] {
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        let current = &text[self.byte_start..self.byte_end];

        // Already applied
        if current == self.new_text {
            return Ok(current);
        }

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }

        Ok(current)
    }

    /// Apply this edit to `text`, returning the new text.
    pub fn apply_to(&self, text: &str) -> Result<String, EditError> {
        let current = self.validate(text)?;
        if current == self.new_text {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len() + self.new_text.len() - current.len());
        out.push_str(&text[..self.byte_start]);
        out.push_str(&self.new_text);
        out.push_str(&text[self.byte_end..]);
        Ok(out)
    }
}

/// Apply multiple edits to one text buffer.
///
/// Edits are sorted by byte_start descending and applied back-to-front so that
/// a splice never shifts the offsets recorded for an edit not yet applied.
/// When two edits start at the same offset the wider one is applied first,
/// which leaves an insertion at that offset in front of the replaced text.
pub fn apply_batch(text: &str, mut edits: Vec<Edit>) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(text.to_string());
    }

    edits.sort_by(|a, b| {
        b.byte_start
            .cmp(&a.byte_start)
            .then(b.byte_end.cmp(&a.byte_end))
    });

    // Validate all edits against the original first
    for edit in &edits {
        edit.validate(text)?;
    }

    // Sorted descending: the earlier edit must end at or before the later one starts.
    // Two insertions at one offset are ambiguous and rejected too.
    for window in edits.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        let same_point_insertions =
            later.is_insertion() && earlier.is_insertion() && later.byte_start == earlier.byte_start;
        if earlier.byte_end > later.byte_start || same_point_insertions {
            return Err(EditError::Overlap {
                first_start: earlier.byte_start,
                first_end: earlier.byte_end,
                second_start: later.byte_start,
                second_end: later.byte_end,
            });
        }
    }

    let mut out = text.to_string();
    for edit in &edits {
        if out[edit.byte_start..edit.byte_end] == edit.new_text {
            continue;
        }
        out.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
    }

    Ok(out)
}
