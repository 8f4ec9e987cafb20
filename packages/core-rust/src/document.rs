//! Uploaded documents and the file types the extraction pipeline understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::text::word_count;

// ---------------------------------------------------------------------------
// FileType
// ---------------------------------------------------------------------------

/// Document formats accepted for upload. Each maps to exactly one MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FileType {
    Pdf,
    Docx,
    Doc,
    Txt,
    Png,
    Jpg,
    Gif,
    Bmp,
}

impl FileType {
    pub const ALL: [FileType; 8] = [
        FileType::Pdf,
        FileType::Docx,
        FileType::Doc,
        FileType::Txt,
        FileType::Png,
        FileType::Jpg,
        FileType::Gif,
        FileType::Bmp,
    ];

    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Doc => "application/msword",
            Self::Txt => "text/plain",
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }

    /// Looks up a file type by MIME string.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.mime() == mime)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Error returned for a MIME type outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported file type: {0}")]
pub struct UnknownFileType(pub String);

impl FromStr for FileType {
    type Err = UnknownFileType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mime(s).ok_or_else(|| UnknownFileType(s.to_string()))
    }
}

impl TryFrom<String> for FileType {
    type Error = UnknownFileType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FileType> for String {
    fn from(value: FileType) -> Self {
        value.mime().to_string()
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// An uploaded file and, once extraction ran, its text.
///
/// `text_length` is always the word count of `extracted_text`; it is
/// recomputed by [`Document::set_extracted_text`] and on deserialization.
/// Raw bytes are never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DocumentWire")]
pub struct Document {
    file_name: String,
    file_type: FileType,
    file_size: usize,
    #[serde(skip)]
    raw_bytes: Vec<u8>,
    extracted_text: Option<String>,
    text_length: Option<usize>,
}

/// Serialized form; the derived field is discarded and recomputed.
#[derive(Deserialize)]
struct DocumentWire {
    file_name: String,
    file_type: FileType,
    file_size: usize,
    extracted_text: Option<String>,
}

impl From<DocumentWire> for Document {
    fn from(wire: DocumentWire) -> Self {
        let mut doc = Self {
            file_name: wire.file_name,
            file_type: wire.file_type,
            file_size: wire.file_size,
            raw_bytes: Vec::new(),
            extracted_text: None,
            text_length: None,
        };
        if let Some(text) = wire.extracted_text {
            doc.set_extracted_text(text);
        }
        doc
    }
}

impl Document {
    /// # Errors
    ///
    /// Returns `ValidationError` when `file_name` is blank.
    pub fn new(
        file_name: impl Into<String>,
        file_type: FileType,
        raw_bytes: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(ValidationError::new("file name is empty"));
        }
        Ok(Self {
            file_name,
            file_type,
            file_size: raw_bytes.len(),
            raw_bytes,
            extracted_text: None,
            text_length: None,
        })
    }

    /// Stores extracted text and refreshes `text_length`.
    pub fn set_extracted_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.text_length = Some(word_count(&text));
        self.extracted_text = Some(text);
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    #[must_use]
    pub fn file_size(&self) -> usize {
        self.file_size
    }

    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    #[must_use]
    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    #[must_use]
    pub fn text_length(&self) -> Option<usize> {
        self.text_length
    }
}
