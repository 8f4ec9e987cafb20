//! Per-operation request validation.
//!
//! [`Validator::validate`] turns a raw JSON payload into a typed
//! [`ValidatedRequest`] or a [`ValidationError`] whose message is shown to the
//! caller verbatim. Optional fields fall back to defaults and never fail when
//! absent.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::document::FileType;
use crate::error::ValidationError;
use crate::language::Language;
use crate::summary::{SummaryMethod, SummaryRequest};
use crate::translation::TranslationRequest;

/// Smallest accepted `sentences_count`.
pub const MIN_SENTENCES: u8 = 1;
/// Largest accepted `sentences_count`.
pub const MAX_SENTENCES: u8 = 10;
/// `sentences_count` used when the field is absent.
pub const DEFAULT_SENTENCES_COUNT: u8 = 3;
/// Upload size limit used when none is configured (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// RequestKind / ValidatedRequest
// ---------------------------------------------------------------------------

/// Operations whose payload goes through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Translate,
    Summarize,
    Upload,
}

impl RequestKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Summarize => "summarize",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded document upload. `bytes` is within the configured size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub file_type: FileType,
    pub bytes: Vec<u8>,
}

/// Output of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedRequest {
    Translation(TranslationRequest),
    Summary(SummaryRequest),
    Upload(UploadRequest),
}

// ---------------------------------------------------------------------------
// UploadLimits
// ---------------------------------------------------------------------------

/// Upload constraints applied by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum decoded file size in bytes.
    pub max_bytes: usize,
    /// MIME types the extraction pipeline may process.
    pub allowed_types: HashSet<FileType>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_types: FileType::ALL.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Stateless payload validator configured with upload limits.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    limits: UploadLimits,
}

impl Validator {
    #[must_use]
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    /// Validates `payload` for the given operation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for non-object payloads, missing or empty
    /// required fields, malformed values, out-of-range numbers, and
    /// cross-field violations.
    pub fn validate(
        &self,
        kind: RequestKind,
        payload: &Value,
    ) -> Result<ValidatedRequest, ValidationError> {
        let Some(fields) = payload.as_object() else {
            return Err(ValidationError::new("request body must be a JSON object"));
        };

        let result = match kind {
            RequestKind::Translate => validate_translation(fields).map(ValidatedRequest::Translation),
            RequestKind::Summarize => validate_summary(fields).map(ValidatedRequest::Summary),
            RequestKind::Upload => self.validate_upload(fields).map(ValidatedRequest::Upload),
        };

        if let Err(ref err) = result {
            tracing::debug!(operation = %kind, reason = err.message(), "request rejected");
        }
        result
    }

    fn validate_upload(&self, fields: &Map<String, Value>) -> Result<UploadRequest, ValidationError> {
        let file_data = required_str(fields, "file_data")?;
        let file_type = required_str(fields, "file_type")?;
        let file_name = required_str(fields, "file_name")?;

        // The allow-list is checked before touching the payload bytes.
        let file_type = FileType::from_mime(file_type)
            .filter(|t| self.limits.allowed_types.contains(t))
            .ok_or_else(|| ValidationError::new(format!("unsupported file type: {file_type}")))?;

        if file_name.trim().is_empty() {
            return Err(ValidationError::new("file name is empty"));
        }

        // Reject before decoding when the encoded form alone is too large.
        if file_data.len() / 4 * 3 > self.limits.max_bytes + 3 {
            return Err(self.too_large());
        }
        let bytes = STANDARD
            .decode(file_data.trim())
            .map_err(|e| ValidationError::new(format!("file_data is not valid base64: {e}")))?;
        if bytes.len() > self.limits.max_bytes {
            return Err(self.too_large());
        }

        Ok(UploadRequest {
            file_name: file_name.to_string(),
            file_type,
            bytes,
        })
    }

    fn too_large(&self) -> ValidationError {
        ValidationError::new(format!(
            "file exceeds the maximum size of {} bytes",
            self.limits.max_bytes
        ))
    }
}

fn validate_translation(fields: &Map<String, Value>) -> Result<TranslationRequest, ValidationError> {
    let text = required_str(fields, "text")?;
    let target = required_str(fields, "target_lang")?;
    let source = optional_str(fields, "source_lang")?.unwrap_or("auto");

    let target_language = Language::from_str(target)
        .ok()
        .filter(|l| !l.is_auto())
        .ok_or_else(|| ValidationError::new(format!("unsupported target language: {target}")))?;
    let source_language = Language::from_str(source)
        .map_err(|_| ValidationError::new(format!("unsupported source language: {source}")))?;

    TranslationRequest::new(text, source_language, target_language)
}

fn validate_summary(fields: &Map<String, Value>) -> Result<SummaryRequest, ValidationError> {
    let text = required_str(fields, "text")?;
    let method = match optional_str(fields, "method")? {
        Some(m) => m.parse::<SummaryMethod>()?,
        None => SummaryMethod::default(),
    };
    let sentences_count = match fields.get("sentences_count") {
        None | Some(Value::Null) => DEFAULT_SENTENCES_COUNT,
        Some(v) => coerce_sentences_count(v)?,
    };
    SummaryRequest::new(text, method, sentences_count)
}

/// Coerces integers, integral floats and numeric strings into a count in
/// `MIN_SENTENCES..=MAX_SENTENCES`.
fn coerce_sentences_count(value: &Value) -> Result<u8, ValidationError> {
    let not_a_number = || ValidationError::new("sentences_count must be a number");
    let n: i64 = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            #[allow(clippy::cast_possible_truncation)]
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
            _ => return Err(not_a_number()),
        },
        Value::String(s) => s.trim().parse().map_err(|_| not_a_number())?,
        _ => return Err(not_a_number()),
    };
    u8::try_from(n)
        .ok()
        .filter(|c| (MIN_SENTENCES..=MAX_SENTENCES).contains(c))
        .ok_or_else(|| {
            ValidationError::new(format!(
                "sentences_count must be between {MIN_SENTENCES} and {MAX_SENTENCES}"
            ))
        })
}

/// A required field must be a non-empty string.
fn required_str<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a str, ValidationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(ValidationError::missing_field(name)),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::missing_field(name)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::new(format!("{name} must be a string"))),
    }
}

/// Absent, null and empty optional fields all mean "use the default".
fn optional_str<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<&'a str>, ValidationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ValidationError::new(format!("{name} must be a string"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
