//! DTS Core — request/result models, request validation, and the error taxonomy.
//!
//! Everything in this crate is pure: no I/O, no configuration loading. The
//! server crate feeds raw JSON payloads through [`Validator`] and turns the
//! typed requests into adapter calls.

pub mod document;
pub mod error;
pub mod identity;
pub mod language;
pub mod summary;
pub mod text;
pub mod translation;
pub mod validate;

pub use document::{Document, FileType, UnknownFileType};
pub use error::{ErrorKind, ErrorResponse, ValidationError};
pub use identity::UserIdentity;
pub use language::{Language, UnknownLanguage};
pub use summary::{SummaryMethod, SummaryRequest, SummaryResult};
pub use text::word_count;
pub use translation::{TranslationRequest, TranslationResult};
pub use validate::{
    RequestKind, UploadLimits, UploadRequest, ValidatedRequest, Validator,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SENTENCES_COUNT, MAX_SENTENCES, MIN_SENTENCES,
};
