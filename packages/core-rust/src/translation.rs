use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::language::Language;

/// A validated translation request.
///
/// Fields are private so the invariants checked in [`TranslationRequest::new`]
/// (non-blank text, concrete target, distinct languages) cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    text: String,
    source_language: Language,
    target_language: Language,
}

impl TranslationRequest {
    /// # Errors
    ///
    /// Returns `ValidationError` when the text is blank, the target is `auto`,
    /// or source and target are the same language.
    pub fn new(
        text: impl Into<String>,
        source_language: Language,
        target_language: Language,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::new("text to translate is empty"));
        }
        if target_language.is_auto() {
            return Err(ValidationError::new(
                "target language cannot be auto-detected",
            ));
        }
        if source_language == target_language {
            return Err(ValidationError::new(
                "source and target languages are the same",
            ));
        }
        Ok(Self {
            text,
            source_language,
            target_language,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn source_language(&self) -> Language {
        self.source_language
    }

    #[must_use]
    pub fn target_language(&self) -> Language {
        self.target_language
    }
}

/// Outcome of a translation, serialized as the `POST /translate` body
/// (minus the `success` flag added by the controller).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: Language,
    pub target_language: Language,
    #[serde(rename = "model")]
    pub model_name: String,
}

impl TranslationResult {
    /// Pairs the request with the backend output.
    #[must_use]
    pub fn from_request(
        request: &TranslationRequest,
        translated_text: String,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            original_text: request.text.clone(),
            translated_text,
            source_language: request.source_language,
            target_language: request.target_language,
            model_name: model_name.into(),
        }
    }
}
