use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::text::word_count;
use crate::validate::{MAX_SENTENCES, MIN_SENTENCES};

/// Summary style requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    /// Context-preserving summary that keeps supporting detail.
    #[default]
    #[serde(alias = "gpt")]
    Detailed,
    /// Key points only.
    Brief,
}

impl SummaryMethod {
    pub const ALL: [SummaryMethod; 2] = [SummaryMethod::Detailed, SummaryMethod::Brief];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Brief => "brief",
        }
    }

    /// Description served by `GET /summarize`.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Detailed => "Detailed summary that keeps context and supporting details",
            Self::Brief => "Brief summary with only the key points",
        }
    }
}

impl FromStr for SummaryMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "gpt" is the legacy name of the detailed method.
            "detailed" | "gpt" => Ok(Self::Detailed),
            "brief" => Ok(Self::Brief),
            other => Err(ValidationError::new(format!(
                "unsupported summary method: {other}"
            ))),
        }
    }
}

/// A validated summarization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    text: String,
    method: SummaryMethod,
    sentences_count: u8,
}

impl SummaryRequest {
    /// # Errors
    ///
    /// Returns `ValidationError` when the text is blank or `sentences_count`
    /// falls outside `MIN_SENTENCES..=MAX_SENTENCES`.
    pub fn new(
        text: impl Into<String>,
        method: SummaryMethod,
        sentences_count: u8,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::new("text to summarize is empty"));
        }
        if !(MIN_SENTENCES..=MAX_SENTENCES).contains(&sentences_count) {
            return Err(ValidationError::new(format!(
                "sentences_count must be between {MIN_SENTENCES} and {MAX_SENTENCES}"
            )));
        }
        Ok(Self {
            text,
            method,
            sentences_count,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn method(&self) -> SummaryMethod {
        self.method
    }

    #[must_use]
    pub fn sentences_count(&self) -> u8 {
        self.sentences_count
    }
}

/// Outcome of a summarization, serialized as the `POST /summarize` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub original_text: String,
    pub summary: String,
    pub method: SummaryMethod,
    pub sentences_count: u8,
    pub original_length: usize,
    pub summary_length: usize,
    #[serde(rename = "model")]
    pub model_name: String,
}

impl SummaryResult {
    /// Builds the result and derives both word counts.
    #[must_use]
    pub fn from_request(
        request: &SummaryRequest,
        summary: String,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            original_length: word_count(&request.text),
            summary_length: word_count(&summary),
            original_text: request.text.clone(),
            summary,
            method: request.method,
            sentences_count: request.sentences_count,
            model_name: model_name.into(),
        }
    }
}
