//! Adapters around external collaborators.
//!
//! Each adapter exposes one async operation behind a trait so the domain
//! services can be exercised with in-process stubs:
//!
//! - [`ChatCompletion`]: OpenAI-compatible chat completions ([`openai`])
//! - [`Translator`]: LLM-prompted translation ([`translation`])
//! - [`Summarizer`]: LLM-prompted summarization ([`summary`])
//! - [`TextExtractor`]: PDF / Office / text / OCR extraction ([`extraction`], [`ocr`])
//! - [`IdentityProvider`]: Google OAuth code exchange ([`oauth`])
//!
//! Every adapter fails with a tagged [`AdapterError`]; nothing is retried.

pub mod error;
pub mod extraction;
pub mod oauth;
pub mod ocr;
pub mod openai;
pub mod summary;
pub mod translation;

pub use error::{AdapterError, Backend};
pub use extraction::DocumentExtractor;
pub use oauth::GoogleOAuth;
pub use ocr::TesseractOcr;
pub use openai::OpenAiClient;
pub use summary::LlmSummarizer;
pub use translation::LlmTranslator;

use async_trait::async_trait;
use dts_core::{FileType, SummaryRequest, TranslationRequest, UserIdentity};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Chat completion
// ---------------------------------------------------------------------------

/// One message in a chat completion prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// A chat completion request with its token budget.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// Chat completion backend.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Model identifier reported in results.
    fn model(&self) -> &str;

    /// Returns the trimmed text of the first choice.
    async fn complete(&self, request: ChatRequest) -> Result<String, AdapterError>;
}

// ---------------------------------------------------------------------------
// Operation adapters
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Translator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn translate(&self, request: &TranslationRequest) -> Result<String, AdapterError>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn model_name(&self) -> &str;

    async fn summarize(&self, request: &SummaryRequest) -> Result<String, AdapterError>;
}

/// Turns document bytes of a known type into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file_type: FileType, bytes: &[u8]) -> Result<String, AdapterError>;
}

/// Bitmap-to-text recognition. Input is always PNG-encoded.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, png: Vec<u8>) -> Result<String, AdapterError>;
}

/// OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authorization URL the browser is redirected to, carrying `state`.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::NotConfigured` when client credentials are absent.
    fn authorization_url(&self, state: &str) -> Result<String, AdapterError>;

    /// Exchanges an authorization code and fetches the user's profile.
    async fn exchange_code(&self, code: &str) -> Result<UserIdentity, AdapterError>;
}
