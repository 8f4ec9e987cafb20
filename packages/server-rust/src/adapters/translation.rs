//! Translation through a chat completion backend.

use std::sync::Arc;

use async_trait::async_trait;
use dts_core::TranslationRequest;

use super::{AdapterError, ChatCompletion, ChatMessage, ChatRequest, Translator};

/// Prompts the language model for a faithful, natural translation.
pub struct LlmTranslator {
    chat: Arc<dyn ChatCompletion>,
    max_tokens: u32,
}

impl LlmTranslator {
    pub fn new(chat: Arc<dyn ChatCompletion>, max_tokens: u32) -> Self {
        Self { chat, max_tokens }
    }

    fn prompt(&self, request: &TranslationRequest) -> ChatRequest {
        let target = request.target_language().english_name();
        let system = format!(
            "You are a professional translator. Translate the given text into {target} \
             accurately and naturally. Reply with the translation only."
        );
        let source = request.source_language();
        let from = if source.is_auto() {
            String::new()
        } else {
            format!(" from {}", source.english_name())
        };
        let user = format!(
            "Translate the following text{from} into {target}. Preserve the meaning and \
             nuance of the original while keeping the {target} natural:\n\n{}",
            request.text()
        );
        ChatRequest {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    fn model_name(&self) -> &str {
        self.chat.model()
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<String, AdapterError> {
        self.chat.complete(self.prompt(request)).await
    }
}
