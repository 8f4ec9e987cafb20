//! Summarization through a chat completion backend.

use std::sync::Arc;

use async_trait::async_trait;
use dts_core::{SummaryMethod, SummaryRequest};

use super::{AdapterError, ChatCompletion, ChatMessage, ChatRequest, Summarizer};

const SYSTEM_PROMPT: &str = "You are a professional summarizer. Summarize the given text \
    accurately and clearly in exactly the requested number of sentences, in the language \
    of the original text.";

pub struct LlmSummarizer {
    chat: Arc<dyn ChatCompletion>,
    max_tokens: u32,
}

impl LlmSummarizer {
    pub fn new(chat: Arc<dyn ChatCompletion>, max_tokens: u32) -> Self {
        Self { chat, max_tokens }
    }

    fn prompt(&self, request: &SummaryRequest) -> ChatRequest {
        let n = request.sentences_count();
        let sentences = if n == 1 { "sentence" } else { "sentences" };
        let instruction = match request.method() {
            SummaryMethod::Brief => format!(
                "Briefly summarize the following text in {n} {sentences}. \
                 Include only the key points."
            ),
            SummaryMethod::Detailed => format!(
                "Summarize the following text in {n} {sentences}, in detail and accurately. \
                 Keep all important information and context."
            ),
        };
        ChatRequest {
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!("{instruction}\n\n{}", request.text())),
            ],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn model_name(&self) -> &str {
        self.chat.model()
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String, AdapterError> {
        self.chat.complete(self.prompt(request)).await
    }
}
