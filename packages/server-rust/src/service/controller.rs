//! Controller: the single catch boundary between transport and domain.
//!
//! `handle` classifies the payload into a typed operation, runs it through the
//! operation pipeline and serializes the result. Every failure is classified
//! here into an [`ErrorResponse`]; nothing propagates to the transport layer.

use std::sync::Arc;

use dts_core::{ErrorResponse, UploadLimits};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;
use tracing::debug;

use super::classify::{OperationKind, OperationService};
use super::config::ServiceConfig;
use super::domain::{DocumentService, SummaryService, TranslationService};
use super::error::{classify, DispatchError};
use super::middleware::{build_operation_pipeline, OperationPipeline};
use super::operation::service_names;
use super::router::OperationRouter;
use crate::adapters::{
    ChatCompletion, DocumentExtractor, LlmSummarizer, LlmTranslator, OpenAiClient, Summarizer,
    TesseractOcr, TextExtractor, Translator,
};

/// The adapters backing each domain service.
pub struct Adapters {
    pub translator: Arc<dyn Translator>,
    pub summarizer: Arc<dyn Summarizer>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl Adapters {
    /// Production adapters: one shared chat client, tesseract-backed OCR.
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        let chat: Arc<dyn ChatCompletion> = Arc::new(OpenAiClient::new(config.llm.clone()));
        let ocr = Arc::new(TesseractOcr::new(config.ocr.clone()));
        Self {
            translator: Arc::new(LlmTranslator::new(Arc::clone(&chat), config.llm.max_tokens)),
            summarizer: Arc::new(LlmSummarizer::new(chat, config.llm.summary_max_tokens)),
            extractor: Arc::new(DocumentExtractor::new(ocr)),
        }
    }
}

pub struct Controller {
    operations: OperationService,
    // BoxCloneService is Send but not Sync; each call clones it out.
    pipeline: Mutex<OperationPipeline>,
}

impl Controller {
    #[must_use]
    pub fn new(limits: UploadLimits, adapters: Adapters) -> Self {
        let mut router = OperationRouter::new();
        router.register(
            service_names::TRANSLATION,
            TranslationService::new(adapters.translator),
        );
        router.register(service_names::SUMMARY, SummaryService::new(adapters.summarizer));
        router.register(service_names::DOCUMENT, DocumentService::new(adapters.extractor));

        Self {
            operations: OperationService::new(limits),
            pipeline: Mutex::new(build_operation_pipeline(router)),
        }
    }

    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.upload.clone(), Adapters::from_config(config))
    }

    /// Runs one operation end to end.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ErrorResponse`] for any failure.
    pub async fn handle(&self, kind: OperationKind, payload: &Value) -> Result<Value, ErrorResponse> {
        self.dispatch(kind, payload).await.map_err(|err| {
            let response = classify(&err);
            debug!(operation = %kind, kind = %response.error_kind, "operation failed");
            response
        })
    }

    /// Like [`Controller::handle`], resolving the operation by name first.
    ///
    /// # Errors
    ///
    /// Unknown names fail as validation errors.
    pub async fn handle_named(&self, name: &str, payload: &Value) -> Result<Value, ErrorResponse> {
        match name.parse::<OperationKind>() {
            Ok(kind) => self.handle(kind, payload).await,
            Err(err) => Err(classify(&err.into())),
        }
    }

    async fn dispatch(&self, kind: OperationKind, payload: &Value) -> Result<Value, DispatchError> {
        let op = self.operations.classify(kind, payload)?;
        let pipeline = self.pipeline.lock().clone();
        let response = pipeline.oneshot(op).await?;
        response
            .into_json()
            .map_err(|e| DispatchError::from(anyhow::Error::from(e)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use dts_core::ErrorKind;
    use serde_json::json;

    use super::*;
    use crate::service::domain::tests::{EchoTranslator, FirstWordsSummarizer, Utf8Extractor};

    pub(crate) fn stub_adapters() -> Adapters {
        Adapters {
            translator: Arc::new(EchoTranslator),
            summarizer: Arc::new(FirstWordsSummarizer),
            extractor: Arc::new(Utf8Extractor),
        }
    }

    fn controller() -> Controller {
        Controller::new(UploadLimits::default(), stub_adapters())
    }

    #[tokio::test]
    async fn summarize_end_to_end() {
        let text = "The quick brown fox jumps over the lazy dog";
        let body = controller()
            .handle(
                OperationKind::Summarize,
                &json!({"text": text, "method": "brief", "sentences_count": 2}),
            )
            .await
            .unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["summary"], "The quick");
        assert_eq!(body["method"], "brief");
        assert_eq!(body["sentences_count"], 2);
        assert_eq!(body["original_length"], 9);
        assert_eq!(body["model"], "first-words");
    }

    #[tokio::test]
    async fn translate_same_language_is_validation_error() {
        let err = controller()
            .handle(
                OperationKind::Translate,
                &json!({"text": "hi", "target_lang": "en", "source_lang": "en"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::ValidationError);
        assert_eq!(err.status_code, 400);
    }

    #[tokio::test]
    async fn zip_upload_rejected_before_extraction() {
        let err = controller()
            .handle(
                OperationKind::Upload,
                &json!({"file_data": "UEsDBA==", "file_type": "application/zip", "file_name": "a.zip"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn undecodable_text_is_file_processing_error() {
        // 0xFF 0xFE 0xFD
        let err = controller()
            .handle(
                OperationKind::Upload,
                &json!({"file_data": "//79", "file_type": "text/plain", "file_name": "a.txt"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::FileProcessingError);
        assert_eq!(err.status_code, 400);
    }

    #[tokio::test]
    async fn upload_returns_text_and_length() {
        // "hello there"
        let body = controller()
            .handle(
                OperationKind::Upload,
                &json!({"file_data": "aGVsbG8gdGhlcmU=", "file_type": "text/plain", "file_name": "a.txt"}),
            )
            .await
            .unwrap();
        assert_eq!(body["extracted_text"], "hello there");
        assert_eq!(body["text_length"], 2);
        assert_eq!(body["file_name"], "a.txt");
    }

    #[tokio::test]
    async fn listings() {
        let c = controller();
        let languages = c.handle(OperationKind::Languages, &Value::Null).await.unwrap();
        assert_eq!(languages["supported_languages"]["en"], "영어");
        let methods = c.handle_named("summary_methods", &Value::Null).await.unwrap();
        assert!(methods["methods"]["detailed"].is_string());
        assert!(methods["methods"]["brief"].is_string());
    }

    #[tokio::test]
    async fn unknown_operation_name_fails_validation() {
        let err = controller().handle_named("ocr", &json!({})).await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn unconfigured_llm_is_internal_error() {
        let c = Controller::from_config(&ServiceConfig::default());
        let err = c
            .handle(OperationKind::Translate, &json!({"text": "hi", "target_lang": "ko"}))
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::InternalError);
        assert_eq!(err.error, crate::service::error::INTERNAL_ERROR_MESSAGE);
    }
}
