//! Domain services.
//!
//! Each service is a cheap-to-clone `tower::Service<Operation>` holding its
//! adapter behind an `Arc`. It turns the adapter's raw output into a typed
//! result model; adapter failures propagate untouched for classification.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use dts_core::{Document, Language, SummaryMethod, SummaryResult, TranslationResult};
use tower::Service;

use crate::adapters::{Summarizer, TextExtractor, Translator};
use crate::service::operation::{Operation, OperationError, OperationResponse};

type BoxedFuture = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

fn wrong_service(op: &Operation, service: &'static str) -> BoxedFuture {
    let err = anyhow::anyhow!("operation {} routed to {service}", op.name());
    Box::pin(async move { Err(OperationError::Internal(err)) })
}

// ---------------------------------------------------------------------------
// TranslationService
// ---------------------------------------------------------------------------

/// Handles `Translate` and `ListLanguages`.
#[derive(Clone)]
pub struct TranslationService {
    translator: Arc<dyn Translator>,
}

impl TranslationService {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }
}

impl Service<Operation> for TranslationService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = BoxedFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        match op {
            Operation::Translate { request, .. } => {
                let translator = Arc::clone(&self.translator);
                Box::pin(async move {
                    let translated = translator.translate(&request).await?;
                    Ok(OperationResponse::Translation(TranslationResult::from_request(
                        &request,
                        translated,
                        translator.model_name(),
                    )))
                })
            }
            Operation::ListLanguages { .. } => {
                Box::pin(async { Ok(OperationResponse::Languages(&Language::SUPPORTED)) })
            }
            other => wrong_service(&other, "translation"),
        }
    }
}

// ---------------------------------------------------------------------------
// SummaryService
// ---------------------------------------------------------------------------

/// Handles `Summarize` and `ListSummaryMethods`.
#[derive(Clone)]
pub struct SummaryService {
    summarizer: Arc<dyn Summarizer>,
}

impl SummaryService {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }
}

impl Service<Operation> for SummaryService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = BoxedFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        match op {
            Operation::Summarize { request, .. } => {
                let summarizer = Arc::clone(&self.summarizer);
                Box::pin(async move {
                    let summary = summarizer.summarize(&request).await?;
                    Ok(OperationResponse::Summary(SummaryResult::from_request(
                        &request,
                        summary,
                        summarizer.model_name(),
                    )))
                })
            }
            Operation::ListSummaryMethods { .. } => {
                Box::pin(async { Ok(OperationResponse::SummaryMethods(&SummaryMethod::ALL)) })
            }
            other => wrong_service(&other, "summary"),
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentService
// ---------------------------------------------------------------------------

/// Handles `ExtractDocument`.
#[derive(Clone)]
pub struct DocumentService {
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentService {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }
}

impl Service<Operation> for DocumentService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = BoxedFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        match op {
            Operation::ExtractDocument { upload, .. } => {
                let extractor = Arc::clone(&self.extractor);
                Box::pin(async move {
                    let mut doc = Document::new(upload.file_name, upload.file_type, upload.bytes)
                        .map_err(|e| anyhow::anyhow!("validated upload rejected: {e}"))?;
                    let text = extractor.extract(doc.file_type(), doc.raw_bytes()).await?;
                    doc.set_extracted_text(text);
                    Ok(OperationResponse::Document(doc))
                })
            }
            other => wrong_service(&other, "document"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
