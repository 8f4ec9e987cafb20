//! Typed operations flowing through the service pipeline.

use dts_core::{
    Document, Language, SummaryMethod, SummaryRequest, SummaryResult, TranslationRequest,
    TranslationResult, UploadRequest,
};
use serde_json::{json, Map, Value};

use crate::adapters::AdapterError;

/// Domain service names used for routing.
pub mod service_names {
    pub const TRANSLATION: &str = "translation";
    pub const SUMMARY: &str = "summary";
    pub const DOCUMENT: &str = "document";
}

/// Context carried with every operation through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    pub call_id: u64,
    pub service_name: &'static str,
}

impl OperationContext {
    #[must_use]
    pub fn new(call_id: u64, service_name: &'static str) -> Self {
        Self {
            call_id,
            service_name,
        }
    }
}

/// Typed operation variants dispatched through the pipeline.
///
/// Payload-carrying variants hold already-validated requests.
#[derive(Debug)]
pub enum Operation {
    Translate {
        ctx: OperationContext,
        request: TranslationRequest,
    },
    ListLanguages {
        ctx: OperationContext,
    },
    Summarize {
        ctx: OperationContext,
        request: SummaryRequest,
    },
    ListSummaryMethods {
        ctx: OperationContext,
    },
    ExtractDocument {
        ctx: OperationContext,
        upload: UploadRequest,
    },
}

impl Operation {
    #[must_use]
    pub fn ctx(&self) -> &OperationContext {
        match self {
            Self::Translate { ctx, .. }
            | Self::ListLanguages { ctx }
            | Self::Summarize { ctx, .. }
            | Self::ListSummaryMethods { ctx }
            | Self::ExtractDocument { ctx, .. } => ctx,
        }
    }

    /// Stable name used in logs and metric labels.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Translate { .. } => "translate",
            Self::ListLanguages { .. } => "languages",
            Self::Summarize { .. } => "summarize",
            Self::ListSummaryMethods { .. } => "summary_methods",
            Self::ExtractDocument { .. } => "upload",
        }
    }
}

/// Successful response from a domain service.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResponse {
    Translation(TranslationResult),
    Languages(&'static [Language]),
    Summary(SummaryResult),
    SummaryMethods(&'static [SummaryMethod]),
    Document(Document),
}

impl OperationResponse {
    /// Success payload sent to the client, always carrying `"success": true`.
    ///
    /// # Errors
    ///
    /// Fails only if a result cannot be serialized.
    pub fn into_json(self) -> Result<Value, serde_json::Error> {
        let body = match self {
            Self::Translation(result) => with_success(serde_json::to_value(result)?),
            Self::Summary(result) => with_success(serde_json::to_value(result)?),
            Self::Languages(languages) => {
                let table: Map<String, Value> = languages
                    .iter()
                    .map(|l| (l.code().to_string(), Value::from(l.label())))
                    .collect();
                json!({ "success": true, "supported_languages": table })
            }
            Self::SummaryMethods(methods) => {
                let table: Map<String, Value> = methods
                    .iter()
                    .map(|m| (m.as_str().to_string(), Value::from(m.description())))
                    .collect();
                json!({ "success": true, "methods": table })
            }
            Self::Document(doc) => json!({
                "success": true,
                "file_name": doc.file_name(),
                "file_type": doc.file_type().mime(),
                "extracted_text": doc.extracted_text(),
                "text_length": doc.text_length(),
            }),
        };
        Ok(body)
    }
}

fn with_success(mut value: Value) -> Value {
    if let Value::Object(fields) = &mut value {
        fields.insert("success".to_string(), Value::Bool(true));
    }
    value
}

/// Errors returned by operation handlers.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("unknown service: {name}")]
    UnknownService { name: String },
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
