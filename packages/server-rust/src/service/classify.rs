//! Request classification: turns an operation name plus raw JSON payload into
//! a typed, validated [`Operation`].

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use dts_core::{RequestKind, UploadLimits, ValidatedRequest, ValidationError, Validator};
use serde_json::Value;

use super::operation::{service_names, Operation, OperationContext};

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// Operation names accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Translate,
    Languages,
    Summarize,
    SummaryMethods,
    Upload,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Translate,
        OperationKind::Languages,
        OperationKind::Summarize,
        OperationKind::SummaryMethods,
        OperationKind::Upload,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Languages => "languages",
            Self::Summarize => "summarize",
            Self::SummaryMethods => "summary_methods",
            Self::Upload => "upload",
        }
    }

    /// Domain service that handles this operation.
    #[must_use]
    pub fn service_name(self) -> &'static str {
        match self {
            Self::Translate | Self::Languages => service_names::TRANSLATION,
            Self::Summarize | Self::SummaryMethods => service_names::SUMMARY,
            Self::Upload => service_names::DOCUMENT,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::new(format!("unknown operation: {s}")))
    }
}

// ---------------------------------------------------------------------------
// OperationService
// ---------------------------------------------------------------------------

/// Validates payloads and wraps them into `Operation` values.
///
/// Each call gets a unique, monotonically increasing call ID.
pub struct OperationService {
    validator: Validator,
    call_id_counter: AtomicU64,
}

impl OperationService {
    #[must_use]
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            validator: Validator::new(limits),
            call_id_counter: AtomicU64::new(1),
        }
    }

    fn make_ctx(&self, kind: OperationKind) -> OperationContext {
        let call_id = self.call_id_counter.fetch_add(1, Ordering::Relaxed);
        OperationContext::new(call_id, kind.service_name())
    }

    /// Classify a payload into an `Operation`.
    ///
    /// Listing operations ignore the payload.
    ///
    /// # Errors
    ///
    /// Returns the validator's `ValidationError` for payload-carrying
    /// operations whose input is missing, malformed, or out of range.
    pub fn classify(
        &self,
        kind: OperationKind,
        payload: &Value,
    ) -> Result<Operation, ValidationError> {
        let request_kind = match kind {
            OperationKind::Languages => {
                return Ok(Operation::ListLanguages {
                    ctx: self.make_ctx(kind),
                })
            }
            OperationKind::SummaryMethods => {
                return Ok(Operation::ListSummaryMethods {
                    ctx: self.make_ctx(kind),
                })
            }
            OperationKind::Translate => RequestKind::Translate,
            OperationKind::Summarize => RequestKind::Summarize,
            OperationKind::Upload => RequestKind::Upload,
        };

        let validated = self.validator.validate(request_kind, payload)?;
        let ctx = self.make_ctx(kind);
        Ok(match validated {
            ValidatedRequest::Translation(request) => Operation::Translate { ctx, request },
            ValidatedRequest::Summary(request) => Operation::Summarize { ctx, request },
            ValidatedRequest::Upload(upload) => Operation::ExtractDocument { ctx, upload },
        })
    }
}
