//! Pipeline composition: wraps the router with the operation middleware.

use tower::util::BoxCloneService;
use tower::{ServiceBuilder, ServiceExt};

use super::metrics::MetricsLayer;
use crate::service::operation::{Operation, OperationError, OperationResponse};
use crate::service::router::OperationRouter;

/// The composed, type-erased operation pipeline.
pub type OperationPipeline = BoxCloneService<Operation, OperationResponse, OperationError>;

/// Build the operation pipeline by wrapping the `OperationRouter` with middleware layers.
///
/// `MetricsLayer` sits directly around the router so recorded durations cover
/// only domain work. Request deadlines are enforced by the transport layer.
#[must_use]
pub fn build_operation_pipeline(router: OperationRouter) -> OperationPipeline {
    ServiceBuilder::new()
        .layer(MetricsLayer)
        .service(router)
        .boxed_clone()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dts_core::{Language, TranslationRequest};

    use super::*;
    use crate::service::domain::tests::EchoTranslator;
    use crate::service::domain::TranslationService;
    use crate::service::operation::{service_names, OperationContext};

    #[tokio::test]
    async fn pipeline_routes_through_all_layers() {
        let mut router = OperationRouter::new();
        router.register(
            service_names::TRANSLATION,
            TranslationService::new(Arc::new(EchoTranslator)),
        );

        let svc = build_operation_pipeline(router);
        let request = TranslationRequest::new("hi", Language::Auto, Language::Ja).unwrap();
        let resp = svc
            .oneshot(Operation::Translate {
                ctx: OperationContext::new(42, service_names::TRANSLATION),
                request,
            })
            .await
            .unwrap();
        assert!(matches!(
            resp,
            OperationResponse::Translation(ref r) if r.translated_text == "[ja] hi"
        ));
    }

    #[tokio::test]
    async fn unregistered_service_surfaces_as_error() {
        let svc = build_operation_pipeline(OperationRouter::new());
        let err = svc
            .oneshot(Operation::ListLanguages {
                ctx: OperationContext::new(1, service_names::TRANSLATION),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::UnknownService { .. }));
    }
}
