//! Tower middleware layers for the operation pipeline.
//!
//! - [`metrics`]: Operation timing, counting and logging
//! - [`pipeline`]: Composes the layers around the router

pub mod metrics;
pub mod pipeline;

pub use metrics::MetricsLayer;
pub use pipeline::{build_operation_pipeline, OperationPipeline};
