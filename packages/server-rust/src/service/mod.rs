//! Operation routing and execution framework.
//!
//! This module implements the service-oriented operation pipeline:
//!
//! 1. **Classification** (`classify`): name + JSON payload -> validated `Operation`
//! 2. **Middleware** (`middleware`): Tower layers (metrics)
//! 3. **Routing** (`router`): Dispatch to domain services by `service_name`
//! 4. **Domain services** (`domain`): translation, summary, document
//! 5. **Error classification** (`error`): failures -> `ErrorResponse`
//! 6. **Controller** (`controller`): the catch boundary tying 1-5 together

pub mod classify;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod operation;
pub mod router;

// Re-export key types for convenient access.
pub use classify::{OperationKind, OperationService};
pub use config::ServiceConfig;
pub use controller::{Adapters, Controller};
pub use error::{classify as classify_error, DispatchError};
pub use operation::{
    service_names, Operation, OperationContext, OperationError, OperationResponse,
};
pub use router::OperationRouter;
