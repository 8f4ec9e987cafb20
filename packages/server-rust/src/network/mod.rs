//! HTTP transport: configuration, routing, middleware and shutdown control.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod shutdown;

pub use config::*;
pub use handlers::AppState;
pub use middleware::apply_http_layers;
pub use module::NetworkModule;
pub use shutdown::*;
