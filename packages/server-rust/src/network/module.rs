//! Network module with deferred startup lifecycle.
//!
//! `new()` allocates shared state, `start()` binds the TCP listener and
//! `serve()` accepts connections until the shutdown future resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    callback_handler, health_handler, languages_handler, liveness_handler, login_handler,
    logout_handler, readiness_handler, summarize_handler, summary_methods_handler,
    translate_handler, upload_handler, verify_handler, AppState,
};
use super::middleware::apply_http_layers;
use super::shutdown::{track_in_flight, ShutdownController};
use crate::auth::Authenticator;
use crate::service::Controller;

/// How long `serve()` waits for in-flight requests after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the HTTP server lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    controller: Arc<Controller>,
    auth: Arc<Authenticator>,
    shutdown: Arc<ShutdownController>,
    start_time: Instant,
}

impl NetworkModule {
    #[must_use]
    pub fn new(config: NetworkConfig, controller: Arc<Controller>, auth: Arc<Authenticator>) -> Self {
        Self {
            config,
            listener: None,
            controller,
            auth,
            shutdown: Arc::new(ShutdownController::new()),
            start_time: Instant::now(),
        }
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// API and auth routes are served at the root and again under `/api`:
    /// - `POST /translate`, `GET /translate`
    /// - `POST /summarize`, `GET /summarize`
    /// - `POST /upload`
    /// - `GET /auth/google`, `GET /auth/google/callback`
    /// - `POST /auth/verify`, `POST /auth/logout`
    ///
    /// Health probes live at the root only: `GET /health`, `/health/live`,
    /// `/health/ready`.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            controller: Arc::clone(&self.controller),
            auth: Arc::clone(&self.auth),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::new(self.config.clone()),
            start_time: self.start_time,
        };

        let api = Router::new()
            .route("/translate", post(translate_handler).get(languages_handler))
            .route("/summarize", post(summarize_handler).get(summary_methods_handler))
            .route("/upload", post(upload_handler))
            .route("/auth/google", get(login_handler))
            .route("/auth/google/callback", get(callback_handler))
            .route("/auth/verify", post(verify_handler))
            .route("/auth/logout", post(logout_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), track_in_flight));

        let router = Router::new()
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .merge(api.clone())
            .nest("/api", api);

        apply_http_layers(router.with_state(state), &self.config)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which differs from the configured one
    /// when port 0 is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// # Errors
    ///
    /// Fails if `start()` was not called first or the server hits a fatal
    /// I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;
        let router = self.build_router();
        let shutdown_ctrl = Arc::clone(&self.shutdown);

        shutdown_ctrl.set_ready();
        info!("Serving HTTP connections");

        let signal_ctrl = Arc::clone(&shutdown_ctrl);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                signal_ctrl.trigger_shutdown();
            })
            .await?;

        if shutdown_ctrl.wait_for_drain(DRAIN_TIMEOUT).await {
            info!("All requests drained");
        } else {
            warn!(
                in_flight = shutdown_ctrl.in_flight_count(),
                "Drain timeout expired with in-flight requests remaining"
            );
        }
        Ok(())
    }
}
