//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the public and admin handlers
//! - Wire up middleware (timeout, request ID, tracing)
//! - Apply config reloads to the static registry
//! - Serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::State,
    http::HeaderMap,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::RelayConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer, GenerateRequest};
use crate::http::response::{map_request_timeout, ErrorResponse, GenerateResponse};
use crate::orchestrator::FallbackOrchestrator;
use crate::registry::{build_registry, StaticRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<FallbackOrchestrator>,
    /// Present when backends come from the config file.
    pub static_registry: Option<Arc<StaticRegistry>>,
    /// Current configuration, swapped on reload.
    pub config: Arc<ArcSwap<RelayConfig>>,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        let (registry, static_registry) = build_registry(&config);
        let orchestrator = Arc::new(FallbackOrchestrator::from_config(&config, registry));
        Self {
            orchestrator,
            static_registry,
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Apply a reloaded configuration.
    ///
    /// Only the backend set and admin key take effect; resilience settings
    /// need a restart.
    pub fn apply_config(&self, config: RelayConfig) {
        if let Some(registry) = &self.static_registry {
            registry.reload(&config.backends);
        }
        self.config.store(Arc::new(config));
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        Self::from_state(AppState::new(config))
    }

    pub fn from_state(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.load_full();

        let mut router = Router::new()
            .route("/v1/generate", post(generate_handler))
            .route("/health", get(health_handler))
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(setup_admin_router(state));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(middleware::map_response(map_request_timeout))
                .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs))),
        )
    }

    /// The router, for serving on a caller-owned listener or in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RelayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.apply_config(config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Public generation endpoint.
async fn generate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let request_id = request_id(&headers);
    if request.prompt.trim().is_empty() {
        return ErrorResponse::bad_request("prompt must not be empty");
    }

    tracing::debug!(request_id = %request_id, prompt_chars = request.prompt.chars().count(), "Generate request");

    match state.orchestrator.generate(&request.prompt).await {
        Ok(generation) => Json(GenerateResponse {
            text: generation.text,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                kind = e.kind().as_str(),
                trace = %e.diagnostics().trace(),
                "Generation failed"
            );
            e.into_response()
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}
