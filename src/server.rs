//! # Server Configuration
//!
//! Router assembly, shared application state and the serve loop for the
//! object catalog API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers::{ai, analyses, health, objects, relationships};
use crate::orchestrator::{AgentStrategy, CannedOrchestrator};
use crate::telemetry::trace_context_middleware;
use crate::token_verification::{TokenVerifier, build_verifier};

pub const API_PREFIX: &str = "/api/v1";

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub verifier: Arc<dyn TokenVerifier>,
    pub orchestrator: Arc<dyn AgentStrategy>,
}

impl AppState {
    /// Wires the verifier and orchestrator selected by `config`.
    pub fn from_config(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        let verifier = build_verifier(&config).context("Failed to build token verifier")?;
        let orchestrator = Arc::new(CannedOrchestrator::new(Duration::from_millis(
            config.agent_step_delay_ms,
        )));

        Ok(Self {
            config: Arc::new(config),
            db,
            verifier,
            orchestrator,
        })
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let health_routes = Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready));

    let protected_routes = Router::new()
        .route(
            "/objects",
            get(objects::list_objects).post(objects::create_object),
        )
        .route(
            "/objects/",
            get(objects::list_objects).post(objects::create_object),
        )
        .route(
            "/objects/{object_id}",
            get(objects::get_object)
                .put(objects::update_object)
                .delete(objects::delete_object),
        )
        .route(
            "/objects/{object_id}/relationships",
            get(relationships::list_relationships).post(relationships::create_relationship),
        )
        .route(
            "/analysis/{object_id}",
            get(analyses::list_analyses).post(analyses::create_analysis),
        )
        .route(
            "/analysis/{object_id}/{analysis_id}",
            put(analyses::update_analysis),
        )
        .route("/ai/analyze/{object_id}", post(ai::analyze_object))
        .route("/ai/optimize/{object_id}", post(ai::optimize_object))
        .route("/ai/chat", post(ai::chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .merge(health_routes.clone())
        .merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest(API_PREFIX, api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}

/// Starts the server and serves until Ctrl+C or SIGTERM
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let state = AppState::from_config(config, db)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, %profile, "Object catalog API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    servers((url = "/api/v1")),
    paths(
        health::live,
        health::ready,
        objects::list_objects,
        objects::create_object,
        objects::get_object,
        objects::update_object,
        objects::delete_object,
        analyses::list_analyses,
        analyses::create_analysis,
        analyses::update_analysis,
        relationships::list_relationships,
        relationships::create_relationship,
        ai::analyze_object,
        ai::optimize_object,
        ai::chat,
    ),
    components(
        schemas(
            crate::error::ApiError,
            crate::handlers::types::MessageResponse,
            crate::models::BusinessObjectResponse,
            crate::models::AnalysisResponse,
            crate::models::RelationshipResponse,
            crate::models::ObjectType,
            crate::models::ObjectStatus,
            crate::models::ComplexityLevel,
            crate::models::RelationshipType,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "objects", description = "Business object catalog"),
        (name = "analysis", description = "Analyses recorded against business objects"),
        (name = "relationships", description = "Typed edges between business objects"),
        (name = "ai", description = "Agent-driven analysis, optimization and chat")
    ),
    info(
        title = "Object Catalog API",
        description = "Multi-tenant catalog of business objects with analyses and agent orchestration",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
