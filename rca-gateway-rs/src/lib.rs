// rca-gateway-rs/src/lib.rs
// HTTP gateway for the RCA desk.
//
// Routes:
// - POST /api/rca/turn          multi-turn RCA drafting (CONTINUE / FINALIZE)
// - POST /api/cases/predict     field predictions for a new case
// - POST /api/cases/similar     similar historical cases
// - POST /api/cases             create a case
// - PUT  /api/cases/:id         replace a case
// - GET  /api/cases/:id         view a case
// - GET  /health

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use case_store::{CaseDesk, CaseRepository, FieldNormalizer, InMemoryCaseRepository};
use shared_types_rs::RcaDeskConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod analysis_client;
pub mod error;
pub mod handlers;
pub mod prediction;
pub mod reshape;
pub mod session;
pub mod turn;


pub use analysis_client::{AnalysisBackend, AnalysisClient};
pub use error::{ErrorBody, ErrorPolicy, GatewayError, ProxyError};
pub use prediction::{CaseLookupRequest, PredictionRequest, PredictionResponse, SimilarCasesResponse};
pub use reshape::FinalizeOutcome;
pub use session::{SessionStore, SESSION_COOKIE};
pub use turn::{TurnHandler, TurnReply, TurnRequest};

pub const SERVICE_NAME: &str = "rca-gateway";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub turns: TurnHandler,
    pub backend: Arc<dyn AnalysisBackend>,
    pub cases: CaseDesk,
    pub errors: ErrorPolicy,
    pub history_limit: usize,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        config: &RcaDeskConfig,
        backend: Arc<dyn AnalysisBackend>,
        repository: Arc<dyn CaseRepository + Send + Sync>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            turns: TurnHandler::new(Arc::clone(&backend)),
            backend,
            cases: CaseDesk::new(repository, FieldNormalizer::default()),
            errors: ErrorPolicy::from_config(config),
            history_limit: config.cases.history_limit,
            max_body_bytes: config.gateway.max_request_body_bytes,
        }
    }

    /// State backed by the HTTP analysis client and an in-memory case store.
    pub fn from_config(config: &RcaDeskConfig) -> Result<Self, ProxyError> {
        let client = AnalysisClient::new(config.analysis.clone())?;
        Ok(Self::new(
            config,
            Arc::new(client),
            Arc::new(InMemoryCaseRepository::new()),
        ))
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/rca/turn", post(handlers::rca_turn))
        .route("/api/cases/predict", post(handlers::predict_case))
        .route("/api/cases/similar", post(handlers::similar_cases))
        .route("/api/cases", post(handlers::create_case))
        .route(
            "/api/cases/:id",
            get(handlers::get_case).put(handlers::edit_case),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
