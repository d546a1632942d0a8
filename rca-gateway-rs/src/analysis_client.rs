// rca-gateway-rs/src/analysis_client.rs
//
// HTTP client for the external analysis backend.
//
// Behaviour:
// - One POST per call, bounded by `analysis.request_timeout_secs`. No retries.
// - Timeouts surface as `ProxyError::Timeout`; other transport failures as
//   `ProxyError::Network`.
// - Non-2xx answers surface as `ProxyError::UpstreamStatus` with the body.
// - Bodies are read as text first so every failure can carry the raw response.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{de::DeserializeOwned, Serialize};
use shared_types_rs::{AnalysisConfig, Draft, Suggestion};
use tracing::instrument;

use crate::error::ProxyError;
use crate::prediction::{PredictionRequest, PredictionResponse, SimilarCasesResponse};
use crate::reshape::{classify_finalize_body, FinalizeOutcome};

/// Calls the gateway makes against the analysis backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// CONTINUE turn: the backend answers with a suggested draft.
    async fn refine_continue(&self, draft: Draft) -> Result<Suggestion, ProxyError>;

    /// FINALIZE turn.
    async fn refine_final(&self, draft: Draft) -> Result<FinalizeOutcome, ProxyError>;

    async fn predict(&self, request: PredictionRequest) -> Result<PredictionResponse, ProxyError>;

    async fn similar_cases(
        &self,
        request: PredictionRequest,
    ) -> Result<SimilarCasesResponse, ProxyError>;
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    config: AnalysisConfig,
}

impl AnalysisClient {
    pub fn new(config: AnalysisConfig) -> Result<Self, ProxyError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ProxyError::Network(format!("failed to build HTTP client: {}", e)))?;

        tracing::info!(
            base_url = %config.base_url,
            timeout_secs = config.request_timeout_secs,
            "analysis client initialized"
        );
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// POST `payload` and return the body of a 2xx response.
    async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<String, ProxyError> {
        let url = self.config.endpoint(path);
        let bytes = serde_json::to_vec(payload).map_err(|e| ProxyError::Serialize(e.to_string()))?;

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(bytes)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "analysis service returned an error status");
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(%url, bytes = body.len(), "analysis service responded");
        Ok(body)
    }

    async fn post_parsed<T, R>(&self, path: &str, payload: &T) -> Result<R, ProxyError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = self.post(path, payload).await?;
        serde_json::from_str(&body).map_err(|e| ProxyError::Parse {
            detail: e.to_string(),
            body,
        })
    }
}

fn classify_transport_error(err: reqwest::Error) -> ProxyError {
    if err.is_timeout() {
        ProxyError::Timeout(err.to_string())
    } else {
        ProxyError::Network(err.to_string())
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    #[instrument(name = "refine_continue", skip(self, draft), fields(session_id = %draft.session_id))]
    async fn refine_continue(&self, draft: Draft) -> Result<Suggestion, ProxyError> {
        let body = self.post(&self.config.refine_path, &draft).await?;
        serde_json::from_str(&body).map_err(|e| ProxyError::SuggestionFormat {
            detail: e.to_string(),
            body,
        })
    }

    #[instrument(name = "refine_final", skip(self, draft), fields(session_id = %draft.session_id))]
    async fn refine_final(&self, draft: Draft) -> Result<FinalizeOutcome, ProxyError> {
        let body = self.post(&self.config.refine_path, &draft).await?;
        classify_finalize_body(&body)
    }

    #[instrument(skip(self, request), fields(history = request.historical_cases.len()))]
    async fn predict(&self, request: PredictionRequest) -> Result<PredictionResponse, ProxyError> {
        self.post_parsed(&self.config.predict_path, &request).await
    }

    #[instrument(skip(self, request), fields(history = request.historical_cases.len()))]
    async fn similar_cases(
        &self,
        request: PredictionRequest,
    ) -> Result<SimilarCasesResponse, ProxyError> {
        self.post_parsed(&self.config.similar_cases_path, &request).await
    }
}
