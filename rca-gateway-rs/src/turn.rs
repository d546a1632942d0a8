// rca-gateway-rs/src/turn.rs
// Classifies each RCA conversation turn and forwards it to the analysis backend.
//
// Nothing is retained between turns: the client sends the accumulated form
// data every time and each call builds a fresh Draft from it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types_rs::{Draft, Suggestion};
use tracing::instrument;

use crate::analysis_client::AnalysisBackend;
use crate::error::GatewayError;
use crate::reshape::FinalizeOutcome;

/// Inbound turn payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnRequest {
    #[serde(rename = "isFinal", default)]
    pub is_final: bool,
    #[serde(rename = "formData", default)]
    pub form_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TurnReply {
    Suggestion(Suggestion),
    Finalized(FinalizeOutcome),
}

#[derive(Clone)]
pub struct TurnHandler {
    backend: Arc<dyn AnalysisBackend>,
}

impl TurnHandler {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    #[instrument(name = "rca_turn", skip(self, request), fields(session_id = %session_id, is_final = request.is_final))]
    pub async fn handle(&self, session_id: &str, request: TurnRequest) -> Result<TurnReply, GatewayError> {
        if request.is_final {
            self.finalize(session_id, request.form_data)
                .await
                .map(TurnReply::Finalized)
        } else {
            self.continue_turn(session_id, request.form_data)
                .await
                .map(TurnReply::Suggestion)
        }
    }

    /// Missing fields default; fields of the wrong type reject the turn.
    pub async fn continue_turn(&self, session_id: &str, form_data: Value) -> Result<Suggestion, GatewayError> {
        let draft = Draft::from_form_data(form_data)
            .map_err(|e| GatewayError::InvalidFormData(e.to_string()))?
            .tagged(session_id, false);

        Ok(self.backend.refine_continue(draft).await?)
    }

    /// Always issues exactly one backend call; unreadable form data is
    /// replaced by the sentinel draft.
    pub async fn finalize(&self, session_id: &str, form_data: Value) -> Result<FinalizeOutcome, GatewayError> {
        let draft = match Draft::from_form_data(form_data) {
            Ok(draft) => draft.tagged(session_id, true),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable formData on finalize, submitting sentinel draft");
                Draft::sentinel(session_id)
            }
        };

        let outcome = self.backend.refine_final(draft).await?;
        tracing::info!(
            with_report = matches!(outcome, FinalizeOutcome::Report { .. }),
            "rca finalized"
        );
        Ok(outcome)
    }
}
