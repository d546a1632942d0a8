// rca-gateway-rs/src/prediction.rs
// Payloads for the prediction and similar-case lookups.

use std::collections::BTreeMap;

use case_store::{CaseAttributes, TicketForm};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body posted to `/predict` and `/search_similar_cases`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub description: String,
    pub new_case: CaseAttributes,
    pub historical_cases: Vec<CaseAttributes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub predictions: BTreeMap<String, String>,
    #[serde(rename = "rcaSuggestion", default)]
    pub rca_suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCasesResponse {
    #[serde(rename = "similarCases", default)]
    pub similar_cases: Vec<Value>,
}

/// Inbound lookup request: the case form plus an optional free-text description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseLookupRequest {
    #[serde(rename = "description", default)]
    pub query: Option<String>,
    #[serde(flatten)]
    pub form: TicketForm,
}

impl CaseLookupRequest {
    /// Text the backend searches with: the explicit description, else the case
    /// description, else its subject.
    pub fn search_text(&self) -> String {
        [
            self.query.as_deref(),
            Some(self.form.description.as_str()),
            Some(self.form.subject.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
    }
}
