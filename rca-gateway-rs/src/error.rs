// rca-gateway-rs/src/error.rs
// Error taxonomy for the gateway and its caller-visible JSON shape.
//
// Every error leaving the gateway is an `ErrorBody` with at least an `error`
// field. Raw upstream bodies are size-bounded; internal error text is only
// attached when the deployment opts in.

use axum::{http::StatusCode, Json};
use case_store::RepositoryError;
use serde::{Deserialize, Serialize};
use shared_types_rs::RcaDeskConfig;

/// Caller-visible error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            response: None,
            retryable: None,
        }
    }
}

/// How much diagnostic detail error bodies may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPolicy {
    pub expose_details: bool,
    pub max_diagnostic_bytes: usize,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            expose_details: false,
            max_diagnostic_bytes: 1024,
        }
    }
}

impl ErrorPolicy {
    /// Production deployments never expose internal error text.
    pub fn from_config(config: &RcaDeskConfig) -> Self {
        let expose_details = config.gateway.expose_error_details && !config.is_production();
        if config.gateway.expose_error_details && !expose_details {
            tracing::warn!("gateway.expose_error_details ignored in production");
        }
        Self {
            expose_details,
            max_diagnostic_bytes: config.analysis.max_diagnostic_bytes,
        }
    }

    fn details(&self, detail: impl FnOnce() -> String) -> Option<String> {
        self.expose_details.then(detail)
    }

    fn raw(&self, body: &str) -> Option<String> {
        Some(truncate_body(body, self.max_diagnostic_bytes))
    }
}

/// Cut `body` to at most `max` bytes on a char boundary, marking the cut with `…`.
pub fn truncate_body(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

/// Failures talking to the analysis backend.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("analysis service timed out: {0}")]
    Timeout(String),

    #[error("analysis service unreachable: {0}")]
    Network(String),

    #[error("analysis service returned HTTP {status}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invalid formData format: {detail}")]
    SuggestionFormat { detail: String, body: String },

    #[error("failed to parse analysis response: {detail}")]
    Parse { detail: String, body: String },

    #[error("analysis service did not report success")]
    Rejected { body: String },

    #[error("failed to serialize request: {0}")]
    Serialize(String),
}

impl ProxyError {
    /// Only timeouts are worth repeating as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProxyError::Timeout(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn to_body(&self, policy: &ErrorPolicy) -> ErrorBody {
        let mut body = match self {
            ProxyError::Timeout(_) => ErrorBody {
                retryable: Some(true),
                ..ErrorBody::new("Analysis service timed out")
            },
            ProxyError::Network(_) => ErrorBody::new("Failed to reach analysis service"),
            ProxyError::UpstreamStatus { status, body } => ErrorBody {
                response: policy.raw(body),
                ..ErrorBody::new(format!("Analysis service returned HTTP {}", status))
            },
            ProxyError::SuggestionFormat { body, .. } => ErrorBody {
                response: policy.raw(body),
                ..ErrorBody::new("Invalid formData format")
            },
            ProxyError::Parse { body, .. } => ErrorBody {
                response: policy.raw(body),
                ..ErrorBody::new("Failed to parse analysis response")
            },
            ProxyError::Rejected { body } => ErrorBody {
                response: policy.raw(body),
                ..ErrorBody::new("Analysis service did not report success")
            },
            ProxyError::Serialize(_) => ErrorBody::new("Failed to serialize request"),
        };
        body.details = policy.details(|| self.to_string());
        body
    }
}

/// Top-level error for gateway handlers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("Invalid formData format: {0}")]
    InvalidFormData(String),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidJson(_) | GatewayError::InvalidFormData(_) => StatusCode::BAD_REQUEST,
            GatewayError::Proxy(err) => err.status_code(),
            GatewayError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            GatewayError::Repository(RepositoryError::Invalid(_)) => StatusCode::BAD_REQUEST,
        }
    }

    /// Convert to HTTP status code and error body
    pub fn to_response(&self, policy: &ErrorPolicy) -> (StatusCode, Json<ErrorBody>) {
        let body = match self {
            GatewayError::InvalidJson(detail) => ErrorBody {
                details: policy.details(|| detail.clone()),
                ..ErrorBody::new("Invalid JSON format")
            },
            GatewayError::InvalidFormData(detail) => ErrorBody {
                details: policy.details(|| detail.clone()),
                ..ErrorBody::new("Invalid formData format")
            },
            GatewayError::Proxy(err) => err.to_body(policy),
            GatewayError::Repository(RepositoryError::NotFound(id)) => {
                ErrorBody::new(format!("Case {} not found", id))
            }
            GatewayError::Repository(RepositoryError::Invalid(reason)) => {
                ErrorBody::new(format!("Invalid case: {}", reason))
            }
        };

        if self.status_code().is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (self.status_code(), Json(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_body("short", 10), "short");
        assert_eq!(truncate_body("abcdef", 3), "abc…");
        // 'é' is two bytes; cutting at 2 would split it
        assert_eq!(truncate_body("aéb", 2), "a…");
    }

    #[test]
    fn details_hidden_unless_exposed() {
        let err = ProxyError::Parse {
            detail: "expected value at line 1".to_string(),
            body: "<html>".to_string(),
        };
        let hidden = err.to_body(&ErrorPolicy::default());
        assert_eq!(hidden.details, None);
        assert_eq!(hidden.response.as_deref(), Some("<html>"));

        let exposed = err.to_body(&ErrorPolicy {
            expose_details: true,
            ..ErrorPolicy::default()
        });
        assert!(exposed.details.unwrap().contains("expected value"));
    }

    #[test]
    fn production_never_exposes_details() {
        let mut config = RcaDeskConfig::default();
        config.gateway.expose_error_details = true;
        assert!(ErrorPolicy::from_config(&config).expose_details);

        config.system.environment = "production".to_string();
        let policy = ErrorPolicy::from_config(&config);
        assert!(!policy.expose_details);

        let body = ProxyError::Network("connection refused".to_string()).to_body(&policy);
        assert_eq!(body.details, None);
    }

    #[test]
    fn timeout_is_the_only_retryable_error() {
        let timeout = ProxyError::Timeout("deadline".to_string());
        assert!(timeout.is_retryable());
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.to_body(&ErrorPolicy::default()).retryable, Some(true));

        let network = ProxyError::Network("refused".to_string());
        assert!(!network.is_retryable());
        assert_eq!(network.to_body(&ErrorPolicy::default()).retryable, None);
    }

    #[test]
    fn repository_errors_map_to_client_statuses() {
        let missing = GatewayError::from(RepositoryError::NotFound(9));
        let (status, Json(body)) = missing.to_response(&ErrorPolicy::default());
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Case 9 not found");
    }
}
