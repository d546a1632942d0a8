// rca-gateway-rs/src/reshape.rs
// Classification of FINALIZE responses from the analysis backend.
//
// Backend versions have answered FINALIZE with different shapes. They are
// tried richest first:
//   1. {status:"success", rca_report, data}
//   2. {status:"success"}
//   3. a strict string map whose `status` decides success or rejection
// A body none of them can read is a parse error carrying the raw text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::ProxyError;

pub const SUCCESS: &str = "success";

/// What a successful FINALIZE relays to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    Report { rca_report: String, data: Value },
    Success,
}

#[derive(Serialize)]
struct FinalizeReply<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rca_report: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
}

impl Serialize for FinalizeOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let reply = match self {
            FinalizeOutcome::Report { rca_report, data } => FinalizeReply {
                status: SUCCESS,
                rca_report: Some(rca_report),
                data: Some(data),
            },
            FinalizeOutcome::Success => FinalizeReply {
                status: SUCCESS,
                rca_report: None,
                data: None,
            },
        };
        reply.serialize(serializer)
    }
}

#[derive(Deserialize)]
struct ReportShape {
    status: String,
    rca_report: String,
    data: Value,
}

#[derive(Deserialize)]
struct StatusShape {
    status: String,
}

/// Classify a 2xx FINALIZE body.
pub fn classify_finalize_body(body: &str) -> Result<FinalizeOutcome, ProxyError> {
    if let Ok(report) = serde_json::from_str::<ReportShape>(body) {
        if report.status == SUCCESS {
            return Ok(FinalizeOutcome::Report {
                rca_report: report.rca_report,
                data: report.data,
            });
        }
    }

    let status_only = serde_json::from_str::<StatusShape>(body).ok();
    if matches!(&status_only, Some(shape) if shape.status == SUCCESS) {
        return Ok(FinalizeOutcome::Success);
    }

    match serde_json::from_str::<HashMap<String, String>>(body) {
        Ok(map) if map.get("status").map(String::as_str) == Some(SUCCESS) => {
            Ok(FinalizeOutcome::Success)
        }
        Ok(_) => Err(ProxyError::Rejected {
            body: body.to_string(),
        }),
        // A readable status that is not success is a rejection even when other
        // fields are not strings.
        Err(_) if status_only.is_some() => Err(ProxyError::Rejected {
            body: body.to_string(),
        }),
        Err(e) => Err(ProxyError::Parse {
            detail: e.to_string(),
            body: body.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rich_shape_is_relayed_whole() {
        let outcome =
            classify_finalize_body(r#"{"status":"success","rca_report":"R","data":{"x":1}}"#)
                .unwrap();
        assert_eq!(
            outcome,
            FinalizeOutcome::Report {
                rca_report: "R".to_string(),
                data: json!({"x": 1})
            }
        );
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "success", "rca_report": "R", "data": {"x": 1}})
        );
    }

    #[test]
    fn bare_success_shape() {
        let outcome = classify_finalize_body(r#"{"status":"success"}"#).unwrap();
        assert_eq!(outcome, FinalizeOutcome::Success);
        assert_eq!(serde_json::to_value(&outcome).unwrap(), json!({"status": "success"}));
    }

    #[test]
    fn success_with_partial_report_degrades_to_bare() {
        let outcome = classify_finalize_body(r#"{"status":"success","rca_report":"R"}"#).unwrap();
        assert_eq!(outcome, FinalizeOutcome::Success);
    }

    #[test]
    fn non_success_status_is_rejected_with_body() {
        let err = classify_finalize_body(r#"{"status":"fail"}"#).unwrap_err();
        match err {
            ProxyError::Rejected { body } => assert_eq!(body, r#"{"status":"fail"}"#),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = classify_finalize_body(r#"{"message":"nope"}"#).unwrap_err();
        assert!(matches!(err, ProxyError::Rejected { .. }));

        let err = classify_finalize_body(r#"{"status":"error","data":{"code":7}}"#).unwrap_err();
        assert!(matches!(err, ProxyError::Rejected { .. }));
    }

    #[test]
    fn unreadable_body_is_a_parse_error() {
        let err = classify_finalize_body("<html>502 Bad Gateway</html>").unwrap_err();
        match err {
            ProxyError::Parse { detail, body } => {
                assert!(!detail.is_empty());
                assert_eq!(body, "<html>502 Bad Gateway</html>");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = classify_finalize_body(r#"{"status":1}"#).unwrap_err();
        assert!(matches!(err, ProxyError::Parse { .. }));
    }
}
