// case-store-rs/src/history.rs
// Flat attribute maps sent to the prediction backend.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::repository::{CaseRepository, RepositoryError};
use crate::ticket::Ticket;

pub type CaseAttributes = BTreeMap<String, Value>;

/// Project a ticket into the flat map the prediction endpoints index.
///
/// Unsaved tickets (id 0) carry no `ID` / `CaseNumber` keys.
pub fn project_case(ticket: &Ticket) -> CaseAttributes {
    let mut map = CaseAttributes::new();
    let mut put = |key: &str, value: Value| {
        map.insert(key.to_string(), value);
    };

    if ticket.id > 0 {
        put("ID", Value::from(ticket.id));
        put("CaseNumber", Value::from(ticket.case_number.clone()));
    }

    let summary = if ticket.summary.trim().is_empty() {
        ticket.subject.clone()
    } else {
        ticket.summary.clone()
    };

    put("Subject", Value::from(ticket.subject.clone()));
    put("Summary", Value::from(summary));
    put("Description", Value::from(ticket.description.clone()));
    put("Category", Value::from(ticket.category_name.clone()));
    put("CategoryName", Value::from(ticket.category_name.clone()));
    put("Task", Value::from(ticket.task_name.clone()));
    put("TaskName", Value::from(ticket.task_name.clone()));
    put("Priority", Value::from(ticket.severity_label.clone()));
    put("Severity", Value::from(ticket.severity_label.clone()));
    put("PREFERENCE", Value::from(ticket.preference_code));
    put("PreferenceLevel", Value::from(ticket.preference_label.clone()));
    put("Status", Value::from(ticket.status_label.clone()));
    put("DefectPhase", Value::from(ticket.defect_phase.clone()));
    put("RCAReport", Value::from(ticket.rca_report.clone()));

    map
}

/// Up to `limit` recent cases with an RCA report, or the `limit` most recent
/// cases when none has one.
pub async fn historical_cases<R>(repo: &R, limit: usize) -> Result<Vec<CaseAttributes>, RepositoryError>
where
    R: CaseRepository + ?Sized,
{
    let mut cases = repo.recent_with_report(limit).await?;
    if cases.is_empty() {
        tracing::debug!(limit, "no cases carry an RCA report, using most recent cases");
        cases = repo.recent(limit).await?;
    }
    Ok(cases.iter().map(project_case).collect())
}
