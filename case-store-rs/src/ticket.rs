// case-store-rs/src/ticket.rs
// Persisted case record and the inbound form it is built from.
//
// Column naming follows the legacy case table: `Priority`/`PriorityName` hold
// the severity pair and `PREFERENCE`/`SeverityName` hold the preference pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalizer::{CodedValue, FieldNormalizer};

/// Reasons a ticket cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("{0} label is empty")]
    MissingLabel(&'static str),

    #[error("a ticket needs a subject, summary or description")]
    NoText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ticket {
    #[serde(rename = "ID")]
    pub id: i64,
    pub case_number: String,
    pub subject: String,
    pub summary: String,
    pub description: String,
    #[serde(rename = "CategoryIDFK")]
    pub category_id: Option<i32>,
    #[serde(rename = "Category")]
    pub category_name: String,
    #[serde(rename = "TaskID")]
    pub task_id: Option<i32>,
    #[serde(rename = "Task")]
    pub task_name: String,
    #[serde(rename = "Priority")]
    pub severity_code: i32,
    #[serde(rename = "PriorityName")]
    pub severity_label: String,
    #[serde(rename = "PREFERENCE")]
    pub preference_code: i32,
    #[serde(rename = "SeverityName")]
    pub preference_label: String,
    #[serde(rename = "StatusIDFK")]
    pub status_code: i32,
    #[serde(rename = "Status")]
    pub status_label: String,
    pub defect_phase: String,
    pub root_cause: String,
    #[serde(rename = "RCAReport")]
    pub rca_report: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// Create/edit payload as submitted by the case form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TicketForm {
    pub subject: String,
    pub summary: String,
    pub description: String,
    #[serde(rename = "CategoryIDFK")]
    pub category_id: Option<i32>,
    pub category: String,
    #[serde(rename = "TaskID")]
    pub task_id: Option<i32>,
    pub task: String,
    #[serde(rename = "Priority")]
    pub severity_code: Option<i32>,
    #[serde(rename = "PriorityName")]
    pub severity_label: Option<String>,
    #[serde(rename = "PREFERENCE")]
    pub preference_code: Option<i32>,
    #[serde(rename = "SeverityName")]
    pub preference_label: Option<String>,
    #[serde(rename = "StatusIDFK")]
    pub status_code: Option<i32>,
    pub status: Option<String>,
    pub defect_phase: String,
    pub root_cause: String,
    #[serde(rename = "RCAReport")]
    pub rca_report: String,
}

impl Ticket {
    /// Build an unsaved ticket from a form. Ids and case numbers are assigned
    /// by the repository.
    pub fn from_form(form: TicketForm, normalizer: &FieldNormalizer) -> Self {
        let severity =
            normalizer.resolve_severity(form.severity_label.as_deref(), form.severity_code);
        let preference =
            normalizer.resolve_preference(form.preference_label.as_deref(), form.preference_code);
        let status = normalizer.resolve_status(form.status.as_deref(), form.status_code);

        let lookups = normalizer.lookups();
        let (category_id, category_name) = match form.category_id.and_then(|id| lookups.category_by_id(id)) {
            Some(row) => (Some(row.id), row.description.clone()),
            None => match lookups.category_by_name(&form.category) {
                Some(row) => (Some(row.id), row.description.clone()),
                None => (form.category_id, form.category.trim().to_string()),
            },
        };
        let (task_id, task_name) = match form.task_id.and_then(|id| lookups.task_by_id(id)) {
            Some(row) => (Some(row.id), row.description.clone()),
            None => match lookups.task_by_name(&form.task) {
                Some(row) => (Some(row.id), row.description.clone()),
                None => (form.task_id, form.task.trim().to_string()),
            },
        };

        let now = Utc::now();
        Self {
            id: 0,
            case_number: String::new(),
            subject: form.subject,
            summary: form.summary,
            description: form.description,
            category_id,
            category_name,
            task_id,
            task_name,
            severity_code: severity.code,
            severity_label: severity.label,
            preference_code: preference.code,
            preference_label: preference.label,
            status_code: status.code,
            status_label: status.label,
            defect_phase: form.defect_phase,
            root_cause: form.root_cause,
            rca_report: form.rca_report,
            created_date: now,
            updated_date: now,
        }
    }

    pub fn severity(&self) -> CodedValue {
        CodedValue {
            code: self.severity_code,
            label: self.severity_label.clone(),
        }
    }

    pub fn preference(&self) -> CodedValue {
        CodedValue {
            code: self.preference_code,
            label: self.preference_label.clone(),
        }
    }

    /// Re-derive labels from the stored codes so both halves always agree.
    pub fn denormalized(mut self, normalizer: &FieldNormalizer) -> Self {
        let severity = normalizer.severity_from_code(self.severity_code);
        let preference = normalizer.preference_from_code(self.preference_code);
        let status = normalizer.status_from_code(self.status_code);
        self.severity_code = severity.code;
        self.severity_label = severity.label;
        self.preference_code = preference.code;
        self.preference_label = preference.label;
        self.status_code = status.code;
        self.status_label = status.label;
        self
    }

    pub fn has_report(&self) -> bool {
        !self.rca_report.trim().is_empty()
    }

    /// Checks performed before a record is attached to the store.
    pub fn validate(&self) -> Result<(), TicketError> {
        if self.severity_label.trim().is_empty() {
            return Err(TicketError::MissingLabel("severity"));
        }
        if self.preference_label.trim().is_empty() {
            return Err(TicketError::MissingLabel("preference"));
        }
        if self.status_label.trim().is_empty() {
            return Err(TicketError::MissingLabel("status"));
        }
        if self.subject.trim().is_empty()
            && self.summary.trim().is_empty()
            && self.description.trim().is_empty()
        {
            return Err(TicketError::NoText);
        }
        Ok(())
    }
}
