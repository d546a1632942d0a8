// case-store-rs/src/normalizer.rs
// Label <-> storage code mapping for the severity, preference and status axes.
//
// Every conversion returns a `CodedValue` whose code and label denote the same
// value; unresolvable input falls back to the axis default instead of leaving
// either half unset.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lookup::LookupTables;

pub const DEFAULT_SEVERITY_ID: i32 = 1;

static SEVERITY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bseverity\s*(\d+)\s*$").expect("severity pattern is valid"));

static BARE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*$").expect("bare code pattern is valid"));

/// A storage code together with the label it displays as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodedValue {
    pub code: i32,
    pub label: String,
}

impl CodedValue {
    fn new(code: i32, label: impl Into<String>) -> Self {
        Self {
            code,
            label: label.into(),
        }
    }
}

fn parse_bare_code(label: &str) -> Option<i32> {
    BARE_CODE
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Preference (the `PREFERENCE` column). Discriminants are storage codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preference {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Preference {
    pub const ALL: [Preference; 3] = [Preference::High, Preference::Medium, Preference::Low];

    pub fn description(&self) -> &'static str {
        match self {
            Preference::High => "High",
            Preference::Medium => "Medium",
            Preference::Low => "Low",
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Exact description, then case-insensitive name, then Medium.
    pub fn from_label(label: &str) -> Self {
        if let Some(p) = Self::ALL.iter().find(|p| p.description() == label) {
            return *p;
        }
        let lowered = label.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "high" => Preference::High,
            "medium" => Preference::Medium,
            "low" => Preference::Low,
            _ => match parse_bare_code(label) {
                Some(code) => Self::from_code(code),
                None => Preference::Medium,
            },
        }
    }

    /// 1 is High, 3 is Low, anything else reads as Medium.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Preference::High,
            3 => Preference::Low,
            _ => Preference::Medium,
        }
    }

    pub fn coded(&self) -> CodedValue {
        CodedValue::new(self.code(), self.description())
    }
}

/// Ticket workflow status (the `StatusIDFK` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Open = 2,
    Closed = 5,
    InProgress = 37,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] =
        [TicketStatus::Open, TicketStatus::Closed, TicketStatus::InProgress];

    pub fn description(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::Closed => "Closed",
            TicketStatus::InProgress => "In Progress",
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_label(label: &str) -> Self {
        if let Some(s) = Self::ALL.iter().find(|s| s.description() == label) {
            return *s;
        }
        let squashed: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match squashed.as_str() {
            "open" => TicketStatus::Open,
            "closed" => TicketStatus::Closed,
            "inprogress" => TicketStatus::InProgress,
            _ => match parse_bare_code(label) {
                Some(code) => Self::from_code(code),
                None => TicketStatus::Open,
            },
        }
    }

    pub fn from_code(code: i32) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.code() == code)
            .unwrap_or(TicketStatus::Open)
    }

    pub fn coded(&self) -> CodedValue {
        CodedValue::new(self.code(), self.description())
    }
}

/// Resolves labels and codes against the lookup tables.
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    lookups: Arc<LookupTables>,
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(LookupTables::standard()))
    }
}

impl FieldNormalizer {
    pub fn new(lookups: Arc<LookupTables>) -> Self {
        Self { lookups }
    }

    pub fn lookups(&self) -> &LookupTables {
        &self.lookups
    }

    /// Severity label to code without applying the default.
    ///
    /// Table label first, then a trailing number in a `Severity N` label,
    /// then a bare number.
    pub fn severity_code(&self, label: &str) -> Option<i32> {
        if let Some(row) = self.lookups.severity_by_label(label) {
            return Some(row.id);
        }
        if let Some(code) = SEVERITY_PATTERN
            .captures(label)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
        {
            return Some(code);
        }
        parse_bare_code(label)
    }

    pub fn severity_from_label(&self, label: &str) -> CodedValue {
        match self.severity_code(label) {
            Some(code) => self.severity_from_code(code),
            None => {
                tracing::debug!(label, "unresolved severity label, using default");
                self.severity_from_code(DEFAULT_SEVERITY_ID)
            }
        }
    }

    pub fn severity_from_code(&self, code: i32) -> CodedValue {
        match self.lookups.severity_by_id(code) {
            Some(row) => CodedValue::new(row.id, row.severity_level.clone()),
            None => CodedValue::new(code, format!("Severity {}", code)),
        }
    }

    pub fn preference_from_label(&self, label: &str) -> CodedValue {
        Preference::from_label(label).coded()
    }

    pub fn preference_from_code(&self, code: i32) -> CodedValue {
        Preference::from_code(code).coded()
    }

    pub fn status_from_label(&self, label: &str) -> CodedValue {
        TicketStatus::from_label(label).coded()
    }

    pub fn status_from_code(&self, code: i32) -> CodedValue {
        TicketStatus::from_code(code).coded()
    }

    /// Pick the label when present, otherwise the code, otherwise the default.
    pub fn resolve_severity(&self, label: Option<&str>, code: Option<i32>) -> CodedValue {
        match (non_blank(label), code) {
            (Some(label), _) => self.severity_from_label(label),
            (None, Some(code)) => self.severity_from_code(code),
            (None, None) => self.severity_from_code(DEFAULT_SEVERITY_ID),
        }
    }

    pub fn resolve_preference(&self, label: Option<&str>, code: Option<i32>) -> CodedValue {
        match (non_blank(label), code) {
            (Some(label), _) => self.preference_from_label(label),
            (None, Some(code)) => self.preference_from_code(code),
            (None, None) => Preference::Medium.coded(),
        }
    }

    pub fn resolve_status(&self, label: Option<&str>, code: Option<i32>) -> CodedValue {
        match (non_blank(label), code) {
            (Some(label), _) => self.status_from_label(label),
            (None, Some(code)) => self.status_from_code(code),
            (None, None) => TicketStatus::Open.coded(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare() -> FieldNormalizer {
        FieldNormalizer::new(Arc::new(LookupTables::default()))
    }

    #[test]
    fn severity_table_match_wins() {
        let mut tables = LookupTables::default();
        tables.severities.push(crate::lookup::SeverityLevel {
            id: 7,
            severity_level: "Critical".to_string(),
            response_time_hours: None,
            resolution_days: None,
        });
        let normalizer = FieldNormalizer::new(Arc::new(tables));
        assert_eq!(normalizer.severity_code("Critical"), Some(7));
        assert_eq!(normalizer.severity_from_code(7).label, "Critical");
    }

    #[test]
    fn severity_pattern_fallback_without_table_row() {
        let normalizer = bare();
        assert_eq!(normalizer.severity_code("Severity 3"), Some(3));
        assert_eq!(normalizer.severity_code("severity12"), Some(12));
        assert_eq!(normalizer.severity_from_code(3).label, "Severity 3");
    }

    #[test]
    fn unknown_severity_label_defaults_to_one() {
        let normalizer = bare();
        assert_eq!(normalizer.severity_code("whenever"), None);
        assert_eq!(
            normalizer.severity_from_label("whenever"),
            CodedValue::new(1, "Severity 1")
        );
    }

    #[test]
    fn severity_round_trip() {
        let normalizer = FieldNormalizer::default();
        let coded = normalizer.severity_from_label("Severity 2");
        assert_eq!(coded.code, 2);
        assert_eq!(normalizer.severity_from_code(coded.code).label, "Severity 2");
    }

    #[test]
    fn numeric_codes_are_idempotent() {
        let normalizer = FieldNormalizer::default();
        for code in [1, 2, 3, 4, 9] {
            let once = normalizer.severity_from_label(&code.to_string());
            let twice = normalizer.severity_from_label(&once.code.to_string());
            assert_eq!(once.code, code);
            assert_eq!(twice, once);

            let via_label = normalizer.severity_from_label(&once.label);
            assert_eq!(via_label, once);
        }
        for code in [1, 2, 3] {
            let once = normalizer.preference_from_label(&code.to_string());
            assert_eq!(normalizer.preference_from_label(&once.code.to_string()), once);
        }
    }

    #[test]
    fn preference_matching_order() {
        assert_eq!(Preference::from_label("High"), Preference::High);
        assert_eq!(Preference::from_label("high"), Preference::High);
        assert_eq!(Preference::from_label("  LOW "), Preference::Low);
        assert_eq!(Preference::from_label("urgent"), Preference::Medium);
        assert_eq!(Preference::from_label(""), Preference::Medium);
    }

    #[test]
    fn preference_code_heuristic() {
        assert_eq!(Preference::from_code(1), Preference::High);
        assert_eq!(Preference::from_code(3), Preference::Low);
        assert_eq!(Preference::from_code(2), Preference::Medium);
        assert_eq!(Preference::from_code(42), Preference::Medium);
    }

    #[test]
    fn preference_round_trip_is_synonymous() {
        let normalizer = bare();
        let coded = normalizer.preference_from_label("high");
        assert_eq!(coded, CodedValue::new(1, "High"));
        assert_eq!(normalizer.preference_from_code(coded.code).label, "High");
    }

    #[test]
    fn status_labels_and_codes() {
        assert_eq!(TicketStatus::from_label("in progress"), TicketStatus::InProgress);
        assert_eq!(TicketStatus::from_label("Closed"), TicketStatus::Closed);
        assert_eq!(TicketStatus::from_label("???"), TicketStatus::Open);
        assert_eq!(TicketStatus::from_code(37), TicketStatus::InProgress);
        assert_eq!(TicketStatus::from_code(99), TicketStatus::Open);
    }

    #[test]
    fn label_wins_over_code() {
        let normalizer = FieldNormalizer::default();
        assert_eq!(normalizer.resolve_severity(Some("Severity 3"), Some(1)).code, 3);
        assert_eq!(normalizer.resolve_severity(Some("  "), Some(4)).code, 4);
        assert_eq!(normalizer.resolve_severity(None, None).code, 1);
        assert_eq!(normalizer.resolve_preference(None, Some(3)).label, "Low");
        assert_eq!(normalizer.resolve_preference(None, None).code, 2);
        assert_eq!(normalizer.resolve_status(None, None).label, "Open");
    }
}
