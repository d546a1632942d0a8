// case-store-rs/src/lookup.rs
// Reference tables the ticket form resolves against.

use serde::{Deserialize, Serialize};

/// Row of the severity SLA table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityLevel {
    pub id: i32,
    pub severity_level: String,
    pub response_time_hours: Option<i32>,
    pub resolution_days: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i32,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTables {
    pub severities: Vec<SeverityLevel>,
    pub categories: Vec<Category>,
    pub tasks: Vec<Task>,
}

impl LookupTables {
    /// Tables seeded with the levels and categories the desk ships with.
    pub fn standard() -> Self {
        let severity = |id: i32, hours: i32, days: i32| SeverityLevel {
            id,
            severity_level: format!("Severity {}", id),
            response_time_hours: Some(hours),
            resolution_days: Some(days),
        };
        let category = |id: i32, description: &str| Category {
            id,
            description: description.to_string(),
        };
        let task = |id: i32, description: &str| Task {
            id,
            description: description.to_string(),
            is_active: true,
        };

        Self {
            severities: vec![
                severity(1, 1, 1),
                severity(2, 4, 3),
                severity(3, 8, 5),
                severity(4, 24, 10),
            ],
            categories: vec![
                category(1, "Network"),
                category(2, "Application"),
                category(3, "Database"),
                category(4, "Infrastructure"),
            ],
            tasks: vec![
                task(1, "Incident"),
                task(2, "Service Request"),
                task(3, "Change Request"),
            ],
        }
    }

    pub fn severity_by_label(&self, label: &str) -> Option<&SeverityLevel> {
        self.severities.iter().find(|s| s.severity_level == label)
    }

    pub fn severity_by_id(&self, id: i32) -> Option<&SeverityLevel> {
        self.severities.iter().find(|s| s.id == id)
    }

    pub fn category_by_id(&self, id: i32) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.description.eq_ignore_ascii_case(name.trim()))
    }

    pub fn task_by_id(&self, id: i32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_by_name(&self, name: &str) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|t| t.is_active && t.description.eq_ignore_ascii_case(name.trim()))
    }
}
