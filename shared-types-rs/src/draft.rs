// shared-types-rs/src/draft.rs
// The structured RCA-in-progress exchanged between the client, the gateway
// and the analysis backend.
//
// Inbound drafts are lenient: any missing or null field takes its empty
// default. Suggestions coming back from the backend are strict at the top level.

use serde::{Deserialize, Deserializer, Serialize};

use crate::dynamic_field::DynamicFieldSet;

pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_SEVERITY_LABEL: &str = "Severity 1";
pub const DEFAULT_PRIORITY_LABEL: &str = "Medium";
pub const NOT_PROVIDED: &str = "Not provided";
pub const TO_BE_DETERMINED: &str = "TBD";

/// Treat an explicit JSON `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    #[serde(default, deserialize_with = "nullable")]
    pub affected_module: String,
    #[serde(default, deserialize_with = "nullable")]
    pub severity: String,
    #[serde(default, deserialize_with = "nullable")]
    pub priority: String,
    #[serde(default, deserialize_with = "nullable")]
    pub defect_phase: String,
    #[serde(default, deserialize_with = "nullable")]
    pub dynamic_fields: DynamicFieldSet,
}

impl ImpactAnalysis {
    /// The values the backend assumes when nothing is known about the impact.
    pub fn documented_default() -> Self {
        Self {
            affected_module: UNKNOWN.to_string(),
            severity: DEFAULT_SEVERITY_LABEL.to_string(),
            priority: DEFAULT_PRIORITY_LABEL.to_string(),
            defect_phase: UNKNOWN.to_string(),
            dynamic_fields: DynamicFieldSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    #[serde(default, deserialize_with = "nullable")]
    pub fix_applied: String,
    #[serde(default, deserialize_with = "nullable")]
    pub dynamic_fields: DynamicFieldSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreventiveMeasures {
    #[serde(default, deserialize_with = "nullable")]
    pub general_measure: String,
    #[serde(default, deserialize_with = "nullable")]
    pub dynamic_fields: DynamicFieldSet,
}

/// A section that only carries runtime-defined fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicSection {
    #[serde(default, deserialize_with = "nullable")]
    pub dynamic_fields: DynamicFieldSet,
}

pub type SupplementaryInfo = DynamicSection;
pub type AdditionalQuestions = DynamicSection;

/// Draft sent to the analysis backend on every turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub task: String,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub root_causes: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub conclusion: String,
    #[serde(default, deserialize_with = "nullable")]
    pub impact_analysis: ImpactAnalysis,
    #[serde(default, deserialize_with = "nullable")]
    pub resolution: Resolution,
    #[serde(default, deserialize_with = "nullable")]
    pub preventive_measures: PreventiveMeasures,
    #[serde(default, deserialize_with = "nullable")]
    pub supplementary_info: SupplementaryInfo,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_questions: AdditionalQuestions,
    #[serde(default, deserialize_with = "nullable")]
    pub session_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_final: bool,
}

impl Draft {
    /// Draft submitted on a FINALIZE turn whose form data could not be read.
    pub fn sentinel(session_id: impl Into<String>) -> Self {
        Self {
            impact_analysis: ImpactAnalysis::documented_default(),
            resolution: Resolution {
                fix_applied: NOT_PROVIDED.to_string(),
                dynamic_fields: DynamicFieldSet::new(),
            },
            preventive_measures: PreventiveMeasures {
                general_measure: TO_BE_DETERMINED.to_string(),
                dynamic_fields: DynamicFieldSet::new(),
            },
            session_id: session_id.into(),
            is_final: true,
            ..Self::default()
        }
    }

    /// Parse client form data. `null` yields an empty draft.
    pub fn from_form_data(form_data: serde_json::Value) -> Result<Self, serde_json::Error> {
        if form_data.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(form_data)
    }

    pub fn tagged(mut self, session_id: impl Into<String>, is_final: bool) -> Self {
        self.session_id = session_id.into();
        self.is_final = is_final;
        self
    }
}

/// Suggestion returned by the backend on a CONTINUE turn.
///
/// Top-level fields are required; section contents fall back to empty values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    pub task: String,
    pub summary: String,
    pub description: String,
    pub root_causes: Vec<String>,
    pub conclusion: String,
    pub impact_analysis: ImpactAnalysis,
    pub resolution: Resolution,
    pub supplementary_info: SupplementaryInfo,
    pub preventive_measures: PreventiveMeasures,
    pub additional_questions: AdditionalQuestions,
}
