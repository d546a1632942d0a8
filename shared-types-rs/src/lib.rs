pub mod config;
pub mod draft;
pub mod dynamic_field;

pub use config::{
    AnalysisConfig, CasesConfig, ConfigError, GatewayConfig, RcaDeskConfig, SystemConfig,
};
pub use draft::{
    AdditionalQuestions, DynamicSection, Draft, ImpactAnalysis, PreventiveMeasures, Resolution,
    Suggestion, SupplementaryInfo,
};
pub use dynamic_field::{DynamicField, DynamicFieldError, DynamicFieldSet, DynamicValue, FieldType};
