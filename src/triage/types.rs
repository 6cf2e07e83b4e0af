use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// RiskBand
// ---------------------------------------------------------------------------

/// Discrete severity classification. Ordered so that `Immediate` is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Routine,
    Urgent,
    Immediate,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Urgent => "urgent",
            Self::Immediate => "immediate",
        }
    }
}

// ---------------------------------------------------------------------------
// CareLevel
// ---------------------------------------------------------------------------

/// Care pathway severity of a plan. One level per band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareLevel {
    Emergency,
    UrgentCare,
    PrimaryCare,
}

impl CareLevel {
    pub fn for_band(band: RiskBand) -> Self {
        match band {
            RiskBand::Immediate => Self::Emergency,
            RiskBand::Urgent => Self::UrgentCare,
            RiskBand::Routine => Self::PrimaryCare,
        }
    }

    pub fn band(&self) -> RiskBand {
        match self {
            Self::Emergency => RiskBand::Immediate,
            Self::UrgentCare => RiskBand::Urgent,
            Self::PrimaryCare => RiskBand::Routine,
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingPriority {
    Immediate,
    Urgent,
    Routine,
    /// Reserved for non-interactive ingestion. Never produced by `triage`.
    Batch,
}

impl RoutingPriority {
    pub fn from_band(band: RiskBand) -> Self {
        match band {
            RiskBand::Immediate => Self::Immediate,
            RiskBand::Urgent => Self::Urgent,
            RiskBand::Routine => Self::Routine,
        }
    }

    /// The band this priority corresponds to; `None` for `Batch`.
    pub fn band(&self) -> Option<RiskBand> {
        match self {
            Self::Immediate => Some(RiskBand::Immediate),
            Self::Urgent => Some(RiskBand::Urgent),
            Self::Routine => Some(RiskBand::Routine),
            Self::Batch => None,
        }
    }
}

/// Diagnostic routing metadata. `test_category` is for display only and never scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingMeta {
    pub priority: RoutingPriority,
    pub test_category: String,
}

// ---------------------------------------------------------------------------
// Rule category
// ---------------------------------------------------------------------------

/// Clinical category of a classifier rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Cardiac,
    Respiratory,
    Neurological,
    Haemorrhage,
    Collapse,
    Infection,
    Abdominal,
    HeadInjury,
    Fracture,
    Headache,
    Musculoskeletal,
    UpperRespiratory,
    Unclassified,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardiac => "cardiac",
            Self::Respiratory => "respiratory",
            Self::Neurological => "neurological",
            Self::Haemorrhage => "haemorrhage",
            Self::Collapse => "collapse",
            Self::Infection => "infection",
            Self::Abdominal => "abdominal",
            Self::HeadInjury => "head_injury",
            Self::Fracture => "fracture",
            Self::Headache => "headache",
            Self::Musculoskeletal => "musculoskeletal",
            Self::UpperRespiratory => "upper_respiratory",
            Self::Unclassified => "unclassified",
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub band: RiskBand,
    /// Probability of urgency, in [0, 1].
    pub probability: f32,
    /// Indicators justifying the band. Never empty.
    pub explanations: Vec<String>,
    /// Id of the classifier rule that fired.
    pub matched_rule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePlan {
    pub care_level: CareLevel,
    pub disposition: String,
    pub recommendation: String,
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationType {
    Guideline,
    JournalArticle,
    ClinicalRule,
    Textbook,
}

/// A guideline or literature reference backing a rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: CitationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rationale {
    pub summary: String,
    pub reasoning: Vec<String>,
    pub evidence: Vec<String>,
    pub citations: Vec<Citation>,
    pub confidence: f32,
    pub model_used: String,
    pub generated_at: DateTime<Utc>,
}

/// Composite result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResult {
    pub risk: RiskAssessment,
    pub care_plan: CarePlan,
    pub rationale: Rationale,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingMeta>,
}

impl TriageResult {
    /// Band, care level and routing priority all describe the same severity.
    pub fn is_severity_consistent(&self) -> bool {
        let plan_agrees = self.care_plan.care_level.band() == self.risk.band;
        let routing_agrees = self
            .routing
            .as_ref()
            .map_or(true, |r| r.priority.band() == Some(self.risk.band));
        plan_agrees && routing_agrees
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Boundary input from the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageRequest {
    pub text: String,
    #[serde(default)]
    pub patient_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors and the engine seam
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriageError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Entry point implemented by the triage engine.
pub trait SymptomTriage {
    /// Classify once and assemble risk, plan and rationale for the request.
    fn triage_request(&self, request: &TriageRequest) -> Result<TriageResult, TriageError>;
}
