use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

/// Identity of a patient known to the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub key: String,
    pub display_name: String,
    /// Years. Absent for the unregistered sentinel.
    pub age: Option<u8>,
    pub gender: Gender,
}

/// One entry of a patient's medical-history timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Human-readable relative timestamp, e.g. "8 months ago".
    pub when: String,
    pub note: String,
}

/// Condition archetype a patient's canned rationale content is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Cardiac,
    Headache,
    Musculoskeletal,
    /// Unregistered sentinel: no modelled condition.
    None,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardiac => "cardiac",
            Self::Headache => "headache",
            Self::Musculoskeletal => "musculoskeletal",
            Self::None => "none",
        }
    }
}

/// How much the rationale may trust the patient's recorded history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// Registered patient with a consistent history.
    Established,
    /// No history to corroborate the reported symptoms.
    Unverified,
}

/// Per-patient narrative content used by the rationale synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RationaleProfile {
    pub archetype: Archetype,
    pub history_summary: String,
    pub confidence_tier: ConfidenceTier,
}

/// Picker row for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub key: String,
    pub display_name: String,
    pub age: Option<u8>,
    pub gender: Gender,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            key: patient.key.clone(),
            display_name: patient.display_name.clone(),
            age: patient.age,
            gender: patient.gender,
        }
    }
}

/// A patient as held by the directory.
#[derive(Debug, Clone)]
pub struct PatientEntry {
    pub patient: Patient,
    pub timeline: Vec<TimelineEntry>,
    pub profile: RationaleProfile,
}

/// Borrowed result of a directory lookup.
#[derive(Debug, Clone, Copy)]
pub struct PatientRecord<'a> {
    pub patient: &'a Patient,
    pub timeline: &'a [TimelineEntry],
    pub profile: &'a RationaleProfile,
    pub registered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_serializes_lowercase() {
        let json = serde_json::to_string(&Gender::Female).unwrap();
        assert_eq!(json, "\"female\"");
    }

    #[test]
    fn archetype_serializes_snake_case() {
        let json = serde_json::to_string(&Archetype::Musculoskeletal).unwrap();
        assert_eq!(json, "\"musculoskeletal\"");
        assert_eq!(Archetype::Musculoskeletal.as_str(), "musculoskeletal");
    }

    #[test]
    fn patient_uses_camel_case_fields() {
        let patient = Patient {
            key: "k".into(),
            display_name: "Name".into(),
            age: Some(40),
            gender: Gender::Other,
        };
        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["displayName"], "Name");
        assert_eq!(value["age"], 40);
    }

    #[test]
    fn rationale_profile_uses_camel_case_fields() {
        let profile = RationaleProfile {
            archetype: Archetype::Headache,
            history_summary: "Migraine".into(),
            confidence_tier: ConfidenceTier::Established,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["historySummary"], "Migraine");
        assert!(value.get("confidenceTier").is_some());
        assert!(value.get("history_summary").is_none());
    }
}
