use chrono::{DateTime, Utc};

use crate::config::TriageConfig;
use crate::directory::PatientDirectory;

use super::care_plan::build_plan;
use super::classifier::classify;
use super::rationale::build_rationale;
use super::sanitize::sanitize_symptom_text;
use super::types::{
    RoutingMeta, RoutingPriority, SymptomTriage, TriageError, TriageRequest, TriageResult,
};

/// The production triage engine.
///
/// Holds only immutable state, so one instance can be shared across threads and
/// called concurrently.
#[derive(Clone, Copy)]
pub struct TriageEngine {
    config: TriageConfig,
    directory: &'static PatientDirectory,
}

impl TriageEngine {
    pub fn new(config: TriageConfig) -> Self {
        Self {
            config,
            directory: PatientDirectory::global(),
        }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Triage free-text symptoms for an optional patient.
    pub fn triage(
        &self,
        text: &str,
        patient_key: Option<&str>,
    ) -> Result<TriageResult, TriageError> {
        self.triage_at(text, patient_key, Utc::now())
    }

    /// As [`TriageEngine::triage`], stamping the rationale with `generated_at`.
    /// Two calls with the same arguments return equal results.
    pub fn triage_at(
        &self,
        text: &str,
        patient_key: Option<&str>,
        generated_at: DateTime<Utc>,
    ) -> Result<TriageResult, TriageError> {
        let normalized = sanitize_symptom_text(text, self.config.max_input_length())?;
        if normalized.was_truncated() {
            tracing::warn!(
                max_input_length = self.config.max_input_length(),
                "Symptom text exceeded maximum length and was truncated"
            );
        }

        // Classified once; every synthesizer below keys off this rule.
        let classification = classify(&normalized);
        let rule = classification.rule;
        let band = classification.band();
        let patient = self.directory.lookup(patient_key);

        let result = TriageResult {
            risk: classification.to_assessment(),
            care_plan: build_plan(band, rule.id),
            rationale: build_rationale(band, rule.id, &patient, &self.config, generated_at),
            routing: Some(RoutingMeta {
                priority: RoutingPriority::from_band(band),
                test_category: rule.category.as_str().to_string(),
            }),
        };
        debug_assert!(result.is_severity_consistent());

        tracing::info!(
            rule_id = rule.id,
            band = ?band,
            fallback = classification.is_fallback(),
            registered = patient.registered,
            care_level = ?result.care_plan.care_level,
            "Triage complete"
        );

        Ok(result)
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new(TriageConfig::default())
    }
}

impl SymptomTriage for TriageEngine {
    fn triage_request(&self, request: &TriageRequest) -> Result<TriageResult, TriageError> {
        self.triage(&request.text, request.patient_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::triage::types::{CareLevel, RiskBand};

    fn engine() -> TriageEngine {
        TriageEngine::default()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap()
    }

    const SAMPLE_INPUTS: &[&str] = &[
        "Severe chest pain for 20 minutes with sweating",
        "I have a mild headache for 2 hours",
        "I twisted my ankle playing football, can still walk",
        "I have been feeling unwell with general fatigue",
        "I can't breathe properly",
        "High fever and shivering since last night",
        "Stomach pain on the right side",
        "Pulled a muscle in my back",
        "Runny nose and sneezing",
        "Sudden slurred speech and face drooping",
        "Fell off a ladder and hit my head",
        "worst headache of my life, came on suddenly",
        "xyz",
    ];

    // ── Scenarios ───────────────────────────────────────────

    #[test]
    fn severe_chest_pain_goes_to_emergency() {
        let result = engine()
            .triage("Severe chest pain for 20 minutes with sweating", None)
            .unwrap();
        assert_eq!(result.risk.band, RiskBand::Immediate);
        assert_eq!(result.care_plan.disposition, "Go to Emergency Department now");
        assert_eq!(result.care_plan.care_level, CareLevel::Emergency);
        assert_eq!(result.risk.matched_rule, "chest-pain");
    }

    #[test]
    fn mild_headache_is_routine() {
        let result = engine()
            .triage("I have a mild headache for 2 hours", None)
            .unwrap();
        assert_eq!(result.risk.band, RiskBand::Routine);
        assert!(result
            .care_plan
            .recommendation
            .contains("Primary care or pharmacy advice"));
    }

    #[test]
    fn walkable_ankle_twist_gets_rice() {
        let result = engine()
            .triage("I twisted my ankle playing football, can still walk", None)
            .unwrap();
        assert_eq!(result.risk.band, RiskBand::Routine);
        assert!(result.care_plan.actions.iter().any(|a| a.contains("RICE")));
    }

    #[test]
    fn unmatched_symptoms_default_to_urgent() {
        let result = engine()
            .triage("I have been feeling unwell with general fatigue", None)
            .unwrap();
        assert_eq!(result.risk.band, RiskBand::Urgent);
        assert!(result
            .care_plan
            .follow_up
            .iter()
            .any(|f| f.contains("within 24 hours")));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            engine().triage("", None),
            Err(TriageError::InvalidInput(_))
        ));
        assert!(engine().triage("   \n ", Some("john-carter")).is_err());
    }

    // ── Properties ──────────────────────────────────────────

    #[test]
    fn results_are_severity_consistent() {
        for input in SAMPLE_INPUTS {
            for key in [None, Some("john-carter"), Some("emma-wilson"), Some("liam-patel")] {
                let result = engine().triage(input, key).unwrap();
                assert!(result.is_severity_consistent(), "input {input:?}");
                assert_eq!(
                    result.routing.as_ref().map(|r| r.priority),
                    Some(RoutingPriority::from_band(result.risk.band))
                );
            }
        }
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        for input in SAMPLE_INPUTS {
            let result = engine().triage(input, Some("john-carter")).unwrap();
            assert!((0.0..=1.0).contains(&result.risk.probability));
            assert!((0.0..=1.0).contains(&result.care_plan.confidence));
            assert!((0.0..=1.0).contains(&result.rationale.confidence));
            assert!(!result.risk.explanations.is_empty());
            assert!(!result.rationale.reasoning.is_empty());
        }
    }

    #[test]
    fn same_input_same_result() {
        let engine = engine();
        let first = engine
            .triage_at("Runny nose and sneezing", Some("emma-wilson"), fixed_time())
            .unwrap();
        let second = engine
            .triage_at("Runny nose and sneezing", Some("emma-wilson"), fixed_time())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn patient_changes_rationale_not_risk() {
        let engine = engine();
        let text = "Severe chest pain for 20 minutes with sweating";
        let registered = engine.triage_at(text, Some("john-carter"), fixed_time()).unwrap();
        let unregistered = engine.triage_at(text, None, fixed_time()).unwrap();

        assert_eq!(registered.risk, unregistered.risk);
        assert_eq!(registered.care_plan, unregistered.care_plan);
        assert_ne!(registered.rationale, unregistered.rationale);
        assert!(registered
            .rationale
            .evidence
            .iter()
            .any(|e| e.contains("troponin")));
        assert!(!unregistered
            .rationale
            .evidence
            .iter()
            .any(|e| e.contains("troponin")));
    }

    #[test]
    fn unregistered_confidence_is_lower() {
        let engine = engine();
        for input in SAMPLE_INPUTS {
            let registered = engine.triage(input, Some("liam-patel")).unwrap();
            let unregistered = engine.triage(input, Some("not-a-patient")).unwrap();
            assert!(unregistered.rationale.confidence < registered.rationale.confidence);
        }
    }

    #[test]
    fn configured_input_limit_applies() {
        let config = TriageConfig::new(0.92, 0.45, 12).unwrap();
        let result = TriageEngine::new(config)
            .triage("runny nose and a chest pain", None)
            .unwrap();
        // Truncated to "runny nose", so the later chest pain trigger is never seen.
        assert_eq!(result.risk.matched_rule, "common-cold");
    }

    #[test]
    fn input_truncated_to_nothing_is_rejected() {
        let engine = TriageEngine::new(TriageConfig::new(0.92, 0.45, 2).unwrap());
        assert_eq!(engine.config().max_input_length(), 2);
        assert!(matches!(
            engine.triage("胸痛", None),
            Err(TriageError::InvalidInput(_))
        ));
    }

    #[test]
    fn suffixed_patient_key_resolves_to_registered_patient() {
        let engine = engine();
        let text = "Severe chest pain for 20 minutes with sweating";
        let keyed = engine.triage_at(text, Some("john-carter-key"), fixed_time()).unwrap();
        let anonymous = engine.triage_at(text, None, fixed_time()).unwrap();

        assert_eq!(keyed.risk.band, anonymous.risk.band);
        assert_eq!(keyed.care_plan, anonymous.care_plan);
        assert_ne!(keyed.rationale, anonymous.rationale);
        assert!(keyed.rationale.evidence.iter().any(|e| e.contains("troponin")));
        assert!(keyed.rationale.confidence > anonymous.rationale.confidence);
    }

    #[test]
    fn request_seam_matches_direct_call() {
        let engine = engine();
        let request = TriageRequest {
            text: "I have a mild headache for 2 hours".into(),
            patient_key: Some("emma-wilson".into()),
        };
        let via_trait = engine.triage_request(&request).unwrap();
        let direct = engine
            .triage(&request.text, request.patient_key.as_deref())
            .unwrap();
        assert_eq!(via_trait.risk, direct.risk);
        assert_eq!(via_trait.care_plan, direct.care_plan);
        assert_eq!(via_trait.rationale.summary, direct.rationale.summary);
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = engine()
            .triage_at("Pulled a muscle in my back", None, fixed_time())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

        assert_eq!(value["risk"]["band"], "routine");
        assert_eq!(value["risk"]["matchedRule"], "minor-strain");
        assert_eq!(value["carePlan"]["careLevel"], "primary_care");
        assert_eq!(value["routing"]["priority"], "routine");
        assert_eq!(value["routing"]["testCategory"], "musculoskeletal");
        assert!(value["rationale"]["generatedAt"].is_string());
        assert!(value["rationale"]["modelUsed"].is_string());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_are_independent() {
        let engine = Arc::new(engine());
        let mut handles = Vec::new();

        for (i, input) in SAMPLE_INPUTS.iter().cycle().take(64).enumerate() {
            let engine = Arc::clone(&engine);
            let key = if i % 2 == 0 { Some("john-carter") } else { None };
            handles.push(tokio::task::spawn_blocking(move || {
                let result = engine.triage_at(input, key, fixed_time()).unwrap();
                (*input, key, result)
            }));
        }

        for handle in handles {
            let (input, key, result) = handle.await.unwrap();
            let expected = engine.triage_at(input, key, fixed_time()).unwrap();
            assert_eq!(result, expected);
        }
    }
}
