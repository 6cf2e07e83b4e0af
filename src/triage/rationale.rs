//! Rationale Synthesizer.
//!
//! Combines the matched rule's authored narrative with the patient's rationale
//! profile and timeline, so the same rule reads differently for different patients.
//! Citations are fixed per rule. Confidence comes from the profile's tier through
//! configuration.

use chrono::{DateTime, Utc};

use crate::config::{TriageConfig, RULESET_LABEL};
use crate::directory::{Archetype, ConfidenceTier, PatientRecord};

use super::classifier::{contains_phrase, find_rule};
use super::types::{Citation, CitationType, Rationale, RiskBand, RuleCategory};

/// Authored narrative for one classifier rule.
struct RuleNarrative {
    summary: &'static str,
    reasoning: &'static [&'static str],
    evidence: &'static [&'static str],
    /// Lowercase terms that make a timeline note relevant evidence.
    history_terms: &'static [&'static str],
    citations: &'static [CitationRef],
}

struct CitationRef {
    title: &'static str,
    authors: Option<&'static str>,
    journal: Option<&'static str>,
    year: Option<u16>,
    relevance: Option<&'static str>,
    url: Option<&'static str>,
    kind: CitationType,
}

impl CitationRef {
    fn to_citation(&self) -> Citation {
        Citation {
            title: self.title.to_string(),
            authors: self.authors.map(str::to_string),
            journal: self.journal.map(str::to_string),
            year: self.year,
            relevance: self.relevance.map(str::to_string),
            url: self.url.map(str::to_string),
            kind: self.kind,
        }
    }
}

// ── Citations ───────────────────────────────────────────────

const NICE_CHEST_PAIN: CitationRef = CitationRef {
    title: "Recent-onset chest pain of suspected cardiac origin: assessment and diagnosis (CG95)",
    authors: Some("National Institute for Health and Care Excellence"),
    journal: None,
    year: Some(2010),
    relevance: Some("Immediate referral for suspected acute coronary syndrome"),
    url: Some("https://www.nice.org.uk/guidance/cg95"),
    kind: CitationType::Guideline,
};

const AHA_CHEST_PAIN: CitationRef = CitationRef {
    title: "2021 AHA/ACC Guideline for the Evaluation and Diagnosis of Chest Pain",
    authors: Some("Gulati M, et al."),
    journal: Some("Circulation"),
    year: Some(2021),
    relevance: Some("ECG within 10 minutes and high-sensitivity troponin pathways"),
    url: Some("https://doi.org/10.1161/CIR.0000000000001029"),
    kind: CitationType::JournalArticle,
};

const BTS_OXYGEN: CitationRef = CitationRef {
    title: "BTS guideline for oxygen use in adults in healthcare and emergency settings",
    authors: Some("O'Driscoll BR, et al."),
    journal: Some("Thorax"),
    year: Some(2017),
    relevance: Some("Assessment and management of acute breathlessness"),
    url: None,
    kind: CitationType::Guideline,
};

const NICE_STROKE: CitationRef = CitationRef {
    title: "Stroke and transient ischaemic attack in over 16s: diagnosis and initial management (NG128)",
    authors: Some("National Institute for Health and Care Excellence"),
    journal: None,
    year: Some(2019),
    relevance: Some("Rapid recognition of stroke symptoms with the FAST test"),
    url: Some("https://www.nice.org.uk/guidance/ng128"),
    kind: CitationType::Guideline,
};

const NICE_HEADACHE: CitationRef = CitationRef {
    title: "Headaches in over 12s: diagnosis and management (CG150)",
    authors: Some("National Institute for Health and Care Excellence"),
    journal: None,
    year: Some(2012),
    relevance: Some("Red-flag features and management of primary headache"),
    url: Some("https://www.nice.org.uk/guidance/cg150"),
    kind: CitationType::Guideline,
};

const OTTAWA_SAH: CitationRef = CitationRef {
    title: "Validation of the Ottawa Subarachnoid Hemorrhage Rule in patients with acute headache",
    authors: Some("Perry JJ, et al."),
    journal: Some("CMAJ"),
    year: Some(2017),
    relevance: Some("Identifying headaches that require investigation for haemorrhage"),
    url: None,
    kind: CitationType::ClinicalRule,
};

const NICE_MAJOR_TRAUMA: CitationRef = CitationRef {
    title: "Major trauma: assessment and initial management (NG39)",
    authors: Some("National Institute for Health and Care Excellence"),
    journal: None,
    year: Some(2016),
    relevance: Some("Control of external haemorrhage"),
    url: Some("https://www.nice.org.uk/guidance/ng39"),
    kind: CitationType::Guideline,
};

const NICE_TLOC: CitationRef = CitationRef {
    title: "Transient loss of consciousness ('blackouts') in over 16s (CG109)",
    authors: Some("National Institute for Health and Care Excellence"),
    journal: None,
    year: Some(2010),
    relevance: Some("Initial assessment after loss of consciousness"),
    url: Some("https://www.nice.org.uk/guidance/cg109"),
    kind: CitationType::Guideline,
};

const NICE_SEPSIS: CitationRef = CitationRef {
    title: "Suspected sepsis: recognition, diagnosis and early management (NG51)",
    authors: Some("National Institute for Health and Care Excellence"),
    journal: None,
    year: Some(2016),
    relevance: Some("Risk stratification of patients with fever"),
    url: Some("https://www.nice.org.uk/guidance/ng51"),
    kind: CitationType::Guideline,
};

const NICE_HEAD_INJURY: CitationRef = CitationRef {
    title: "Head injury: assessment and early management (NG232)",
    authors: Some("National Institute for Health and Care Excellence"),
    journal: None,
    year: Some(2023),
    relevance: Some("Criteria for assessment and observation after head injury"),
    url: Some("https://www.nice.org.uk/guidance/ng232"),
    kind: CitationType::Guideline,
};

const OTTAWA_ANKLE: CitationRef = CitationRef {
    title: "Decision rules for the use of radiography in acute ankle injuries",
    authors: Some("Stiell IG, et al."),
    journal: Some("JAMA"),
    year: Some(1993),
    relevance: Some("Ottawa ankle rules: weight bearing and bony tenderness"),
    url: None,
    kind: CitationType::ClinicalRule,
};

const CKS_SPRAINS: CitationRef = CitationRef {
    title: "Sprains and strains",
    authors: Some("NICE Clinical Knowledge Summaries"),
    journal: None,
    year: None,
    relevance: Some("Self-care with rest, ice, compression and elevation"),
    url: Some("https://cks.nice.org.uk/topics/sprains-strains/"),
    kind: CitationType::Guideline,
};

const CKS_COMMON_COLD: CitationRef = CitationRef {
    title: "Common cold",
    authors: Some("NICE Clinical Knowledge Summaries"),
    journal: None,
    year: None,
    relevance: Some("Self-care for upper respiratory tract infection"),
    url: Some("https://cks.nice.org.uk/topics/common-cold/"),
    kind: CitationType::Guideline,
};

const MANCHESTER_TRIAGE: CitationRef = CitationRef {
    title: "Emergency Triage: Manchester Triage Group",
    authors: Some("Mackway-Jones K, Marsden J, Windle J"),
    journal: None,
    year: Some(2014),
    relevance: Some("Presentation-based prioritisation with conservative defaults"),
    url: None,
    kind: CitationType::Textbook,
};

// ── Narratives ──────────────────────────────────────────────

fn narrative(rule_id: &str) -> Option<RuleNarrative> {
    let narrative = match rule_id {
        "chest-pain" => RuleNarrative {
            summary: "Acute chest pain with features of possible acute coronary syndrome",
            reasoning: &[
                "Chest pain is treated as cardiac in origin until an ECG and troponin exclude it",
                "Associated sweating or radiation to the arm raises the likelihood of ischaemia",
            ],
            evidence: &["Reported chest pain of recent onset"],
            history_terms: &[
                "troponin", "ecg", "chest", "cardiac", "hypertension", "blood pressure", "ldl",
            ],
            citations: &[NICE_CHEST_PAIN, AHA_CHEST_PAIN],
        },
        "breathing-difficulty" => RuleNarrative {
            summary: "Acute breathing difficulty",
            reasoning: &[
                "Breathing problems take priority over all other presentations in triage",
            ],
            evidence: &["Reported difficulty breathing"],
            history_terms: &["asthma", "copd", "inhaler", "breath", "chest"],
            citations: &[BTS_OXYGEN, MANCHESTER_TRIAGE],
        },
        "stroke-signs" => RuleNarrative {
            summary: "Focal neurological symptoms suggestive of stroke",
            reasoning: &[
                "Face, arm or speech symptoms are positive FAST signs",
                "Reperfusion treatment is only possible within hours of onset",
            ],
            evidence: &["Reported focal neurological symptoms"],
            history_terms: &["stroke", "hypertension", "blood pressure", "neurology", "migraine"],
            citations: &[NICE_STROKE],
        },
        "thunderclap-headache" => RuleNarrative {
            summary: "Sudden-onset severe headache",
            reasoning: &[
                "A headache reaching maximum intensity within a minute needs exclusion of haemorrhage",
            ],
            evidence: &["Reported sudden severe headache"],
            history_terms: &["migraine", "headache", "neurology", "hypertension"],
            citations: &[OTTAWA_SAH, NICE_HEADACHE],
        },
        "severe-bleeding" => RuleNarrative {
            summary: "Uncontrolled or internal bleeding",
            reasoning: &["Ongoing blood loss can cause shock and needs immediate control"],
            evidence: &["Reported heavy or uncontrolled bleeding"],
            history_terms: &["anticoagulant", "warfarin", "apixaban", "bleeding", "aspirin"],
            citations: &[NICE_MAJOR_TRAUMA, MANCHESTER_TRIAGE],
        },
        "collapse" => RuleNarrative {
            summary: "Loss of consciousness or seizure",
            reasoning: &[
                "Collapse may have a cardiac cause that needs an ECG",
                "A first seizure needs neurological assessment",
            ],
            evidence: &["Reported collapse, fainting or seizure"],
            history_terms: &["ecg", "cardiac", "seizure", "epilepsy", "blood pressure", "amlodipine"],
            citations: &[NICE_TLOC],
        },
        "high-fever" => RuleNarrative {
            summary: "Fever requiring same-day assessment",
            reasoning: &[
                "Fever with systemic symptoms is screened for sepsis the same day",
            ],
            evidence: &["Reported fever or rigors"],
            history_terms: &["infection", "immunosuppressed", "chemotherapy", "fever"],
            citations: &[NICE_SEPSIS],
        },
        "abdominal-pain" => RuleNarrative {
            summary: "Abdominal pain requiring same-day assessment",
            reasoning: &[
                "Surgical causes such as appendicitis must be excluded the same day",
            ],
            evidence: &["Reported abdominal pain"],
            history_terms: &["abdominal", "surgery", "gallstones", "ibuprofen"],
            citations: &[MANCHESTER_TRIAGE],
        },
        "head-injury" => RuleNarrative {
            summary: "Head injury requiring same-day assessment",
            reasoning: &[
                "Intracranial complications can appear hours after a head injury",
            ],
            evidence: &["Reported head injury"],
            history_terms: &["anticoagulant", "warfarin", "head", "concussion"],
            citations: &[NICE_HEAD_INJURY],
        },
        "suspected-fracture" => RuleNarrative {
            summary: "Limb injury with features of possible fracture",
            reasoning: &[
                "Inability to bear weight meets the Ottawa criteria for imaging",
            ],
            evidence: &["Reported inability to bear weight or visible deformity"],
            history_terms: &["fracture", "x-ray", "sprain", "strain", "osteoporosis"],
            citations: &[OTTAWA_ANKLE, MANCHESTER_TRIAGE],
        },
        "severe-headache" => RuleNarrative {
            summary: "Severe headache with possible red-flag features",
            reasoning: &[
                "Vomiting, neck stiffness or unusual severity warrant exclusion of secondary causes",
            ],
            evidence: &["Reported severe headache or associated red-flag symptoms"],
            history_terms: &["migraine", "headache", "neurology", "sumatriptan", "propranolol"],
            citations: &[NICE_HEADACHE],
        },
        "mild-headache" => RuleNarrative {
            summary: "Mild headache without red-flag features",
            reasoning: &[
                "No red-flag features were reported, so a primary headache is most likely",
                "Primary headaches are managed with simple analgesia and self-care",
            ],
            evidence: &["Reported mild headache"],
            history_terms: &["migraine", "headache", "neurology", "sumatriptan", "propranolol"],
            citations: &[NICE_HEADACHE],
        },
        "ankle-sprain" => RuleNarrative {
            summary: "Ankle sprain with preserved weight bearing",
            reasoning: &[
                "Ability to walk makes a fracture unlikely under the Ottawa ankle rules",
                "Soft-tissue injuries recover with the RICE protocol",
            ],
            evidence: &["Reported twisted ankle", "Able to bear weight"],
            history_terms: &["ankle", "sprain", "physiotherapy", "instability"],
            citations: &[OTTAWA_ANKLE, CKS_SPRAINS],
        },
        "minor-strain" => RuleNarrative {
            summary: "Minor muscle strain",
            reasoning: &["Uncomplicated strains settle with self-care and graded activity"],
            evidence: &["Reported muscle strain or back ache"],
            history_terms: &["strain", "sprain", "physiotherapy", "back"],
            citations: &[CKS_SPRAINS],
        },
        "common-cold" => RuleNarrative {
            summary: "Upper respiratory symptoms consistent with a viral illness",
            reasoning: &["Cold symptoms without breathing difficulty are self-limiting"],
            evidence: &["Reported upper respiratory symptoms"],
            history_terms: &["asthma", "copd", "immunosuppressed"],
            citations: &[CKS_COMMON_COLD],
        },
        "unclassified" => RuleNarrative {
            summary: "Symptoms that do not match a recognised presentation",
            reasoning: &[
                "Unclassified symptoms are assessed conservatively as urgent",
                "A clinician should review the full description within 24 hours",
            ],
            evidence: &["No recognised symptom pattern in the description"],
            history_terms: &[],
            citations: &[MANCHESTER_TRIAGE],
        },
        _ => return None,
    };
    Some(narrative)
}

// ── Synthesis ───────────────────────────────────────────────

/// Build the rationale for a matched rule and a resolved patient.
pub fn build_rationale(
    band: RiskBand,
    rule_id: &str,
    patient: &PatientRecord<'_>,
    config: &TriageConfig,
    generated_at: DateTime<Utc>,
) -> Rationale {
    let confidence = tier_confidence(patient.profile.confidence_tier, config);

    let Some(narrative) = narrative(rule_id) else {
        tracing::error!(
            rule_id,
            band = ?band,
            "No rationale authored for rule, using generic rationale"
        );
        return generic_rationale(band, patient, confidence, generated_at);
    };

    let category = find_rule(rule_id).map_or(RuleCategory::Unclassified, |rule| rule.category);
    let history = relevant_history(patient, narrative.history_terms);

    let mut reasoning = vec![format!(
        "Rule '{}' matched the reported symptoms and assigned the {} band",
        rule_id,
        band.as_str()
    )];
    reasoning.extend(narrative.reasoning.iter().map(|s| (*s).to_string()));
    reasoning.push(history_step(patient, category));
    if !history.is_empty() {
        reasoning.push(format!(
            "{} prior timeline entries relate to this presentation and were reviewed",
            history.len()
        ));
    }

    let mut evidence: Vec<String> = narrative.evidence.iter().map(|s| (*s).to_string()).collect();
    evidence.extend(history);

    Rationale {
        summary: summary_line(narrative.summary, patient),
        reasoning,
        evidence,
        citations: narrative.citations.iter().map(CitationRef::to_citation).collect(),
        confidence,
        model_used: RULESET_LABEL.to_string(),
        generated_at,
    }
}

/// Fallback rationale for a band when a rule has no authored narrative.
pub fn generic_rationale(
    band: RiskBand,
    patient: &PatientRecord<'_>,
    confidence: f32,
    generated_at: DateTime<Utc>,
) -> Rationale {
    Rationale {
        summary: summary_line(&format!("Symptoms assessed as {}", band.as_str()), patient),
        reasoning: vec![
            format!(
                "No rule-specific rationale is available; the generic {} rationale applies",
                band.as_str()
            ),
            history_step(patient, RuleCategory::Unclassified),
        ],
        evidence: Vec::new(),
        citations: vec![MANCHESTER_TRIAGE.to_citation()],
        confidence: confidence.clamp(0.0, 1.0),
        model_used: RULESET_LABEL.to_string(),
        generated_at,
    }
}

fn tier_confidence(tier: ConfidenceTier, config: &TriageConfig) -> f32 {
    let value = match tier {
        ConfidenceTier::Established => config.registered_confidence(),
        ConfidenceTier::Unverified => config.unregistered_confidence(),
    };
    value.clamp(0.0, 1.0)
}

fn summary_line(summary: &str, patient: &PatientRecord<'_>) -> String {
    if !patient.registered {
        return format!("{summary} in an unregistered patient with no available history.");
    }
    match patient.patient.age {
        Some(age) => format!(
            "{summary} in {}, a {age}-year-old {} patient.",
            patient.patient.display_name,
            patient.patient.gender.as_str()
        ),
        None => format!("{summary} in {}.", patient.patient.display_name),
    }
}

fn history_step(patient: &PatientRecord<'_>, category: RuleCategory) -> String {
    if !patient.registered {
        return "No registered history is available, so the assessment relies on the reported \
                symptoms alone"
            .to_string();
    }

    let name = &patient.patient.display_name;
    let archetype = patient.profile.archetype;
    if archetype_bears_on(archetype, category) {
        format!(
            "{name}'s {} history is directly relevant: {}",
            archetype.as_str(),
            patient.profile.history_summary
        )
    } else {
        format!(
            "{name}'s recorded {} history does not bear on this presentation",
            archetype.as_str()
        )
    }
}

fn archetype_bears_on(archetype: Archetype, category: RuleCategory) -> bool {
    matches!(
        (archetype, category),
        (
            Archetype::Cardiac,
            RuleCategory::Cardiac | RuleCategory::Respiratory | RuleCategory::Collapse
        ) | (Archetype::Headache, RuleCategory::Headache | RuleCategory::Neurological)
            | (
                Archetype::Musculoskeletal,
                RuleCategory::Musculoskeletal | RuleCategory::Fracture
            )
    )
}

/// Timeline notes mentioning any of the rule's history terms as whole words, oldest first.
fn relevant_history(patient: &PatientRecord<'_>, terms: &[&str]) -> Vec<String> {
    patient
        .timeline
        .iter()
        .filter(|entry| {
            let note = entry.note.to_lowercase();
            terms.iter().any(|term| contains_phrase(&note, term))
        })
        .map(|entry| format!("Patient history ({}): {}", entry.when, entry.note))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::directory::lookup;
    use crate::triage::classifier::rules;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()
    }

    fn rationale_for(rule_id: &str, key: Option<&str>) -> Rationale {
        let band = find_rule(rule_id).map_or(RiskBand::Urgent, |r| r.band);
        build_rationale(band, rule_id, &lookup(key), &TriageConfig::default(), fixed_time())
    }

    #[test]
    fn every_rule_has_a_narrative_with_citations() {
        for rule in rules() {
            let narrative = narrative(rule.id)
                .unwrap_or_else(|| panic!("no narrative for rule {}", rule.id));
            assert!(!narrative.reasoning.is_empty(), "rule {}", rule.id);
            assert!(!narrative.citations.is_empty(), "rule {}", rule.id);
        }
        assert!(narrative("unclassified").is_some());
    }

    #[test]
    fn cardiac_patient_chest_pain_cites_prior_troponin() {
        let rationale = rationale_for("chest-pain", Some("john-carter"));
        assert!(rationale.evidence.iter().any(|e| e.contains("troponin")));
        assert!(rationale.summary.contains("John Carter"));
        assert!(rationale
            .reasoning
            .iter()
            .any(|r| r.contains("cardiac history is directly relevant")));
    }

    #[test]
    fn unregistered_chest_pain_has_no_history_evidence() {
        let rationale = rationale_for("chest-pain", None);
        assert!(!rationale.evidence.iter().any(|e| e.starts_with("Patient history")));
        assert!(rationale.summary.contains("unregistered"));
        assert!(rationale
            .reasoning
            .iter()
            .any(|r| r.contains("No registered history")));
    }

    #[test]
    fn confidence_depends_on_registration() {
        let registered = rationale_for("chest-pain", Some("john-carter"));
        let unregistered = rationale_for("chest-pain", None);
        assert!((registered.confidence - 0.92).abs() < f32::EPSILON);
        assert!((unregistered.confidence - 0.45).abs() < f32::EPSILON);
        assert!(unregistered.confidence < registered.confidence);
    }

    #[test]
    fn configured_confidence_is_used() {
        let config = TriageConfig::new(0.8, 0.3, 2_000).unwrap();
        let rationale = build_rationale(
            RiskBand::Routine,
            "mild-headache",
            &lookup(None),
            &config,
            fixed_time(),
        );
        assert!((rationale.confidence - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn unrelated_archetype_is_noted() {
        let rationale = rationale_for("ankle-sprain", Some("john-carter"));
        assert!(rationale
            .reasoning
            .iter()
            .any(|r| r.contains("does not bear on this presentation")));
        assert!(!rationale.evidence.iter().any(|e| e.starts_with("Patient history")));
    }

    #[test]
    fn musculoskeletal_patient_ankle_history_is_cited() {
        let rationale = rationale_for("ankle-sprain", Some("liam-patel"));
        let history: Vec<&String> = rationale
            .evidence
            .iter()
            .filter(|e| e.starts_with("Patient history"))
            .collect();
        assert_eq!(history.len(), 2);
        assert!(history[0].contains("3 years ago"));
    }

    #[test]
    fn headache_patient_summary_includes_demographics() {
        let rationale = rationale_for("mild-headache", Some("emma-wilson"));
        assert!(rationale.summary.contains("34-year-old female"));
        assert!(rationale.evidence.iter().any(|e| e.contains("migraine")));
    }

    #[test]
    fn citations_are_rule_specific() {
        let chest = rationale_for("chest-pain", None);
        assert_eq!(chest.citations.len(), 2);
        assert!(chest.citations[0].title.contains("chest pain"));

        let sprain = rationale_for("ankle-sprain", None);
        assert!(sprain.citations.iter().any(|c| c.kind == CitationType::ClinicalRule));
    }

    #[test]
    fn attribution_and_timestamp_recorded() {
        let rationale = rationale_for("common-cold", None);
        assert_eq!(rationale.model_used, RULESET_LABEL);
        assert_eq!(rationale.generated_at, fixed_time());
    }

    #[test]
    fn unmapped_rule_gets_generic_rationale() {
        let rationale = build_rationale(
            RiskBand::Immediate,
            "rule-that-does-not-exist",
            &lookup(Some("john-carter")),
            &TriageConfig::default(),
            fixed_time(),
        );
        assert!(rationale.reasoning[0].contains("generic immediate rationale"));
        assert!(!rationale.reasoning.is_empty());
        assert_eq!(rationale.citations.len(), 1);
        assert!((rationale.confidence - 0.92).abs() < f32::EPSILON);
    }

    #[test]
    fn history_terms_match_whole_words() {
        let rationale = rationale_for("head-injury", Some("emma-wilson"));
        assert!(!rationale.evidence.iter().any(|e| e.contains("Headache diary")));
        assert!(!rationale.evidence.iter().any(|e| e.starts_with("Patient history")));
    }

    #[test]
    fn archetype_relevance_table() {
        assert!(archetype_bears_on(Archetype::Cardiac, RuleCategory::Collapse));
        assert!(archetype_bears_on(Archetype::Headache, RuleCategory::Neurological));
        assert!(archetype_bears_on(Archetype::Musculoskeletal, RuleCategory::Fracture));
        assert!(!archetype_bears_on(Archetype::Headache, RuleCategory::Cardiac));
        assert!(!archetype_bears_on(Archetype::None, RuleCategory::Unclassified));
    }
}
