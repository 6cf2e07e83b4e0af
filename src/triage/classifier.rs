//! Symptom Classifier.
//!
//! Matches normalized symptom text against an ordered table of phrase rules.
//! Rules are listed most severe first and the first match wins, so text that mentions
//! both a severe and a mild complaint resolves to the severe band. Text that matches
//! nothing falls back to the conservative `unclassified` rule (band `urgent`).

use super::sanitize::NormalizedText;
use super::types::{RiskAssessment, RiskBand, RuleCategory};

/// A fixed keyword/phrase rule.
#[derive(Debug)]
pub struct SymptomRule {
    /// Join key shared with the care plan and rationale synthesizers.
    pub id: &'static str,
    pub category: RuleCategory,
    pub band: RiskBand,
    /// Probability of urgency reported with the assessment.
    pub probability: f32,
    /// Lowercase phrases, matched on word boundaries.
    pub triggers: &'static [&'static str],
    pub explanations: &'static [&'static str],
}

pub const UNCLASSIFIED_RULE_ID: &str = "unclassified";

// ── Rule registry ───────────────────────────────────────────

/// Immediate rules first, then urgent, then routine.
static RULES: &[SymptomRule] = &[
    SymptomRule {
        id: "chest-pain",
        category: RuleCategory::Cardiac,
        band: RiskBand::Immediate,
        probability: 0.92,
        triggers: &[
            "chest pain", "chest tightness", "tight chest", "tightness in my chest",
            "crushing chest", "pain in my chest", "pressure in my chest", "chest pressure",
            "pain radiating to my arm", "pain spreading to my arm",
        ],
        explanations: &[
            "Chest pain reported: possible acute coronary syndrome",
            "Cardiac causes must be excluded with an ECG and troponin testing",
            "Time-critical presentation: outcomes depend on rapid assessment",
        ],
    },
    SymptomRule {
        id: "breathing-difficulty",
        category: RuleCategory::Respiratory,
        band: RiskBand::Immediate,
        probability: 0.90,
        triggers: &[
            "can't breathe", "cannot breathe", "difficulty breathing", "trouble breathing",
            "struggling to breathe", "short of breath", "shortness of breath", "breathless",
            "lips turning blue", "choking",
        ],
        explanations: &[
            "Breathing difficulty reported",
            "Compromised airway or breathing is an immediate priority in triage",
        ],
    },
    SymptomRule {
        id: "stroke-signs",
        category: RuleCategory::Neurological,
        band: RiskBand::Immediate,
        probability: 0.91,
        triggers: &[
            "face drooping", "facial droop", "drooping face", "slurred speech",
            "slurring my words", "arm weakness", "weakness on one side", "numbness on one side",
            "can't lift my arm", "sudden confusion", "sudden loss of vision",
        ],
        explanations: &[
            "Focal neurological symptoms reported (FAST signs)",
            "Possible stroke: treatment is time-dependent",
        ],
    },
    SymptomRule {
        id: "thunderclap-headache",
        category: RuleCategory::Neurological,
        band: RiskBand::Immediate,
        probability: 0.89,
        triggers: &[
            "worst headache of my life", "worst headache ever", "thunderclap headache",
            "sudden severe headache",
        ],
        explanations: &[
            "Sudden-onset severe headache reported",
            "Thunderclap headache requires exclusion of subarachnoid haemorrhage",
        ],
    },
    SymptomRule {
        id: "severe-bleeding",
        category: RuleCategory::Haemorrhage,
        band: RiskBand::Immediate,
        probability: 0.87,
        triggers: &[
            "heavy bleeding", "bleeding heavily", "won't stop bleeding", "will not stop bleeding",
            "bleeding that won't stop", "coughing up blood", "vomiting blood", "blood in my vomit",
        ],
        explanations: &[
            "Uncontrolled or internal bleeding reported",
            "Significant blood loss can cause rapid deterioration",
        ],
    },
    SymptomRule {
        id: "collapse",
        category: RuleCategory::Collapse,
        band: RiskBand::Immediate,
        probability: 0.88,
        triggers: &[
            "passed out", "fainted", "collapsed", "unconscious", "unresponsive", "seizure",
            "convulsion", "blacked out",
        ],
        explanations: &[
            "Loss of consciousness or seizure reported",
            "Transient loss of consciousness needs assessment for cardiac and neurological causes",
        ],
    },
    SymptomRule {
        id: "high-fever",
        category: RuleCategory::Infection,
        band: RiskBand::Urgent,
        probability: 0.68,
        triggers: &["high fever", "high temperature", "fever", "rigors", "shivering"],
        explanations: &[
            "Fever reported",
            "Fever with systemic symptoms needs same-day assessment to exclude sepsis",
        ],
    },
    SymptomRule {
        id: "abdominal-pain",
        category: RuleCategory::Abdominal,
        band: RiskBand::Urgent,
        probability: 0.64,
        triggers: &[
            "severe abdominal pain", "severe stomach pain", "abdominal pain", "stomach pain",
            "pain in my abdomen", "tummy pain", "belly pain",
        ],
        explanations: &[
            "Abdominal pain reported",
            "Surgical causes of abdominal pain must be excluded the same day",
        ],
    },
    SymptomRule {
        id: "head-injury",
        category: RuleCategory::HeadInjury,
        band: RiskBand::Urgent,
        probability: 0.62,
        triggers: &[
            "hit my head", "head injury", "banged my head", "bumped my head", "knocked my head",
            "concussion",
        ],
        explanations: &[
            "Head injury reported",
            "Head injuries need assessment for delayed intracranial complications",
        ],
    },
    SymptomRule {
        id: "suspected-fracture",
        category: RuleCategory::Fracture,
        band: RiskBand::Urgent,
        probability: 0.60,
        triggers: &[
            "can't walk", "cannot walk", "unable to walk", "can't put weight", "can't bear weight",
            "cannot bear weight", "heard a crack", "bone sticking out", "broken bone", "broke my",
            "deformed",
        ],
        explanations: &[
            "Inability to bear weight or deformity reported",
            "Possible fracture: imaging criteria are likely to be met",
        ],
    },
    SymptomRule {
        id: "severe-headache",
        category: RuleCategory::Headache,
        band: RiskBand::Urgent,
        probability: 0.58,
        triggers: &[
            "severe headache", "headache and vomiting", "headache with vomiting", "stiff neck",
        ],
        explanations: &[
            "Severe headache or headache with red-flag features reported",
            "Secondary causes of headache should be assessed the same day",
        ],
    },
    SymptomRule {
        id: "mild-headache",
        category: RuleCategory::Headache,
        band: RiskBand::Routine,
        probability: 0.15,
        triggers: &["mild headache", "tension headache", "headache", "migraine"],
        explanations: &[
            "Headache reported without red-flag features",
            "Uncomplicated headache is usually managed in primary care or with pharmacy advice",
        ],
    },
    SymptomRule {
        id: "ankle-sprain",
        category: RuleCategory::Musculoskeletal,
        band: RiskBand::Routine,
        probability: 0.12,
        triggers: &[
            "twisted my ankle", "twisted ankle", "sprained my ankle", "sprained ankle",
            "ankle sprain", "rolled my ankle", "went over on my ankle",
        ],
        explanations: &[
            "Ankle injury reported without inability to bear weight",
            "Soft-tissue ankle injuries usually recover with self-care",
        ],
    },
    SymptomRule {
        id: "minor-strain",
        category: RuleCategory::Musculoskeletal,
        band: RiskBand::Routine,
        probability: 0.14,
        triggers: &[
            "pulled a muscle", "muscle strain", "strained my", "sore muscles", "stiff back",
            "backache", "back ache",
        ],
        explanations: &[
            "Minor muscle strain reported",
            "Uncomplicated strains usually settle with self-care within two weeks",
        ],
    },
    SymptomRule {
        id: "common-cold",
        category: RuleCategory::UpperRespiratory,
        band: RiskBand::Routine,
        probability: 0.10,
        triggers: &[
            "runny nose", "blocked nose", "stuffy nose", "sore throat", "sneezing",
            "common cold", "head cold", "cold symptoms", "cough",
        ],
        explanations: &[
            "Upper respiratory symptoms reported",
            "Self-limiting viral illness is the most likely cause",
        ],
    },
];

static UNCLASSIFIED_RULE: SymptomRule = SymptomRule {
    id: UNCLASSIFIED_RULE_ID,
    category: RuleCategory::Unclassified,
    band: RiskBand::Urgent,
    probability: 0.50,
    triggers: &[],
    explanations: &[
        "No recognised symptom pattern in the description",
        "Conservative default: unclassified symptoms are assessed as urgent until reviewed",
    ],
};

/// The ordered rule table, excluding the fallback.
pub fn rules() -> &'static [SymptomRule] {
    RULES
}

/// Look up any rule by id, including the fallback.
pub fn find_rule(id: &str) -> Option<&'static SymptomRule> {
    RULES
        .iter()
        .chain(std::iter::once(&UNCLASSIFIED_RULE))
        .find(|rule| rule.id == id)
}

// ── Classification ──────────────────────────────────────────

/// Outcome of a single classification.
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub rule: &'static SymptomRule,
    /// Trigger that fired; `None` for the fallback.
    pub matched_phrase: Option<&'static str>,
}

impl Classification {
    pub fn band(&self) -> RiskBand {
        self.rule.band
    }

    pub fn rule_id(&self) -> &'static str {
        self.rule.id
    }

    pub fn probability(&self) -> f32 {
        self.rule.probability
    }

    pub fn is_fallback(&self) -> bool {
        self.matched_phrase.is_none()
    }

    pub fn to_assessment(&self) -> RiskAssessment {
        RiskAssessment {
            band: self.rule.band,
            probability: self.rule.probability.clamp(0.0, 1.0),
            explanations: self.rule.explanations.iter().map(|e| (*e).to_string()).collect(),
            matched_rule: self.rule.id.to_string(),
        }
    }
}

/// Classify normalized symptom text. First matching rule wins.
pub fn classify(text: &NormalizedText) -> Classification {
    let text = text.as_str();

    for rule in RULES {
        if let Some(phrase) = rule.triggers.iter().find(|p| contains_phrase(text, p)) {
            tracing::debug!(
                rule_id = rule.id,
                band = ?rule.band,
                trigger = *phrase,
                "Symptom rule matched"
            );
            return Classification {
                rule,
                matched_phrase: Some(*phrase),
            };
        }
    }

    tracing::debug!(
        rule_id = UNCLASSIFIED_RULE_ID,
        "No symptom rule matched, applying conservative default"
    );
    Classification {
        rule: &UNCLASSIFIED_RULE,
        matched_phrase: None,
    }
}

/// Phrase occurs in `text` with non-alphanumeric characters (or the ends) on both sides.
pub(crate) fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, matched)| {
        let end = start + matched.len();
        let clear_before = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let clear_after = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        clear_before && clear_after
    })
}
