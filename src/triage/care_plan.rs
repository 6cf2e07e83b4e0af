//! Care Plan Synthesizer.
//!
//! Maps the matched rule to an authored plan. The mapping is total over bands: an
//! unmapped rule id, or an authored plan whose care level disagrees with the band,
//! is logged as a configuration defect and replaced by the band's generic plan.

use super::types::{CareLevel, CarePlan, RiskBand};

/// Build the care plan for a classification result.
pub fn build_plan(band: RiskBand, rule_id: &str) -> CarePlan {
    let expected = CareLevel::for_band(band);

    match authored_plan(rule_id) {
        Some(plan) if plan.care_level == expected => plan,
        Some(plan) => {
            tracing::error!(
                rule_id,
                band = ?band,
                care_level = ?plan.care_level,
                "Authored care plan disagrees with risk band, using generic plan"
            );
            generic_plan(band)
        }
        None => {
            tracing::error!(
                rule_id,
                band = ?band,
                "No care plan authored for rule, using generic plan"
            );
            generic_plan(band)
        }
    }
}

/// Fallback plan for a band.
pub fn generic_plan(band: RiskBand) -> CarePlan {
    match band {
        RiskBand::Immediate => plan(
            CareLevel::Emergency,
            "Go to Emergency Department now",
            "Seek emergency care now: these symptoms need immediate clinical assessment.",
            &[
                "Call emergency services or go to the nearest Emergency Department",
                "Do not drive yourself",
                "Bring a list of your current medications",
            ],
            Some("Immediately"),
            &[],
            &["Call emergency services if symptoms worsen while waiting"],
            0.70,
        ),
        RiskBand::Urgent => plan(
            CareLevel::UrgentCare,
            "Urgent clinical assessment",
            "Arrange an urgent assessment with a clinician today.",
            &[
                "Contact your GP practice or an urgent care service today",
                "Note when symptoms started and any changes",
            ],
            Some("Within 24 hours"),
            &["See a healthcare provider within 24 hours"],
            &["Go to the Emergency Department if symptoms become severe"],
            0.65,
        ),
        RiskBand::Routine => plan(
            CareLevel::PrimaryCare,
            "Self-care with primary care follow-up",
            "Primary care or pharmacy advice: manage at home and book a routine appointment if symptoms persist.",
            &[
                "Rest and monitor your symptoms",
                "Ask a pharmacist about suitable over-the-counter treatment",
            ],
            Some("Routine appointment if not improving within 7 days"),
            &[],
            &["Seek urgent care if new or worsening symptoms develop"],
            0.70,
        ),
    }
}

fn authored_plan(rule_id: &str) -> Option<CarePlan> {
    let plan = match rule_id {
        "chest-pain" => plan(
            CareLevel::Emergency,
            "Go to Emergency Department now",
            "Go to the Emergency Department now for an ECG and cardiac assessment.",
            &[
                "Call emergency services or have someone drive you to the Emergency Department",
                "Chew 300 mg aspirin unless you are allergic or have been told not to take it",
                "Stop any physical activity and sit down while you wait",
            ],
            Some("Immediately"),
            &[
                "12-lead ECG within 10 minutes of arrival",
                "Serial high-sensitivity troponin testing",
            ],
            &["Call emergency services if you faint, or if the pain worsens or spreads"],
            0.90,
        ),
        "breathing-difficulty" => plan(
            CareLevel::Emergency,
            "Call emergency services now",
            "Call emergency services now: difficulty breathing needs immediate treatment.",
            &[
                "Call emergency services",
                "Sit upright and loosen tight clothing",
                "Use your reliever inhaler if you have one prescribed",
            ],
            Some("Immediately"),
            &["Oxygen saturation and respiratory assessment on arrival"],
            &["Tell the call handler if lips or face are turning blue"],
            0.88,
        ),
        "stroke-signs" => plan(
            CareLevel::Emergency,
            "Call emergency services now",
            "Call emergency services now: these may be signs of a stroke.",
            &[
                "Call emergency services and say you suspect a stroke",
                "Note the time the symptoms started",
                "Do not eat or drink anything",
            ],
            Some("Immediately"),
            &["Urgent brain imaging at a stroke centre"],
            &["Do not wait to see whether the symptoms pass"],
            0.90,
        ),
        "thunderclap-headache" => plan(
            CareLevel::Emergency,
            "Go to Emergency Department now",
            "Go to the Emergency Department now: a sudden severe headache needs urgent investigation.",
            &[
                "Go to the nearest Emergency Department",
                "Do not take further painkillers before assessment",
            ],
            Some("Immediately"),
            &["CT head scan", "Neurological examination"],
            &["Call emergency services if you become drowsy, confused or have a seizure"],
            0.86,
        ),
        "severe-bleeding" => plan(
            CareLevel::Emergency,
            "Call emergency services now",
            "Call emergency services now and apply firm pressure to any wound.",
            &[
                "Call emergency services",
                "Apply firm, continuous pressure to the bleeding point",
                "Lie down and raise your legs if you feel faint",
            ],
            Some("Immediately"),
            &["Blood count and cross-match on arrival"],
            &["Do not remove objects embedded in a wound"],
            0.87,
        ),
        "collapse" => plan(
            CareLevel::Emergency,
            "Go to Emergency Department now",
            "Go to the Emergency Department now for assessment after a collapse or seizure.",
            &[
                "Call emergency services if the person is not fully awake",
                "Place an unresponsive but breathing person in the recovery position",
                "Do not leave the person alone",
            ],
            Some("Immediately"),
            &["ECG and blood glucose check", "Neurological assessment"],
            &["Call emergency services if a seizure lasts more than 5 minutes"],
            0.85,
        ),
        "high-fever" => plan(
            CareLevel::UrgentCare,
            "Urgent same-day assessment",
            "Arrange a same-day assessment with your GP or an urgent care service.",
            &[
                "Contact your GP practice or an urgent care service today",
                "Take paracetamol to manage the temperature",
                "Drink plenty of fluids",
            ],
            Some("Within 24 hours"),
            &["See a healthcare provider within 24 hours", "Temperature and sepsis screening"],
            &["Go to the Emergency Department if you develop a rash, confusion or a stiff neck"],
            0.78,
        ),
        "abdominal-pain" => plan(
            CareLevel::UrgentCare,
            "Urgent same-day assessment",
            "Arrange a same-day assessment to rule out surgical causes of abdominal pain.",
            &[
                "Contact your GP practice or an urgent care service today",
                "Avoid eating until you have been assessed",
            ],
            Some("Within 24 hours"),
            &["See a healthcare provider within 24 hours", "Abdominal examination and urinalysis"],
            &["Go to the Emergency Department if the pain becomes severe or you vomit blood"],
            0.76,
        ),
        "head-injury" => plan(
            CareLevel::UrgentCare,
            "Urgent same-day assessment",
            "Arrange a same-day assessment of the head injury.",
            &[
                "Have someone stay with you for the next 24 hours",
                "Avoid alcohol and sleeping tablets",
                "Rest and avoid contact sports",
            ],
            Some("Within 24 hours"),
            &["See a healthcare provider within 24 hours"],
            &["Go to the Emergency Department if you vomit repeatedly, become drowsy or confused"],
            0.78,
        ),
        "suspected-fracture" => plan(
            CareLevel::UrgentCare,
            "Urgent injury assessment",
            "Attend an urgent treatment centre or minor injuries unit for an X-ray.",
            &[
                "Keep the injured limb still and supported",
                "Apply an ice pack wrapped in a cloth",
                "Do not put weight on the injured limb",
            ],
            Some("Within 4 hours"),
            &["X-ray of the injured area"],
            &["Call emergency services if the limb becomes cold, pale or numb"],
            0.80,
        ),
        "severe-headache" => plan(
            CareLevel::UrgentCare,
            "Urgent same-day assessment",
            "Arrange a same-day assessment to check for secondary causes of headache.",
            &[
                "Contact your GP practice or an urgent care service today",
                "Rest in a quiet, dark room",
            ],
            Some("Within 24 hours"),
            &["See a healthcare provider within 24 hours", "Blood pressure and neurological check"],
            &["Go to the Emergency Department if the headache becomes sudden and severe"],
            0.76,
        ),
        "mild-headache" => plan(
            CareLevel::PrimaryCare,
            "Self-care",
            "Primary care or pharmacy advice: manage at home with simple pain relief and fluids.",
            &[
                "Take paracetamol or ibuprofen as directed on the pack",
                "Drink water and rest",
                "Limit screen time and caffeine",
            ],
            Some("Book a GP appointment if not improved within 3 days"),
            &["Keep a headache diary if headaches recur"],
            &["Seek urgent care if the headache becomes severe or you develop a fever or stiff neck"],
            0.85,
        ),
        "ankle-sprain" => plan(
            CareLevel::PrimaryCare,
            "Self-care with pharmacy advice",
            "Primary care or pharmacy advice: treat the sprain at home and ask a pharmacist about pain relief.",
            &[
                "Follow the RICE protocol: Rest, Ice, Compression, Elevation",
                "Take ibuprofen or paracetamol as directed",
                "Start gentle movement after 48 hours",
            ],
            Some("Most sprains improve within 2 weeks"),
            &["See a physiotherapist if the ankle is still unstable after 6 weeks"],
            &["Seek urgent care if you cannot put weight on the ankle"],
            0.88,
        ),
        "minor-strain" => plan(
            CareLevel::PrimaryCare,
            "Self-care with pharmacy advice",
            "Primary care or pharmacy advice: rest the strained muscle and keep gently active.",
            &[
                "Use an ice pack for the first 48 hours, then gentle heat",
                "Take ibuprofen or paracetamol as directed",
                "Keep moving gently within comfortable limits",
            ],
            Some("Most strains improve within 2 weeks"),
            &["See your GP if pain persists beyond 6 weeks"],
            &["Seek urgent care if you develop numbness or weakness in your legs"],
            0.84,
        ),
        "common-cold" => plan(
            CareLevel::PrimaryCare,
            "Self-care",
            "Primary care or pharmacy advice: rest, fluids and over-the-counter remedies.",
            &[
                "Rest and drink plenty of fluids",
                "Ask a pharmacist about decongestants or throat lozenges",
            ],
            Some("Symptoms usually clear within 7 to 10 days"),
            &[],
            &["Seek advice if symptoms last more than 3 weeks or you become short of breath"],
            0.86,
        ),
        "unclassified" => plan(
            CareLevel::UrgentCare,
            "Urgent clinical assessment",
            "Arrange a clinical assessment today so a clinician can review your symptoms.",
            &[
                "Contact your GP practice or an urgent care service",
                "Describe all your symptoms, when they started and how they have changed",
            ],
            Some("Within 24 hours"),
            &["See a healthcare provider within 24 hours"],
            &["Go to the Emergency Department if you develop chest pain, breathing difficulty or confusion"],
            0.60,
        ),
        _ => return None,
    };
    Some(plan)
}

#[allow(clippy::too_many_arguments)]
fn plan(
    care_level: CareLevel,
    disposition: &str,
    recommendation: &str,
    actions: &[&str],
    timeframe: Option<&str>,
    follow_up: &[&str],
    warnings: &[&str],
    confidence: f32,
) -> CarePlan {
    CarePlan {
        care_level,
        disposition: disposition.to_string(),
        recommendation: recommendation.to_string(),
        actions: to_strings(actions),
        timeframe: timeframe.map(str::to_string),
        follow_up: to_strings(follow_up),
        warnings: to_strings(warnings),
        confidence: confidence.clamp(0.0, 1.0),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::classifier::{rules, UNCLASSIFIED_RULE_ID};

    #[test]
    fn every_rule_has_congruent_authored_plan() {
        for rule in rules() {
            let plan = authored_plan(rule.id)
                .unwrap_or_else(|| panic!("no plan for rule {}", rule.id));
            assert_eq!(plan.care_level.band(), rule.band, "rule {}", rule.id);
            assert!(!plan.actions.is_empty(), "rule {}", rule.id);
            assert!((0.0..=1.0).contains(&plan.confidence), "rule {}", rule.id);
        }
    }

    #[test]
    fn chest_pain_plan_sends_to_emergency_department() {
        let plan = build_plan(RiskBand::Immediate, "chest-pain");
        assert_eq!(plan.disposition, "Go to Emergency Department now");
        assert_eq!(plan.care_level, CareLevel::Emergency);
        assert!(plan.follow_up.iter().any(|f| f.contains("ECG")));
        assert!(plan.follow_up.iter().any(|f| f.contains("troponin")));
        assert!(plan.warnings.iter().any(|w| w.contains("Call emergency services")));
    }

    #[test]
    fn ankle_sprain_plan_includes_rice() {
        let plan = build_plan(RiskBand::Routine, "ankle-sprain");
        assert_eq!(plan.disposition, "Self-care with pharmacy advice");
        assert!(plan.actions.iter().any(|a| a.contains("RICE")));
    }

    #[test]
    fn mild_headache_recommends_primary_care_or_pharmacy() {
        let plan = build_plan(RiskBand::Routine, "mild-headache");
        assert!(plan.recommendation.contains("Primary care or pharmacy advice"));
    }

    #[test]
    fn unclassified_plan_follows_up_within_24_hours() {
        let plan = build_plan(RiskBand::Urgent, UNCLASSIFIED_RULE_ID);
        assert_eq!(plan.care_level, CareLevel::UrgentCare);
        assert!(plan.follow_up.iter().any(|f| f.contains("within 24 hours")));
    }

    #[test]
    fn unmapped_rule_falls_back_to_generic_plan() {
        for band in [RiskBand::Immediate, RiskBand::Urgent, RiskBand::Routine] {
            let plan = build_plan(band, "rule-that-does-not-exist");
            assert_eq!(plan, generic_plan(band));
            assert_eq!(plan.care_level.band(), band);
        }
    }

    #[test]
    fn mismatched_band_falls_back_to_generic_plan() {
        let plan = build_plan(RiskBand::Routine, "chest-pain");
        assert_eq!(plan.care_level, CareLevel::PrimaryCare);
        assert_eq!(plan, generic_plan(RiskBand::Routine));
    }

    #[test]
    fn generic_plans_are_complete() {
        for band in [RiskBand::Immediate, RiskBand::Urgent, RiskBand::Routine] {
            let plan = generic_plan(band);
            assert!(!plan.actions.is_empty());
            assert!(!plan.recommendation.is_empty());
            assert!((0.0..=1.0).contains(&plan.confidence));
        }
    }

    #[test]
    fn empty_optional_lists_are_omitted_from_json() {
        let plan = build_plan(RiskBand::Routine, "common-cold");
        let value = serde_json::to_value(&plan).unwrap();
        assert!(value.get("followUp").is_none());
        assert!(value.get("warnings").is_some());
        assert_eq!(value["careLevel"], "primary_care");
    }
}
