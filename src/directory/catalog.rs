//! Fixed patient catalog. Timelines are listed oldest first.

use super::types::{
    Archetype, ConfidenceTier, Gender, Patient, PatientEntry, RationaleProfile, TimelineEntry,
};

pub const UNREGISTERED_KEY: &str = "unregistered";

pub(crate) fn registered_patients() -> Vec<PatientEntry> {
    vec![
        entry(
            "john-carter",
            "John Carter",
            58,
            Gender::Male,
            Archetype::Cardiac,
            "Hypertensive with raised cholesterol and one previous emergency attendance \
             for chest tightness that was investigated and ruled out.",
            &[
                ("2 years ago", "Diagnosed with hypertension; started amlodipine 5 mg daily"),
                (
                    "8 months ago",
                    "Emergency attendance for chest tightness; ECG normal sinus rhythm, \
                     troponin negative (<5 ng/L); discharged",
                ),
                ("3 months ago", "Lipid panel: LDL 4.1 mmol/L; atorvastatin 20 mg started"),
                ("2 weeks ago", "Routine review: blood pressure 142/88 mmHg"),
            ],
        ),
        entry(
            "emma-wilson",
            "Emma Wilson",
            34,
            Gender::Female,
            Archetype::Headache,
            "Long-standing migraine without aura, stable on prophylaxis with a normal \
             neurological review.",
            &[
                ("5 years ago", "Diagnosed with migraine without aura"),
                ("1 year ago", "Started propranolol 40 mg for migraine prophylaxis"),
                (
                    "6 months ago",
                    "Headache diary: 2-3 migraine episodes per month, responsive to sumatriptan",
                ),
                ("1 month ago", "Neurology review: normal examination, no red flags"),
            ],
        ),
        entry(
            "liam-patel",
            "Liam Patel",
            27,
            Gender::Male,
            Archetype::Musculoskeletal,
            "Active footballer with a previous ankle sprain and recurrent ankle \
             instability treated with physiotherapy.",
            &[
                ("3 years ago", "Left ankle sprain playing football; managed conservatively"),
                ("1 year ago", "Physiotherapy course for recurrent left ankle instability"),
                ("4 months ago", "Right knee strain; X-ray showed no fracture"),
            ],
        ),
    ]
}

pub(crate) fn unregistered_patient() -> PatientEntry {
    PatientEntry {
        patient: Patient {
            key: UNREGISTERED_KEY.into(),
            display_name: "Unregistered patient".into(),
            age: None,
            gender: Gender::Unknown,
        },
        timeline: Vec::new(),
        profile: RationaleProfile {
            archetype: Archetype::None,
            history_summary: "No registered medical history is available.".into(),
            confidence_tier: ConfidenceTier::Unverified,
        },
    }
}

fn entry(
    key: &str,
    display_name: &str,
    age: u8,
    gender: Gender,
    archetype: Archetype,
    history_summary: &str,
    timeline: &[(&str, &str)],
) -> PatientEntry {
    PatientEntry {
        patient: Patient {
            key: key.into(),
            display_name: display_name.into(),
            age: Some(age),
            gender,
        },
        timeline: timeline
            .iter()
            .map(|(when, note)| TimelineEntry {
                when: (*when).into(),
                note: (*note).into(),
            })
            .collect(),
        profile: RationaleProfile {
            archetype,
            history_summary: history_summary.into(),
            confidence_tier: ConfidenceTier::Established,
        },
    }
}
