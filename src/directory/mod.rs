//! Patient Directory: a fixed, read-only catalog of patients.
//!
//! Maps a patient key to identity, a chronological medical-history timeline, and the
//! rationale profile for the patient's condition archetype. Unknown or absent keys
//! resolve to the unregistered sentinel; absence is a modelled case, never an error.
//! The catalog is built once on first use and never mutated.

mod catalog;
mod types;

use std::sync::LazyLock;

pub use catalog::UNREGISTERED_KEY;
pub use types::*;

/// Optional suffix on patient keys supplied by callers.
const KEY_SUFFIX: &str = "-key";

static DIRECTORY: LazyLock<PatientDirectory> = LazyLock::new(|| PatientDirectory::builtin());

pub struct PatientDirectory {
    entries: Vec<PatientEntry>,
    unregistered: PatientEntry,
}

impl PatientDirectory {
    /// The process-wide directory.
    pub fn global() -> &'static PatientDirectory {
        &DIRECTORY
    }

    fn builtin() -> Self {
        let entries = catalog::registered_patients();
        tracing::debug!(patients = entries.len(), "Patient directory initialised");
        Self {
            entries,
            unregistered: catalog::unregistered_patient(),
        }
    }

    /// Resolve a patient key. Keys are trimmed and compared case-insensitively, and a
    /// trailing `-key` is accepted (`john-carter-key` resolves `john-carter`).
    pub fn lookup(&self, patient_key: Option<&str>) -> PatientRecord<'_> {
        match patient_key.and_then(|key| self.find(key)) {
            Some(entry) => record(entry, true),
            None => record(&self.unregistered, false),
        }
    }

    /// Picker rows in catalog order. The sentinel is not listed.
    pub fn patients(&self) -> Vec<PatientSummary> {
        self.entries
            .iter()
            .map(|entry| PatientSummary::from(&entry.patient))
            .collect()
    }

    /// Raw timeline for a key; empty for unknown keys.
    pub fn timeline(&self, patient_key: &str) -> &[TimelineEntry] {
        self.find(patient_key)
            .map(|entry| entry.timeline.as_slice())
            .unwrap_or(&[])
    }

    fn find(&self, patient_key: &str) -> Option<&PatientEntry> {
        let key = patient_key.trim();
        if key.is_empty() {
            return None;
        }
        let canonical = strip_key_suffix(key);
        self.entries.iter().find(|entry| {
            entry.patient.key.eq_ignore_ascii_case(key)
                || entry.patient.key.eq_ignore_ascii_case(canonical)
        })
    }
}

fn strip_key_suffix(key: &str) -> &str {
    let split = key.len().saturating_sub(KEY_SUFFIX.len());
    match key.get(split..) {
        Some(suffix) if split > 0 && suffix.eq_ignore_ascii_case(KEY_SUFFIX) => &key[..split],
        _ => key,
    }
}

fn record(entry: &PatientEntry, registered: bool) -> PatientRecord<'_> {
    PatientRecord {
        patient: &entry.patient,
        timeline: &entry.timeline,
        profile: &entry.profile,
        registered,
    }
}

/// Shorthand for [`PatientDirectory::lookup`] on the global directory.
pub fn lookup(patient_key: Option<&str>) -> PatientRecord<'static> {
    PatientDirectory::global().lookup(patient_key)
}
