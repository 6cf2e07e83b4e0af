pub mod config;
pub mod directory; // Patient Directory
pub mod triage; // Classifier, synthesizers and the assembly facade

use std::sync::LazyLock;

use tracing_subscriber::EnvFilter;

pub use config::{ConfigError, TriageConfig};
pub use directory::{PatientDirectory, PatientRecord, PatientSummary};
pub use triage::{
    RiskBand, SymptomTriage, TriageEngine, TriageError, TriageRequest, TriageResult,
};

static DEFAULT_ENGINE: LazyLock<TriageEngine> = LazyLock::new(TriageEngine::default);

/// Install the fmt subscriber. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::ENGINE_VERSION);
    }
}

/// Triage with the default configuration.
pub fn triage(text: &str, patient_key: Option<&str>) -> Result<TriageResult, TriageError> {
    DEFAULT_ENGINE.triage(text, patient_key)
}

/// Patients available for selection, in catalog order.
pub fn list_patients() -> Vec<PatientSummary> {
    PatientDirectory::global().patients()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_triages_with_defaults() {
        let result = triage("Severe chest pain for 20 minutes with sweating", Some("john-carter"))
            .unwrap();
        assert_eq!(result.risk.band, RiskBand::Immediate);
        assert!(result.is_severity_consistent());
    }

    #[test]
    fn facade_rejects_empty_text() {
        assert!(triage("", None).is_err());
    }

    #[test]
    fn picker_lists_registered_patients() {
        let keys: Vec<String> = list_patients().into_iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["john-carter", "emma-wilson", "liam-patel"]);
    }

    #[test]
    fn init_tracing_is_repeatable() {
        init_tracing();
        init_tracing();
    }
}
