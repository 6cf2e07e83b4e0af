//! Symptom triage: sanitize free text, classify it against an ordered keyword
//! ruleset, and assemble risk, care plan and rationale from the single rule that
//! fired.
//!
//! Entry point is [`TriageEngine`]. No I/O, no network, no shared mutable state.

pub mod care_plan;
pub mod classifier;
mod engine;
pub mod rationale;
mod sanitize;
mod types;

pub use care_plan::build_plan;
pub use classifier::{
    classify, find_rule, rules, Classification, SymptomRule, UNCLASSIFIED_RULE_ID,
};
pub use engine::TriageEngine;
pub use rationale::build_rationale;
pub use sanitize::{sanitize_symptom_text, NormalizedText};
pub use types::*;
