use serde::{Deserialize, Serialize};

use super::severity::severity_score;

/// Symptom labels that escalate when paired with a high severity.
pub const RED_FLAG_SYMPTOMS: &[&str] = &["chest pain", "shortness of breath", "dizziness"];

/// Scores at or above this make a red-flag symptom urgent.
pub const URGENT_THRESHOLD: u8 = 7;
/// Scores at or below this may be handled with self-care.
pub const SELF_CARE_THRESHOLD: u8 = 3;

/// Urgency level for a reported symptom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageCategory {
    Urgent,
    Routine,
    SelfCare,
}

impl std::fmt::Display for TriageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Urgent => write!(f, "urgent"),
            Self::Routine => write!(f, "routine"),
            Self::SelfCare => write!(f, "selfcare"),
        }
    }
}

/// Classify a symptom report.
///
/// `symptom` and `severity` are expected lower-cased by the caller; the
/// red-flag match is exact. `duration` is matched case-insensitively.
/// The red-flag rule is checked first, so a red-flag symptom with a low
/// score can still come out as self-care.
pub fn classify_triage(symptom: &str, severity: &str, duration: &str) -> TriageCategory {
    let score = severity_score(severity);

    if RED_FLAG_SYMPTOMS.contains(&symptom) && score >= URGENT_THRESHOLD {
        TriageCategory::Urgent
    } else if score <= SELF_CARE_THRESHOLD && duration.to_lowercase().contains("day") {
        TriageCategory::SelfCare
    } else {
        TriageCategory::Routine
    }
}
