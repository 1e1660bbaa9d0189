//! Request and response types exchanged with the triage engine.
//!
//! These types are request-scoped: the engine builds a fresh response for
//! every request and never mutates or retains the caller's input.

use serde::{Deserialize, Serialize};

// ── Patient context ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Unknown => "unknown",
        }
    }
}

/// Age and sex supplied by the caller. Age is meaningful in `[0, 120]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContext {
    pub age: u32,
    pub sex: Sex,
}

/// Upper bound accepted for `PatientContext::age` at the transport boundary.
pub const MAX_AGE: u32 = 120;

// ── Symptoms ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

/// Accepted on the wire and carried through, but not read by either scoring path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Onset {
    Sudden,
    Gradual,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomInput {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onset: Option<Onset>,
}

impl SymptomInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            duration_days: None,
            severity: None,
            onset: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_onset(mut self, onset: Onset) -> Self {
        self.onset = Some(onset);
        self
    }

    pub fn with_duration_days(mut self, days: u32) -> Self {
        self.duration_days = Some(days);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRequest {
    pub context: PatientContext,
    pub symptoms: Vec<SymptomInput>,
}

// ── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyScore {
    pub specialty_id: String,
    pub label: String,
    /// Always clamped to `[0, 1]`.
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrgencyLevel {
    SelfCare,
    SeeGp,
    Specialist,
    UrgentCare,
    Er,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::SelfCare => "self-care",
            UrgencyLevel::SeeGp => "see-gp",
            UrgencyLevel::Specialist => "specialist",
            UrgencyLevel::UrgentCare => "urgent-care",
            UrgencyLevel::Er => "er",
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageAdvice {
    pub level: UrgencyLevel,
    /// Never empty.
    pub rationale: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResponse {
    pub specialties: Vec<SpecialtyScore>,
    pub advice: TriageAdvice,
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_wire_format() {
        let body = r#"{
            "context": {"age": 42, "sex": "female"},
            "symptoms": [
                {"id": "s_headache", "label": "Headache", "durationDays": 3,
                 "severity": "moderate", "onset": "gradual"}
            ]
        }"#;
        let req: TriageRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.context.age, 42);
        assert_eq!(req.context.sex, Sex::Female);
        assert_eq!(
            req.symptoms[0],
            SymptomInput::new("s_headache", "Headache")
                .with_duration_days(3)
                .with_severity(Severity::Moderate)
                .with_onset(Onset::Gradual)
        );
    }

    #[test]
    fn test_optional_symptom_fields_default_to_none() {
        let body = r#"{"id": "s_skin_rash", "label": "Skin rash"}"#;
        let s: SymptomInput = serde_json::from_str(body).unwrap();
        assert!(s.severity.is_none());
        assert!(s.onset.is_none());
        assert!(s.duration_days.is_none());
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let body = r#"{"id": "s_skin_rash", "label": "Skin rash", "severity": "extreme"}"#;
        assert!(serde_json::from_str::<SymptomInput>(body).is_err());
    }

    #[test]
    fn test_urgency_level_serialises_kebab_case() {
        let levels = [
            UrgencyLevel::SelfCare,
            UrgencyLevel::SeeGp,
            UrgencyLevel::Specialist,
            UrgencyLevel::UrgentCare,
            UrgencyLevel::Er,
        ];
        for level in levels {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
    }

    #[test]
    fn test_response_uses_camel_case_specialty_id() {
        let resp = TriageResponse {
            specialties: vec![SpecialtyScore {
                specialty_id: "dermatology".to_string(),
                label: "Dermatology".to_string(),
                score: 0.475,
            }],
            advice: TriageAdvice {
                level: UrgencyLevel::SeeGp,
                rationale: vec!["Top match: Dermatology".to_string()],
            },
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["specialties"][0]["specialtyId"], "dermatology");
        assert_eq!(value["advice"]["level"], "see-gp");
    }
}
