//! Triage orchestrator: rules + scores → urgency advice.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use carepath_common::config::TriageConfig;
use carepath_common::{Result, SpecialtyScore, TriageAdvice, TriageRequest, TriageResponse, UrgencyLevel};

use crate::knowledge_base::KnowledgeBase;
use crate::rules::evaluate_rules;
use crate::scorer::score_specialties;

/// Specialty reported when the score list is empty, and never routed to `specialist`.
pub const GENERAL_PRACTICE_ID: &str = "gp";
pub const GENERAL_PRACTICE_LABEL: &str = "General Practice";

/// True when a rationale string calls for emergency care.
///
/// Case-insensitive substring match on `immediate|ER`.
pub fn matches_escalation(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)immediate|ER").expect("escalation pattern is valid"))
        .is_match(text)
}

/// Thresholds for score-based routing.
#[derive(Debug, Clone, PartialEq)]
pub struct UrgencyPolicy {
    pub specialist_threshold: f64,
    pub self_care_threshold: f64,
}

impl Default for UrgencyPolicy {
    fn default() -> Self {
        Self { specialist_threshold: 0.60, self_care_threshold: 0.30 }
    }
}

impl From<&TriageConfig> for UrgencyPolicy {
    fn from(cfg: &TriageConfig) -> Self {
        Self {
            specialist_threshold: cfg.specialist_threshold,
            self_care_threshold: cfg.self_care_threshold,
        }
    }
}

impl UrgencyPolicy {
    /// First matching step wins: escalation rationale, strong non-GP match,
    /// weak match, otherwise GP.
    pub fn decide_level(&self, rationale: &[String], top: &SpecialtyScore) -> UrgencyLevel {
        if rationale.iter().any(|r| matches_escalation(r)) {
            UrgencyLevel::Er
        } else if top.score >= self.specialist_threshold && top.specialty_id != GENERAL_PRACTICE_ID {
            UrgencyLevel::Specialist
        } else if top.score < self.self_care_threshold {
            UrgencyLevel::SelfCare
        } else {
            UrgencyLevel::SeeGp
        }
    }
}

/// Immutable, shareable triage engine.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    kb: Arc<KnowledgeBase>,
    policy: UrgencyPolicy,
}

impl TriageEngine {
    pub fn new(kb: Arc<KnowledgeBase>, policy: UrgencyPolicy) -> Self {
        Self { kb, policy }
    }

    /// Built-in knowledge base with default thresholds.
    pub fn builtin() -> Self {
        Self::new(Arc::new(KnowledgeBase::builtin()), UrgencyPolicy::default())
    }

    /// Knowledge base from `cfg.knowledge_base` when set, else the built-in tables.
    pub fn from_config(cfg: &TriageConfig) -> Result<Self> {
        let kb = match &cfg.knowledge_base {
            Some(path) => KnowledgeBase::from_path(path)?,
            None => KnowledgeBase::builtin(),
        };
        Ok(Self::new(Arc::new(kb), UrgencyPolicy::from(cfg)))
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn policy(&self) -> &UrgencyPolicy {
        &self.policy
    }

    pub fn score_specialties(&self, req: &TriageRequest) -> Vec<SpecialtyScore> {
        score_specialties(&self.kb, req)
    }

    pub fn evaluate_rules(&self, req: &TriageRequest) -> Vec<String> {
        evaluate_rules(&self.kb, req)
    }

    pub fn triage(&self, req: &TriageRequest) -> TriageResponse {
        let rationale = self.evaluate_rules(req);
        let specialties = self.score_specialties(req);

        let top = specialties.first().cloned().unwrap_or_else(|| SpecialtyScore {
            specialty_id: GENERAL_PRACTICE_ID.to_string(),
            label: GENERAL_PRACTICE_LABEL.to_string(),
            score: 0.0,
        });

        let level = self.policy.decide_level(&rationale, &top);
        tracing::debug!(
            level = %level,
            top = %top.specialty_id,
            score = top.score,
            rules_fired = rationale.len(),
            "Triage decision"
        );

        let rationale = if rationale.is_empty() {
            vec![format!("Top match: {}", top.label)]
        } else {
            rationale
        };

        TriageResponse { specialties, advice: TriageAdvice { level, rationale } }
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carepath_common::{PatientContext, Severity, Sex, SymptomInput};

    fn top(id: &str, score: f64) -> SpecialtyScore {
        SpecialtyScore { specialty_id: id.to_string(), label: id.to_string(), score }
    }

    #[test]
    fn test_escalation_pattern() {
        assert!(matches_escalation("Severe chest pain warrants immediate evaluation."));
        assert!(matches_escalation("Go to the ER now"));
        assert!(matches_escalation("IMMEDIATE attention"));
        // Case-insensitive substring: "er" inside any word matches too.
        assert!(matches_escalation("Consider a referral"));
        assert!(matches_escalation("Top match: Dermatology"));
        assert!(!matches_escalation("Top match: Cardiology"));
        assert!(!matches_escalation(""));
    }

    #[test]
    fn test_decide_level_precedence() {
        let policy = UrgencyPolicy::default();
        let er = vec!["needs immediate care".to_string()];

        // Escalation overrides every score-based branch.
        assert_eq!(policy.decide_level(&er, &top("dermatology", 0.9)), UrgencyLevel::Er);
        assert_eq!(policy.decide_level(&er, &top("gp", 0.0)), UrgencyLevel::Er);

        assert_eq!(policy.decide_level(&[], &top("dermatology", 0.6)), UrgencyLevel::Specialist);
        assert_eq!(policy.decide_level(&[], &top("dermatology", 0.59)), UrgencyLevel::SeeGp);
        assert_eq!(policy.decide_level(&[], &top("dermatology", 0.3)), UrgencyLevel::SeeGp);
        assert_eq!(policy.decide_level(&[], &top("dermatology", 0.29)), UrgencyLevel::SelfCare);
    }

    #[test]
    fn test_gp_never_routes_to_specialist() {
        let policy = UrgencyPolicy::default();
        assert_eq!(policy.decide_level(&[], &top("gp", 0.95)), UrgencyLevel::SeeGp);
    }

    #[test]
    fn test_custom_thresholds() {
        let policy = UrgencyPolicy { specialist_threshold: 0.4, self_care_threshold: 0.1 };
        assert_eq!(policy.decide_level(&[], &top("neurology", 0.45)), UrgencyLevel::Specialist);
        assert_eq!(policy.decide_level(&[], &top("neurology", 0.2)), UrgencyLevel::SeeGp);
    }

    #[test]
    fn test_empty_knowledge_base_uses_synthetic_gp() {
        let kb = KnowledgeBase::new(vec![], vec![]).unwrap();
        let engine = TriageEngine::new(Arc::new(kb), UrgencyPolicy::default());
        let req = TriageRequest {
            context: PatientContext { age: 30, sex: Sex::Male },
            symptoms: vec![SymptomInput::new("s_headache", "Headache")],
        };
        let resp = engine.triage(&req);
        assert!(resp.specialties.is_empty());
        assert_eq!(resp.advice.level, UrgencyLevel::SelfCare);
        assert_eq!(resp.advice.rationale, vec!["Top match: General Practice".to_string()]);
    }

    #[test]
    fn test_rule_rationale_replaces_top_match() {
        let req = TriageRequest {
            context: PatientContext { age: 40, sex: Sex::Female },
            symptoms: vec![
                SymptomInput::new("s_chest_pain", "Chest pain").with_severity(Severity::Severe),
            ],
        };
        let resp = TriageEngine::builtin().triage(&req);
        assert_eq!(
            resp.advice.rationale,
            vec!["Severe chest pain warrants immediate evaluation.".to_string()]
        );
    }

    #[test]
    fn test_from_config_defaults_to_builtin() {
        let engine = TriageEngine::from_config(&TriageConfig::default()).unwrap();
        assert_eq!(engine.knowledge_base(), &KnowledgeBase::builtin());
        assert_eq!(engine.policy(), &UrgencyPolicy::default());
    }

    #[test]
    fn test_from_config_missing_file_is_an_error() {
        let cfg = TriageConfig {
            knowledge_base: Some("/nonexistent/kb.toml".into()),
            ..TriageConfig::default()
        };
        assert!(TriageEngine::from_config(&cfg).is_err());
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TriageEngine>();
    }
}
