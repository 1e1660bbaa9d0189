//! Classifier-backed advice: model ranking plus symptom-family boosts.
//!
//! Separate from [`carepath_triage::TriageEngine`]; the rule-based engine
//! never consults the model.

use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use carepath_common::{SpecialtyScore, TriageAdvice, TriageRequest, TriageResponse, UrgencyLevel};
use carepath_triage::engine::matches_escalation;
use carepath_triage::rules::evaluate_listed;
use carepath_triage::Rule;

use crate::model::{ClassifierInput, ClassifierModel, Prediction, DEFAULT_TOP_K};
use crate::vocab::{class_label, normalize_symptoms};

/// Classes requested from the model before boosting, so a boosted class is not cut off.
const CANDIDATES: usize = 20;

const SAFETY_RULES: &[Rule] = &[Rule::ErIfChestPainSevere];

const NO_MATCH: &str = "I couldn't match those symptoms to my knowledge. Try using the suggestions.";
const NONSPECIFIC: &str = "Symptoms are nonspecific; start with a General Practitioner.";
const SOME_UNKNOWN: &str = "Some symptoms weren't recognized. Use the chips/suggestions for best results.";

struct SymptomFamily {
    pattern: &'static str,
    boosts: &'static [(&'static str, f64)],
    note: &'static str,
}

const FAMILIES: &[SymptomFamily] = &[
    SymptomFamily {
        pattern: r"(?i)rash|itch|skin|acne|blister|psoriasis|blackheads|pustules",
        boosts: &[("dermatology", 0.12)],
        note: "Skin symptoms present → prioritizing Dermatology.",
    },
    SymptomFamily {
        pattern: r"(?i)urine|urinary|micturition|bladder",
        boosts: &[("urology", 0.12), ("infectious_disease", 0.06)],
        note: "Urinary symptoms present → prioritizing Urology and Infectious Disease.",
    },
    SymptomFamily {
        pattern: r"(?i)chest_pain|palpitations|fast_heart_rate|heart_attack",
        boosts: &[("cardiology", 0.10)],
        note: "Cardiac/chest symptoms present → prioritizing Cardiology.",
    },
    SymptomFamily {
        pattern: r"(?i)shortness_of_breath|breathlessness|cough|wheezing|asthma",
        boosts: &[("pulmonology", 0.10)],
        note: "Respiratory symptoms present → prioritizing Pulmonology.",
    },
    SymptomFamily {
        pattern: r"(?i)abdominal|stomach|vomit|nausea|diarrh|constipation|acid|ulcer",
        boosts: &[("gastroenterology", 0.10)],
        note: "Gastrointestinal symptoms present → prioritizing Gastroenterology.",
    },
    SymptomFamily {
        pattern: r"(?i)joint|knee|elbow|swelling_joints|stiff|arthralgia|back_pain",
        boosts: &[("rheumatology", 0.10), ("orthopedics", 0.05)],
        note: "Joint/musculoskeletal symptoms present → prioritizing Rheumatology/Orthopedics.",
    },
    SymptomFamily {
        pattern: r"(?i)dizziness|vertigo|seizure|weakness|tingling|headache|loss_of_balance|blurred_vision",
        boosts: &[("neurology", 0.10)],
        note: "Neurologic symptoms present → prioritizing Neurology.",
    },
];

fn family_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        FAMILIES
            .iter()
            .map(|f| Regex::new(f.pattern).expect("family pattern is valid"))
            .collect()
    })
}

/// Add each matching family's boosts (capped at 1) and re-rank.
///
/// Families apply in table order; each one that matches appends its note.
pub fn apply_family_boosts(
    recognized: &[String],
    ranked: &[Prediction],
    rationale: &mut Vec<String>,
) -> Vec<Prediction> {
    let mut boosted = ranked.to_vec();
    for (family, re) in FAMILIES.iter().zip(family_patterns()) {
        if !recognized.iter().any(|id| re.is_match(id)) {
            continue;
        }
        for p in boosted.iter_mut() {
            if let Some((_, b)) = family.boosts.iter().find(|(label, _)| *label == p.label) {
                p.prob = (p.prob + b).min(1.0);
            }
        }
        rationale.push(family.note.to_string());
    }
    boosted.sort_by(|a, b| b.prob.partial_cmp(&a.prob).unwrap_or(Ordering::Equal));
    boosted
}

#[derive(Debug, Clone)]
pub struct ClassifierAdvisor {
    model: Arc<ClassifierModel>,
    confidence_threshold: f64,
}

impl ClassifierAdvisor {
    pub fn new(model: Arc<ClassifierModel>, confidence_threshold: f64) -> Self {
        Self { model, confidence_threshold }
    }

    pub fn model(&self) -> &ClassifierModel {
        &self.model
    }

    pub fn advise(&self, req: &TriageRequest) -> TriageResponse {
        let raw: Vec<&str> = req.symptoms.iter().map(|s| s.id.as_str()).collect();
        let normalized = normalize_symptoms(&self.model, raw.as_slice());

        // Escalation is decided on safety-rule output only; family notes never escalate.
        let mut rationale = evaluate_listed(SAFETY_RULES, req);
        let escalate = rationale.iter().any(|r| matches_escalation(r));

        if normalized.recognized.is_empty() {
            rationale.push(NO_MATCH.to_string());
            let level = if escalate { UrgencyLevel::Er } else { UrgencyLevel::SeeGp };
            return TriageResponse { specialties: vec![], advice: TriageAdvice { level, rationale } };
        }

        let input = ClassifierInput {
            age: f64::from(req.context.age),
            sex: req.context.sex.as_str().to_string(),
            symptoms: normalized.recognized.clone(),
        };
        let ranked = self.model.predict_top_k(&input, CANDIDATES);
        let boosted = apply_family_boosts(&normalized.recognized, &ranked, &mut rationale);

        let specialties: Vec<SpecialtyScore> = boosted
            .iter()
            .take(DEFAULT_TOP_K)
            .map(|p| SpecialtyScore {
                specialty_id: p.label.clone(),
                label: class_label(&p.label),
                score: p.prob.clamp(0.0, 1.0),
            })
            .collect();

        let top_prob = boosted.first().map_or(0.0, |p| p.prob);
        let level = if escalate {
            UrgencyLevel::Er
        } else if top_prob >= self.confidence_threshold {
            UrgencyLevel::Specialist
        } else {
            UrgencyLevel::SeeGp
        };

        if let Some(top) = specialties.first() {
            rationale.push(format!(
                "Top match: {} ({}% confidence).",
                top.label,
                (top.score * 100.0).round()
            ));
            if level == UrgencyLevel::SeeGp {
                rationale.push(NONSPECIFIC.to_string());
            }
        }
        if !normalized.unknown.is_empty() {
            rationale.push(SOME_UNKNOWN.to_string());
        }

        tracing::debug!(
            level = %level,
            recognized = normalized.recognized.len(),
            unknown = normalized.unknown.len(),
            top_prob,
            "Classifier advice"
        );

        TriageResponse { specialties, advice: TriageAdvice { level, rationale } }
    }
}
