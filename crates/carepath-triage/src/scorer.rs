//! Specialty affinity scoring.
//!
//! For every specialty, each selected symptom it weights contributes
//! `weight + severity_boost`; the sum is divided by `SCORE_DIVISOR` and
//! clamped to `[0, 1]`.

use std::cmp::Ordering;

use carepath_common::{Severity, SpecialtyScore, TriageRequest};

use crate::knowledge_base::{KnowledgeBase, Specialty};
use crate::selection::Selection;

pub const SEVERE_BOOST: f64 = 0.15;
pub const MODERATE_BOOST: f64 = 0.05;

/// Fixed scaling constant; not derived from the knowledge base.
pub const SCORE_DIVISOR: f64 = 2.0;

pub fn severity_boost(severity: Option<Severity>) -> f64 {
    match severity {
        Some(Severity::Severe) => SEVERE_BOOST,
        Some(Severity::Moderate) => MODERATE_BOOST,
        Some(Severity::Mild) | None => 0.0,
    }
}

/// Score one specialty against a selection.
pub fn score_specialty(spec: &Specialty, selection: &Selection<'_>) -> f64 {
    let acc: f64 = spec
        .symptom_weights
        .iter()
        .filter(|sw| selection.contains(&sw.symptom))
        .map(|sw| sw.weight + severity_boost(selection.severity(&sw.symptom)))
        .sum();
    (acc / SCORE_DIVISOR).clamp(0.0, 1.0)
}

/// One score per specialty, sorted by descending score.
///
/// The sort is stable, so ties keep knowledge-base order and identical input
/// always yields identical output.
pub fn score_specialties(kb: &KnowledgeBase, req: &TriageRequest) -> Vec<SpecialtyScore> {
    let selection = Selection::from_request(req);

    let mut scores: Vec<SpecialtyScore> = kb
        .list_specialties()
        .iter()
        .map(|spec| SpecialtyScore {
            specialty_id: spec.id.clone(),
            label: spec.label.clone(),
            score: score_specialty(spec, &selection),
        })
        .collect();

    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scores
}
