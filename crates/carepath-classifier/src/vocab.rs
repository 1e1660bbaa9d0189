//! Mapping free-form symptom ids onto the model vocabulary, and display labels.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::ClassifierModel;

/// Ontology-style ids that differ from the model vocabulary.
const SYMPTOM_ALIASES: &[(&str, &str)] = &[
    ("s_short_breath", "shortness_of_breath"),
    ("s_breathlessness", "shortness_of_breath"),
    ("s_burning_urine", "burning_micturition"),
    ("s_uti", "urinary_tract_infection"),
    ("s_stomach_pain", "abdominal_pain"),
    ("s_belly_pain", "abdominal_pain"),
    ("s_spinning_movements", "vertigo"),
    ("s_chestpain", "chest_pain"),
];

const SYMPTOM_LABELS: &[(&str, &str)] = &[
    ("shortness_of_breath", "Shortness of breath"),
    ("burning_micturition", "Burning urination"),
    ("abdominal_pain", "Abdominal pain"),
    ("spinning_movements", "Vertigo (spinning)"),
    ("blackheads", "Blackheads"),
    ("stomach_pain", "Stomach pain"),
];

const CLASS_LABELS: &[(&str, &str)] = &[
    ("cardiology", "Cardiology"),
    ("dermatology", "Dermatology"),
    ("neurology", "Neurology"),
    ("urology", "Urology"),
    ("pulmonology", "Pulmonology"),
    ("gastroenterology", "Gastroenterology"),
    ("endocrinology", "Endocrinology"),
    ("infectious_disease", "Infectious Disease"),
    ("orthopedics", "Orthopedics"),
    ("rheumatology", "Rheumatology"),
    ("vascular_surgery", "Vascular Surgery"),
    ("allergy_immunology", "Allergy & Immunology"),
];

fn lookup(table: &'static [(&str, &str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Lowercase, collapse every run of non-`[a-z0-9]` characters to `_`, and
/// strip leading/trailing underscores.
pub fn to_feature_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut gap = false;
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if gap && !out.is_empty() {
                out.push('_');
            }
            gap = false;
            out.push(c);
        } else {
            gap = true;
        }
    }
    out
}

/// Vocabulary id for a raw symptom id: alias table first, then normalisation.
pub fn canonical_id(raw: &str) -> String {
    let id = to_feature_id(raw);
    match lookup(SYMPTOM_ALIASES, &id) {
        Some(alias) => alias.to_string(),
        None => id,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSymptoms {
    /// Vocabulary ids, first-seen order, no duplicates.
    pub recognized: Vec<String>,
    /// Raw inputs the model does not know, as given.
    pub unknown: Vec<String>,
}

pub fn normalize_symptoms<S: AsRef<str>>(model: &ClassifierModel, raw: &[S]) -> NormalizedSymptoms {
    let mut seen = HashSet::new();
    let mut out = NormalizedSymptoms::default();
    for r in raw {
        let id = canonical_id(r.as_ref());
        if model.in_vocab(&id) {
            if seen.insert(id.clone()) {
                out.recognized.push(id);
            }
        } else {
            out.unknown.push(r.as_ref().to_string());
        }
    }
    out
}

/// Capitalise the first letter of every word, treating `_` as a space.
fn title_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut boundary = true;
    for c in id.chars() {
        let c = if c == '_' { ' ' } else { c };
        if boundary && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        boundary = !c.is_alphanumeric();
    }
    out
}

pub fn symptom_label(id: &str) -> String {
    lookup(SYMPTOM_LABELS, id).map(str::to_string).unwrap_or_else(|| title_case(id))
}

pub fn class_label(id: &str) -> String {
    lookup(CLASS_LABELS, id).map(str::to_string).unwrap_or_else(|| title_case(id))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomChip {
    pub id: String,
    pub label: String,
}

/// One chip per vocabulary entry, sorted by label.
pub fn symptom_chips(model: &ClassifierModel) -> Vec<SymptomChip> {
    let mut chips: Vec<SymptomChip> = model
        .sym_vocab()
        .iter()
        .map(|id| SymptomChip { id: id.clone(), label: symptom_label(id) })
        .collect();
    chips.sort_by(|a, b| compare_labels(&a.label, &b.label));
    chips
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}
