//! Static symptom and specialty tables.
//!
//! A `KnowledgeBase` is built once at startup (either the built-in tables or a
//! file named in configuration), validated, and then shared read-only.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use carepath_common::{Result, TriageError};

use crate::rules::Rule;

/// Tag marking symptoms that should never be ignored.
pub const RED_FLAG_TAG: &str = "red-flag";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Symptom {
    pub fn new(id: &str, label: &str) -> Self {
        Self { id: id.to_string(), label: label.to_string(), tags: vec![] }
    }

    pub fn tagged(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn is_red_flag(&self) -> bool {
        self.tags.iter().any(|t| t == RED_FLAG_TAG)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomWeight {
    pub symptom: String,
    /// In `[0, 1]`. Weights of one specialty need not sum to 1.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub symptom_weights: Vec<SymptomWeight>,
    /// Rule ids evaluated for this specialty, in order.
    #[serde(default)]
    pub rules: Vec<String>,
}

impl Specialty {
    fn new(id: &str, label: &str, weights: &[(&str, f64)]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            symptom_weights: weights
                .iter()
                .map(|(symptom, weight)| SymptomWeight { symptom: symptom.to_string(), weight: *weight })
                .collect(),
            rules: vec![],
        }
    }

    fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule.id().to_string());
        self
    }
}

/// On-disk layout shared by the TOML, JSON and YAML loaders.
#[derive(Debug, Deserialize)]
struct KnowledgeBaseFile {
    symptoms: Vec<Symptom>,
    specialties: Vec<Specialty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeBase {
    symptoms: Vec<Symptom>,
    specialties: Vec<Specialty>,
}

impl KnowledgeBase {
    /// Build and validate a knowledge base. Specialty order is the tie-break
    /// order used by the scorer.
    pub fn new(symptoms: Vec<Symptom>, specialties: Vec<Specialty>) -> Result<Self> {
        let kb = Self { symptoms, specialties };
        kb.validate()?;
        Ok(kb)
    }

    /// The built-in symptom ontology.
    pub fn builtin() -> Self {
        let symptoms = vec![
            Symptom::new("s_chest_pain", "Chest pain").tagged(RED_FLAG_TAG),
            Symptom::new("s_short_breath", "Shortness of breath").tagged(RED_FLAG_TAG),
            Symptom::new("s_headache", "Headache"),
            Symptom::new("s_skin_rash", "Skin rash"),
            Symptom::new("s_burning_urine", "Burning urination"),
            Symptom::new("s_dizziness", "Dizziness"),
        ];

        let specialties = vec![
            Specialty::new(
                "cardiology",
                "Cardiology",
                &[("s_chest_pain", 0.9), ("s_short_breath", 0.8), ("s_dizziness", 0.3)],
            )
            .with_rule(Rule::ErIfChestPainSevere),
            Specialty::new("dermatology", "Dermatology", &[("s_skin_rash", 0.95)]),
            Specialty::new(
                "neurology",
                "Neurology",
                &[("s_headache", 0.7), ("s_dizziness", 0.6)],
            ),
            Specialty::new("urology", "Urology", &[("s_burning_urine", 0.9)]),
            Specialty::new(
                "gp",
                "General Practice",
                &[
                    ("s_headache", 0.4),
                    ("s_dizziness", 0.4),
                    ("s_skin_rash", 0.3),
                    ("s_burning_urine", 0.3),
                ],
            ),
        ];

        Self { symptoms, specialties }
    }

    /// Load from a .toml, .json, .yaml or .yml file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let file: KnowledgeBaseFile = match ext.as_str() {
            "toml" => toml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            other => {
                return Err(TriageError::KnowledgeBase(format!(
                    "unsupported knowledge base format '{other}' for {}",
                    path.display()
                )))
            }
        };

        let kb = Self::new(file.symptoms, file.specialties)?;
        tracing::info!(
            path = %path.display(),
            symptoms = kb.symptoms.len(),
            specialties = kb.specialties.len(),
            "Loaded knowledge base"
        );
        Ok(kb)
    }

    /// Check the data-integrity invariants of the tables.
    pub fn validate(&self) -> Result<()> {
        let mut symptom_ids = HashSet::new();
        for s in &self.symptoms {
            if s.id.is_empty() {
                return Err(TriageError::KnowledgeBase("symptom with empty id".to_string()));
            }
            if !symptom_ids.insert(s.id.as_str()) {
                return Err(TriageError::KnowledgeBase(format!("duplicate symptom id '{}'", s.id)));
            }
        }

        let mut specialty_ids = HashSet::new();
        for spec in &self.specialties {
            if !specialty_ids.insert(spec.id.as_str()) {
                return Err(TriageError::KnowledgeBase(format!(
                    "duplicate specialty id '{}'",
                    spec.id
                )));
            }
            let mut weighted = HashSet::new();
            for sw in &spec.symptom_weights {
                if !weighted.insert(sw.symptom.as_str()) {
                    return Err(TriageError::KnowledgeBase(format!(
                        "specialty '{}' weights symptom '{}' twice",
                        spec.id, sw.symptom
                    )));
                }
                if !symptom_ids.contains(sw.symptom.as_str()) {
                    return Err(TriageError::KnowledgeBase(format!(
                        "specialty '{}' weights unknown symptom '{}'",
                        spec.id, sw.symptom
                    )));
                }
                if !sw.weight.is_finite() || !(0.0..=1.0).contains(&sw.weight) {
                    return Err(TriageError::KnowledgeBase(format!(
                        "specialty '{}' has weight {} for '{}' outside [0, 1]",
                        spec.id, sw.weight, sw.symptom
                    )));
                }
            }
            for rule_id in &spec.rules {
                if Rule::from_id(rule_id).is_none() {
                    tracing::debug!(specialty = %spec.id, rule = %rule_id, "Unknown rule id will be ignored");
                }
            }
        }
        Ok(())
    }

    pub fn list_specialties(&self) -> &[Specialty] {
        &self.specialties
    }

    pub fn list_symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    pub fn symptom(&self, id: &str) -> Option<&Symptom> {
        self.symptoms.iter().find(|s| s.id == id)
    }

    pub fn specialty(&self, id: &str) -> Option<&Specialty> {
        self.specialties.iter().find(|s| s.id == id)
    }

    /// Resolve a rule id. Unknown ids resolve to `None`, never an error.
    pub fn lookup_rule(&self, id: &str) -> Option<Rule> {
        Rule::from_id(id)
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}
