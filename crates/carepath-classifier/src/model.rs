//! Exported linear model and probability scoring.
//!
//! Feature vector layout (length `V + 2` for a vocabulary of `V` symptoms):
//!
//! | index   | value                                   |
//! |---------|-----------------------------------------|
//! | `i < V` | 1.0 if `sym_vocab[i]` was reported      |
//! | `V`     | `clamp(age, 0, 100) / 100`              |
//! | `V + 1` | `sex_index[sex] / 2`, unknown sex → 2   |

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};

pub const DEFAULT_TOP_K: usize = 5;

/// Code used for a sex value missing from the artifact's table.
pub const DEFAULT_SEX_CODE: u32 = 2;

const MAX_AGE: f64 = 100.0;

/// The artifact as exported by the training scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelArtifact {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    sym_vocab: Vec<String>,
    sex_index: HashMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierInput {
    pub age: f64,
    pub sex: String,
    /// Vocabulary ids; ids outside the vocabulary are ignored.
    pub symptoms: Vec<String>,
}

impl ClassifierInput {
    pub fn new<S: Into<String>>(age: f64, sex: impl Into<String>, symptoms: impl IntoIterator<Item = S>) -> Self {
        Self {
            age,
            sex: sex.into(),
            symptoms: symptoms.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub prob: f64,
}

/// Read-only model; load once and share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ClassifierModel {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    sym_vocab: Vec<String>,
    vocab_index: HashMap<String, usize>,
    sex_index: HashMap<String, u32>,
}

impl ClassifierModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let model = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            classes = model.classes.len(),
            vocab = model.sym_vocab.len(),
            "Loaded classifier model"
        );
        Ok(model)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(content)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(a: ModelArtifact) -> Result<Self> {
        if a.classes.is_empty() {
            return Err(ClassifierError::Shape("no classes".to_string()));
        }
        if a.intercept.len() != a.classes.len() {
            return Err(ClassifierError::Shape(format!(
                "{} intercepts for {} classes",
                a.intercept.len(),
                a.classes.len()
            )));
        }
        if a.coef.len() != a.classes.len() {
            return Err(ClassifierError::Shape(format!(
                "{} coefficient rows for {} classes",
                a.coef.len(),
                a.classes.len()
            )));
        }

        let width = a.sym_vocab.len() + 2;
        for (c, row) in a.coef.iter().enumerate() {
            if row.len() != width {
                return Err(ClassifierError::Shape(format!(
                    "row {c} ('{}') has {} columns, expected {width}",
                    a.classes[c],
                    row.len()
                )));
            }
        }
        if a.coef.iter().flatten().chain(a.intercept.iter()).any(|v| !v.is_finite()) {
            return Err(ClassifierError::Shape("non-finite weight".to_string()));
        }

        let mut vocab_index = HashMap::with_capacity(a.sym_vocab.len());
        for (i, id) in a.sym_vocab.iter().enumerate() {
            if vocab_index.insert(id.clone(), i).is_some() {
                return Err(ClassifierError::Shape(format!("duplicate vocabulary id '{id}'")));
            }
        }
        if let Some((sex, code)) = a.sex_index.iter().find(|(_, code)| **code > DEFAULT_SEX_CODE) {
            return Err(ClassifierError::Shape(format!("sex code {code} for '{sex}' outside 0..=2")));
        }

        Ok(Self {
            classes: a.classes,
            coef: a.coef,
            intercept: a.intercept,
            sym_vocab: a.sym_vocab,
            vocab_index,
            sex_index: a.sex_index,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn sym_vocab(&self) -> &[String] {
        &self.sym_vocab
    }

    pub fn in_vocab(&self, id: &str) -> bool {
        self.vocab_index.contains_key(id)
    }

    pub fn feature_len(&self) -> usize {
        self.sym_vocab.len() + 2
    }

    pub fn features(&self, input: &ClassifierInput) -> Vec<f64> {
        let v = self.sym_vocab.len();
        let mut f = vec![0.0; v + 2];

        let reported: HashSet<&str> = input.symptoms.iter().map(String::as_str).collect();
        for id in reported {
            if let Some(&i) = self.vocab_index.get(id) {
                f[i] = 1.0;
            }
        }

        f[v] = input.age.clamp(0.0, MAX_AGE) / MAX_AGE;
        let sex_code = self.sex_index.get(&input.sex).copied().unwrap_or(DEFAULT_SEX_CODE);
        f[v + 1] = f64::from(sex_code) / 2.0;
        f
    }

    /// `intercept[c] + coef[c] · features` for each class.
    pub fn logits(&self, features: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>())
            .collect()
    }

    /// Full distribution in class order; sums to 1.
    pub fn probabilities(&self, input: &ClassifierInput) -> Vec<Prediction> {
        let probs = softmax(&self.logits(&self.features(input)));
        self.classes
            .iter()
            .zip(probs)
            .map(|(label, prob)| Prediction { label: label.clone(), prob })
            .collect()
    }

    /// Top `k` classes by probability; ties keep class order.
    pub fn predict_top_k(&self, input: &ClassifierInput, k: usize) -> Vec<Prediction> {
        let mut ranked = self.probabilities(input);
        ranked.sort_by(|a, b| b.prob.partial_cmp(&a.prob).unwrap_or(Ordering::Equal));
        ranked.truncate(k);
        ranked
    }
}

/// Numerically stable softmax.
pub fn softmax(z: &[f64]) -> Vec<f64> {
    let Some(max) = z.iter().copied().reduce(f64::max) else {
        return vec![];
    };
    let ex: Vec<f64> = z.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = ex.iter().sum();
    ex.into_iter().map(|v| v / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carepath_test_utils::{assert_close, tiny_model_json, TINY_MODEL_VOCAB};

    fn model() -> ClassifierModel {
        ClassifierModel::from_json_str(&tiny_model_json()).unwrap()
    }

    #[test]
    fn test_softmax_basic() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert_close(p.iter().sum::<f64>(), 1.0, 1e-12);
        assert!(p[2] > p[1] && p[1] > p[0]);
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let p = softmax(&[1000.0, 1000.0, -1000.0]);
        assert!(p.iter().all(|v| v.is_finite()));
        assert_close(p[0], 0.5, 1e-12);
        assert_close(p[2], 0.0, 1e-12);
    }

    #[test]
    fn test_feature_layout() {
        let m = model();
        let input = ClassifierInput::new(30.0, "female", ["chest_pain", "cough", "not_in_vocab"]);
        let f = m.features(&input);
        assert_eq!(f.len(), TINY_MODEL_VOCAB.len() + 2);
        assert_eq!(f.len(), m.feature_len());
        assert_eq!(f[2], 1.0); // chest_pain
        assert_eq!(f[3], 1.0); // cough
        assert_eq!(f.iter().take(TINY_MODEL_VOCAB.len()).sum::<f64>(), 2.0);
        assert_close(f[8], 0.3, 1e-12);
        assert_close(f[9], 0.5, 1e-12);
    }

    #[test]
    fn test_age_is_clamped() {
        let m = model();
        assert_eq!(m.features(&ClassifierInput::new(150.0, "male", Vec::<String>::new()))[8], 1.0);
        assert_eq!(m.features(&ClassifierInput::new(-5.0, "male", Vec::<String>::new()))[8], 0.0);
    }

    #[test]
    fn test_unknown_sex_uses_default_code() {
        let m = model();
        let f = m.features(&ClassifierInput::new(40.0, "other", Vec::<String>::new()));
        assert_eq!(f[9], 1.0);
        let f = m.features(&ClassifierInput::new(40.0, "male", Vec::<String>::new()));
        assert_eq!(f[9], 0.0);
    }

    #[test]
    fn test_top_k_sorted_and_truncated() {
        let m = model();
        let input = ClassifierInput::new(40.0, "male", ["skin_rash", "itching"]);
        let top = m.predict_top_k(&input, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "dermatology");
        assert!(top[0].prob >= top[1].prob);

        let all = m.predict_top_k(&input, DEFAULT_TOP_K);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_ties_keep_class_order() {
        let json = serde_json::json!({
            "classes": ["b", "a", "c"],
            "coef": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
            "intercept": [0.0, 0.0, 0.0],
            "sym_vocab": ["x"],
            "sex_index": {"male": 0, "female": 1, "unknown": 2}
        });
        let m = ClassifierModel::from_json_str(&json.to_string()).unwrap();
        let labels: Vec<String> = m
            .predict_top_k(&ClassifierInput::new(10.0, "unknown", ["x"]), 3)
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rejects_wrong_row_width() {
        let json = serde_json::json!({
            "classes": ["a"],
            "coef": [[0.0, 0.0]],
            "intercept": [0.0],
            "sym_vocab": ["x"],
            "sex_index": {}
        });
        let err = ClassifierModel::from_json_str(&json.to_string()).unwrap_err();
        assert!(matches!(err, ClassifierError::Shape(_)));
    }

    #[test]
    fn test_rejects_mismatched_intercepts() {
        let json = serde_json::json!({
            "classes": ["a", "b"],
            "coef": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
            "intercept": [0.0],
            "sym_vocab": ["x"],
            "sex_index": {}
        });
        assert!(ClassifierModel::from_json_str(&json.to_string()).is_err());
    }

    #[test]
    fn test_rejects_empty_and_malformed() {
        let empty = serde_json::json!({
            "classes": [], "coef": [], "intercept": [], "sym_vocab": [], "sex_index": {}
        });
        assert!(ClassifierModel::from_json_str(&empty.to_string()).is_err());
        assert!(matches!(
            ClassifierModel::from_json_str("{\"classes\": "),
            Err(ClassifierError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_sex_code() {
        let json = serde_json::json!({
            "classes": ["a"],
            "coef": [[0.0, 0.0, 0.0]],
            "intercept": [0.0],
            "sym_vocab": ["x"],
            "sex_index": {"male": 0, "other": 7}
        });
        assert!(ClassifierModel::from_json_str(&json.to_string()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ClassifierModel::load("/nonexistent/sk_model.json"),
            Err(ClassifierError::Io(_))
        ));
    }
}
