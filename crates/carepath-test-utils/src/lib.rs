//! Shared fixtures for CarePath tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use carepath_common::{PatientContext, Severity, Sex, SymptomInput, TriageRequest};

pub use pretty_assertions;

/// Symptom ids of the built-in knowledge base.
pub const BUILTIN_SYMPTOM_IDS: &[&str] = &[
    "s_chest_pain",
    "s_short_breath",
    "s_headache",
    "s_skin_rash",
    "s_burning_urine",
    "s_dizziness",
];

/// Ids no knowledge base or model knows about.
pub const UNKNOWN_SYMPTOM_IDS: &[&str] = &["s_hiccups", "s_third_ear", "x_not_a_symptom"];

pub fn symptom(id: &str) -> SymptomInput {
    SymptomInput::new(id, id.trim_start_matches("s_").replace('_', " "))
}

pub fn with_severity(id: &str, severity: Severity) -> SymptomInput {
    symptom(id).with_severity(severity)
}

pub fn request(age: u32, sex: Sex, symptoms: Vec<SymptomInput>) -> TriageRequest {
    TriageRequest { context: PatientContext { age, sex }, symptoms }
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A random request drawing from known and unknown symptom ids, any severity,
/// any sex and any age in `[0, 120]`.
pub fn random_request<R: Rng>(rng: &mut R) -> TriageRequest {
    let pool: Vec<&str> = BUILTIN_SYMPTOM_IDS
        .iter()
        .chain(UNKNOWN_SYMPTOM_IDS.iter())
        .copied()
        .collect();

    let n = rng.gen_range(0..=pool.len());
    let symptoms = (0..n)
        .map(|_| {
            let id = pool[rng.gen_range(0..pool.len())];
            let mut s = symptom(id);
            s.severity = match rng.gen_range(0..4) {
                0 => None,
                1 => Some(Severity::Mild),
                2 => Some(Severity::Moderate),
                _ => Some(Severity::Severe),
            };
            s
        })
        .collect();

    let sex = match rng.gen_range(0..3) {
        0 => Sex::Male,
        1 => Sex::Female,
        _ => Sex::Unknown,
    };
    request(rng.gen_range(0..=120), sex, symptoms)
}

/// Vocabulary of [`tiny_model_json`], in feature-column order.
pub const TINY_MODEL_VOCAB: &[&str] = &[
    "abdominal_pain",
    "burning_micturition",
    "chest_pain",
    "cough",
    "itching",
    "shortness_of_breath",
    "skin_rash",
    "vertigo",
];

/// A small exported classifier: four classes over `TINY_MODEL_VOCAB` plus the
/// age and sex columns.
pub fn tiny_model_json() -> String {
    serde_json::json!({
        "classes": ["cardiology", "dermatology", "pulmonology", "urology"],
        "coef": [
            [0.0, 0.0, 2.5, 0.2, 0.0, 1.2, 0.0, 0.4, 1.0, 0.1],
            [0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 2.2, 0.0, -0.3, 0.0],
            [0.0, 0.0, 0.8, 2.0, 0.0, 1.8, 0.0, 0.0, 0.2, 0.0],
            [0.3, 2.4, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, -0.1]
        ],
        "intercept": [-0.5, -0.2, -0.4, -0.6],
        "sym_vocab": TINY_MODEL_VOCAB,
        "sex_index": {"male": 0, "female": 1, "unknown": 2}
    })
    .to_string()
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} ± {tol}, got {actual}"
    );
}
