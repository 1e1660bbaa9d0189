use std::path::PathBuf;
use std::sync::Arc;

use carepath_classifier::{
    normalize_symptoms, symptom_chips, ClassifierAdvisor, ClassifierInput, ClassifierModel,
};
use carepath_common::{Sex, UrgencyLevel};
use carepath_test_utils::{assert_close, request, seeded_rng, symptom};
use rand::seq::SliceRandom;
use rand::Rng;

fn demo_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("model/demo_model.json")
}

fn demo_model() -> ClassifierModel {
    ClassifierModel::load(demo_model_path()).unwrap()
}

#[test]
fn demo_model_loads() {
    let m = demo_model();
    assert_eq!(m.classes().len(), 7);
    assert_eq!(m.feature_len(), m.sym_vocab().len() + 2);
}

#[test]
fn probabilities_always_sum_to_one() {
    let m = demo_model();
    let vocab: Vec<String> = m.sym_vocab().to_vec();
    let sexes = ["male", "female", "unknown", "other"];
    let mut rng = seeded_rng(7);

    for _ in 0..500 {
        let n = rng.gen_range(0..=vocab.len());
        let symptoms: Vec<String> = vocab.choose_multiple(&mut rng, n).cloned().collect();
        let sex = sexes[rng.gen_range(0..sexes.len())];
        let input = ClassifierInput::new(rng.gen_range(-10.0..130.0), sex, symptoms);

        let probs = m.probabilities(&input);
        assert_eq!(probs.len(), m.classes().len());
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(&p.prob)));
        assert_close(probs.iter().map(|p| p.prob).sum(), 1.0, 1e-9);

        let top = m.predict_top_k(&input, 3);
        assert_eq!(top.len(), 3);
        assert!(top.windows(2).all(|w| w[0].prob >= w[1].prob));
    }
}

#[test]
fn obvious_inputs_rank_the_obvious_class_first() {
    let m = demo_model();
    let cases = [
        (vec!["chest_pain", "palpitations"], "cardiology"),
        (vec!["skin_rash", "itching"], "dermatology"),
        (vec!["burning_micturition"], "urology"),
        (vec!["cough", "shortness_of_breath"], "pulmonology"),
        (vec!["headache", "vertigo"], "neurology"),
    ];
    for (symptoms, expected) in cases {
        let top = m.predict_top_k(&ClassifierInput::new(35.0, "female", symptoms.clone()), 1);
        assert_eq!(top[0].label, expected, "for {symptoms:?}");
    }
}

#[test]
fn ontology_ids_are_normalized_before_prediction() {
    let m = demo_model();
    let n = normalize_symptoms(&m, &["s_burning_urine", "s_short_breath", "s_headache"]);
    assert_eq!(n.recognized, vec!["burning_micturition", "shortness_of_breath"]);
    assert_eq!(n.unknown, vec!["s_headache"]);
}

#[test]
fn chips_cover_the_vocabulary() {
    let m = demo_model();
    let chips = symptom_chips(&m);
    assert_eq!(chips.len(), m.sym_vocab().len());
    assert!(chips.iter().any(|c| c.id == "burning_micturition" && c.label == "Burning urination"));
}

#[test]
fn advisor_routes_urinary_symptoms_to_urology() {
    let advisor = ClassifierAdvisor::new(Arc::new(demo_model()), 0.60);
    let resp = advisor.advise(&request(28, Sex::Female, vec![symptom("s_burning_urine")]));
    assert_eq!(resp.specialties[0].specialty_id, "urology");
    assert_eq!(resp.advice.level, UrgencyLevel::Specialist);
    assert!(resp.specialties.len() <= 5);
    assert!(resp.advice.rationale[0].starts_with("Urinary symptoms present"));
}
