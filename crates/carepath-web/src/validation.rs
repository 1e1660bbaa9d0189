//! Semantic checks on request bodies that parsed successfully.

use carepath_common::entities::MAX_AGE;
use carepath_common::TriageRequest;

use crate::error::{ApiError, FieldError};
use crate::handlers::classifier::ClassifierRequest;

pub fn validate_triage_request(req: &TriageRequest) -> Result<(), ApiError> {
    let mut fields = Vec::new();

    if req.context.age > MAX_AGE {
        fields.push(FieldError::new("context.age", format!("must be between 0 and {MAX_AGE}")));
    }
    if req.symptoms.is_empty() {
        fields.push(FieldError::new("symptoms", "at least one symptom is required"));
    }
    for (i, s) in req.symptoms.iter().enumerate() {
        if s.id.trim().is_empty() {
            fields.push(FieldError::new(format!("symptoms[{i}].id"), "must not be empty"));
        }
    }

    finish(fields)
}

pub fn validate_classifier_request(req: &ClassifierRequest) -> Result<(), ApiError> {
    let mut fields = Vec::new();

    if !req.age.is_finite() || req.age < 0.0 || req.age > f64::from(MAX_AGE) {
        fields.push(FieldError::new("age", format!("must be between 0 and {MAX_AGE}")));
    }
    if req.symptoms.is_empty() {
        fields.push(FieldError::new("symptoms", "at least one symptom is required"));
    }
    if req.k == Some(0) {
        fields.push(FieldError::new("k", "must be at least 1"));
    }

    finish(fields)
}

fn finish(fields: Vec<FieldError>) -> Result<(), ApiError> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carepath_common::Sex;
    use carepath_test_utils::{request, symptom};
    use pretty_assertions::assert_eq;

    fn fields_of(result: Result<(), ApiError>) -> Vec<String> {
        match result {
            Err(ApiError::Validation(fields)) => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_triage_request(&request(120, Sex::Male, vec![symptom("s_headache")])).is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let mut req = request(121, Sex::Female, vec![symptom("s_headache"), symptom("  ")]);
        req.symptoms[1].id = "  ".to_string();
        assert_eq!(fields_of(validate_triage_request(&req)), vec!["context.age", "symptoms[1].id"]);
    }

    #[test]
    fn test_empty_symptoms_rejected() {
        assert_eq!(
            fields_of(validate_triage_request(&request(30, Sex::Unknown, vec![]))),
            vec!["symptoms"]
        );
    }

    #[test]
    fn test_classifier_request_checks() {
        let req = ClassifierRequest { age: -1.0, sex: None, symptoms: vec![], k: Some(0) };
        assert_eq!(fields_of(validate_classifier_request(&req)), vec!["age", "symptoms", "k"]);
    }
}
