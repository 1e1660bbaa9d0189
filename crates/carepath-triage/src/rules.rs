//! Named escalation rules and their evaluation.
//!
//! Rules form a closed set: a specialty refers to a rule by its string id,
//! and an id with no matching variant simply contributes nothing.

use std::panic::{catch_unwind, AssertUnwindSafe};

use carepath_common::{Severity, TriageRequest};

use crate::knowledge_base::KnowledgeBase;
use crate::selection::Selection;

/// Inputs a rule may read.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'s, 'a> {
    pub selection: &'s Selection<'a>,
    pub age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Chest pain that is severe, or reported by a patient over 50.
    ErIfChestPainSevere,
}

impl Rule {
    pub const ALL: &'static [Rule] = &[Rule::ErIfChestPainSevere];

    pub fn id(&self) -> &'static str {
        match self {
            Rule::ErIfChestPainSevere => "r_er_if_chest_pain_severe",
        }
    }

    pub fn from_id(id: &str) -> Option<Rule> {
        Self::ALL.iter().copied().find(|r| r.id() == id)
    }

    /// Returns the rationale when the rule fires.
    pub fn evaluate(&self, input: &RuleInput<'_, '_>) -> Option<String> {
        match self {
            Rule::ErIfChestPainSevere => {
                let fires = input.selection.contains("s_chest_pain")
                    && (input.selection.severity("s_chest_pain") == Some(Severity::Severe)
                        || input.age > 50);
                fires.then(|| "Severe chest pain warrants immediate evaluation.".to_string())
            }
        }
    }
}

/// Evaluate every rule declared by every specialty.
///
/// Order is specialty-table order, then declared order within a specialty.
/// Duplicate rationale strings are kept.
pub fn evaluate_rules(kb: &KnowledgeBase, req: &TriageRequest) -> Vec<String> {
    let selection = Selection::from_request(req);
    let input = RuleInput { selection: &selection, age: req.context.age };

    let mut rationale = Vec::new();
    for spec in kb.list_specialties() {
        for rule_id in &spec.rules {
            let Some(rule) = kb.lookup_rule(rule_id) else {
                continue;
            };
            if let Some(msg) = run_guarded(rule_id, &spec.id, || rule.evaluate(&input)) {
                rationale.push(msg);
            }
        }
    }
    rationale
}

/// Evaluate a fixed list of rules directly, independent of any knowledge base.
pub fn evaluate_listed(rules: &[Rule], req: &TriageRequest) -> Vec<String> {
    let selection = Selection::from_request(req);
    let input = RuleInput { selection: &selection, age: req.context.age };

    rules
        .iter()
        .filter_map(|rule| run_guarded(rule.id(), "-", || rule.evaluate(&input)))
        .collect()
}

/// Run one rule. A panic or an empty message counts as "did not fire".
pub(crate) fn run_guarded<F>(rule_id: &str, specialty_id: &str, f: F) -> Option<String>
where
    F: FnOnce() -> Option<String>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Some(msg)) if !msg.is_empty() => Some(msg),
        Ok(_) => None,
        Err(_) => {
            tracing::warn!(rule = rule_id, specialty = specialty_id, "Rule panicked; treating as not fired");
            None
        }
    }
}
