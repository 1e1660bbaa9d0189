//! Per-request view of the selected symptoms.

use std::collections::{HashMap, HashSet};

use carepath_common::{Severity, TriageRequest};

/// Selected symptom ids plus the reported severity of each.
///
/// When an id is reported more than once, the last entry's severity wins
/// (including an absent severity).
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    ids: HashSet<&'a str>,
    severity: HashMap<&'a str, Option<Severity>>,
}

impl<'a> Selection<'a> {
    pub fn from_request(req: &'a TriageRequest) -> Self {
        let mut sel = Self::default();
        for s in &req.symptoms {
            sel.ids.insert(s.id.as_str());
            sel.severity.insert(s.id.as_str(), s.severity);
        }
        sel
    }

    pub fn contains(&self, symptom_id: &str) -> bool {
        self.ids.contains(symptom_id)
    }

    pub fn severity(&self, symptom_id: &str) -> Option<Severity> {
        self.severity.get(symptom_id).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
