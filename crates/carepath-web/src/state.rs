//! Shared application state for the web server.

use std::sync::Arc;

use carepath_classifier::{ClassifierAdvisor, ClassifierModel};
use carepath_common::Config;
use carepath_triage::TriageEngine;

/// Shared state injected into every Axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: TriageEngine,
    /// `None` when no model was configured or it failed to load.
    pub classifier: Option<ClassifierAdvisor>,
    pub config: Config,
}

impl AppState {
    pub fn new(engine: TriageEngine, classifier: Option<ClassifierAdvisor>, config: Config) -> Self {
        Self { engine, classifier, config }
    }

    /// Build the engine and, if configured, the classifier.
    ///
    /// A bad knowledge base is fatal; a bad or missing model only disables
    /// the classifier routes.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let engine = TriageEngine::from_config(&config.triage)?;
        tracing::info!(
            specialties = engine.knowledge_base().list_specialties().len(),
            symptoms = engine.knowledge_base().list_symptoms().len(),
            "Knowledge base ready"
        );

        let classifier = match &config.classifier.model_path {
            Some(path) => match ClassifierModel::load(path) {
                Ok(model) => Some(ClassifierAdvisor::new(
                    Arc::new(model),
                    config.classifier.confidence_threshold,
                )),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Classifier model failed to load; classifier routes disabled");
                    None
                }
            },
            None => {
                tracing::warn!("No classifier model configured; classifier routes disabled");
                None
            }
        };

        Ok(Self::new(engine, classifier, config))
    }
}

pub type SharedState = Arc<AppState>;
