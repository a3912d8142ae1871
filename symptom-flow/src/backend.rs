use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::{
    config::{DiseaseStrategy, EngineConfig, FollowupStrategy},
    diagnosis::{
        Diagnosis, DiseaseSelector, RandomSelector, SymptomOverlapSelector, assess_severity,
    },
    error::{FlowError, Result},
    followup::{CoOccurrenceFollowups, FollowupPlanner, RandomFollowups},
    matching::match_symptoms,
    protocol::PredictionRequest,
    reference::ReferenceData,
};

/// Source of symptom matches, follow-up symptoms and predictions.
///
/// Stage tasks only talk to this trait, so the same conversation runs against
/// in-process reference data ([`LocalBackend`]) or a remote service.
#[async_trait]
pub trait SymptomBackend: Send + Sync {
    /// Vocabulary entries matching free text, best first.
    async fn lookup(&self, query: &str) -> Result<Vec<String>>;

    /// Symptoms to ask about after `symptom`.
    async fn followups(&self, symptom: &str) -> Result<Vec<String>>;

    async fn predict(&self, request: &PredictionRequest) -> Result<Diagnosis>;
}

/// Embedded backend over shared reference data.
///
/// All randomness flows from the owned RNG, so a seeded backend is reproducible.
pub struct LocalBackend {
    reference: Arc<ReferenceData>,
    planner: Box<dyn FollowupPlanner>,
    selector: Box<dyn DiseaseSelector>,
    rng: Mutex<StdRng>,
    max_candidates: usize,
    followup_count: usize,
    severity_threshold: f64,
}

impl LocalBackend {
    pub fn new(reference: Arc<ReferenceData>, config: &EngineConfig, rng: StdRng) -> Self {
        let planner: Box<dyn FollowupPlanner> = match config.followup_strategy {
            FollowupStrategy::Random => Box::new(RandomFollowups),
            FollowupStrategy::CoOccurrence => Box::new(CoOccurrenceFollowups),
        };
        let selector: Box<dyn DiseaseSelector> = match config.disease_strategy {
            DiseaseStrategy::Random => Box::new(RandomSelector),
            DiseaseStrategy::SymptomOverlap => Box::new(SymptomOverlapSelector),
        };

        Self {
            reference,
            planner,
            selector,
            rng: Mutex::new(rng),
            max_candidates: config.max_candidates,
            followup_count: config.followup_count,
            severity_threshold: config.severity_threshold,
        }
    }

    pub fn seeded(reference: Arc<ReferenceData>, config: &EngineConfig, seed: u64) -> Self {
        Self::new(reference, config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(reference: Arc<ReferenceData>, config: &EngineConfig) -> Self {
        Self::new(reference, config, StdRng::from_os_rng())
    }

    /// Replace the disease selection strategy, e.g. with a real classifier.
    pub fn with_selector(mut self, selector: Box<dyn DiseaseSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

#[async_trait]
impl SymptomBackend for LocalBackend {
    async fn lookup(&self, query: &str) -> Result<Vec<String>> {
        let matches = match_symptoms(self.reference.vocabulary(), query, self.max_candidates);
        debug!(query, matches = matches.len(), "Symptom lookup");
        Ok(matches)
    }

    async fn followups(&self, symptom: &str) -> Result<Vec<String>> {
        let planned = self.with_rng(|rng| {
            self.planner
                .plan(&self.reference, symptom, self.followup_count, rng)
        });
        debug!(symptom, planned = ?planned, "Planned follow-up symptoms");
        Ok(planned)
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<Diagnosis> {
        if let Some(unknown) = request
            .symptoms
            .iter()
            .find(|s| !self.reference.knows_symptom(s))
        {
            return Err(FlowError::Backend(format!("Unknown symptom: {unknown}")));
        }

        let mut evidence = request.symptoms.clone();
        if let Some(primary) = &request.primary_symptom {
            if !evidence.contains(primary) {
                evidence.insert(0, primary.clone());
            }
        }

        let disease = self
            .with_rng(|rng| self.selector.select(self.reference.catalog(), &evidence, rng))
            .ok_or_else(|| FlowError::Backend("Disease catalog is empty".to_string()))?;

        let severity = assess_severity(
            &self.reference,
            &request.symptoms,
            request.days,
            self.severity_threshold,
        );
        debug!(disease = %disease.name, score = severity.score, "Prediction computed");

        Ok(Diagnosis::new(disease, severity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::Verdict;

    fn backend(config: &EngineConfig) -> LocalBackend {
        LocalBackend::seeded(Arc::new(ReferenceData::builtin().unwrap()), config, 11)
    }

    #[tokio::test]
    async fn lookup_is_capped_by_config() {
        let mut config = EngineConfig::guided();
        config.max_candidates = 2;
        let matches = backend(&config).lookup("pain").await.unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn followups_respect_count() {
        let mut config = EngineConfig::guided();
        config.followup_count = 3;
        let planned = backend(&config).followups("itching").await.unwrap();
        assert_eq!(planned.len(), 3);
    }

    #[tokio::test]
    async fn predict_scores_given_symptoms() {
        let request = PredictionRequest {
            symptoms: vec!["cough".into(), "chills".into(), "fatigue".into()],
            days: 10,
            primary_symptom: Some("itching".into()),
        };
        let diagnosis = backend(&EngineConfig::guided()).predict(&request).await.unwrap();
        assert_eq!(diagnosis.severity.score, 7.5);
        assert_eq!(diagnosis.severity.verdict, Verdict::TakePrecautions);
        assert!(!diagnosis.precautions.is_empty());
    }

    #[tokio::test]
    async fn predict_rejects_unknown_symptoms() {
        let request = PredictionRequest {
            symptoms: vec!["made_up".into()],
            days: 1,
            primary_symptom: None,
        };
        let err = backend(&EngineConfig::guided()).predict(&request).await.unwrap_err();
        assert!(matches!(err, FlowError::Backend(msg) if msg.contains("made_up")));
    }

    #[tokio::test]
    async fn overlap_strategy_uses_primary_symptom() {
        let mut config = EngineConfig::guided();
        config.disease_strategy = DiseaseStrategy::SymptomOverlap;
        let request = PredictionRequest {
            symptoms: vec![],
            days: 3,
            primary_symptom: Some("skin_rash".into()),
        };
        let diagnosis = backend(&config).predict(&request).await.unwrap();
        assert_eq!(diagnosis.disease, "Fungal infection");
    }
}
