use super::encoder::LabelEncoder;
use super::forest::RandomForest;
use super::trainer::TrainingReport;
use crate::persistence;
use crate::vocabulary::{DiseaseProfiles, SymptomVocabulary};
use chrono::{DateTime, Utc};
use error_common::{DiagnosisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub symptom_count: usize,
    pub class_count: usize,
    /// Size of the mapper table when the model was trained
    pub mapping_size: usize,
    pub vocabulary_fingerprint: String,
    pub report: TrainingReport,
}

impl ModelMetadata {
    pub fn new(vocabulary: &SymptomVocabulary, class_count: usize, mapping_size: usize, report: TrainingReport) -> Self {
        Self {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            symptom_count: vocabulary.len(),
            class_count,
            mapping_size,
            vocabulary_fingerprint: vocabulary.fingerprint(),
            report,
        }
    }
}

/// Everything inference needs from training, stored as one document.
///
/// The forest, the label encoder and the vocabulary ordering are only
/// meaningful together; [`ModelArtifact::load`] refuses a set that does not
/// line up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,
    pub vocabulary: SymptomVocabulary,
    pub labels: LabelEncoder,
    pub forest: RandomForest,
    pub profiles: DiseaseProfiles,
}

impl ModelArtifact {
    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_json(self, path)?;
        tracing::info!(
            model_id = %self.metadata.model_id,
            symptoms = self.metadata.symptom_count,
            diseases = self.metadata.class_count,
            path = %path.display(),
            "💾 Model artifact saved"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let artifact: Self = persistence::load_json(path)?;
        artifact.verify()?;
        tracing::info!(
            model_id = %artifact.metadata.model_id,
            trained_at = %artifact.metadata.trained_at,
            symptoms = artifact.metadata.symptom_count,
            diseases = artifact.metadata.class_count,
            "✅ Loaded disease prediction model"
        );
        Ok(artifact)
    }

    /// Cross-check metadata, vocabulary, encoder and forest.
    pub fn verify(&self) -> Result<()> {
        let fingerprint = self.vocabulary.fingerprint();
        if fingerprint != self.metadata.vocabulary_fingerprint {
            return Err(DiagnosisError::VocabularyMismatch(format!(
                "vocabulary fingerprint {fingerprint} does not match trained {}",
                self.metadata.vocabulary_fingerprint
            )));
        }
        if self.forest.n_features() != self.vocabulary.len() || self.metadata.symptom_count != self.vocabulary.len() {
            return Err(DiagnosisError::VocabularyMismatch(format!(
                "model expects {} features, vocabulary has {} symptoms",
                self.forest.n_features(),
                self.vocabulary.len()
            )));
        }
        if self.forest.n_classes() != self.labels.len() || self.metadata.class_count != self.labels.len() {
            return Err(DiagnosisError::VocabularyMismatch(format!(
                "model predicts {} classes, label encoder has {}",
                self.forest.n_classes(),
                self.labels.len()
            )));
        }
        Ok(())
    }
}
