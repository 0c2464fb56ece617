use crate::codes;
use thiserror::Error;

/// Error enum shared by the engine and its tooling
#[derive(Error, Debug)]
pub enum DiagnosisError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed or missing tabular input
    #[error("Dataset error in {file}: {message}")]
    Dataset { file: String, message: String },

    /// Knowledge-base or model artifact could not be read or written
    #[error("Artifact error ({path}): {message}")]
    Artifact { path: String, message: String },

    /// Model, label encoder and symptom vocabulary do not belong together
    #[error("Vocabulary mismatch: {0}")]
    VocabularyMismatch(String),

    /// Classifier fitting errors
    #[error("Training error: {0}")]
    Training(String),

    /// Invalid knowledge-base edits or lookups
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    /// Rejected caller input
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DiagnosisError {
    pub fn dataset(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dataset {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn artifact(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Stable code for log correlation
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => codes::configuration::INVALID_CONFIG,
            Self::Artifact { .. } => codes::configuration::ARTIFACT_UNREADABLE,
            Self::VocabularyMismatch(_) => codes::configuration::VOCABULARY_MISMATCH,
            Self::Dataset { .. } => codes::data::MALFORMED_TABLE,
            Self::KnowledgeBase(_) => codes::data::KNOWLEDGE_BASE,
            Self::Training(_) => codes::training::FIT_FAILED,
            Self::Validation(_) => codes::validation::INVALID_INPUT,
            Self::Io(_) => codes::system::IO,
            Self::Json(_) => codes::system::SERIALIZATION,
            Self::Other(_) => codes::system::INTERNAL,
        }
    }

    /// Errors that must stop the service from starting in a half-initialised state.
    pub fn is_startup_fatal(&self) -> bool {
        !matches!(self, Self::Validation(_) | Self::KnowledgeBase(_))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, DiagnosisError>;

/// Log an error with its code
pub fn log_error(context: &str, error: &DiagnosisError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "Symptom engine error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_per_category() {
        let config = DiagnosisError::Configuration("missing path".to_string());
        let mismatch = DiagnosisError::VocabularyMismatch("131 != 130".to_string());
        let validation = DiagnosisError::Validation("empty name".to_string());

        assert_eq!(config.code(), "CONFIG_1001");
        assert_eq!(mismatch.code(), "CONFIG_1003");
        assert_eq!(validation.code(), "VALIDATION_4001");
    }

    #[test]
    fn test_startup_fatal_classification() {
        assert!(DiagnosisError::artifact("models/model.json", "truncated").is_startup_fatal());
        assert!(DiagnosisError::dataset("dataset.csv", "no header").is_startup_fatal());
        assert!(!DiagnosisError::KnowledgeBase("duplicate symptom".to_string()).is_startup_fatal());
        assert!(!DiagnosisError::Validation("blank".to_string()).is_startup_fatal());
    }

    #[test]
    fn test_display_includes_location() {
        let err = DiagnosisError::dataset("symptom_precaution.csv", "missing header Disease");
        assert_eq!(
            err.to_string(),
            "Dataset error in symptom_precaution.csv: missing header Disease"
        );
    }
}
