//! The symptom and disease knowledge base.
//!
//! Built from the tabular inputs by [`KnowledgeBaseBuilder`], persisted as a
//! JSON document and loaded read-only by the inference context. The
//! administrative edit path in [`editor`] rewrites the document.

pub mod builder;
pub mod category;
pub mod editor;
pub mod stats;

pub use builder::*;
pub use category::*;
pub use stats::*;

use crate::persistence;
use error_common::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const KNOWLEDGE_BASE_VERSION: &str = "2.0";
pub const KNOWLEDGE_BASE_SOURCE: &str = "CSV Medical Database";

/// A canonical symptom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomRecord {
    /// Canonical slug, e.g. `joint_pain`
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub category: SymptomCategory,
    pub synonyms: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub advice: String,
    #[serde(default)]
    pub frequency: u32,
    #[serde(default)]
    pub related_diseases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_source")]
    pub source: String,
    pub total_symptoms: usize,
    pub total_diseases: usize,
    pub symptoms: Vec<SymptomRecord>,
    pub diseases: Vec<DiseaseRecord>,
}

fn default_version() -> String {
    KNOWLEDGE_BASE_VERSION.to_string()
}

fn default_source() -> String {
    KNOWLEDGE_BASE_SOURCE.to_string()
}

impl KnowledgeBase {
    pub fn new(symptoms: Vec<SymptomRecord>, diseases: Vec<DiseaseRecord>) -> Self {
        Self {
            version: default_version(),
            source: default_source(),
            total_symptoms: symptoms.len(),
            total_diseases: diseases.len(),
            symptoms,
            diseases,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut kb: Self = persistence::load_json(path)?;
        kb.refresh_totals();
        tracing::info!(
            symptoms = kb.total_symptoms,
            diseases = kb.total_diseases,
            path = %path.display(),
            "✅ Loaded knowledge base"
        );
        Ok(kb)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_json(self, path)?;
        tracing::info!(
            symptoms = self.total_symptoms,
            diseases = self.total_diseases,
            with_precautions = self.diseases.iter().filter(|d| !d.precautions.is_empty()).count(),
            path = %path.display(),
            "✅ Knowledge base saved"
        );
        Ok(())
    }

    pub(crate) fn refresh_totals(&mut self) {
        self.total_symptoms = self.symptoms.len();
        self.total_diseases = self.diseases.len();
    }

    pub fn symptom(&self, name: &str) -> Option<&SymptomRecord> {
        self.symptoms.iter().find(|s| s.name == name)
    }

    pub fn disease(&self, name: &str) -> Option<&DiseaseRecord> {
        self.diseases.iter().find(|d| d.name == name)
    }

    /// Advice for a symptom, matched by canonical or display name
    pub fn advice_for(&self, symptom: &str) -> Option<&str> {
        self.symptoms
            .iter()
            .find(|s| s.name == symptom || s.display_name == symptom)
            .map(|s| s.advice.as_str())
            .filter(|advice| !advice.is_empty())
    }
}

/// Canonical slug of a free-text name
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Human-readable form of a slug: `skin_rash` becomes `Skin Rash`
pub fn title_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
