use super::{title_case, DiseaseRecord, KnowledgeBase, SymptomCategory, SymptomRecord, ESCALATION_ADVICE};
use crate::dataset::{DiseaseCatalog, SymptomDataset};
use crate::vocabulary::SymptomVocabulary;
use error_common::{DiagnosisError, Result};
use itertools::Itertools;
use std::collections::HashMap;

/// Related diseases kept per symptom
pub const MAX_RELATED_DISEASES: usize = 5;

const VERY_COMMON_FREQUENCY: u32 = 100;
const MODERATELY_COMMON_FREQUENCY: u32 = 50;

/// Builds the knowledge base from the incidence table and the disease catalog.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseBuilder {
    max_related_diseases: usize,
}

impl Default for KnowledgeBaseBuilder {
    fn default() -> Self {
        Self {
            max_related_diseases: MAX_RELATED_DISEASES,
        }
    }
}

impl KnowledgeBaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&self, dataset: &SymptomDataset, catalog: &DiseaseCatalog) -> Result<KnowledgeBase> {
        tracing::info!("🏗️ Creating knowledge base");
        let vocabulary = SymptomVocabulary::from_dataset(dataset);
        if vocabulary.is_empty() {
            return Err(DiagnosisError::dataset(
                "dataset",
                "no symptom found in any record",
            ));
        }

        // symptom -> diseases in first-seen order, disease -> symptoms of its latest record
        let mut symptom_diseases: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut disease_symptoms: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut disease_order: Vec<&str> = Vec::new();

        for record in dataset.records() {
            let disease = record.disease.as_str();
            let symptoms: Vec<&str> = record.symptoms().collect();
            for &symptom in &symptoms {
                let diseases = symptom_diseases.entry(symptom).or_default();
                if !diseases.contains(&disease) {
                    diseases.push(disease);
                }
            }
            if !disease_symptoms.contains_key(disease) {
                disease_order.push(disease);
            }
            let latest = disease_symptoms.entry(disease).or_default();
            if !symptoms.is_empty() {
                *latest = symptoms;
            }
        }

        let symptoms: Vec<SymptomRecord> = vocabulary
            .names()
            .iter()
            .map(|name| {
                let related = symptom_diseases.get(name.as_str()).map_or(&[][..], Vec::as_slice);
                self.symptom_record(name, vocabulary.occurrence_count(name), related)
            })
            .collect();

        let table_only = catalog
            .entries()
            .iter()
            .map(|entry| entry.name.as_str())
            .filter(|name| !disease_symptoms.contains_key(name));

        let diseases: Vec<DiseaseRecord> = disease_order
            .iter()
            .copied()
            .chain(table_only)
            .map(|name| DiseaseRecord {
                name: name.to_string(),
                description: catalog.description(name).unwrap_or_default().to_string(),
                symptoms: disease_symptoms
                    .get(name)
                    .map(|s| s.iter().map(|s| (*s).to_string()).collect())
                    .unwrap_or_default(),
                precautions: catalog.precautions(name).to_vec(),
            })
            .collect();

        let kb = KnowledgeBase::new(symptoms, diseases);
        tracing::info!(
            symptoms = kb.total_symptoms,
            diseases = kb.total_diseases,
            "✅ Knowledge base built"
        );
        Ok(kb)
    }

    fn symptom_record(&self, name: &str, frequency: u32, related: &[&str]) -> SymptomRecord {
        let category = SymptomCategory::classify(name);
        SymptomRecord {
            name: name.to_string(),
            display_name: title_case(name),
            category,
            synonyms: synonyms_for(name, category),
            description: describe(name, frequency, related),
            advice: format!("{} {}", category.advice(), ESCALATION_ADVICE),
            frequency,
            related_diseases: related
                .iter()
                .take(self.max_related_diseases)
                .map(|d| (*d).to_string())
                .collect(),
        }
    }
}

/// The name itself, its spaced form and the lay terms of its category, without duplicates
pub fn synonyms_for(name: &str, category: SymptomCategory) -> Vec<String> {
    let spaced = name.replace('_', " ");
    std::iter::once(name)
        .chain(std::iter::once(spaced.as_str()))
        .chain(category.lay_synonyms())
        .map(str::to_string)
        .unique()
        .collect()
}

fn describe(name: &str, frequency: u32, related: &[&str]) -> String {
    let qualifier = if frequency > VERY_COMMON_FREQUENCY {
        "This is a very common symptom"
    } else if frequency > MODERATELY_COMMON_FREQUENCY {
        "This is a moderately common symptom"
    } else {
        "This symptom"
    };

    if related.is_empty() {
        return format!(
            "{qualifier} that may indicate various underlying health conditions and should be evaluated by a healthcare professional."
        );
    }

    let mut diseases = related.iter().take(2).join(", ");
    if related.len() > 2 {
        diseases.push_str(&format!(" and {} other conditions", related.len() - 2));
    }

    format!(
        "{qualifier} that can be associated with {diseases}. {} may indicate various underlying health conditions and should be evaluated properly.",
        title_case(name)
    )
}
