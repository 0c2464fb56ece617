use super::KnowledgeBase;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

const TOP_SYMPTOMS: usize = 10;

/// Summary of a knowledge base for operators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeBaseStats {
    pub total_symptoms: usize,
    pub total_diseases: usize,
    pub diseases_with_precautions: usize,
    pub diseases_with_description: usize,
    pub total_synonyms: usize,
    /// Most frequent symptoms, highest first
    pub top_symptoms: Vec<(String, u32)>,
    /// Number of symptoms listing each disease as related
    pub disease_mentions: BTreeMap<String, usize>,
}

impl KnowledgeBase {
    pub fn stats(&self) -> KnowledgeBaseStats {
        let top_symptoms = self
            .symptoms
            .iter()
            .sorted_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.name.cmp(&b.name)))
            .take(TOP_SYMPTOMS)
            .map(|s| (s.name.clone(), s.frequency))
            .collect();

        let disease_mentions = self
            .symptoms
            .iter()
            .flat_map(|s| s.related_diseases.iter().cloned())
            .counts()
            .into_iter()
            .collect();

        KnowledgeBaseStats {
            total_symptoms: self.symptoms.len(),
            total_diseases: self.diseases.len(),
            diseases_with_precautions: self.diseases.iter().filter(|d| !d.precautions.is_empty()).count(),
            diseases_with_description: self.diseases.iter().filter(|d| !d.description.is_empty()).count(),
            total_synonyms: self.symptoms.iter().map(|s| s.synonyms.len()).sum(),
            top_symptoms,
            disease_mentions,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::{CaseRecord, DiseaseCatalog, SymptomDataset};
    use crate::knowledge::KnowledgeBaseBuilder;

    #[test]
    fn test_stats_summary() {
        let dataset = SymptomDataset::from_records(vec![
            CaseRecord::new("Flu", ["high_fever", "headache", "chills"]),
            CaseRecord::new("Flu", ["high_fever", "headache"]),
            CaseRecord::new("Migraine", ["headache", "nausea"]),
        ]);
        let kb = KnowledgeBaseBuilder::new()
            .build(&dataset, &DiseaseCatalog::default())
            .unwrap();

        let stats = kb.stats();
        assert_eq!(stats.total_symptoms, 4);
        assert_eq!(stats.total_diseases, 2);
        assert_eq!(stats.diseases_with_precautions, 0);
        assert_eq!(stats.top_symptoms[0], ("headache".to_string(), 3));
        assert_eq!(stats.top_symptoms[1], ("high_fever".to_string(), 2));
        assert_eq!(stats.disease_mentions["Flu"], 3);
        assert_eq!(stats.disease_mentions["Migraine"], 2);
    }
}
