//! Administrative edits of the knowledge base.
//!
//! Edits operate on an owned copy; serving code picks the result up through
//! [`crate::EngineHandle::apply_knowledge_edit`], so live readers never see a
//! half-edited catalog.

use super::{slugify, DiseaseRecord, KnowledgeBase, SymptomCategory, SymptomRecord, ESCALATION_ADVICE};
use crate::dataset::MAX_PRECAUTIONS;
use error_common::{DiagnosisError, Result};
use itertools::Itertools;

/// A symptom entered by an operator
#[derive(Debug, Clone, Default)]
pub struct NewSymptom {
    pub name: String,
    pub synonyms: Vec<String>,
    pub description: String,
    /// Derived from the name when absent
    pub category: Option<SymptomCategory>,
}

#[derive(Debug, Clone, Default)]
pub struct NewDisease {
    pub name: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub precautions: Vec<String>,
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unique()
        .collect()
}

fn non_blank(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DiagnosisError::Validation(format!("{what} must not be empty")));
    }
    Ok(value.to_string())
}

impl KnowledgeBase {
    pub fn add_symptom(&mut self, symptom: NewSymptom) -> Result<&SymptomRecord> {
        let display_name = non_blank(&symptom.name, "symptom name")?;
        let name = slugify(&display_name);
        if self.symptom(&name).is_some() {
            return Err(DiagnosisError::KnowledgeBase(format!("symptom {name} already exists")));
        }

        let category = symptom.category.unwrap_or_else(|| SymptomCategory::classify(&name));
        self.symptoms.push(SymptomRecord {
            advice: format!("{} {}", category.advice(), ESCALATION_ADVICE),
            name: name.clone(),
            display_name,
            category,
            synonyms: clean_list(&symptom.synonyms),
            description: symptom.description.trim().to_string(),
            frequency: 0,
            related_diseases: Vec::new(),
        });
        self.refresh_totals();
        tracing::info!(symptom = %name, "➕ Added symptom");

        self.symptoms
            .last()
            .ok_or_else(|| DiagnosisError::KnowledgeBase("symptom list unexpectedly empty".to_string()))
    }

    /// Rename a symptom (matched by canonical or display name) and replace its synonyms.
    pub fn update_symptom(&mut self, current: &str, new_name: &str, synonyms: &[String]) -> Result<&SymptomRecord> {
        let display_name = non_blank(new_name, "symptom name")?;
        let slug = slugify(&display_name);

        let position = self
            .symptoms
            .iter()
            .position(|s| s.name == current || s.display_name == current)
            .ok_or_else(|| DiagnosisError::KnowledgeBase(format!("unknown symptom {current}")))?;

        if self
            .symptoms
            .iter()
            .enumerate()
            .any(|(i, s)| i != position && s.name == slug)
        {
            return Err(DiagnosisError::KnowledgeBase(format!("symptom {slug} already exists")));
        }

        let record = &mut self.symptoms[position];
        let previous = std::mem::replace(&mut record.name, slug);
        record.display_name = display_name;
        record.synonyms = clean_list(synonyms);
        tracing::info!(from = %previous, to = %record.name, "✏️ Updated symptom");
        Ok(&*record)
    }

    pub fn add_disease(&mut self, disease: NewDisease) -> Result<&DiseaseRecord> {
        let name = non_blank(&disease.name, "disease name")?;
        if self.disease(&name).is_some() {
            return Err(DiagnosisError::KnowledgeBase(format!("disease {name} already exists")));
        }

        let precautions = clean_list(&disease.precautions);
        if precautions.len() > MAX_PRECAUTIONS {
            tracing::warn!(disease = %name, given = precautions.len(), "⚠️ Extra precautions dropped");
        }

        self.diseases.push(DiseaseRecord {
            name: name.clone(),
            description: disease.description.trim().to_string(),
            symptoms: clean_list(&disease.symptoms),
            precautions: precautions.into_iter().take(MAX_PRECAUTIONS).collect(),
        });
        self.refresh_totals();
        tracing::info!(disease = %name, "➕ Added disease");

        self.diseases
            .last()
            .ok_or_else(|| DiagnosisError::KnowledgeBase("disease list unexpectedly empty".to_string()))
    }

    pub fn update_disease_description(&mut self, disease: &str, description: &str) -> Result<()> {
        let record = self.disease_mut(disease)?;
        record.description = description.trim().to_string();
        tracing::info!(disease = %disease, "✏️ Updated disease description");
        Ok(())
    }

    pub fn set_disease_precautions(&mut self, disease: &str, precautions: &[String]) -> Result<()> {
        let cleaned = clean_list(precautions);
        if cleaned.len() > MAX_PRECAUTIONS {
            return Err(DiagnosisError::Validation(format!(
                "at most {MAX_PRECAUTIONS} precautions are kept, got {}",
                cleaned.len()
            )));
        }
        let record = self.disease_mut(disease)?;
        record.precautions = cleaned;
        tracing::info!(disease = %disease, count = record.precautions.len(), "✏️ Updated precautions");
        Ok(())
    }

    fn disease_mut(&mut self, name: &str) -> Result<&mut DiseaseRecord> {
        self.diseases
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| DiagnosisError::KnowledgeBase(format!("unknown disease {name}")))
    }
}

impl NewSymptom {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new(Vec::new(), Vec::new());
        kb.add_symptom(NewSymptom {
            name: "Joint Pain".to_string(),
            synonyms: vec!["joint ache".to_string(), " ".to_string(), "joint ache".to_string()],
            description: "Pain in the joints".to_string(),
            category: None,
        })
        .unwrap();
        kb.add_disease(NewDisease {
            name: "Arthritis".to_string(),
            description: "Inflammation of joints".to_string(),
            symptoms: vec!["joint_pain".to_string()],
            precautions: vec!["exercise".to_string()],
        })
        .unwrap();
        kb
    }

    #[test]
    fn test_add_symptom_slugs_and_classifies() {
        let kb = kb();
        let symptom = kb.symptom("joint_pain").unwrap();
        assert_eq!(symptom.display_name, "Joint Pain");
        assert_eq!(symptom.category, SymptomCategory::JointPain);
        assert_eq!(symptom.synonyms, vec!["joint ache"]);
        assert_eq!(symptom.frequency, 0);
        assert_eq!(kb.total_symptoms, 1);
        assert_eq!(kb.total_diseases, 1);
    }

    #[test]
    fn test_duplicate_symptom_rejected() {
        let mut kb = kb();
        let err = kb.add_symptom(NewSymptom::named("joint pain")).unwrap_err();
        assert!(matches!(err, DiagnosisError::KnowledgeBase(_)));
        assert_eq!(kb.total_symptoms, 1);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut kb = kb();
        let err = kb.add_symptom(NewSymptom::named("   ")).unwrap_err();
        assert!(matches!(err, DiagnosisError::Validation(_)));
    }

    #[test]
    fn test_update_symptom_by_display_name() {
        let mut kb = kb();
        kb.update_symptom("Joint Pain", "Knee Pain", &["sore knee".to_string()])
            .unwrap();
        assert!(kb.symptom("joint_pain").is_none());
        let knee = kb.symptom("knee_pain").unwrap();
        assert_eq!(knee.synonyms, vec!["sore knee"]);
    }

    #[test]
    fn test_update_symptom_rename_collision() {
        let mut kb = kb();
        kb.add_symptom(NewSymptom::named("headache")).unwrap();
        let err = kb.update_symptom("headache", "joint pain", &[]).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_disease_edits() {
        let mut kb = kb();
        kb.update_disease_description("Arthritis", "  Joint inflammation ").unwrap();
        assert_eq!(kb.disease("Arthritis").unwrap().description, "Joint inflammation");

        kb.set_disease_precautions("Arthritis", &[]).unwrap();
        assert!(kb.disease("Arthritis").unwrap().precautions.is_empty());

        let too_many: Vec<String> = (1..=5).map(|i| format!("step {i}")).collect();
        assert!(kb.set_disease_precautions("Arthritis", &too_many).is_err());
        assert!(kb.update_disease_description("Gout", "x").is_err());
    }
}
