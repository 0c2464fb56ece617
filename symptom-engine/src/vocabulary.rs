use crate::dataset::SymptomDataset;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The ordered symptom vocabulary shared by the knowledge base, the trainer
/// and the vectorizer.
///
/// Names are sorted so the symptom-to-index mapping is reproducible from the
/// same dataset. The vocabulary is persisted with the model: a model is only
/// valid together with the exact vocabulary it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "VocabularyParts", into = "VocabularyParts")]
pub struct SymptomVocabulary {
    names: Vec<String>,
    counts: Vec<u32>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct VocabularyParts {
    names: Vec<String>,
    counts: Vec<u32>,
}

impl From<VocabularyParts> for SymptomVocabulary {
    fn from(parts: VocabularyParts) -> Self {
        let index = parts
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names: parts.names,
            counts: parts.counts,
            index,
        }
    }
}

impl From<SymptomVocabulary> for VocabularyParts {
    fn from(vocabulary: SymptomVocabulary) -> Self {
        Self {
            names: vocabulary.names,
            counts: vocabulary.counts,
        }
    }
}

impl SymptomVocabulary {
    /// Distinct symptom names of the dataset, sorted, with the number of
    /// times each one fills a slot across all records.
    pub fn from_dataset(dataset: &SymptomDataset) -> Self {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for record in dataset.records() {
            for symptom in record.symptoms() {
                *counts.entry(symptom).or_insert(0) += 1;
            }
        }

        let (names, counts): (Vec<String>, Vec<u32>) = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .unzip();

        VocabularyParts { names, counts }.into()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Slot occurrences of `name` in the dataset, 0 if unknown
    pub fn occurrence_count(&self, name: &str) -> u32 {
        self.index_of(name)
            .and_then(|i| self.counts.get(i).copied())
            .unwrap_or(0)
    }

    /// Stable hash of the ordered names
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update(b"\n");
        }
        general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// Symptoms and record count of one disease over the whole dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProfile {
    pub symptoms: BTreeSet<String>,
    pub record_count: usize,
}

/// `disease -> profile`, computed once so match scoring never rescans the dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProfiles {
    profiles: BTreeMap<String, DiseaseProfile>,
}

impl DiseaseProfiles {
    pub fn from_dataset(dataset: &SymptomDataset) -> Self {
        let mut profiles: BTreeMap<String, DiseaseProfile> = BTreeMap::new();
        for record in dataset.records() {
            let profile = profiles.entry(record.disease.clone()).or_default();
            profile.record_count += 1;
            profile
                .symptoms
                .extend(record.symptoms().map(str::to_string));
        }
        Self { profiles }
    }

    pub fn get(&self, disease: &str) -> Option<&DiseaseProfile> {
        self.profiles.get(disease)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DiseaseProfile)> {
        self.profiles.iter()
    }
}
