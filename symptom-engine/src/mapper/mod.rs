//! Free text to canonical symptom identifiers.

pub mod curated;

pub use curated::CuratedSynonyms;

use crate::knowledge::KnowledgeBase;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Keys shorter than this never take part in the substring pass
const SUBSTRING_MIN_CHARS: usize = 5;
/// Words of multi-word names shorter than this are not mapped on their own
const WORD_MIN_CHARS: usize = 5;
const EXCLUDED_WORDS: [&str; 6] = ["pain", "feel", "from", "with", "during", "very"];

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

lazy_static! {
    static ref WORD_REGEX: Regex = compile(r"\w+");
    static ref STOP_WORD_REGEX: Regex =
        compile(r"\b(i|am|have|been|feel|feeling|my|the|and|or|with|very|really|quite)\b");
    static ref WHITESPACE_REGEX: Regex = compile(r"\s+");
}

/// Which pass produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPass {
    Token,
    Phrase,
    Substring,
}

/// One detected symptom and the term that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomMatch {
    pub symptom: String,
    pub term: String,
    pub pass: MatchPass,
}

/// Maps free text to canonical symptom identifiers.
///
/// The mapping table is built once from the knowledge base and the curated
/// synonyms and never changes afterwards, so extraction is a pure function
/// of the input text.
#[derive(Debug, Clone)]
pub struct SymptomMapper {
    table: HashMap<String, String>,
    /// Keys long enough for the substring pass, longest first
    long_keys: Vec<String>,
}

impl SymptomMapper {
    pub fn new(kb: &KnowledgeBase, curated: &CuratedSynonyms) -> Self {
        let mut table: HashMap<String, String> = HashMap::new();

        for symptom in &kb.symptoms {
            for synonym in &symptom.synonyms {
                let key = synonym.trim().to_lowercase();
                if !key.is_empty() {
                    table.insert(key, symptom.name.clone());
                }
            }
        }

        // distinctive single words of multi-word names
        for symptom in &kb.symptoms {
            let spaced = symptom.name.replace('_', " ").to_lowercase();
            let words: Vec<&str> = spaced.split_whitespace().collect();
            if words.len() < 2 {
                continue;
            }
            for word in words {
                if word.chars().count() >= WORD_MIN_CHARS && !EXCLUDED_WORDS.contains(&word) {
                    table.insert(word.to_string(), symptom.name.clone());
                }
            }
        }

        for symptom in &kb.symptoms {
            let lowered = symptom.name.to_lowercase();
            table.insert(lowered.replace('_', " "), symptom.name.clone());
            table.insert(lowered, symptom.name.clone());
        }

        for (key, symptom) in curated.iter() {
            table.insert(key.to_string(), symptom.to_string());
        }

        let mut long_keys: Vec<String> = table
            .keys()
            .filter(|k| k.chars().count() >= SUBSTRING_MIN_CHARS)
            .cloned()
            .collect();
        long_keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        tracing::info!(mappings = table.len(), "🔗 Created symptom mappings");
        Self { table, long_keys }
    }

    /// Number of keys in the mapping table
    pub fn mapping_size(&self) -> usize {
        self.table.len()
    }

    pub fn lookup(&self, term: &str) -> Option<&str> {
        self.table.get(&term.trim().to_lowercase()).map(String::as_str)
    }

    /// Canonical symptoms mentioned in `text`, first-detected order, no duplicates
    pub fn extract_symptoms(&self, text: &str) -> Vec<String> {
        self.extract_matches(text).into_iter().map(|m| m.symptom).collect()
    }

    /// Like [`Self::extract_symptoms`], keeping the term and pass behind each symptom.
    pub fn extract_matches(&self, text: &str) -> Vec<SymptomMatch> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        let mut matches: Vec<SymptomMatch> = Vec::new();
        let mut push = |term: &str, symptom: &str, pass: MatchPass| {
            if !matches.iter().any(|m| m.symptom == symptom) {
                tracing::debug!(symptom = %symptom, pass = ?pass, "✅ Mapped symptom");
                matches.push(SymptomMatch {
                    symptom: symptom.to_string(),
                    term: term.to_string(),
                    pass,
                });
            }
        };

        for token in WORD_REGEX.find_iter(&lowered) {
            if let Some(symptom) = self.table.get(token.as_str()) {
                push(token.as_str(), symptom.as_str(), MatchPass::Token);
            }
        }

        let full = lowered.trim();
        let stripped = STOP_WORD_REGEX.replace_all(&lowered, "");
        let stripped = WHITESPACE_REGEX.replace_all(stripped.trim(), " ");
        for phrase in [full, &*stripped] {
            if phrase.is_empty() {
                continue;
            }
            if let Some(symptom) = self.table.get(phrase) {
                push(phrase, symptom.as_str(), MatchPass::Phrase);
            }
        }

        let mut found: Vec<(usize, &str)> = self
            .long_keys
            .iter()
            .filter_map(|key| lowered.find(key.as_str()).map(|pos| (pos, key.as_str())))
            .collect();
        found.sort_by_key(|&(pos, key)| (pos, Reverse(key.len())));
        for (_, key) in found {
            if let Some(symptom) = self.table.get(key) {
                push(key, symptom.as_str(), MatchPass::Substring);
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{DiseaseRecord, SymptomCategory, SymptomRecord};

    fn symptom(name: &str, synonyms: &[&str]) -> SymptomRecord {
        SymptomRecord {
            name: name.to_string(),
            display_name: name.to_string(),
            category: SymptomCategory::classify(name),
            synonyms: synonyms.iter().map(|s| (*s).to_string()).collect(),
            description: String::new(),
            advice: String::new(),
            frequency: 1,
            related_diseases: Vec::new(),
        }
    }

    fn mapper() -> SymptomMapper {
        let kb = KnowledgeBase::new(
            vec![
                symptom("continuous_feel_of_urine", &[]),
                symptom("diarrhoea", &["diarrhea", "loose stools"]),
                symptom("fatigue", &["tiredness", "weakness"]),
                symptom("headache", &[]),
                symptom("high_fever", &["fever", "temperature"]),
                symptom("muscle_weakness", &[]),
                symptom("skin_rash", &["skin rash", "red spots"]),
            ],
            Vec::<DiseaseRecord>::new(),
        );
        SymptomMapper::new(&kb, &CuratedSynonyms::default())
    }

    #[test]
    fn test_scenario_headache_tired_high_fever() {
        let detected = mapper().extract_symptoms("I have a headache and feel very tired with high fever");
        assert!(detected.contains(&"headache".to_string()));
        assert!(detected.contains(&"fatigue".to_string()));
        assert!(detected.contains(&"high_fever".to_string()));
        assert_eq!(detected[0], "headache");
    }

    #[test]
    fn test_nonsense_and_blank_input() {
        let mapper = mapper();
        assert!(mapper.extract_symptoms("xyz123 nonsense").is_empty());
        assert!(mapper.extract_symptoms("").is_empty());
        assert!(mapper.extract_symptoms("   \t\n").is_empty());
    }

    #[test]
    fn test_spelling_variants_deduplicate() {
        let detected = mapper().extract_symptoms("diarrhea since yesterday, the diarrhoea is bad");
        assert_eq!(detected, vec!["diarrhoea"]);
    }

    #[test]
    fn test_curated_overrides_win() {
        let mapper = mapper();
        // fatigue synonym "weakness" is overridden by the curated table
        assert_eq!(mapper.lookup("weakness"), Some("muscle_weakness"));
        assert_eq!(mapper.lookup("Diarrhea"), Some("diarrhoea"));
    }

    #[test]
    fn test_common_words_not_mapped_alone() {
        let mapper = mapper();
        assert_eq!(mapper.lookup("feel"), None);
        assert_eq!(mapper.lookup("urine"), Some("continuous_feel_of_urine"));
        assert_eq!(mapper.lookup("continuous feel of urine"), Some("continuous_feel_of_urine"));
    }

    #[test]
    fn test_phrase_pass_after_stop_words() {
        let matches = mapper().extract_matches("I have   red spots");
        let rash = matches.iter().find(|m| m.symptom == "skin_rash").unwrap();
        assert_eq!(rash.term, "red spots");
    }

    #[test]
    fn test_substring_pass_orders_by_position() {
        let matches = mapper().extract_matches("red spots and loose stools");
        let symptoms: Vec<_> = matches.iter().map(|m| m.symptom.as_str()).collect();
        assert_eq!(symptoms, vec!["skin_rash", "diarrhoea"]);
        assert!(matches.iter().all(|m| m.pass == MatchPass::Substring));
    }

    #[test]
    fn test_mapping_size_counts_keys() {
        let mapper = mapper();
        assert!(mapper.mapping_size() >= CuratedSynonyms::default().len());
    }
}
