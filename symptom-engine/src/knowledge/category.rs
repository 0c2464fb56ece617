use serde::{Deserialize, Serialize};

const PAIN_ADVICE: &str =
    "Rest the affected area and avoid strenuous activities. Apply ice or heat as appropriate.";
const FEVER_ADVICE: &str = "Stay hydrated, rest, and monitor your temperature.";
const NAUSEA_ADVICE: &str = "Eat light, bland foods and stay hydrated with small sips of water.";
const COUGH_ADVICE: &str = "Stay hydrated and avoid irritants. Consider warm liquids with honey.";
const ITCHING_ADVICE: &str = "Avoid scratching and keep the area clean and dry.";
const FATIGUE_ADVICE: &str = "Ensure adequate rest and maintain a balanced diet.";
const GENERAL_ADVICE: &str = "Monitor the symptom and note any changes or worsening.";

/// Appended to every piece of advice
pub const ESCALATION_ADVICE: &str =
    "If symptoms persist, worsen, or you experience severe discomfort, consult a healthcare professional promptly.";

const PAIN_SYNONYMS: [&str; 3] = ["ache", "hurt", "soreness"];
const FEVER_SYNONYMS: [&str; 4] = ["fever", "temperature", "hot", "feverish"];
const VISION_SYNONYMS: [&str; 3] = ["eyesight", "sight problems", "eye problems"];

/// Clinical category of a symptom, assigned once when the knowledge base is built.
///
/// The category drives the lay synonyms and the advice attached to a symptom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomCategory {
    JointPain,
    MusclePain,
    ChestPain,
    AbdominalPain,
    Pain,
    HighFever,
    MildFever,
    Fever,
    Nausea,
    Vomiting,
    Diarrhoea,
    Cough,
    Breathlessness,
    Itching,
    Rash,
    BlurredVision,
    Vision,
    Fatigue,
    Urinary,
    #[default]
    General,
}

impl SymptomCategory {
    /// Categorise a canonical symptom name by its keywords.
    ///
    /// The first matching keyword wins, in the order pain, fever, nausea,
    /// vomiting, diarrhoea, cough, breathlessness, itching, rash, vision,
    /// fatigue, polyuria.
    pub fn classify(name: &str) -> Self {
        let name = name.to_lowercase();
        let has = |keyword: &str| name.contains(keyword);

        if has("pain") {
            if has("joint") {
                Self::JointPain
            } else if has("muscle") {
                Self::MusclePain
            } else if has("chest") {
                Self::ChestPain
            } else if has("stomach") || has("abdominal") {
                Self::AbdominalPain
            } else {
                Self::Pain
            }
        } else if has("fever") {
            if has("high") {
                Self::HighFever
            } else if has("mild") {
                Self::MildFever
            } else {
                Self::Fever
            }
        } else if has("nausea") {
            Self::Nausea
        } else if has("vomiting") {
            Self::Vomiting
        } else if has("diarrhoea") {
            Self::Diarrhoea
        } else if has("cough") {
            Self::Cough
        } else if has("breathlessness") {
            Self::Breathlessness
        } else if has("itching") {
            Self::Itching
        } else if has("rash") {
            Self::Rash
        } else if has("vision") {
            if has("blurred") {
                Self::BlurredVision
            } else {
                Self::Vision
            }
        } else if has("fatigue") {
            Self::Fatigue
        } else if has("polyuria") {
            Self::Urinary
        } else {
            Self::General
        }
    }

    pub fn is_pain(self) -> bool {
        matches!(
            self,
            Self::JointPain | Self::MusclePain | Self::ChestPain | Self::AbdominalPain | Self::Pain
        )
    }

    pub fn is_fever(self) -> bool {
        matches!(self, Self::HighFever | Self::MildFever | Self::Fever)
    }

    /// Lay terms people use for symptoms of this category
    pub fn lay_synonyms(self) -> Vec<&'static str> {
        let specific: &[&str] = match self {
            Self::JointPain => &["joint ache", "arthritis", "stiff joints"],
            Self::MusclePain => &["muscle ache", "muscle soreness", "myalgia"],
            Self::ChestPain => &["chest ache", "chest discomfort"],
            Self::AbdominalPain => &["belly pain", "tummy ache", "stomach ache"],
            Self::HighFever => &["high temperature", "burning fever"],
            Self::MildFever => &["low fever", "slight fever"],
            Self::Nausea => &["sick feeling", "queasy", "feeling sick"],
            Self::Vomiting => &["throwing up", "being sick", "puking"],
            Self::Diarrhoea => &["diarrhea", "loose stools", "watery stools"],
            Self::Cough => &["coughing", "throat clearing"],
            Self::Breathlessness => &["shortness of breath", "difficulty breathing", "hard to breathe"],
            Self::Itching => &["itch", "scratching", "irritation"],
            Self::Rash => &["skin rash", "skin irritation", "red spots"],
            Self::BlurredVision => &["blurry vision", "unclear vision"],
            Self::Fatigue => &["tiredness", "exhaustion", "weakness"],
            Self::Urinary => &["frequent urination", "urinating often", "peeing frequently"],
            Self::Pain | Self::Fever | Self::Vision | Self::General => &[],
        };

        let shared: &[&str] = if self.is_pain() {
            &PAIN_SYNONYMS
        } else if self.is_fever() {
            &FEVER_SYNONYMS
        } else if matches!(self, Self::Vision | Self::BlurredVision) {
            &VISION_SYNONYMS
        } else {
            &[]
        };

        shared.iter().chain(specific).copied().collect()
    }

    /// Category-specific first sentence of the advice text
    pub fn advice(self) -> &'static str {
        if self.is_pain() {
            PAIN_ADVICE
        } else if self.is_fever() {
            FEVER_ADVICE
        } else {
            match self {
                Self::Nausea => NAUSEA_ADVICE,
                Self::Cough => COUGH_ADVICE,
                Self::Itching => ITCHING_ADVICE,
                Self::Fatigue => FATIGUE_ADVICE,
                _ => GENERAL_ADVICE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_pain_subcategories() {
        assert_eq!(SymptomCategory::classify("joint_pain"), SymptomCategory::JointPain);
        assert_eq!(SymptomCategory::classify("muscle_pain"), SymptomCategory::MusclePain);
        assert_eq!(SymptomCategory::classify("stomach_pain"), SymptomCategory::AbdominalPain);
        assert_eq!(SymptomCategory::classify("belly_pain"), SymptomCategory::Pain);
    }

    #[test]
    fn test_classify_order_pain_before_fever() {
        // both keywords present: pain wins
        assert_eq!(SymptomCategory::classify("fever_pain"), SymptomCategory::Pain);
        assert_eq!(SymptomCategory::classify("high_fever"), SymptomCategory::HighFever);
        assert_eq!(SymptomCategory::classify("polyuria"), SymptomCategory::Urinary);
        assert_eq!(SymptomCategory::classify("skin_rash"), SymptomCategory::Rash);
        assert_eq!(SymptomCategory::classify("headache"), SymptomCategory::General);
    }

    #[test]
    fn test_lay_synonyms_combine_shared_and_specific() {
        let synonyms = SymptomCategory::JointPain.lay_synonyms();
        assert_eq!(
            synonyms,
            vec!["ache", "hurt", "soreness", "joint ache", "arthritis", "stiff joints"]
        );
        assert_eq!(SymptomCategory::MildFever.lay_synonyms().len(), 6);
        assert!(SymptomCategory::General.lay_synonyms().is_empty());
    }

    #[test]
    fn test_advice_by_category() {
        assert_eq!(SymptomCategory::ChestPain.advice(), PAIN_ADVICE);
        assert_eq!(SymptomCategory::HighFever.advice(), FEVER_ADVICE);
        assert_eq!(SymptomCategory::Vomiting.advice(), GENERAL_ADVICE);
        assert_eq!(SymptomCategory::Fatigue.advice(), FATIGUE_ADVICE);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&SymptomCategory::BlurredVision).unwrap();
        assert_eq!(json, "\"blurred_vision\"");
    }
}
