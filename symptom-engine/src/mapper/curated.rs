use serde::{Deserialize, Serialize};

/// Hand-curated lay term -> canonical symptom table.
///
/// Applied after every derived mapping so these entries win on shared keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedSynonyms {
    entries: Vec<(String, String)>,
}

const DEFAULT_TABLE: &[(&str, &str)] = &[
    // pain
    ("joint pain", "joint_pain"),
    ("muscle pain", "muscle_pain"),
    ("muscle aches", "muscle_pain"),
    ("muscle ache", "muscle_pain"),
    ("joint ache", "joint_pain"),
    ("joint aches", "joint_pain"),
    ("back pain", "back_pain"),
    ("neck pain", "neck_pain"),
    ("chest pain", "chest_pain"),
    ("abdominal pain", "abdominal_pain"),
    ("stomach pain", "stomach_pain"),
    ("hip pain", "hip_joint_pain"),
    ("knee pain", "knee_pain"),
    ("stiff", "movement_stiffness"),
    ("stiffness", "movement_stiffness"),
    ("ache", "muscle_pain"),
    ("aching", "muscle_pain"),
    // fever
    ("fever", "high_fever"),
    ("high fever", "high_fever"),
    ("mild fever", "mild_fever"),
    ("temperature", "high_fever"),
    ("chills", "chills"),
    ("shivering", "shivering"),
    // digestive
    ("nausea", "nausea"),
    ("vomiting", "vomiting"),
    ("diarrhea", "diarrhoea"),
    ("diarrhoea", "diarrhoea"),
    ("constipation", "constipation"),
    ("stomach ache", "stomach_pain"),
    ("belly pain", "belly_pain"),
    ("indigestion", "indigestion"),
    // respiratory
    ("breathing difficulty", "breathlessness"),
    ("shortness of breath", "breathlessness"),
    ("breathlessness", "breathlessness"),
    ("cough", "cough"),
    ("congestion", "congestion"),
    ("runny nose", "runny_nose"),
    ("sneezing", "continuous_sneezing"),
    // skin
    ("skin rash", "skin_rash"),
    ("rash", "skin_rash"),
    ("itching", "itching"),
    ("itchy", "itching"),
    // urinary
    ("frequent urination", "polyuria"),
    ("urinating frequently", "polyuria"),
    ("polyuria", "polyuria"),
    ("burning urination", "burning_micturition"),
    ("burning micturition", "burning_micturition"),
    ("dark urine", "dark_urine"),
    ("yellow urine", "yellow_urine"),
    // thirst and appetite; the dataset records diabetic thirst as excessive_hunger
    ("excessive thirst", "excessive_hunger"),
    ("increased appetite", "increased_appetite"),
    ("loss of appetite", "loss_of_appetite"),
    ("excessive hunger", "excessive_hunger"),
    // vision
    ("blurred vision", "blurred_and_distorted_vision"),
    ("blurry vision", "blurred_and_distorted_vision"),
    ("vision problems", "blurred_and_distorted_vision"),
    ("visual disturbances", "visual_disturbances"),
    // fatigue
    ("fatigue", "fatigue"),
    ("tired", "fatigue"),
    ("exhausted", "fatigue"),
    ("weakness", "muscle_weakness"),
    ("weak", "muscle_weakness"),
    ("lethargy", "lethargy"),
    // neurological
    ("headache", "headache"),
    ("head pain", "headache"),
    ("migraine", "headache"),
    ("dizziness", "dizziness"),
    ("dizzy", "dizziness"),
    ("lightheaded", "dizziness"),
    // cardiac
    ("heart pain", "chest_pain"),
    ("palpitations", "palpitations"),
    ("fast heart rate", "fast_heart_rate"),
    ("rapid heartbeat", "fast_heart_rate"),
    // weight
    ("weight loss", "weight_loss"),
    ("weight gain", "weight_gain"),
    // jaundice
    ("yellow eyes", "yellowing_of_eyes"),
    ("yellowing of eyes", "yellowing_of_eyes"),
    ("yellow skin", "yellowish_skin"),
    ("yellowish skin", "yellowish_skin"),
    ("jaundice", "yellowing_of_eyes"),
    // mood
    ("depression", "depression"),
    ("anxiety", "anxiety"),
    ("mood swings", "mood_swings"),
    ("irritability", "irritability"),
    ("restlessness", "restlessness"),
    // sweating and swelling
    ("sweating", "sweating"),
    ("excessive sweating", "sweating"),
    ("swelling", "swelling_joints"),
    ("swollen joints", "swelling_joints"),
    ("joint swelling", "swelling_joints"),
    ("swollen legs", "swollen_legs"),
];

impl Default for CuratedSynonyms {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_TABLE.iter().copied())
    }
}

impl CuratedSynonyms {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Keys are lowercased and trimmed; blank pairs are skipped.
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.as_ref().trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
