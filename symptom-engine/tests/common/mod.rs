//! Small in-memory medical tables shared by the integration tests.

#![allow(dead_code)]

use std::sync::Once;
use symptom_engine::{
    DiseaseCatalog, EngineConfig, InferenceContext, KnowledgeBase, KnowledgeBaseBuilder, ModelArtifact,
    SymptomDataset, SymptomMapper, SymptomVocabulary, Trainer,
};

pub const DATASET_CSV: &str = "\
Disease,Symptom_1,Symptom_2,Symptom_3,Symptom_4
Typhoid, high_fever, headache, fatigue, abdominal_pain
Typhoid, headache, high_fever, chills, fatigue
Typhoid, fatigue, high_fever, abdominal_pain,
Typhoid, high_fever, headache, chills,
Typhoid, high_fever, fatigue, headache, chills
Typhoid, abdominal_pain, high_fever, headache,
Migraine, headache, blurred_and_distorted_vision, nausea,
Migraine, headache, nausea, stiff_neck,
Migraine, blurred_and_distorted_vision, headache, stiff_neck, nausea
Migraine, headache, stiff_neck,,
Migraine, nausea, headache, blurred_and_distorted_vision,
Migraine, headache, blurred_and_distorted_vision,,
Fungal infection, itching, skin_rash, nodal_skin_eruptions,
Fungal infection, itching, skin_rash,,
Fungal infection, skin_rash, nodal_skin_eruptions, itching,
Fungal infection, itching, nodal_skin_eruptions,,
Fungal infection, itching, skin_rash, dischromic_patches,
Fungal infection, skin_rash, itching, dischromic_patches,
Gastroenteritis, vomiting, diarrhoea, dehydration,
Gastroenteritis, vomiting, dehydration,,
Gastroenteritis, diarrhoea, vomiting,,
Gastroenteritis, vomiting, diarrhoea, sunken_eyes,
Gastroenteritis, dehydration, diarrhoea, sunken_eyes,
Gastroenteritis, vomiting, sunken_eyes, dehydration,
Diabetes , polyuria, excessive_hunger, fatigue,
Diabetes , fatigue, polyuria, weight_loss,
Diabetes , excessive_hunger, polyuria, blurred_and_distorted_vision,
Diabetes , polyuria, weight_loss, excessive_hunger,
Diabetes , fatigue, excessive_hunger, polyuria,
Diabetes , polyuria, blurred_and_distorted_vision, weight_loss,
Allergy, continuous_sneezing,,,
";

pub const DESCRIPTIONS_CSV: &str = "\
Disease,Description
Typhoid,An acute illness associated with fever caused by the Salmonella Typhi bacteria.
Migraine,A migraine can cause severe throbbing pain or a pulsing sensation.
Fungal infection,In humans fungal infections occur when an invading fungus takes over an area of the body.
Diabetes ,Diabetes is a disease that occurs when your blood glucose is too high.
Gastroenteritis,Gastroenteritis is an inflammation of the digestive tract.
";

/// Gastroenteritis deliberately has no precautions.
pub const PRECAUTIONS_CSV: &str = "\
Disease,Precaution_1,Precaution_2,Precaution_3,Precaution_4
Typhoid,eat high calorie vegitables,antiboitic therapy,consult doctor,medication
Migraine,meditation,reduce stress,use poloroid glasses in sun,consult doctor
Fungal infection,bath twice,use detol or neem in bathing water,keep infected area dry,use clean cloths
Diabetes ,have balanced diet,exercise,consult doctor,follow up
Allergy,apply calamine,cover area with bandage,,use ice to compress itching
";

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber_for_tests();
    });
}

fn tracing_subscriber_for_tests() -> Result<(), logger_redacted::LoggerError> {
    let config = logger_redacted::LoggerConfig {
        log_level: "warn".to_string(),
        ..logger_redacted::LoggerConfig::default()
    };
    logger_redacted::init_tracing(&config, false)
}

pub fn dataset() -> SymptomDataset {
    SymptomDataset::from_reader(DATASET_CSV.as_bytes(), "dataset.csv").unwrap()
}

pub fn catalog() -> DiseaseCatalog {
    DiseaseCatalog::from_readers(
        DESCRIPTIONS_CSV.as_bytes(),
        "symptom_Description.csv",
        PRECAUTIONS_CSV.as_bytes(),
        "symptom_precaution.csv",
    )
    .unwrap()
}

pub fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.training.n_estimators = 40;
    config.training.min_samples_split = 2;
    config.training.min_samples_leaf = 1;
    config
}

pub fn knowledge_base() -> KnowledgeBase {
    KnowledgeBaseBuilder::new().build(&dataset(), &catalog()).unwrap()
}

pub fn trained(config: &EngineConfig) -> (KnowledgeBase, ModelArtifact) {
    let dataset = dataset();
    let knowledge_base = KnowledgeBaseBuilder::new().build(&dataset, &catalog()).unwrap();
    let mapper = SymptomMapper::new(&knowledge_base, &symptom_engine::CuratedSynonyms::default());
    let vocabulary = SymptomVocabulary::from_dataset(&dataset);
    let (model, _) = Trainer::new(config.training.clone())
        .train(&dataset, &vocabulary, mapper.mapping_size())
        .unwrap();
    (knowledge_base, model)
}

pub fn context() -> InferenceContext {
    init_tracing();
    let config = config();
    let (knowledge_base, model) = trained(&config);
    InferenceContext::new(config, knowledge_base, model).unwrap()
}
